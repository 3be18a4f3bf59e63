//! One-shot seeder for the standing consultant account. The account is an
//! ordinary `users` row; nothing in the request path treats it specially.

use dotenv::dotenv;
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{StoreError, SupabaseClient};
use shared_models::auth::UserRecord;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    if !config.is_configured() {
        error!("Cannot seed: store configuration is incomplete");
        std::process::exit(1);
    }

    let id = std::env::var("SEED_CONSULTANT_ID")
        .ok()
        .and_then(|raw| Uuid::parse_str(&raw).ok())
        .unwrap_or_else(Uuid::new_v4);
    let email = std::env::var("SEED_CONSULTANT_EMAIL")
        .unwrap_or_else(|_| "consultant@arogyam.com".to_string());

    let supabase = SupabaseClient::new(&config);
    let result: Result<UserRecord, StoreError> = supabase
        .insert(
            "users",
            json!({
                "id": id,
                "email": email,
                "role": "consultant",
            }),
        )
        .await;

    match result {
        Ok(user) => info!("Seeded consultant account {} ({})", user.id, user.email),
        Err(StoreError::DuplicateKey) => info!("Consultant account already seeded"),
        Err(e) => {
            error!("Seeding failed: {}", e);
            std::process::exit(1);
        }
    }
}
