use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{StoreError, SupabaseClient};

use crate::models::Notification;

/// Append-only writer used by the other cells to push entries into a user's
/// inbox on domain events.
pub struct NotificationWriter {
    supabase: SupabaseClient,
}

impl NotificationWriter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: &str,
        title: &str,
        body: &str,
        meta: Value,
    ) -> Result<Notification, StoreError> {
        debug!("Writing {} notification for user {}", kind, user_id);

        let row = json!({
            "user_id": user_id,
            "type": kind,
            "title": title,
            "body": body,
            "read": false,
            "meta": meta,
        });

        self.supabase.insert("notifications", row).await
    }
}
