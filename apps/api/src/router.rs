use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::router::{appointment_routes, calendar_routes};
use consultant_cell::router::consultant_routes;
use notification_cell::router::notification_routes;
use session_cell::router::{rating_routes, session_routes};
use shared_config::AppConfig;

async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "data": { "status": "healthy" } }))
}

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Arogyam API is running!" }))
        .route("/api/health", get(health))
        .nest("/api/appointments", appointment_routes(state.clone()))
        .nest("/api/consultants", consultant_routes(state.clone()))
        .nest("/api/sessions", session_routes(state.clone()))
        .nest("/api/ratings", rating_routes(state.clone()))
        .nest("/api/calendar", calendar_routes(state.clone()))
        .nest("/api/notifications", notification_routes(state))
}
