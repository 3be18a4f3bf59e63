use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn session_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/{appointment_id}/token", post(handlers::get_session_token))
        .route("/{appointment_id}/complete", post(handlers::complete_session))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}

pub fn rating_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/{appointment_id}/rate", post(handlers::submit_rating))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
