use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CompleteSessionRequest, RatingRequest, SessionError};
use crate::services::session::SessionService;

fn map_error(e: SessionError) -> AppError {
    match e {
        SessionError::AppointmentNotFound => {
            AppError::NotFound("Appointment not found".to_string())
        }
        SessionError::RecordNotFound => {
            AppError::NotFound("No session record for this appointment".to_string())
        }
        SessionError::AlreadyCompleted => AppError::Conflict {
            code: "SESSION_COMPLETED",
            message: "This session has already been completed".to_string(),
        },
        SessionError::Forbidden(msg) => AppError::Forbidden(msg),
        SessionError::InvalidStatus(msg) => AppError::InvalidStatus(msg),
        SessionError::Validation(msg) => AppError::Validation(msg),
        SessionError::Upstream(msg) => AppError::ExternalService(msg),
        SessionError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn get_session_token(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = SessionService::new(&state);
    let token = service
        .get_token(&user, appointment_id)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "ok": true, "data": token })))
}

/// Completion takes an optional body; an empty body means no session notes.
#[axum::debug_handler]
pub async fn complete_session(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    request: Option<Json<CompleteSessionRequest>>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let service = SessionService::new(&state);
    let record = service
        .complete(&user, appointment_id, request)
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "data": record }))))
}

#[axum::debug_handler]
pub async fn submit_rating(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<RatingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = SessionService::new(&state);
    let record = service
        .rate(&user, appointment_id, request)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "ok": true, "data": record })))
}
