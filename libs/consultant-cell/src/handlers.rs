use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AvailabilityError, AvailabilityQuery, CreateAvailabilityRequest};
use crate::services::availability::AvailabilityService;

fn map_error(e: AvailabilityError) -> AppError {
    match e {
        AvailabilityError::ConsultantNotFound => {
            AppError::NotFound("Consultant not found".to_string())
        }
        AvailabilityError::Validation(msg) => AppError::Validation(msg),
        AvailabilityError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn get_consultants(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let consultants = service.list_consultants().await.map_err(map_error)?;

    Ok(Json(json!({ "ok": true, "data": consultants })))
}

#[axum::debug_handler]
pub async fn get_consultant(
    State(state): State<Arc<AppConfig>>,
    Path(consultant_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let (consultant, availability_count) = service
        .get_consultant(consultant_id)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "ok": true,
        "data": {
            "consultant": consultant,
            "availabilityCount": availability_count
        }
    })))
}

/// Generated bookable slots for one calendar date. The date is validated
/// before any store access.
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Path(consultant_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let raw_date = query
        .date
        .ok_or_else(|| AppError::Validation("Date query parameter is required".to_string()))?;
    let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".to_string()))?;

    let service = AvailabilityService::new(&state);
    let slots = service
        .bookable_slots(consultant_id, date)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "ok": true, "data": slots })))
}

/// Create an availability template. Consultants may only manage their own
/// schedule; admins may manage anyone's.
#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<Arc<AppConfig>>,
    Path(consultant_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let is_self = user.is_consultant() && user.is_same(&consultant_id);
    if !is_self && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to create availability for this consultant".to_string(),
        ));
    }

    let service = AvailabilityService::new(&state);
    let template = service
        .create_template(consultant_id, request)
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "data": template }))))
}
