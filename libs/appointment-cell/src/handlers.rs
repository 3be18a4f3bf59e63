use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AppointmentListQuery, BookingError, CalendarQuery, CreateAppointmentRequest};
use crate::services::booking::BookingService;
use crate::services::calendar::CalendarService;

fn map_error(e: BookingError) -> AppError {
    match e {
        BookingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        BookingError::InvalidConsultant => {
            AppError::Validation("consultantId does not refer to a consultant".to_string())
        }
        BookingError::SlotBooked => AppError::Conflict {
            code: "SLOT_BOOKED",
            message: "This slot has already been booked".to_string(),
        },
        BookingError::Forbidden(msg) => AppError::Forbidden(msg),
        BookingError::Validation(msg) => AppError::Validation(msg),
        BookingError::InvalidTransition { .. } => AppError::InvalidStatus(e.to_string()),
        BookingError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = BookingService::new(&state);
    let appointment = service.create(&user, request).await.map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "data": appointment }))))
}

#[axum::debug_handler]
pub async fn get_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AppointmentListQuery>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointments = service.list(&user, query).await.map_err(map_error)?;

    Ok(Json(json!({ "ok": true, "data": appointments })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.get(&user, appointment_id).await.map_err(map_error)?;

    Ok(Json(json!({ "ok": true, "data": appointment })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .confirm(&user, appointment_id)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "ok": true, "data": appointment })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .cancel(&user, appointment_id)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "ok": true, "data": appointment })))
}

/// Month view of a user's appointments. Users may only read their own
/// calendar; admins may read anyone's.
#[axum::debug_handler]
pub async fn get_calendar_events(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if !user.is_admin() && !user.is_same(&user_id) {
        return Err(AppError::Forbidden(
            "Not authorized to view this calendar".to_string(),
        ));
    }
    let month = query
        .month
        .ok_or_else(|| AppError::Validation("Month query parameter is required".to_string()))?;

    let service = CalendarService::new(&state);
    let days = service.month_events(user_id, &month).await.map_err(map_error)?;

    Ok(Json(json!({ "ok": true, "data": days })))
}
