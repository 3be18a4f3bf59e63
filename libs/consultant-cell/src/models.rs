use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A consultant's recurring (day-of-week) or one-off (specific date) open
/// window. Exactly one of `day_of_week` / `date` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityTemplate {
    pub id: Uuid,
    pub consultant_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday, for recurring templates.
    pub day_of_week: Option<i32>,
    /// Specific calendar date, for one-off overrides.
    pub date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_min: i32,
    pub max_concurrent: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One concrete bookable window derived from a template for a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookableSlot {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Advisory capacity metadata; booking itself enforces single occupancy.
    pub max_concurrent: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAvailabilityRequest {
    #[serde(alias = "dayOfWeek")]
    pub day_of_week: Option<i32>,
    pub date: Option<NaiveDate>,
    /// Time of day, "HH:MM" or "HH:MM:SS".
    #[serde(alias = "startTime")]
    pub start_time: String,
    #[serde(alias = "endTime")]
    pub end_time: String,
    #[serde(alias = "slotDurationMin")]
    pub slot_duration_min: Option<i32>,
    #[serde(alias = "maxConcurrent")]
    pub max_concurrent: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Consultant not found")]
    ConsultantNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<shared_database::StoreError> for AvailabilityError {
    fn from(e: shared_database::StoreError) -> Self {
        AvailabilityError::Database(e.to_string())
    }
}
