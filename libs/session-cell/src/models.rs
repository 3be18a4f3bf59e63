use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closure record for a completed appointment. One per appointment, enforced
/// by a unique index on `appointment_id`; ratings and comments are filled in
/// after the fact by each party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub participants: Vec<Uuid>,
    pub notes: Option<String>,
    pub consultant_rating_by_patient: Option<i32>,
    pub patient_rating_by_consultant: Option<i32>,
    pub patient_comment: Option<String>,
    pub consultant_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompleteSessionRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// What a party needs to join the call.
#[derive(Debug, Serialize)]
pub struct SessionTokenResponse {
    #[serde(rename = "videoRoomId")]
    pub video_room_id: String,
    #[serde(rename = "roomUrl")]
    pub room_url: String,
    /// Absent when no video provider is configured.
    pub token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("No session record for this appointment")]
    RecordNotFound,

    #[error("Session already completed")]
    AlreadyCompleted,

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Invalid appointment status: {0}")]
    InvalidStatus(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Video provider error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<shared_database::StoreError> for SessionError {
    fn from(e: shared_database::StoreError) -> Self {
        match e {
            // The only unique index this cell writes against is the one on
            // session_records.appointment_id.
            shared_database::StoreError::DuplicateKey => SessionError::AlreadyCompleted,
            other => SessionError::Database(other.to_string()),
        }
    }
}
