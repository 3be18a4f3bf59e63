use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::auth::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub consultant_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub booked_at: DateTime<Utc>,
    pub video_room_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// True when the user is referenced by this appointment as patient,
    /// consultant or assigned doctor.
    pub fn is_party(&self, user: &User) -> bool {
        user.is_same(&self.patient_id)
            || user.is_same(&self.consultant_id)
            || self.doctor_id.map(|id| user.is_same(&id)).unwrap_or(false)
    }

    /// The patient and consultant minus the given actor. For an actor who is
    /// neither (an admin), both are returned.
    pub fn counterparties(&self, actor: &User) -> Vec<Uuid> {
        if actor.is_same(&self.patient_id) {
            vec![self.consultant_id]
        } else if actor.is_same(&self.consultant_id) {
            vec![self.patient_id]
        } else {
            vec![self.patient_id, self.consultant_id]
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    #[serde(rename = "no-show")]
    NoShow,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed | AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::NoShow => write!(f, "no-show"),
        }
    }
}

/// Caller-initiated status changes, checked against the transition table in
/// `services::lifecycle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Confirm,
    Cancel,
    Complete,
}

impl fmt::Display for AppointmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentAction::Confirm => write!(f, "confirm"),
            AppointmentAction::Cancel => write!(f, "cancel"),
            AppointmentAction::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(alias = "consultantId")]
    pub consultant_id: Uuid,
    #[serde(alias = "startAt")]
    pub start_at: DateTime<Utc>,
    #[serde(alias = "endAt")]
    pub end_at: DateTime<Utc>,
    #[serde(alias = "patientNotes")]
    pub patient_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    /// Which side of the appointment the caller's id is matched against.
    pub role: Option<String>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// Month in `YYYY-MM` form.
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarEntry {
    pub id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: String,
    pub count: usize,
    pub appointments: Vec<CalendarEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Invalid consultant")]
    InvalidConsultant,

    #[error("Slot already booked")]
    SlotBooked,

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot {action} appointment in status {from}")]
    InvalidTransition {
        from: AppointmentStatus,
        action: AppointmentAction,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<shared_database::StoreError> for BookingError {
    fn from(e: shared_database::StoreError) -> Self {
        match e {
            shared_database::StoreError::DuplicateKey => BookingError::SlotBooked,
            other => BookingError::Database(other.to_string()),
        }
    }
}
