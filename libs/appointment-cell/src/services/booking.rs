use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use notification_cell::NotificationWriter;
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::User;

use crate::models::{
    Appointment, AppointmentAction, AppointmentListQuery, AppointmentStatus, BookingError,
    CreateAppointmentRequest,
};
use crate::services::lifecycle;

pub struct BookingService {
    supabase: SupabaseClient,
    notifications: NotificationWriter,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            notifications: NotificationWriter::new(config),
        }
    }

    /// Book a new appointment for the calling patient. The appointment row
    /// and the consultant's notification are written in one storage
    /// transaction (`book_appointment` function); a concurrent booking of
    /// the same consultant and start time loses on the unique index and
    /// surfaces as `SlotBooked`. No availability pre-check is made here —
    /// the index is the arbiter.
    pub async fn create(
        &self,
        user: &User,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        if !user.is_patient() {
            return Err(BookingError::Forbidden(
                "Only patients can create appointments".to_string(),
            ));
        }
        let patient_id = user
            .uuid()
            .ok_or_else(|| BookingError::Validation("Invalid user id".to_string()))?;

        if request.end_at <= request.start_at {
            return Err(BookingError::Validation(
                "endAt must be after startAt".to_string(),
            ));
        }

        match self.supabase.get_user(request.consultant_id).await? {
            Some(consultant) if consultant.role == "consultant" => consultant,
            _ => return Err(BookingError::InvalidConsultant),
        };

        info!(
            "Booking appointment for patient {} with consultant {} at {}",
            patient_id, request.consultant_id, request.start_at
        );

        let appointment: Appointment = self
            .supabase
            .rpc(
                "book_appointment",
                json!({
                    "p_patient_id": patient_id,
                    "p_consultant_id": request.consultant_id,
                    "p_start_at": request.start_at.to_rfc3339(),
                    "p_end_at": request.end_at.to_rfc3339(),
                    "p_notes": request.patient_notes,
                    "p_patient_email": user.email_or_id(),
                }),
            )
            .await?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    /// Confirm a pending appointment. Consultant-on-the-appointment or admin.
    pub async fn confirm(&self, user: &User, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        let appointment = self.get_raw(appointment_id).await?;

        if !user.is_admin() && !user.is_same(&appointment.consultant_id) {
            return Err(BookingError::Forbidden(
                "Not authorized to confirm this appointment".to_string(),
            ));
        }

        let next = lifecycle::next_status(appointment.status, AppointmentAction::Confirm)?;
        let updated = self.set_status(appointment_id, next).await?;

        if let Err(e) = self
            .notifications
            .notify(
                updated.patient_id,
                "appointment_confirmed",
                "Appointment Confirmed",
                &format!("Your appointment with {} has been confirmed", user.email_or_id()),
                json!({ "appointmentId": updated.id }),
            )
            .await
        {
            warn!("Failed to write confirmation notification for {}: {}", updated.id, e);
        }

        Ok(updated)
    }

    /// Cancel an appointment. Either party or admin; the notification goes
    /// to everyone on the appointment except the actor.
    pub async fn cancel(&self, user: &User, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        let appointment = self.get_raw(appointment_id).await?;

        let is_party = user.is_same(&appointment.patient_id) || user.is_same(&appointment.consultant_id);
        if !user.is_admin() && !is_party {
            return Err(BookingError::Forbidden(
                "Not authorized to cancel this appointment".to_string(),
            ));
        }

        let next = lifecycle::next_status(appointment.status, AppointmentAction::Cancel)?;
        let updated = self.set_status(appointment_id, next).await?;

        for recipient in updated.counterparties(user) {
            if let Err(e) = self
                .notifications
                .notify(
                    recipient,
                    "appointment_cancelled",
                    "Appointment Cancelled",
                    &format!("Appointment with {} has been cancelled", user.email_or_id()),
                    json!({ "appointmentId": updated.id }),
                )
                .await
            {
                warn!("Failed to write cancellation notification for {}: {}", updated.id, e);
            }
        }

        Ok(updated)
    }

    /// Fetch one appointment, restricted to its parties and admins.
    pub async fn get(&self, user: &User, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        let appointment = self.get_raw(appointment_id).await?;

        if !user.is_admin() && !appointment.is_party(user) {
            return Err(BookingError::Forbidden(
                "Not authorized to view this appointment".to_string(),
            ));
        }

        Ok(appointment)
    }

    /// List appointments scoped to the caller. `role` picks which side of
    /// the appointment the caller's id is matched against; admins with no
    /// role filter see everything.
    pub async fn list(
        &self,
        user: &User,
        query: AppointmentListQuery,
    ) -> Result<Vec<Appointment>, BookingError> {
        debug!("Listing appointments for user {} with {:?}", user.id, query);

        let role = query.role.as_deref().or(user.role.as_deref());
        let scope_column = match role {
            Some("patient") => Some("patient_id"),
            Some("consultant") => Some("consultant_id"),
            Some("doctor") => Some("doctor_id"),
            Some("admin") => None,
            Some(other) => {
                return Err(BookingError::Validation(format!("Invalid role filter: {}", other)))
            }
            None => None,
        };

        let mut path = "/rest/v1/appointments?order=start_at.desc".to_string();
        match scope_column {
            Some(column) => path.push_str(&format!("&{}=eq.{}", column, user.id)),
            None => {
                if !user.is_admin() {
                    return Err(BookingError::Forbidden(
                        "Not authorized to view these appointments".to_string(),
                    ));
                }
            }
        }
        if let Some(status) = query.status {
            path.push_str(&format!("&status=eq.{}", status));
        }

        let appointments = self.supabase.select(&path).await?;
        Ok(appointments)
    }

    async fn get_raw(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        self.supabase
            .select_one(&path)
            .await?
            .ok_or(BookingError::NotFound)
    }

    async fn set_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, BookingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut updated: Vec<Appointment> = self
            .supabase
            .update(&path, json!({ "status": status }))
            .await?;

        if updated.is_empty() {
            return Err(BookingError::NotFound);
        }
        Ok(updated.remove(0))
    }
}
