use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentAction, AppointmentStatus, BookingError};
use appointment_cell::services::lifecycle;
use notification_cell::NotificationWriter;
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::User;

use crate::models::{
    CompleteSessionRequest, RatingRequest, SessionError, SessionRecord, SessionTokenResponse,
};
use crate::services::video::VideoRoomClient;

pub struct SessionService {
    supabase: SupabaseClient,
    video: VideoRoomClient,
    notifications: NotificationWriter,
}

impl SessionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            video: VideoRoomClient::new(config),
            notifications: NotificationWriter::new(config),
        }
    }

    /// Issue video access for a confirmed appointment. The room id is
    /// assigned on first call and reused afterwards; the provider room is
    /// created together with the assignment.
    pub async fn get_token(
        &self,
        user: &User,
        appointment_id: Uuid,
    ) -> Result<SessionTokenResponse, SessionError> {
        let appointment = self.get_appointment(appointment_id).await?;

        if !user.is_admin() && !appointment.is_party(user) {
            return Err(SessionError::Forbidden(
                "Not authorized to join this session".to_string(),
            ));
        }
        if appointment.status != AppointmentStatus::Confirmed {
            return Err(SessionError::InvalidStatus(format!(
                "Appointment must be confirmed to join, is {}",
                appointment.status
            )));
        }

        if !self.video.is_configured() {
            let room_id = self.ensure_room_id(&appointment, None).await?;
            return Ok(SessionTokenResponse {
                room_url: VideoRoomClient::fallback_room_url(&room_id),
                video_room_id: room_id,
                token: None,
            });
        }

        let (room_id, room_url) = match &appointment.video_room_id {
            Some(room_id) => {
                let room = self.video.get_room(room_id).await?;
                (room_id.clone(), room.url)
            }
            None => {
                let room_id = format!("appointment-{}", appointment.id);
                let room = self.video.create_room(&room_id).await?;
                self.ensure_room_id(&appointment, Some(room_id.clone())).await?;
                (room_id, room.url)
            }
        };

        let is_owner = user.is_same(&appointment.consultant_id);
        let token = self.video.meeting_token(&room_id, &user.id, is_owner).await?;

        info!("Issued video token for {} on appointment {}", user.id, appointment.id);

        Ok(SessionTokenResponse {
            room_url,
            video_room_id: room_id,
            token: Some(token),
        })
    }

    /// Close out a confirmed appointment: mark it completed, write the
    /// closure record and ask both parties to rate each other. The status
    /// change and the record go through one SQL function, so a lost race on
    /// the record's unique index rolls the status change back too.
    pub async fn complete(
        &self,
        user: &User,
        appointment_id: Uuid,
        request: CompleteSessionRequest,
    ) -> Result<SessionRecord, SessionError> {
        let appointment = self.get_appointment(appointment_id).await?;

        if !user.is_admin() && !user.is_same(&appointment.consultant_id) {
            return Err(SessionError::Forbidden(
                "Only the consultant can complete this session".to_string(),
            ));
        }
        if self.get_record(appointment_id).await?.is_some() {
            return Err(SessionError::AlreadyCompleted);
        }

        lifecycle::next_status(appointment.status, AppointmentAction::Complete)
            .map_err(map_transition)?;

        let record: SessionRecord = self
            .supabase
            .rpc(
                "complete_session",
                json!({
                    "p_appointment_id": appointment_id,
                    "p_ended_at": Utc::now(),
                    "p_notes": request.notes,
                }),
            )
            .await?;

        info!("Session record {} written for appointment {}", record.id, appointment_id);

        for recipient in [appointment.patient_id, appointment.consultant_id] {
            if let Err(e) = self
                .notifications
                .notify(
                    recipient,
                    "session_completed",
                    "Session Completed",
                    "Your session has ended. Please rate your experience.",
                    json!({ "appointmentId": appointment_id }),
                )
                .await
            {
                warn!("Failed to write completion notification for {}: {}", appointment_id, e);
            }
        }

        Ok(record)
    }

    /// Record one party's rating of the other. Each party writes its own
    /// column; submitting again overwrites the previous value.
    pub async fn rate(
        &self,
        user: &User,
        appointment_id: Uuid,
        request: RatingRequest,
    ) -> Result<SessionRecord, SessionError> {
        if !(1..=5).contains(&request.rating) {
            return Err(SessionError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let appointment = self.get_appointment(appointment_id).await?;
        if appointment.status != AppointmentStatus::Completed {
            return Err(SessionError::InvalidStatus(format!(
                "Appointment must be completed to rate, is {}",
                appointment.status
            )));
        }
        if self.get_record(appointment_id).await?.is_none() {
            return Err(SessionError::RecordNotFound);
        }

        let patch = if user.is_same(&appointment.patient_id) {
            json!({
                "consultant_rating_by_patient": request.rating,
                "patient_comment": request.comment,
            })
        } else if user.is_same(&appointment.consultant_id) {
            json!({
                "patient_rating_by_consultant": request.rating,
                "consultant_comment": request.comment,
            })
        } else {
            return Err(SessionError::Forbidden(
                "Only the appointment parties can rate this session".to_string(),
            ));
        };

        let path = format!("/rest/v1/session_records?appointment_id=eq.{}", appointment_id);
        let mut updated: Vec<SessionRecord> = self.supabase.update(&path, patch).await?;
        if updated.is_empty() {
            return Err(SessionError::RecordNotFound);
        }

        info!("Rating recorded on appointment {} by {}", appointment_id, user.id);
        Ok(updated.remove(0))
    }

    /// The appointment's room id, assigning one (or the given one) when it
    /// has none yet.
    async fn ensure_room_id(
        &self,
        appointment: &Appointment,
        assigned: Option<String>,
    ) -> Result<String, SessionError> {
        if let Some(room_id) = &appointment.video_room_id {
            return Ok(room_id.clone());
        }
        let room_id = assigned.unwrap_or_else(|| format!("appointment-{}", appointment.id));
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment.id);
        let _: Vec<Appointment> = self
            .supabase
            .update(&path, json!({ "video_room_id": room_id }))
            .await?;
        Ok(room_id)
    }

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, SessionError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        self.supabase
            .select_one(&path)
            .await?
            .ok_or(SessionError::AppointmentNotFound)
    }

    async fn get_record(&self, appointment_id: Uuid) -> Result<Option<SessionRecord>, SessionError> {
        let path = format!("/rest/v1/session_records?appointment_id=eq.{}", appointment_id);
        Ok(self.supabase.select_one(&path).await?)
    }
}

fn map_transition(e: BookingError) -> SessionError {
    SessionError::InvalidStatus(e.to_string())
}
