use chrono::{DateTime, Duration, DurationRound, Utc};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use appointment_cell::models::Appointment;
use notification_cell::NotificationWriter;
use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::services::mailer::MailClient;
use crate::services::schedule;

/// Sweep cadence. Each lead-time window is one minute wide, so ticking once
/// a minute visits every window exactly once.
const SWEEP_INTERVAL_SECS: u64 = 60;

pub struct ReminderService {
    supabase: SupabaseClient,
    notifications: NotificationWriter,
    mailer: MailClient,
    leads: Vec<Duration>,
}

impl ReminderService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            notifications: NotificationWriter::new(config),
            mailer: MailClient::new(config),
            leads: schedule::parse_schedule(&config.reminder_schedule),
        }
    }

    /// Run the sweep forever. Spawned once by the binary; a failed tick is
    /// logged and the next tick proceeds on schedule.
    pub async fn run(self) {
        info!(
            "Reminder sweep running every {}s with {} lead times",
            SWEEP_INTERVAL_SECS,
            self.leads.len()
        );

        let mut interval = tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match self.tick(Utc::now()).await {
                0 => {}
                count => info!("Reminder sweep sent reminders for {} appointments", count),
            }
        }
    }

    /// One sweep pass: for every lead time, remind the confirmed appointments
    /// whose start falls in the minute-wide window at `now + lead`. Returns
    /// how many appointments were reminded. A failure on one window query or
    /// one appointment never blocks the others.
    pub async fn tick(&self, now: DateTime<Utc>) -> usize {
        let mut reminded = 0;

        for lead in &self.leads {
            let window_start = (now + *lead)
                .duration_trunc(Duration::minutes(1))
                .unwrap_or(now + *lead);
            let window_end = window_start + Duration::minutes(1);

            let path = format!(
                "/rest/v1/appointments?status=eq.confirmed&start_at=gte.{}&start_at=lt.{}",
                urlencoding::encode(&window_start.to_rfc3339()),
                urlencoding::encode(&window_end.to_rfc3339()),
            );
            let appointments: Vec<Appointment> = match self.supabase.select(&path).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(
                        "Reminder window query failed for lead {}: {}",
                        format_lead(*lead),
                        e
                    );
                    continue;
                }
            };
            debug!(
                "Reminder window [{}, {}): {} appointments",
                window_start,
                window_end,
                appointments.len()
            );

            for appointment in appointments {
                self.remind(&appointment, *lead).await;
                reminded += 1;
            }
        }

        reminded
    }

    async fn remind(&self, appointment: &Appointment, lead: Duration) {
        debug!("Reminding appointment {} ({} away)", appointment.id, format_lead(lead));

        for user_id in [appointment.patient_id, appointment.consultant_id] {
            if let Err(e) = self
                .notifications
                .notify(
                    user_id,
                    "appointment_reminder",
                    "Upcoming Appointment",
                    &format!("Your appointment starts in {}", format_lead(lead)),
                    json!({ "appointmentId": appointment.id }),
                )
                .await
            {
                warn!(
                    "Failed to write reminder notification for appointment {}: {}",
                    appointment.id, e
                );
            }

            self.email(user_id, appointment).await;
        }
    }

    async fn email(&self, user_id: Uuid, appointment: &Appointment) {
        let email = match self.supabase.get_user(user_id).await {
            Ok(Some(user)) => user.email,
            Ok(None) => {
                warn!("No user row for {} while emailing reminder", user_id);
                return;
            }
            Err(e) => {
                warn!("User lookup failed for reminder email: {}", e);
                return;
            }
        };

        if let Err(e) = self
            .mailer
            .send(
                &email,
                "Upcoming appointment reminder",
                &format!(
                    "You have an appointment starting at {}.",
                    appointment.start_at.to_rfc3339()
                ),
            )
            .await
        {
            warn!(
                "Failed to email reminder for appointment {}: {}",
                appointment.id, e
            );
        }
    }
}

fn format_lead(lead: Duration) -> String {
    if lead.num_minutes() % 60 == 0 {
        format!("{} hour(s)", lead.num_hours())
    } else {
        format!("{} minute(s)", lead.num_minutes())
    }
}
