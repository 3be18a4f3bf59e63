use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Appointment, BookingError, CalendarDay, CalendarEntry};

pub struct CalendarService {
    supabase: SupabaseClient,
}

/// First day of the month named by `YYYY-MM`, plus the first day of the next.
fn month_bounds(month: &str) -> Result<(NaiveDate, NaiveDate), BookingError> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map_err(|_| BookingError::Validation("Invalid month format, expected YYYY-MM".to_string()))?;

    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .ok_or_else(|| BookingError::Validation("Invalid month".to_string()))?;

    Ok((first, next))
}

impl CalendarService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// A user's appointments for one month (any party role), grouped by day.
    pub async fn month_events(
        &self,
        user_id: Uuid,
        month: &str,
    ) -> Result<Vec<CalendarDay>, BookingError> {
        let (first, next) = month_bounds(month)?;
        debug!("Calendar events for {} in [{}, {})", user_id, first, next);

        let month_start = first.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let month_end = next.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();

        let path = format!(
            "/rest/v1/appointments?or=(patient_id.eq.{id},consultant_id.eq.{id},doctor_id.eq.{id})&start_at=gte.{}&start_at=lt.{}&order=start_at.asc",
            urlencoding::encode(&month_start.to_rfc3339()),
            urlencoding::encode(&month_end.to_rfc3339()),
            id = user_id,
        );
        let appointments: Vec<Appointment> = self.supabase.select(&path).await?;

        let mut by_date: BTreeMap<String, Vec<CalendarEntry>> = BTreeMap::new();
        for appointment in appointments {
            let key = appointment.start_at.date_naive().format("%Y-%m-%d").to_string();
            by_date.entry(key).or_default().push(CalendarEntry {
                id: appointment.id,
                start_at: appointment.start_at,
                end_at: appointment.end_at,
                status: appointment.status,
            });
        }

        let days = by_date
            .into_iter()
            .map(|(date, appointments)| CalendarDay {
                date,
                count: appointments.len(),
                appointments,
            })
            .collect();

        Ok(days)
    }
}
