use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::UserRecord;

use crate::models::{AvailabilityError, AvailabilityTemplate, BookableSlot, CreateAvailabilityRequest};

/// Parse a time-of-day field as submitted by clients ("09:00" or "09:00:30").
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, AvailabilityError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AvailabilityError::Validation(format!("Invalid time of day: {}", value)))
}

/// Day-of-week index used by templates: 0 = Sunday .. 6 = Saturday.
pub fn day_of_week_index(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

/// Templates that apply to `date`. Date-specific overrides win: when any
/// override template exists for the date, recurring templates are ignored.
pub fn select_templates(
    templates: Vec<AvailabilityTemplate>,
    date: NaiveDate,
) -> Vec<AvailabilityTemplate> {
    let weekday = day_of_week_index(date);

    let (overrides, recurring): (Vec<_>, Vec<_>) = templates
        .into_iter()
        .filter(|t| t.active)
        .partition(|t| t.date.is_some());

    let matching_overrides: Vec<_> = overrides.into_iter().filter(|t| t.date == Some(date)).collect();
    if !matching_overrides.is_empty() {
        return matching_overrides;
    }

    recurring
        .into_iter()
        .filter(|t| t.day_of_week == Some(weekday))
        .collect()
}

/// Walk a template's window in `slot_duration_min` steps for the given date.
/// A trailing increment that would cross `end_time` is dropped, not emitted.
pub fn expand_template(template: &AvailabilityTemplate, date: NaiveDate) -> Vec<BookableSlot> {
    let window_end = date.and_time(template.end_time).and_utc();
    let step = Duration::minutes(template.slot_duration_min as i64);

    let mut slots = Vec::new();
    let mut cursor = date.and_time(template.start_time).and_utc();

    while cursor + step <= window_end {
        slots.push(BookableSlot {
            start_at: cursor,
            end_at: cursor + step,
            max_concurrent: template.max_concurrent,
        });
        cursor += step;
    }

    slots
}

/// Start times of non-cancelled appointments, used to exclude taken slots.
#[derive(Debug, Deserialize)]
struct BookedStart {
    start_at: DateTime<Utc>,
}

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Validate and store a new availability template for a consultant.
    pub async fn create_template(
        &self,
        consultant_id: Uuid,
        request: CreateAvailabilityRequest,
    ) -> Result<AvailabilityTemplate, AvailabilityError> {
        debug!("Creating availability template for consultant {}", consultant_id);

        match (request.day_of_week, request.date) {
            (Some(day), None) => {
                if !(0..=6).contains(&day) {
                    return Err(AvailabilityError::Validation(
                        "Day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
                    ));
                }
            }
            (None, Some(_)) => {}
            _ => {
                return Err(AvailabilityError::Validation(
                    "Exactly one of dayOfWeek or date must be set".to_string(),
                ))
            }
        }

        let start_time = parse_time_of_day(&request.start_time)?;
        let end_time = parse_time_of_day(&request.end_time)?;
        if start_time >= end_time {
            return Err(AvailabilityError::Validation(
                "Start time must be before end time".to_string(),
            ));
        }

        let slot_duration_min = request.slot_duration_min.unwrap_or(30);
        if slot_duration_min < 15 {
            return Err(AvailabilityError::Validation(
                "Slot duration must be at least 15 minutes".to_string(),
            ));
        }

        let max_concurrent = request.max_concurrent.unwrap_or(1);
        if max_concurrent < 1 {
            return Err(AvailabilityError::Validation(
                "Max concurrent bookings must be at least 1".to_string(),
            ));
        }

        self.require_consultant(consultant_id).await?;

        let row = json!({
            "consultant_id": consultant_id,
            "day_of_week": request.day_of_week,
            "date": request.date,
            "start_time": start_time.format("%H:%M:%S").to_string(),
            "end_time": end_time.format("%H:%M:%S").to_string(),
            "slot_duration_min": slot_duration_min,
            "max_concurrent": max_concurrent,
            "active": request.active.unwrap_or(true),
        });

        let template = self.supabase.insert("availability_templates", row).await?;
        Ok(template)
    }

    /// Generate the ordered bookable slots for a consultant on one date:
    /// applicable templates expanded, already-booked starts excluded.
    pub async fn bookable_slots(
        &self,
        consultant_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookableSlot>, AvailabilityError> {
        debug!("Generating slots for consultant {} on {}", consultant_id, date);

        let weekday = day_of_week_index(date);
        let path = format!(
            "/rest/v1/availability_templates?consultant_id=eq.{}&active=eq.true&or=(day_of_week.eq.{},date.eq.{})&order=created_at.asc",
            consultant_id, weekday, date
        );
        let templates: Vec<AvailabilityTemplate> = self.supabase.select(&path).await?;

        let applicable = select_templates(templates, date);
        if applicable.is_empty() {
            return Ok(Vec::new());
        }

        let booked = self.booked_starts(consultant_id, date).await?;

        let mut slots: Vec<BookableSlot> = applicable
            .iter()
            .flat_map(|template| expand_template(template, date))
            .filter(|slot| !booked.contains(&slot.start_at))
            .collect();

        // Stable sort keeps template order for equal start times.
        slots.sort_by(|a, b| a.start_at.cmp(&b.start_at));

        debug!("Found {} bookable slots", slots.len());
        Ok(slots)
    }

    /// All consultants in the directory.
    pub async fn list_consultants(&self) -> Result<Vec<UserRecord>, AvailabilityError> {
        let rows = self
            .supabase
            .select("/rest/v1/users?role=eq.consultant&order=created_at.asc")
            .await?;
        Ok(rows)
    }

    /// One consultant plus the number of active availability templates.
    pub async fn get_consultant(
        &self,
        consultant_id: Uuid,
    ) -> Result<(UserRecord, usize), AvailabilityError> {
        let consultant = self.require_consultant(consultant_id).await?;

        let path = format!(
            "/rest/v1/availability_templates?consultant_id=eq.{}&active=eq.true&select=id",
            consultant_id
        );
        let templates: Vec<serde_json::Value> = self.supabase.select(&path).await?;

        Ok((consultant, templates.len()))
    }

    async fn require_consultant(&self, id: Uuid) -> Result<UserRecord, AvailabilityError> {
        match self.supabase.get_user(id).await? {
            Some(user) if user.role == "consultant" => Ok(user),
            _ => Err(AvailabilityError::ConsultantNotFound),
        }
    }

    async fn booked_starts(
        &self,
        consultant_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DateTime<Utc>>, AvailabilityError> {
        let day_start = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let day_end = day_start + Duration::days(1);

        let path = format!(
            "/rest/v1/appointments?consultant_id=eq.{}&status=neq.cancelled&start_at=gte.{}&start_at=lt.{}&select=start_at",
            consultant_id,
            urlencoding::encode(&day_start.to_rfc3339()),
            urlencoding::encode(&day_end.to_rfc3339())
        );
        let rows: Vec<BookedStart> = self.supabase.select(&path).await?;

        Ok(rows.into_iter().map(|r| r.start_at).collect())
    }
}
