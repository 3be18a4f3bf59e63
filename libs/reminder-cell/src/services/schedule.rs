use chrono::Duration;
use tracing::warn;

/// Parse a comma-separated reminder schedule such as
/// `"24h before,1h before,10m before"` into lead times. Malformed entries
/// are skipped with a warning rather than failing the whole schedule.
pub fn parse_schedule(schedule: &str) -> Vec<Duration> {
    schedule
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match parse_lead(entry) {
            Some(lead) => Some(lead),
            None => {
                warn!("Ignoring malformed reminder schedule entry: {:?}", entry);
                None
            }
        })
        .collect()
}

fn parse_lead(entry: &str) -> Option<Duration> {
    let amount = entry.strip_suffix(" before")?;
    if let Some(hours) = amount.strip_suffix('h') {
        let hours: i64 = hours.parse().ok()?;
        (hours > 0).then(|| Duration::hours(hours))
    } else if let Some(minutes) = amount.strip_suffix('m') {
        let minutes: i64 = minutes.parse().ok()?;
        (minutes > 0).then(|| Duration::minutes(minutes))
    } else {
        None
    }
}
