//! Timestamp handling for quiz windows and result release.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::errors::ServiceError;

/// Results become visible this long after a quiz's `end_date`.
pub fn result_grace_period() -> Duration {
    Duration::minutes(5)
}

// `%#z` takes `Z`, `+02`, `+0200` and `+02:00`; `%.f` is optional when parsing
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp carrying its own offset (`Z`, `+02:00`, `+0200`).
/// Seconds may be left out. A timestamp without any offset is read as UTC,
/// and a bare date as midnight UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, ServiceError> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt);
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Ok(dt);
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Ok(naive.and_utc().fixed_offset());
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset()),
        Err(e) => Err(ServiceError::InvalidTimestamp { value: value.to_string(), reason: e.to_string() }),
    }
}

/// Whether `now` falls inside `[start, end]`.
///
/// The window is anchored on `start`'s offset: the wall-clock time of `end`
/// is read in that offset, and `now` is converted to it before comparing.
pub fn window_contains(start: &str, end: &str, now: DateTime<Utc>) -> Result<bool, ServiceError> {
    let start = parse_timestamp(start)?;
    let offset = *start.offset();
    let end_raw = parse_timestamp(end)?;
    let end = offset
        .from_local_datetime(&end_raw.naive_local())
        .single()
        .ok_or_else(|| ServiceError::InvalidTimestamp {
            value: end.to_string(),
            reason: format!("cannot be placed in offset {offset}"),
        })?;
    let now = now.with_timezone(&offset);
    Ok(start <= now && now <= end)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Release {
    Available,
    /// Seconds left until the grace period after `end_date` runs out.
    Pending { remaining_secs: f64 },
}

/// Release state of a quiz's result at `now`, judged in `end`'s own offset.
pub fn release_status(end: &str, now: DateTime<Utc>) -> Result<Release, ServiceError> {
    let end = parse_timestamp(end)?;
    let threshold = end + result_grace_period();
    let now = now.with_timezone(end.offset());
    if now > threshold {
        return Ok(Release::Available);
    }
    let left = threshold.signed_duration_since(now);
    let remaining_secs = match left.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => left.num_seconds() as f64,
    };
    Ok(Release::Pending { remaining_secs })
}

/// Render seconds the way clients already parse them: always with a
/// fractional part (`2.0`, `1.25`).
pub fn format_seconds(secs: f64) -> String {
    if secs.is_finite() && secs.fract() == 0.0 {
        format!("{secs:.1}")
    } else {
        format!("{secs}")
    }
}
