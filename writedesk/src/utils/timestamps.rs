//! Timestamp utilities for the editor's date fields.
//!
//! Article times are stored as Unix seconds (UTC). The form presents them
//! in the site's local time as six discrete fields.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

/// Unix seconds, UTC.
pub type Timestamp = i64;

/// Errors that can occur while composing a timestamp from form fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// A sub-field is not a number.
    #[error("Field '{0}' is not numeric")]
    NotNumeric(String),

    /// The sub-fields do not form a calendar date and time.
    #[error("Invalid date or time: {0}")]
    OutOfRange(String),

    /// The composed instant lies before the epoch.
    #[error("Timestamp before 1970: {0}")]
    Negative(i64),
}

/// Source of the server's current time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Sets the current time.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock forward.
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

fn parse_part(name: &str, value: &str) -> Result<i64, TimestampError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| TimestampError::NotNumeric(name.to_string()))
}

fn to_u32(value: i64, what: &str) -> Result<u32, TimestampError> {
    u32::try_from(value).map_err(|_| TimestampError::OutOfRange(format!("{what} {value}")))
}

/// Composes a UTC timestamp from local year/month/day/hour/minute/second.
///
/// `names` labels the sub-fields for error reporting. All six values must
/// be numeric and form a valid calendar date and time; the local instant
/// must not precede the epoch.
pub fn compose_timestamp(
    names: [&str; 6],
    values: [&str; 6],
    gmt_offset_seconds: i32,
) -> Result<Timestamp, TimestampError> {
    let mut parts = [0i64; 6];
    for (i, (name, value)) in names.iter().zip(values.iter()).enumerate() {
        parts[i] = parse_part(name, value)?;
    }
    let [year, month, day, hour, minute, second] = parts;

    let year = i32::try_from(year).map_err(|_| TimestampError::OutOfRange(format!("year {year}")))?;
    let date = NaiveDate::from_ymd_opt(year, to_u32(month, "month")?, to_u32(day, "day")?)
        .ok_or_else(|| TimestampError::OutOfRange(format!("{year}-{month}-{day}")))?;
    let datetime = date
        .and_hms_opt(
            to_u32(hour, "hour")?,
            to_u32(minute, "minute")?,
            to_u32(second, "second")?,
        )
        .ok_or_else(|| TimestampError::OutOfRange(format!("{hour}:{minute}:{second}")))?;

    let local = datetime.and_utc().timestamp();
    if local < 0 {
        return Err(TimestampError::Negative(local));
    }
    Ok(local - i64::from(gmt_offset_seconds))
}

/// Like [`compose_timestamp`], but empty month/day default to 1 and empty
/// hour/minute/second default to 0. A part of `"0"` counts as empty. The
/// year must be present.
pub fn compose_timestamp_with_defaults(
    names: [&str; 6],
    values: [&str; 6],
    gmt_offset_seconds: i32,
) -> Result<Timestamp, TimestampError> {
    let defaults = ["", "1", "1", "0", "0", "0"];
    let mut filled = values;
    for (value, default) in filled.iter_mut().zip(defaults) {
        let trimmed = value.trim();
        if (trimmed.is_empty() || trimmed == "0") && !default.is_empty() {
            *value = default;
        }
    }
    compose_timestamp(names, filled, gmt_offset_seconds)
}

fn site_offset(gmt_offset_seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(gmt_offset_seconds).unwrap_or_else(|| Utc.fix())
}

/// Formats a timestamp in the site's local time with a strftime pattern.
#[must_use]
pub fn format_local(ts: Timestamp, gmt_offset_seconds: i32, pattern: &str) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| {
            dt.with_timezone(&site_offset(gmt_offset_seconds))
                .format(pattern)
                .to_string()
        })
        .unwrap_or_default()
}

/// Formats a timestamp as RFC 3339 in UTC.
#[must_use]
pub fn format_iso8601(ts: Timestamp) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S+00:00").to_string())
        .unwrap_or_default()
}
