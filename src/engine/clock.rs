//! Clock used to stamp step and execution timestamps
//!
//! Real time by default. A clock built with `MockClock::at` is virtual and
//! only moves when told to; the ticker forwards a virtual clock by one
//! interval per tick, which keeps timestamps reproducible in tests and
//! exported reports.

use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct MockClock {
    /// The current virtual time, or None if using real time
    virtual_time: Option<DateTime<Utc>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock frozen at `time`
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            virtual_time: Some(time),
        }
    }

    /// Get the current time (virtual or real)
    pub fn now(&self) -> DateTime<Utc> {
        self.virtual_time.unwrap_or_else(Utc::now)
    }

    /// Advance a virtual clock; a real clock is left alone
    pub fn forward(&mut self, duration: Duration) {
        if let Some(current) = self.virtual_time {
            let step = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
            self.virtual_time = Some(current + step);
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),
}

/// Parse a time string (ISO 8601 or Unix timestamp in seconds)
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, ClockError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ts) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(ts, 0) {
            return Ok(dt);
        }
    }

    Err(ClockError::InvalidTimeFormat(format!(
        "could not parse '{}' as ISO 8601 or Unix timestamp",
        s
    )))
}
