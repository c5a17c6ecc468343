use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use thiserror::Error;

use crate::predict::to_julian;

const MINUTES_PER_DAY: f64 = 1440.0;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("time '{0}' is not in the form 'yyyy-mm-dd hh:mm:ss tz' (tz is an integer hour offset)")]
    Malformed(String),
}

/// How far the search extends either side of the end-of-exposure instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub before: Duration,
    pub after: Duration,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            before: Duration::minutes(10),
            after: Duration::minutes(5),
        }
    }
}

impl WindowPolicy {
    /// Total length of the window, or `None` if it does not fit a `Duration`.
    pub fn span(&self) -> Option<Duration> {
        self.before.checked_add(&self.after)
    }

    pub fn around(&self, instant: DateTime<Utc>) -> SearchWindow {
        let jd = to_julian(instant);
        SearchWindow::new(jd - days(self.before), jd + days(self.after))
    }
}

/// Directed search interval in Julian days. `begin` may be later than `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchWindow {
    pub begin: f64,
    pub end: f64,
}

impl SearchWindow {
    pub fn new(begin: f64, end: f64) -> Self {
        Self { begin, end }
    }

    pub fn midpoint(&self) -> f64 {
        (self.begin + self.end) / 2.0
    }

    pub fn half_span(&self) -> f64 {
        (self.end - self.begin).abs() / 2.0
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS TZ`, where TZ is a signed hour offset added to
/// the clock time to reach UTC.
pub fn parse_exposure_end(text: &str) -> Result<DateTime<Utc>, WindowError> {
    let malformed = || WindowError::Malformed(text.to_string());

    let fields: Vec<&str> = text.split_whitespace().collect();
    let [date, time, tz] = fields.as_slice() else {
        return Err(malformed());
    };

    let naive = NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M:%S")
        .map_err(|_| malformed())?;
    let offset_hours: i64 = tz.parse().map_err(|_| malformed())?;

    Duration::try_hours(offset_hours)
        .and_then(|offset| naive.and_utc().checked_add_signed(offset))
        .ok_or_else(malformed)
}

fn days(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 60_000.0 / MINUTES_PER_DAY
}
