use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::predict::{from_julian, Candidate, PredictError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Geometry of a candidate relative to the target at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    pub angle_deg: f64,
    pub range_km: f64,
    pub altitude_km: f64,
}

/// A candidate whose closest approach fell below the reporting threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub satellite: String,
    pub norad_id: u32,
    pub angle_deg: f64,
    pub range_km: f64,
    pub altitude_km: f64,
    pub time: DateTime<Utc>,
    /// Whole-second UTC timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// Sub-second remainder of `time`, in seconds.
    pub fractional_seconds: f64,
}

impl Match {
    pub fn new(candidate: &Candidate, separation: &Separation, jd: f64) -> Result<Self, PredictError> {
        let time = from_julian(jd).ok_or(PredictError::TimeOutOfRange(jd))?;
        Ok(Self {
            satellite: candidate.name.clone(),
            norad_id: candidate.norad_id,
            angle_deg: separation.angle_deg,
            range_km: separation.range_km,
            altitude_km: separation.altitude_km,
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
            fractional_seconds: f64::from(time.timestamp_subsec_nanos()) * 1e-9,
            time,
        })
    }
}
