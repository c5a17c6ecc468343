use std::f64::consts::TAU;

use crate::predict::{from_julian, geodetic_altitude_km, Candidate, GroundStation, PredictError};

/// Direction and distance of a point as seen from the station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Topocentric {
    pub azimuth_rad: f64,
    pub elevation_rad: f64,
    pub range_km: f64,
}

/// Propagated state of a candidate relative to the station at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub satellite_teme_km: [f64; 3],
    pub observer_teme_km: [f64; 3],
    pub sidereal_rad: f64,
    pub look: Topocentric,
    pub altitude_km: f64,
}

impl Observation {
    /// Unit vector from the observer towards the satellite, TEME frame.
    pub fn line_of_sight(&self) -> [f64; 3] {
        let dr = sub(self.satellite_teme_km, self.observer_teme_km);
        let range = norm(dr);
        if range > 0.0 {
            [dr[0] / range, dr[1] / range, dr[2] / range]
        } else {
            [0.0, 0.0, 0.0]
        }
    }
}

/// Propagate `candidate` to Julian date `jd` and observe it from `station`.
pub fn observe(
    station: &GroundStation,
    candidate: &Candidate,
    jd: f64,
) -> Result<Observation, PredictError> {
    let timestamp = from_julian(jd).ok_or(PredictError::TimeOutOfRange(jd))?;

    let minutes = candidate
        .elements
        .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let prediction = candidate
        .constants
        .propagate(minutes)
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    if prediction.position.iter().any(|v| !v.is_finite()) {
        return Err(PredictError::Propagation(format!(
            "non-finite position at JD {}",
            jd
        )));
    }

    let sidereal =
        sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()));

    let look = topocentric(station, prediction.position, sidereal);
    let altitude_km = geodetic_altitude_km(teme_to_ecef_position(prediction.position, sidereal));

    Ok(Observation {
        satellite_teme_km: prediction.position,
        observer_teme_km: station.position_teme_km(sidereal),
        sidereal_rad: sidereal,
        look,
        altitude_km,
    })
}

/// Azimuth, elevation and range of a TEME point as seen from the station.
pub fn topocentric(station: &GroundStation, point_teme_km: [f64; 3], gmst: f64) -> Topocentric {
    let point_ecef = teme_to_ecef_position(point_teme_km, gmst);
    let dr = sub(point_ecef, station.position_ecef_km());
    let range_km = norm(dr);

    let enu = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
    let azimuth_rad = enu.0.atan2(enu.1).rem_euclid(TAU);
    let elevation_rad = if range_km > 0.0 {
        (enu.2 / range_km).clamp(-1.0, 1.0).asin()
    } else {
        0.0
    };

    Topocentric {
        azimuth_rad,
        elevation_rad,
        range_km,
    }
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn norm(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}
