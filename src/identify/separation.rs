use serde::Deserialize;

use crate::predict::{
    dot, observe, refraction, topocentric, Candidate, GroundStation, Observation, PredictError,
    Separation, Topocentric,
};

const EARTH_RADIUS_M: f64 = 6_371_000.0;
// NOAA Professional Paper 7 refraction coefficient.
const REFRACTION_COEFFICIENT: f64 = 0.001255;
const TARGET_PROJECTION_RANGE_KM: f64 = 10_000.0;

/// How the angle between a candidate and the target is measured.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SeparationModel {
    /// Angle between the observer-relative line of sight and the target direction.
    #[default]
    Direct,
    /// Compare topocentric az/el, with the candidate's elevation corrected for
    /// refraction at its finite range.
    Refracted,
}

/// Fixed direction on the sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyTarget {
    pub ra_rad: f64,
    pub dec_rad: f64,
    unit: [f64; 3],
}

impl SkyTarget {
    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        Self::from_radians(ra_deg.to_radians(), dec_deg.to_radians())
    }

    pub fn from_radians(ra_rad: f64, dec_rad: f64) -> Self {
        let unit = [
            dec_rad.cos() * ra_rad.cos(),
            dec_rad.cos() * ra_rad.sin(),
            dec_rad.sin(),
        ];
        Self {
            ra_rad,
            dec_rad,
            unit,
        }
    }

    pub fn ra_deg(&self) -> f64 {
        self.ra_rad.to_degrees()
    }

    pub fn dec_deg(&self) -> f64 {
        self.dec_rad.to_degrees()
    }

    pub fn unit_vector(&self) -> [f64; 3] {
        self.unit
    }
}

impl SeparationModel {
    pub fn separation(
        &self,
        station: &GroundStation,
        target: &SkyTarget,
        candidate: &Candidate,
        jd: f64,
    ) -> Result<Separation, PredictError> {
        let observation = observe(station, candidate, jd)?;
        Ok(Separation {
            angle_deg: self.angle_deg(station, target, &observation),
            range_km: observation.look.range_km,
            altitude_km: observation.altitude_km,
        })
    }

    pub fn angle_deg(
        &self,
        station: &GroundStation,
        target: &SkyTarget,
        observation: &Observation,
    ) -> f64 {
        match self {
            SeparationModel::Direct => {
                angle_between_deg(observation.line_of_sight(), target.unit_vector())
            }
            SeparationModel::Refracted => refracted_angle_deg(station, target, observation),
        }
    }
}

fn refracted_angle_deg(station: &GroundStation, target: &SkyTarget, observation: &Observation) -> f64 {
    let satellite_el = refracted_elevation(station, &observation.look);

    // Project the target far out along its direction from the observer so the
    // same topocentric transform applies to it.
    let unit = target.unit_vector();
    let origin = observation.observer_teme_km;
    let far_point = [
        origin[0] + TARGET_PROJECTION_RANGE_KM * unit[0],
        origin[1] + TARGET_PROJECTION_RANGE_KM * unit[1],
        origin[2] + TARGET_PROJECTION_RANGE_KM * unit[2],
    ];
    let target_look = topocentric(station, far_point, observation.sidereal_rad);

    angle_between_deg(
        horizontal_unit_vector(observation.look.azimuth_rad, satellite_el),
        horizontal_unit_vector(target_look.azimuth_rad, target_look.elevation_rad),
    )
}

/// Elevation of a satellite at finite range, corrected by the scaled
/// infinite-range refraction. Below the horizon it is left unchanged.
fn refracted_elevation(station: &GroundStation, look: &Topocentric) -> f64 {
    let sin_el = look.elevation_rad.sin();
    if sin_el <= 0.0 || look.range_km <= 0.0 {
        return look.elevation_rad;
    }
    let factor = (EARTH_RADIUS_M + station.altitude_m) * REFRACTION_COEFFICIENT
        / (1000.0 * look.range_km * sin_el)
        * 60.0;
    look.elevation_rad - refraction(look.elevation_rad) * factor
}

fn horizontal_unit_vector(azimuth_rad: f64, elevation_rad: f64) -> [f64; 3] {
    [
        elevation_rad.cos() * azimuth_rad.cos(),
        elevation_rad.cos() * azimuth_rad.sin(),
        elevation_rad.sin(),
    ]
}

/// Angle between two unit vectors in degrees, in [0, 180].
pub fn angle_between_deg(u: [f64; 3], v: [f64; 3]) -> f64 {
    dot(u, v).clamp(-1.0, 1.0).acos().to_degrees()
}
