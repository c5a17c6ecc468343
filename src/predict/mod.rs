mod error;
mod ground_station;
mod julian;
mod propagation;
mod refraction;
mod tle_loader;
mod types;

pub use error::PredictError;
pub use ground_station::{geodetic_altitude_km, GroundStation};
pub use julian::{from_julian, to_julian};
pub use propagation::*;
pub use refraction::refraction;
pub use tle_loader::{Candidate, TleReader, TleRecord};
pub use types::{Match, Separation};
