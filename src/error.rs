use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::identify::WindowError;
use crate::predict::PredictError;

#[derive(Debug, Error)]
pub enum SatidError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error("could not open TLE file {path}: {source}")]
    Catalog {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TLE file {0} contains no entries")]
    EmptyCatalog(PathBuf),
    #[error("no RA/Dec pairs were read from stdin")]
    NoTargets,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SatidError {
    /// Whether the error stems from incomplete or malformed user input.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            SatidError::Config(ConfigError::Missing(_))
                | SatidError::Window(_)
                | SatidError::NoTargets
        )
    }
}
