use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE for {entry}: {message}")]
    InvalidTle { entry: String, message: String },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("Julian date {0} is not representable as a timestamp")]
    TimeOutOfRange(f64),
}
