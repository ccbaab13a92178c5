use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("epoch not found: {0}")]
    NotFound(String),
    #[error("no ephemeris data loaded")]
    EmptySeries,
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid key: {0}")]
    InvalidKey(String),
}
