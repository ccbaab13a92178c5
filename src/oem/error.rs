use thiserror::Error;

/// Any of these means the feed is malformed and must be rejected as a whole.
#[derive(Debug, Error)]
pub enum OemError {
    #[error("feed is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("document has no OEM body")]
    MissingBody,
    #[error("state vector {index}: invalid epoch '{value}'")]
    InvalidEpoch { index: usize, value: String },
    #[error("state vector {index}: {field} is not a finite number")]
    NonFinite { index: usize, field: &'static str },
}
