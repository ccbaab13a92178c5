use thiserror::Error;

use crate::oem::OemError;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    FetchFailed(String),
    #[error("malformed feed: {0}")]
    MalformedFeed(#[from] OemError),
}
