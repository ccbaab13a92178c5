mod error;
mod scheduler;
mod source;

pub use error::RefreshError;
pub use scheduler::{RefreshOutcome, RefreshState, RefreshStatus, Refresher};
pub use source::{FeedSource, HttpFeedSource};
