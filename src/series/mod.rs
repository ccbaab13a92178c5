mod error;
mod persist;
mod series;
mod store;

pub use error::{PersistError, SeriesError};
pub use persist::{FileStore, KeyValueStore, MemoryStore};
pub use series::TimeSeries;
pub use store::SeriesStore;
