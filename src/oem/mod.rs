mod epoch;
mod error;
mod parser;
mod types;

pub use epoch::{format_epoch, parse_epoch};
pub use error::OemError;
pub use parser::parse_oem;
pub use types::StateVector;
