mod engine;
mod types;

pub use engine::QueryEngine;
pub use types::{EpochList, LocationReport, NowReport, SpeedReport, StateVectorReport};
