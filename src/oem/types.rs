use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single position/velocity sample from the ephemeris, in the J2000 frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub epoch: DateTime<Utc>,
    /// km
    pub position: [f64; 3],
    /// km/s
    pub velocity: [f64; 3],
}
