use serde::Serialize;
use utoipa::ToSchema;

use crate::derive::DerivedLocation;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EpochList {
    pub epochs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StateVectorReport {
    pub epoch: String,
    /// km
    pub position: [f64; 3],
    /// km/s
    pub velocity: [f64; 3],
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpeedReport {
    pub epoch: String,
    pub speed_km_s: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocationReport {
    pub epoch: String,
    #[serde(flatten)]
    pub location: DerivedLocation,
}

/// Everything known about the sample closest to the current time.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NowReport {
    pub epoch: String,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub speed_km_s: f64,
    /// Mean speed over every sample in the loaded series.
    pub average_speed_km_s: f64,
    pub location: DerivedLocation,
}
