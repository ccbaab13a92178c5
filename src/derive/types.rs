use serde::Serialize;
use utoipa::ToSchema;

/// Sub-satellite point on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DerivedLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    /// Place name below the station, or "Unknown" over open water.
    pub geoposition: String,
}
