mod frames;
mod geocode;
mod speed;
mod types;

use std::sync::Arc;
use std::time::Duration;

pub use frames::geodetic;
pub use geocode::{resolve_geoposition, GeocodeError, Geocoder, NoGeocoder, NominatimGeocoder};
pub use speed::{average_speed, speed};
pub use types::{DerivedLocation, GeodeticPosition};

use crate::oem::StateVector;

/// Combines the geodetic transform with a time-bounded place-name lookup.
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    timeout: Duration,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, timeout: Duration) -> Self {
        Self { geocoder, timeout }
    }

    pub async fn location(&self, vector: &StateVector) -> DerivedLocation {
        let GeodeticPosition {
            latitude_deg,
            longitude_deg,
            altitude_km,
        } = geodetic(vector);
        let geoposition =
            resolve_geoposition(self.geocoder.as_ref(), latitude_deg, longitude_deg, self.timeout)
                .await;

        DerivedLocation {
            latitude_deg,
            longitude_deg,
            altitude_km,
            geoposition,
        }
    }
}
