use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const UNKNOWN_GEOPOSITION: &str = "Unknown";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reverse geocoding capability. `Ok(None)` means "nothing there", e.g. open ocean.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse_geocode(
        &self,
        latitude_deg: f64,
        longitude_deg: f64,
    ) -> Result<Option<String>, GeocodeError>;
}

/// Geocoder used when lookups are disabled.
pub struct NoGeocoder;

#[async_trait]
impl Geocoder for NoGeocoder {
    async fn reverse_geocode(&self, _: f64, _: f64) -> Result<Option<String>, GeocodeError> {
        Ok(None)
    }
}

/// Client for a Nominatim `reverse` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(url: String, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse_geocode(
        &self,
        latitude_deg: f64,
        longitude_deg: f64,
    ) -> Result<Option<String>, GeocodeError> {
        let lat = latitude_deg.to_string();
        let lon = longitude_deg.to_string();
        let reply: NominatimReverse = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "jsonv2"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("zoom", "10"),
                ("accept-language", "en"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Over water Nominatim answers 200 with {"error": "Unable to geocode"}.
        Ok(reply.display_name.filter(|name| !name.trim().is_empty()))
    }
}

/// Look up a place name, giving up after `timeout`. Never fails: any miss,
/// error, or timeout yields [`UNKNOWN_GEOPOSITION`].
pub async fn resolve_geoposition(
    geocoder: &dyn Geocoder,
    latitude_deg: f64,
    longitude_deg: f64,
    timeout: Duration,
) -> String {
    let lookup = geocoder.reverse_geocode(latitude_deg, longitude_deg);
    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(Some(name))) => name,
        Ok(Ok(None)) => UNKNOWN_GEOPOSITION.to_string(),
        Ok(Err(e)) => {
            log::warn!(
                "Reverse geocode failed for ({:.4}, {:.4}): {}",
                latitude_deg,
                longitude_deg,
                e
            );
            UNKNOWN_GEOPOSITION.to_string()
        }
        Err(_) => {
            log::warn!(
                "Reverse geocode timed out after {:?} for ({:.4}, {:.4})",
                timeout,
                latitude_deg,
                longitude_deg
            );
            UNKNOWN_GEOPOSITION.to_string()
        }
    }
}
