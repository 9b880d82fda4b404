// Module containing response data structures for reverse geocoding
mod response;

use tracing::{debug, error, info};

use crate::error::ClientError;

pub use response::ReverseGeocodeResponse;

// API root for the BigDataCloud client-side geocoding service (no key required)
pub const BIGDATACLOUD_ENDPOINT: &str = "https://api.bigdatacloud.net/data";

/// A place resolved from coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLocation {
    pub city: String,
    pub country: String,
}

/// Resolves coordinates to a city and country for form prefill
#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    http: reqwest::Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Looks up the place at the given coordinates.
    ///
    /// # Returns
    /// * `DetectedLocation` when the service reports both a city and a country
    /// * `ClientError::Geocode` for failed requests or incomplete answers
    pub async fn locate(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<DetectedLocation, ClientError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ClientError::Geocode(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }

        info!("Reverse geocoding {}, {}", latitude, longitude);

        let url = format!("{}/reverse-geocode-client", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ClientError::Geocode(e.to_string()))?;

        if !response.status().is_success() {
            error!("Failed to reverse geocode: {}", response.status());
            return Err(ClientError::Geocode(format!(
                "service answered {}",
                response.status()
            )));
        }

        let place: ReverseGeocodeResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Geocode(e.to_string()))?;
        debug!("Reverse geocoding result: {:?}", place);

        match (place.city, place.country_name) {
            (Some(city), Some(country)) if !city.is_empty() && !country.is_empty() => {
                Ok(DetectedLocation { city, country })
            }
            _ => Err(ClientError::Geocode(
                "no city or country for these coordinates".to_string(),
            )),
        }
    }
}
