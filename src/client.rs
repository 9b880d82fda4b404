//! Terminal counterpart of the browser form: submits queries to the proxy,
//! keeps recent searches and prefills the location from coordinates.

use chrono::Local;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    error::ClientError,
    geocode::{DetectedLocation, ReverseGeocoder},
    history::{KeyValueStore, RecentSearches},
    query::{PrayerQuery, PrayerResult},
};

pub const GENERIC_FAILURE: &str = "Failed to fetch prayer times. Please try again.";
pub const INCOMPLETE_FORM: &str = "Please enter city, country, and select a date";
pub const LOCATION_HINT: &str = "Could not detect your location. Please enter manually.";

/// Error body returned by the proxy
#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    /// The server's `error`, then its `message`, then a generic fallback
    fn into_message(self) -> String {
        self.error
            .filter(|e| !e.is_empty())
            .or(self.message.filter(|m| !m.is_empty()))
            .unwrap_or_else(|| GENERIC_FAILURE.to_string())
    }
}

/// HTTP client for the proxy endpoint
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    server_url: String,
}

impl ProxyClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            server_url: server_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn get_prayer_times(&self, query: &PrayerQuery) -> Result<PrayerResult, ClientError> {
        let url = format!("{}/api/getPrayerTimes", self.server_url);
        let response = self.http.post(&url).json(query).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(ClientError::Server {
            status: status.as_u16(),
            message: body.into_message(),
        })
    }
}

/// Outcome of a location prefill attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationPrefill {
    Detected(DetectedLocation),
    /// Detection failed; the user should type the location in
    Hint(&'static str),
}

/// The form: one submission at a time, recent searches updated on success
pub struct FormClient<S> {
    proxy: ProxyClient,
    geocoder: ReverseGeocoder,
    history: RecentSearches<S>,
}

impl<S: KeyValueStore> FormClient<S> {
    pub fn new(proxy: ProxyClient, geocoder: ReverseGeocoder, history: RecentSearches<S>) -> Self {
        Self {
            proxy,
            geocoder,
            history,
        }
    }

    pub fn history(&self) -> &RecentSearches<S> {
        &self.history
    }

    /// Today's date as the form's default, `YYYY-MM-DD`
    pub fn today() -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }

    /// Validates the form, asks the proxy and records the search on success.
    ///
    /// Input is trimmed before it is sent. A failed lookup leaves the recent
    /// searches untouched.
    pub async fn submit(
        &mut self,
        city: &str,
        country: &str,
        date: &str,
    ) -> Result<PrayerResult, ClientError> {
        let (city, country) = (city.trim(), country.trim());
        if city.is_empty() || country.is_empty() || date.is_empty() {
            return Err(ClientError::InvalidInput(INCOMPLETE_FORM.to_string()));
        }

        let query = PrayerQuery {
            city: city.to_string(),
            country: country.to_string(),
            date: Some(date.to_string()),
        };
        let result = self.proxy.get_prayer_times(&query).await?;
        info!("Fetched prayer times for {}, {}", city, country);

        if let Err(e) = self.history.record(city, country) {
            warn!("Could not save recent search: {}", e);
        }

        Ok(result)
    }

    /// Best-effort prefill from coordinates; failures become a hint
    pub async fn detect_location(&self, latitude: f64, longitude: f64) -> LocationPrefill {
        match self.geocoder.locate(latitude, longitude).await {
            Ok(place) => LocationPrefill::Detected(place),
            Err(e) => {
                warn!("Location detection failed: {}", e);
                LocationPrefill::Hint(LOCATION_HINT)
            }
        }
    }
}
