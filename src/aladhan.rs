// Response data structures for the timings endpoint
mod response;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::{
    error::ProxyError,
    query::{PrayerQuery, Timings},
};

pub use response::TimingsEnvelope;

/// Public Aladhan API root
pub const ALADHAN_ENDPOINT: &str = "https://api.aladhan.com/v1";

/// Islamic Society of North America
pub const DEFAULT_METHOD: u8 = 2;

/// Timings for one day as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTimings {
    pub readable_date: String,
    pub timings: Timings,
}

/// Source of prayer timings for a validated query.
#[async_trait]
pub trait TimingsProvider: Send + Sync {
    async fn fetch_timings(&self, query: &PrayerQuery) -> Result<DayTimings, ProxyError>;
}

/// Client for the Aladhan `timingsByCity` endpoint
#[derive(Debug, Clone)]
pub struct AladhanClient {
    http: reqwest::Client,
    base_url: String,
    method: u8,
}

impl AladhanClient {
    pub fn new(base_url: impl Into<String>, method: u8) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            method,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/timingsByCity", self.base_url)
    }
}

impl Default for AladhanClient {
    fn default() -> Self {
        Self::new(ALADHAN_ENDPOINT, DEFAULT_METHOD)
    }
}

#[async_trait]
impl TimingsProvider for AladhanClient {
    /// Fetches the timings for `query` with a single upstream round trip.
    ///
    /// # Returns
    /// * `DayTimings` with the readable date and the five daily prayers
    /// * `ProxyError::Upstream` if the request fails, the provider answers
    ///   with an unsuccessful status, or the payload cannot be decoded
    async fn fetch_timings(&self, query: &PrayerQuery) -> Result<DayTimings, ProxyError> {
        info!(
            "Fetching prayer times for {}, {} ({})",
            query.city,
            query.country,
            query.date.as_deref().unwrap_or("today")
        );

        let method = self.method.to_string();
        let mut params = vec![
            ("city", query.city.as_str()),
            ("country", query.country.as_str()),
            ("method", method.as_str()),
        ];
        if let Some(date) = &query.date {
            params.push(("date", date.as_str()));
        }

        let response = self
            .http
            .get(self.endpoint())
            .query(&params)
            .send()
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            error!("Failed to fetch prayer times: {}", response.status());
            return Err(ProxyError::Upstream(format!(
                "Failed to fetch prayer times from external API (status {})",
                response.status().as_u16()
            )));
        }

        let envelope: TimingsEnvelope = response.json().await.map_err(|e| {
            error!("Malformed timings payload: {}", e);
            ProxyError::Upstream(format!("Malformed response from external API: {e}"))
        })?;
        debug!("Prayer times fetched successfully: {:?}", envelope);

        Ok(DayTimings {
            readable_date: envelope.data.date.readable,
            timings: envelope.data.timings,
        })
    }
}
