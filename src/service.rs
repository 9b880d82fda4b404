use std::sync::Arc;

use tracing::debug;

use crate::{
    aladhan::TimingsProvider,
    error::ProxyError,
    query::{PrayerQuery, PrayerResult},
};

/// Answers prayer-times queries from a timings provider.
///
/// Shared by the HTTP proxy and the chat assistant. Every call is a fresh
/// provider round trip.
#[derive(Clone)]
pub struct PrayerService {
    provider: Arc<dyn TimingsProvider>,
}

impl PrayerService {
    pub fn new(provider: Arc<dyn TimingsProvider>) -> Self {
        Self { provider }
    }

    pub async fn get_prayer_times(&self, query: PrayerQuery) -> Result<PrayerResult, ProxyError> {
        let day = self.provider.fetch_timings(&query).await?;
        debug!(city = %query.city, country = %query.country, date = %day.readable_date, "resolved timings");

        Ok(PrayerResult {
            city: query.city,
            country: query.country,
            date: day.readable_date,
            timings: day.timings,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::{aladhan::DayTimings, query::Timings};

    /// Provider double that counts calls and returns a canned answer
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        pub calls: AtomicUsize,
        pub fail_with: Option<String>,
    }

    impl FakeProvider {
        pub fn failing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(message.to_string()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TimingsProvider for FakeProvider {
        async fn fetch_timings(&self, _query: &PrayerQuery) -> Result<DayTimings, ProxyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.fail_with {
                return Err(ProxyError::Upstream(message.clone()));
            }
            Ok(DayTimings {
                readable_date: "01 Jan 2024".into(),
                timings: Timings {
                    fajr: "05:31".into(),
                    dhuhr: "12:10".into(),
                    asr: "14:52".into(),
                    maghrib: "17:21".into(),
                    isha: "18:48".into(),
                },
            })
        }
    }

    #[tokio::test]
    async fn echoes_location_and_uses_readable_date() {
        let provider = Arc::new(FakeProvider::default());
        let service = PrayerService::new(provider.clone());

        let result = service
            .get_prayer_times(PrayerQuery {
                city: "Lahore".into(),
                country: "Pakistan".into(),
                date: Some("2024-01-01".into()),
            })
            .await
            .unwrap();

        assert_eq!(result.city, "Lahore");
        assert_eq!(result.country, "Pakistan");
        assert_eq!(result.date, "01 Jan 2024");
        assert_eq!(result.timings.dhuhr, "12:10");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let service = PrayerService::new(Arc::new(FakeProvider::failing("boom")));
        let result = service
            .get_prayer_times(PrayerQuery {
                city: "Cairo".into(),
                country: "Egypt".into(),
                date: None,
            })
            .await;
        assert_eq!(result, Err(ProxyError::Upstream("boom".into())));
    }
}
