use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProxyError;

const MISSING_FIELDS: &str = "City and country are required fields";
const INVALID_DATE: &str = "Invalid date format. Please use YYYY-MM-DD format";

/// Raw body of `POST /api/getPrayerTimes`.
///
/// Every field is optional so that a missing city or country is reported as
/// a validation failure instead of a deserialization rejection.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct PrayerRequest {
    pub city: Option<String>,
    pub country: Option<String>,
    pub date: Option<String>,
}

/// A validated prayer-times query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrayerQuery {
    pub city: String,
    pub country: String,
    /// `YYYY-MM-DD`, forwarded upstream unchanged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl PrayerRequest {
    pub fn validate(self) -> Result<PrayerQuery, ProxyError> {
        let city = self.city.filter(|c| !c.is_empty());
        let country = self.country.filter(|c| !c.is_empty());

        let (Some(city), Some(country)) = (city, country) else {
            return Err(ProxyError::Validation(MISSING_FIELDS.to_string()));
        };

        let date = self.date.filter(|d| !d.is_empty());
        if let Some(date) = &date {
            if !is_iso_date(date) {
                return Err(ProxyError::Validation(INVALID_DATE.to_string()));
            }
        }

        Ok(PrayerQuery {
            city,
            country,
            date,
        })
    }

    /// Validates an arbitrary JSON body.
    ///
    /// A `city` or `country` that is not a string counts as missing; a
    /// `date` that is neither a string nor null is an invalid date.
    pub fn validate_json(body: &Value) -> Result<PrayerQuery, ProxyError> {
        let text = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);

        let query = PrayerRequest {
            city: text("city"),
            country: text("country"),
            date: text("date"),
        }
        .validate()?;

        match body.get("date") {
            Some(date) if !date.is_null() && !date.is_string() => {
                Err(ProxyError::Validation(INVALID_DATE.to_string()))
            }
            _ => Ok(query),
        }
    }
}

/// Checks the `^\d{4}-\d{2}-\d{2}$` shape only; calendar validity is left to
/// the provider.
pub fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// The five daily prayers, keyed the way the provider names them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Timings {
    pub fajr: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl Timings {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("Fajr", self.fajr.as_str()),
            ("Dhuhr", self.dhuhr.as_str()),
            ("Asr", self.asr.as_str()),
            ("Maghrib", self.maghrib.as_str()),
            ("Isha", self.isha.as_str()),
        ]
        .into_iter()
    }
}

/// Response body of a successful lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerResult {
    pub city: String,
    pub country: String,
    /// Human-readable date as reported by the provider, e.g. "01 Jan 2024"
    pub date: String,
    pub timings: Timings,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(city: Option<&str>, country: Option<&str>, date: Option<&str>) -> PrayerRequest {
        PrayerRequest {
            city: city.map(str::to_string),
            country: country.map(str::to_string),
            date: date.map(str::to_string),
        }
    }

    #[test]
    fn missing_or_empty_location_is_rejected() {
        for req in [
            request(None, Some("Pakistan"), None),
            request(Some("Lahore"), None, None),
            request(Some(""), Some("Pakistan"), None),
            request(Some("Lahore"), Some(""), Some("2024-01-01")),
            PrayerRequest::default(),
        ] {
            assert_eq!(
                req.validate(),
                Err(ProxyError::Validation(MISSING_FIELDS.to_string()))
            );
        }
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for date in [
            "2024-1-01",
            "01-01-2024",
            "2024/01/01",
            "2024-01-01T00:00",
            "abcd-ef-gh",
            " 2024-01-01",
            "２０２４-01-01",
        ] {
            let result = request(Some("Lahore"), Some("Pakistan"), Some(date)).validate();
            assert_eq!(
                result,
                Err(ProxyError::Validation(INVALID_DATE.to_string())),
                "{date} should be rejected"
            );
        }
    }

    #[test]
    fn ill_typed_json_fields_pick_the_matching_message() {
        let missing: Result<PrayerQuery, ProxyError> =
            Err(ProxyError::Validation(MISSING_FIELDS.to_string()));
        let bad_date: Result<PrayerQuery, ProxyError> =
            Err(ProxyError::Validation(INVALID_DATE.to_string()));

        assert_eq!(
            PrayerRequest::validate_json(
                &json!({ "city": "Lahore", "country": "Pakistan", "date": 20240101 })
            ),
            bad_date
        );
        assert_eq!(
            PrayerRequest::validate_json(
                &json!({ "city": "Lahore", "country": "Pakistan", "date": ["2024-01-01"] })
            ),
            bad_date
        );
        assert_eq!(
            PrayerRequest::validate_json(&json!({ "city": 42, "country": "Pakistan" })),
            missing
        );
        assert_eq!(
            PrayerRequest::validate_json(&json!({ "city": 42, "country": "Pakistan", "date": 1 })),
            missing
        );
        assert_eq!(PrayerRequest::validate_json(&json!(["Lahore"])), missing);
    }

    #[test]
    fn null_date_in_json_is_absent() {
        let query = PrayerRequest::validate_json(
            &json!({ "city": "Lahore", "country": "Pakistan", "date": null }),
        )
        .unwrap();
        assert_eq!(query.date, None);
    }

    #[test]
    fn shape_is_checked_not_calendar() {
        assert!(is_iso_date("2024-13-45"));
        assert!(is_iso_date("2024-01-01"));
        assert!(!is_iso_date("2024-01-011"));
    }

    #[test]
    fn valid_request_keeps_values_verbatim() {
        let query = request(Some(" Lahore"), Some("Pakistan"), Some("2024-01-01"))
            .validate()
            .unwrap();
        assert_eq!(query.city, " Lahore");
        assert_eq!(query.country, "Pakistan");
        assert_eq!(query.date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn empty_date_counts_as_absent() {
        let query = request(Some("Cairo"), Some("Egypt"), Some(""))
            .validate()
            .unwrap();
        assert_eq!(query.date, None);
    }

    #[test]
    fn timings_serialize_with_provider_keys() {
        let timings = Timings {
            fajr: "05:31".into(),
            dhuhr: "12:10".into(),
            asr: "15:12".into(),
            maghrib: "17:18".into(),
            isha: "18:41".into(),
        };
        let value = serde_json::to_value(&timings).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 5);
        for key in ["Fajr", "Dhuhr", "Asr", "Maghrib", "Isha"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }
}
