use crate::query::Timings;

/// Envelope returned by the Aladhan `timingsByCity` endpoint.
///
/// Only the fields the proxy forwards are decoded; everything else in the
/// payload (hijri date, meta, the remaining timings) is ignored.
#[derive(serde::Deserialize, Debug)]
pub struct TimingsEnvelope {
    pub data: TimingsData,
}

#[derive(serde::Deserialize, Debug)]
pub struct TimingsData {
    pub timings: Timings,
    pub date: DateInfo,
}

/// Gregorian date information for the requested day
#[derive(serde::Deserialize, Debug)]
pub struct DateInfo {
    /// Human-readable date, e.g. "01 Jan 2024"
    pub readable: String,
}
