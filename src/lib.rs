//! Islamic prayer times proxy.
//!
//! An HTTP endpoint validates a city, country and optional date, asks the
//! Aladhan timings API and answers with the five daily prayers. A terminal
//! form client and an LLM chat assistant sit on top of the same operation.

pub mod aladhan;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod geocode;
pub mod history;
pub mod query;
pub mod server;
pub mod service;
pub mod suggest;

pub use error::{ClientError, ProxyError};
pub use query::{PrayerQuery, PrayerRequest, PrayerResult, Timings};
