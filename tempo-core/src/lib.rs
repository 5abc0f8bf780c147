//! Core library for the `tempo` CLI.
//!
//! This crate defines:
//! - Retry with exponential backoff for flaky upstreams
//! - An hourly, file-backed cache for ground-station data
//! - NO₂ number-density to mass-concentration conversion
//! - The [`AirQualityService`] surface that UI-side stores call into
//!
//! It is used by `tempo-cli`, but can also be reused by other front ends.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod retry;
pub mod units;

pub use cache::ExpiringCache;
pub use client::AirQualityClient;
pub use config::Config;
pub use error::FetchError;
pub use model::{
    BoundingBox, ForecastResponse, GroundDataResponse, LocatedGroundData, SatelliteHistoryItem, SatelliteScene,
    SatelliteSnapshot,
};
pub use provider::{AirQualityService, nominatim::UNKNOWN_PLACE};
pub use retry::RetryPolicy;
