use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{
    BoundingBox, ForecastResponse, GroundDataResponse, LocatedGroundData, SatelliteHistoryItem, SatelliteScene,
    SatelliteSnapshot,
};

pub mod backend;
pub mod nominatim;

/// Everything a UI-side store may ask of the data layer.
///
/// Operations never fail outward: `None` means "no data this cycle" and the
/// geocoder falls back to [`nominatim::UNKNOWN_PLACE`].
#[async_trait]
pub trait AirQualityService: Send + Sync + Debug {
    /// Ground-station readings, served from the hourly cache when fresh.
    async fn ground_data(&self, lon: f64, lat: f64) -> Option<GroundDataResponse>;

    /// Ground-station readings plus the reverse-geocoded station city.
    async fn ground_data_with_city(&self, lon: f64, lat: f64) -> Option<LocatedGroundData>;

    async fn forecast(&self, lon: f64, lat: f64) -> Option<ForecastResponse>;

    /// Current NO₂ snapshot with `center_no2` in µg/m³.
    async fn satellite_snapshot(&self, bbox: BoundingBox) -> Option<SatelliteSnapshot>;

    /// The last `count` snapshots in upstream order, each center value in µg/m³.
    async fn satellite_history(&self, bbox: BoundingBox, count: u32) -> Option<Vec<SatelliteHistoryItem>>;

    async fn satellite_scene(&self) -> Option<SatelliteScene>;

    async fn reverse_geocode(&self, lat: f64, lon: f64) -> String;
}
