use serde::{Deserialize, Serialize};

/// Query rectangle for the level-three satellite endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat1: f64,
    pub lat2: f64,
    pub lon1: f64,
    pub lon2: f64,
}

impl BoundingBox {
    pub fn new(lat1: f64, lat2: f64, lon1: f64, lon2: f64) -> Self {
        Self { lat1, lat2, lon1, lon2 }
    }

    /// Square box of half-width `span` degrees around a point.
    pub fn around(lon: f64, lat: f64, span: f64) -> Self {
        Self::new(lat - span, lat + span, lon - span, lon + span)
    }

    pub(crate) fn query(&self) -> [(&'static str, String); 4] {
        [
            ("lat1", self.lat1.to_string()),
            ("lat2", self.lat2.to_string()),
            ("lon1", self.lon1.to_string()),
            ("lon2", self.lon2.to_string()),
        ]
    }
}

/// Single TEMPO NO₂ measurement over a bounding box.
///
/// `center_no2` is in µg/m³ once it leaves the client; `min_no2` and
/// `max_no2` stay on the upstream scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteSnapshot {
    #[serde(rename = "minNO2")]
    pub min_no2: f64,
    #[serde(rename = "maxNO2")]
    pub max_no2: f64,
    #[serde(rename = "centerNO2")]
    pub center_no2: f64,
    /// Base64-encoded PNG rendering of the box.
    #[serde(rename = "imagePng")]
    pub image_png: String,
}

/// A snapshot tagged with the upstream timestamp (kept as an opaque string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteHistoryItem {
    #[serde(flatten)]
    pub snapshot: SatelliteSnapshot,
    pub timestamp: String,
}

/// Full-scene NO₂ rendering from `retrieveFull`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteScene {
    #[serde(rename = "minNO2")]
    pub min_no2: f64,
    #[serde(rename = "maxNO2")]
    pub max_no2: f64,
    pub image_png: String,
    pub scale_factor: f64,
    #[serde(alias = "generatedAtInstant")]
    pub generated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AqiIndex {
    pub aqi: u8,
}

/// Pollutant concentrations in µg/m³. Stations that don't measure a
/// pollutant omit it or send `null`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Components {
    pub co: Option<f64>,
    pub no: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub nh3: Option<f64>,
}

/// One station reading; `dt` is Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirPollutionItem {
    pub main: AqiIndex,
    pub components: Components,
    pub dt: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundDataResponse {
    pub coord: Coord,
    pub list: Vec<AirPollutionItem>,
}

/// The forecast endpoint returns hourly readings in the ground-data shape.
pub type ForecastResponse = GroundDataResponse;

/// Ground data with the station's place name resolved. Never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedGroundData {
    pub ground: GroundDataResponse,
    pub station_city: String,
}
