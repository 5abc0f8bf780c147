use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    error::FetchError,
    model::{BoundingBox, ForecastResponse, GroundDataResponse, SatelliteHistoryItem, SatelliteScene, SatelliteSnapshot},
};

/// Single-attempt adapter for the TEMPO analytics backend.
///
/// Values come back exactly as the server sent them; retries and unit
/// conversion live in [`crate::AirQualityClient`].
#[derive(Debug, Clone)]
pub struct TempoBackend {
    base_url: String,
    http: Client,
}

impl TempoBackend {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_ground(&self, lon: f64, lat: f64) -> Result<GroundDataResponse, FetchError> {
        let query = [("lat", lat.to_string()), ("lon", lon.to_string())];
        self.get_json("ground-based-air-quality/retrieve", &query).await
    }

    pub async fn fetch_forecast(&self, lon: f64, lat: f64) -> Result<ForecastResponse, FetchError> {
        let query = [("lat", lat.to_string()), ("lon", lon.to_string())];
        self.get_json("ground-based-air-quality/retrieveForecast", &query).await
    }

    pub async fn fetch_snapshot(&self, bbox: BoundingBox) -> Result<SatelliteSnapshot, FetchError> {
        self.get_json("level-three/retrieve", &bbox.query()).await
    }

    pub async fn fetch_history(
        &self,
        bbox: BoundingBox,
        count: u32,
    ) -> Result<Vec<SatelliteHistoryItem>, FetchError> {
        let mut query = bbox.query().to_vec();
        query.push(("n", count.to_string()));
        self.get_json("level-three/retrieveN", &query).await
    }

    pub async fn fetch_scene(&self) -> Result<SatelliteScene, FetchError> {
        self.get_json::<SatelliteScene>("level-three/retrieveFull", &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, path);

        let res = self.http.get(&url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        let parsed = serde_json::from_str(&body)?;
        tracing::debug!("GET {} -> {}", url, status);
        Ok(parsed)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
