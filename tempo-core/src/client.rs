use std::{future::Future, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;

use crate::{
    Config,
    cache::{ExpiringCache, ground_data_key},
    error::FetchError,
    model::{
        BoundingBox, ForecastResponse, GroundDataResponse, LocatedGroundData, SatelliteHistoryItem, SatelliteScene,
        SatelliteSnapshot,
    },
    provider::{
        AirQualityService,
        backend::TempoBackend,
        nominatim::{Nominatim, UNKNOWN_PLACE},
    },
    retry::RetryPolicy,
    units::no2_to_mass_concentration,
};

/// Data-fetch client combining the backend, the geocoder, the ground-data
/// cache and the retry policy.
#[derive(Debug, Clone)]
pub struct AirQualityClient {
    backend: TempoBackend,
    geocoder: Nominatim,
    cache: ExpiringCache<GroundDataResponse>,
    retry: RetryPolicy,
    request_timeout: Duration,
    bulk_timeout: Duration,
}

impl AirQualityClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = Client::new();

        Ok(Self {
            backend: TempoBackend::new(config.api_base(), http.clone()),
            geocoder: Nominatim::new(config.geocoder_url.clone(), http),
            cache: ExpiringCache::new(config.cache_dir()?),
            retry: config.retry_policy(),
            request_timeout: config.request_timeout(),
            bulk_timeout: config.bulk_request_timeout(),
        })
    }

    pub fn cache(&self) -> &ExpiringCache<GroundDataResponse> {
        &self.cache
    }

    fn policy(&self, timeout: Duration) -> RetryPolicy {
        self.retry.clone().with_attempt_timeout(timeout)
    }

    /// One attempt bounded by the request timeout; failures are logged and dropped.
    async fn once<T, Fut>(&self, label: &str, request: Fut) -> Option<T>
    where
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let outcome = match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.request_timeout)),
        };

        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Error fetching {}: {}", label, e);
                None
            }
        }
    }
}

#[async_trait]
impl AirQualityService for AirQualityClient {
    async fn ground_data(&self, lon: f64, lat: f64) -> Option<GroundDataResponse> {
        let key = ground_data_key(lon, lat);

        if let Some(cached) = self.cache.get(&key) {
            tracing::info!("Returning cached ground data for {}, {}", lon, lat);
            return Some(cached);
        }

        let backend = &self.backend;
        let data = self
            .policy(self.request_timeout)
            .execute("ground data", move || backend.fetch_ground(lon, lat))
            .await?;

        if let Err(e) = self.cache.put(&key, &data, &Local::now()) {
            tracing::warn!("Failed to cache ground data under {}: {}", key, e);
        }

        tracing::info!("Fetched ground data for {}, {} ({} readings)", lon, lat, data.list.len());
        Some(data)
    }

    async fn ground_data_with_city(&self, lon: f64, lat: f64) -> Option<LocatedGroundData> {
        let ground = self.ground_data(lon, lat).await?;
        let station_city = self.reverse_geocode(ground.coord.lat, ground.coord.lon).await;
        Some(LocatedGroundData { ground, station_city })
    }

    async fn forecast(&self, lon: f64, lat: f64) -> Option<ForecastResponse> {
        self.once("forecast data", self.backend.fetch_forecast(lon, lat)).await
    }

    async fn satellite_snapshot(&self, bbox: BoundingBox) -> Option<SatelliteSnapshot> {
        let backend = &self.backend;
        let mut snapshot = self
            .policy(self.request_timeout)
            .execute("TEMPO snapshot", move || backend.fetch_snapshot(bbox))
            .await?;

        snapshot.center_no2 = no2_to_mass_concentration(snapshot.center_no2);
        Some(snapshot)
    }

    async fn satellite_history(&self, bbox: BoundingBox, count: u32) -> Option<Vec<SatelliteHistoryItem>> {
        let backend = &self.backend;
        let items = self
            .policy(self.bulk_timeout)
            .execute("TEMPO history", move || backend.fetch_history(bbox, count))
            .await?;

        let converted = items
            .into_iter()
            .map(|mut item| {
                item.snapshot.center_no2 = no2_to_mass_concentration(item.snapshot.center_no2);
                item
            })
            .collect();

        Some(converted)
    }

    async fn satellite_scene(&self) -> Option<SatelliteScene> {
        let backend = &self.backend;
        self.policy(self.bulk_timeout)
            .execute("TEMPO full scene", move || backend.fetch_scene())
            .await
    }

    async fn reverse_geocode(&self, lat: f64, lon: f64) -> String {
        self.once("reverse geocode", self.geocoder.reverse(lat, lon))
            .await
            .and_then(|resp| resp.place_name())
            .unwrap_or_else(|| UNKNOWN_PLACE.to_string())
    }
}
