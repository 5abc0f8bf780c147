//! Reverse geocoding through Nominatim (OpenStreetMap). Free, no API key.

use reqwest::{Client, header::USER_AGENT};
use serde::Deserialize;

use crate::error::FetchError;

/// Place name reported when nothing better is known.
pub const UNKNOWN_PLACE: &str = "Unknown";

const AGENT: &str = concat!("tempo-analytics/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Default, Deserialize)]
pub struct NominatimResponse {
    pub address: Option<NominatimAddress>,
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
}

impl NominatimResponse {
    /// First non-empty of city, town, village, then the full display name.
    pub fn place_name(self) -> Option<String> {
        let address = self.address.unwrap_or_default();
        [address.city, address.town, address.village, self.display_name]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct Nominatim {
    url: String,
    http: Client,
}

impl Nominatim {
    pub fn new(url: impl Into<String>, http: Client) -> Self {
        Self { url: url.into(), http }
    }

    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<NominatimResponse, FetchError> {
        let res = self
            .http
            .get(&self.url)
            .header(USER_AGENT, AGENT)
            .query(&[
                ("format", "json".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
