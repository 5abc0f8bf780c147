//! Integration tests for AirQualityClient against a mock backend.

use std::time::Duration;

use chrono::Local;
use serde_json::json;
use tempo_core::{
    AirQualityClient, AirQualityService, BoundingBox, Config, GroundDataResponse, UNKNOWN_PLACE,
    cache::ground_data_key,
    config::{RetryConfig, TimeoutConfig},
    units::no2_to_mass_concentration,
};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

/// Client pointed at `server`, with a private cache dir and fast backoff.
fn client_for(server: &MockServer) -> (AirQualityClient, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        api_base_url: server.uri(),
        geocoder_url: format!("{}/reverse", server.uri()),
        cache_dir: Some(dir.path().to_path_buf()),
        retry: RetryConfig { max_attempts: 3, base_delay_ms: 10, max_delay_ms: 40 },
        timeouts: TimeoutConfig { request_secs: 1, bulk_request_secs: 1 },
    };
    (AirQualityClient::from_config(&config).unwrap(), dir)
}

fn ground_json() -> serde_json::Value {
    json!({
        "coord": {"lon": -73.98, "lat": 40.75},
        "list": [{
            "main": {"aqi": 2},
            "components": {"co": 201.94, "no": 0.02, "no2": 0.77, "o3": 68.66,
                           "so2": 0.64, "pm2_5": 0.5, "pm10": 0.54, "nh3": null},
            "dt": 1723644000
        }]
    })
}

fn snapshot_json(center: f64) -> serde_json::Value {
    json!({"minNO2": 0.5, "maxNO2": 12.25, "centerNO2": center, "imagePng": "iVBORw0KGgo="})
}

#[tokio::test]
async fn ground_data_miss_is_fetched_and_written_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ground-based-air-quality/retrieve"))
        .and(query_param("lat", "40.75"))
        .and(query_param("lon", "-73.98"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ground_json()))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);
    let before_fetch = Local::now();

    let fetched = client.ground_data(-73.98, 40.75).await.expect("first fetch");

    assert_eq!(fetched.list[0].main.aqi, 2);
    // Written after `before_fetch`, so it cannot have expired yet at that instant.
    assert_eq!(client.cache().get_at(&ground_data_key(-73.98, 40.75), &before_fetch), Some(fetched));
}

#[tokio::test]
async fn fresh_cache_entry_skips_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ground-based-air-quality/retrieve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ground_json()))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);
    let seeded: GroundDataResponse = serde_json::from_value(ground_json()).unwrap();

    // Expiry lands at least half an hour past the real clock.
    let written = Local::now() + chrono::Duration::minutes(30);
    client.cache().put(&ground_data_key(-73.98, 40.75), &seeded, &written).unwrap();

    let first = client.ground_data(-73.98, 40.75).await;
    let second = client.ground_data(-73.98, 40.75).await;

    assert_eq!(first, Some(seeded));
    assert_eq!(second, first);
}

#[tokio::test]
async fn ground_data_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ground-based-air-quality/retrieve"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ground-based-air-quality/retrieve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ground_json()))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    let data = client.ground_data(-73.98, 40.75).await;
    assert!(data.is_some());
}

#[tokio::test]
async fn ground_data_gives_up_without_caching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ground-based-air-quality/retrieve"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    assert_eq!(client.ground_data(1.0, 2.0).await, None);
    assert_eq!(client.cache().get(&ground_data_key(1.0, 2.0)), None);
}

#[tokio::test]
async fn malformed_payload_counts_as_failed_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/level-three/retrieve"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(3)
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    let bbox = BoundingBox::new(40.0, 41.0, -74.5, -73.5);
    assert_eq!(client.satellite_snapshot(bbox).await, None);
}

#[tokio::test]
async fn snapshot_converts_only_the_center_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/level-three/retrieve"))
        .and(query_param("lat1", "40"))
        .and(query_param("lat2", "41"))
        .and(query_param("lon1", "-74.5"))
        .and(query_param("lon2", "-73.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_json(1e15)))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    let bbox = BoundingBox::new(40.0, 41.0, -74.5, -73.5);
    let snap = client.satellite_snapshot(bbox).await.expect("snapshot");

    assert!((snap.center_no2 - 7.6394e-2).abs() < 1e-5, "center was {}", snap.center_no2);
    assert_eq!(snap.min_no2, 0.5);
    assert_eq!(snap.max_no2, 12.25);
    assert_eq!(snap.image_png, "iVBORw0KGgo=");
}

#[tokio::test]
async fn history_keeps_order_and_converts_each_item() {
    let raw = [3.0e15, 1.0e15, 2.0e16];
    let body: Vec<_> = raw
        .iter()
        .enumerate()
        .map(|(i, center)| {
            let mut item = snapshot_json(*center);
            item["timestamp"] = json!(format!("2024-08-14T1{i}:00:00Z"));
            item
        })
        .collect();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/level-three/retrieveN"))
        .and(query_param("n", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    let items = client
        .satellite_history(BoundingBox::around(-74.0, 40.5, 0.5), 3)
        .await
        .expect("history");

    assert_eq!(items.len(), 3);
    for (i, (item, center)) in items.iter().zip(raw).enumerate() {
        assert_eq!(item.timestamp, format!("2024-08-14T1{i}:00:00Z"));
        assert_eq!(item.snapshot.center_no2, no2_to_mass_concentration(center));
        assert_eq!(item.snapshot.max_no2, 12.25);
    }
}

#[tokio::test]
async fn scene_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/level-three/retrieveFull"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "minNO2": 0.0, "maxNO2": 8.5, "imagePng": "abc",
            "scaleFactor": 1e15, "generatedAtInstant": "2024-08-14T14:05:00Z"
        })))
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    let scene = client.satellite_scene().await.expect("scene");
    assert_eq!(scene.max_no2, 8.5);
    assert_eq!(scene.scale_factor, 1e15);
    assert_eq!(scene.generated_at, "2024-08-14T14:05:00Z");
}

#[tokio::test]
async fn forecast_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ground-based-air-quality/retrieveForecast"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    assert_eq!(client.forecast(-73.98, 40.75).await, None);
}

#[tokio::test]
async fn forecast_returns_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ground-based-air-quality/retrieveForecast"))
        .and(query_param("lat", "40.75"))
        .and(query_param("lon", "-73.98"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ground_json()))
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    let forecast = client.forecast(-73.98, 40.75).await.expect("forecast");
    assert_eq!(forecast.list.len(), 1);
}

#[tokio::test]
async fn slow_forecast_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ground-based-air-quality/retrieveForecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ground_json())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    assert_eq!(client.forecast(-73.98, 40.75).await, None);
}

#[tokio::test]
async fn reverse_geocode_uses_display_name_when_no_locality() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("format", "json"))
        .and(query_param("zoom", "10"))
        .and(query_param("lat", "48.36"))
        .and(query_param("lon", "-120.12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "display_name": "Okanogan County, Washington, United States",
            "address": {"county": "Okanogan County"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    let name = client.reverse_geocode(48.36, -120.12).await;
    assert_eq!(name, "Okanogan County, Washington, United States");
}

#[tokio::test]
async fn reverse_geocode_falls_back_to_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    assert_eq!(client.reverse_geocode(0.0, 0.0).await, UNKNOWN_PLACE);
}

#[tokio::test]
async fn ground_data_with_city_geocodes_station_coordinate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ground-based-air-quality/retrieve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ground_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "40.75"))
        .and(query_param("lon", "-73.98"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": {"city": "New York"},
            "display_name": "Manhattan, New York County, New York, United States"
        })))
        .mount(&server)
        .await;

    let (client, _dir) = client_for(&server);

    let located = client.ground_data_with_city(-73.99, 40.76).await.expect("located");
    assert_eq!(located.station_city, "New York");
    assert_eq!(located.ground.coord.lat, 40.75);
}
