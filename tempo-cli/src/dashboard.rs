use chrono::{DateTime, Local};
use tempo_core::{AirQualityService, BoundingBox, LocatedGroundData, SatelliteSnapshot};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedLocation {
    pub lat: f64,
    pub lng: f64,
}

/// Caller-owned view state: the latest fetched values plus loading flags.
///
/// Results are stored exactly as the service returned them, so an
/// unavailable upstream shows up as `None` rather than stale data.
#[derive(Debug, Default)]
pub struct Dashboard {
    pub loading: bool,
    pub selected_location: Option<SelectedLocation>,
    pub ground: Option<LocatedGroundData>,
    pub snapshot: Option<SatelliteSnapshot>,
    pub last_updated: Option<DateTime<Local>>,
}

impl Dashboard {
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_selected_location(&mut self, location: Option<SelectedLocation>) {
        self.selected_location = location;
    }

    /// Load ground data and a satellite snapshot for the selected location.
    ///
    /// Does nothing when no location is selected.
    pub async fn refresh(&mut self, service: &dyn AirQualityService, span: f64) {
        let Some(location) = self.selected_location else {
            tracing::debug!("refresh skipped: no location selected");
            return;
        };

        self.set_loading(true);

        let bbox = BoundingBox::around(location.lng, location.lat, span);
        let (ground, snapshot) = tokio::join!(
            service.ground_data_with_city(location.lng, location.lat),
            service.satellite_snapshot(bbox),
        );

        self.ground = ground;
        self.snapshot = snapshot;
        self.last_updated = Some(Local::now());
        self.set_loading(false);
    }
}
