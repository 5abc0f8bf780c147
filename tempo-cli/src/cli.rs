use anyhow::Context;
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use inquire::Text;
use tempo_core::{
    AirQualityClient, AirQualityService, BoundingBox, Config, GroundDataResponse, SatelliteSnapshot,
};

use crate::dashboard::{Dashboard, SelectedLocation};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tempo", version, about = "TEMPO air-quality data CLI")]
pub struct Cli {
    /// Log fetch and cache activity to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Bounding box arguments shared by the satellite commands.
#[derive(Debug, clap::Args)]
pub struct BoxArgs {
    #[arg(long, allow_negative_numbers = true)]
    lat1: f64,
    #[arg(long, allow_negative_numbers = true)]
    lat2: f64,
    #[arg(long, allow_negative_numbers = true)]
    lon1: f64,
    #[arg(long, allow_negative_numbers = true)]
    lon2: f64,
}

impl From<BoxArgs> for BoundingBox {
    fn from(args: BoxArgs) -> Self {
        BoundingBox::new(args.lat1, args.lat2, args.lon1, args.lon2)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set backend and geocoder URLs interactively.
    Configure,

    /// Ground-station readings near a point (cached hourly).
    Ground {
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Also resolve the station's city.
        #[arg(long)]
        city: bool,
    },

    /// Pollutant forecast near a point.
    Forecast {
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
    },

    /// Current TEMPO NO₂ snapshot for a bounding box.
    Snapshot {
        #[command(flatten)]
        bbox: BoxArgs,
    },

    /// Recent TEMPO NO₂ snapshots for a bounding box.
    History {
        #[command(flatten)]
        bbox: BoxArgs,
        /// Number of snapshots.
        #[arg(short, default_value_t = 5)]
        n: u32,
    },

    /// Full-scene TEMPO NO₂ rendering.
    Scene,

    /// Place name for a coordinate.
    Geocode {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Ground data and satellite snapshot for a point, fetched together.
    Dashboard {
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Half-width of the satellite box, in degrees.
        #[arg(long, default_value_t = 0.5)]
        span: f64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(&mut config),
            query => {
                let client = AirQualityClient::from_config(&config)?;
                query.query(&client).await
            }
        }
    }
}

impl Command {
    /// Fetch through `service` and print the result.
    pub async fn query(self, service: &dyn AirQualityService) -> anyhow::Result<()> {
        match self {
            Command::Configure => anyhow::bail!("configure edits the config file and queries nothing"),
            Command::Ground { lon, lat, city } => {
                if city {
                    match service.ground_data_with_city(lon, lat).await {
                        Some(located) => {
                            println!("Station city: {}", located.station_city);
                            print_ground(&located.ground);
                        }
                        None => print_unavailable(),
                    }
                } else {
                    match service.ground_data(lon, lat).await {
                        Some(data) => print_ground(&data),
                        None => print_unavailable(),
                    }
                }
            }
            Command::Forecast { lon, lat } => match service.forecast(lon, lat).await {
                Some(data) => print_ground(&data),
                None => print_unavailable(),
            },
            Command::Snapshot { bbox } => match service.satellite_snapshot(bbox.into()).await {
                Some(snap) => print_snapshot(&snap),
                None => print_unavailable(),
            },
            Command::History { bbox, n } => match service.satellite_history(bbox.into(), n).await {
                Some(items) => {
                    for item in items {
                        println!("[{}]", item.timestamp);
                        print_snapshot(&item.snapshot);
                    }
                }
                None => print_unavailable(),
            },
            Command::Scene => match service.satellite_scene().await {
                Some(scene) => {
                    println!("Generated:    {}", scene.generated_at);
                    println!("NO₂ range:    {} .. {}", scene.min_no2, scene.max_no2);
                    println!("Scale factor: {:e}", scene.scale_factor);
                    println!("Image:        {} bytes (base64)", scene.image_png.len());
                }
                None => print_unavailable(),
            },
            Command::Geocode { lat, lon } => {
                println!("{}", service.reverse_geocode(lat, lon).await);
            }
            Command::Dashboard { lon, lat, span } => {
                let mut dashboard = Dashboard::default();
                dashboard.set_selected_location(Some(SelectedLocation { lat, lng: lon }));
                dashboard.refresh(service, span).await;
                print_dashboard(&dashboard);
            }
        }

        Ok(())
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    config.api_base_url = Text::new("Backend API base URL:")
        .with_default(&config.api_base_url)
        .prompt()
        .context("Failed to read backend URL")?;

    config.geocoder_url = Text::new("Reverse geocoder URL:")
        .with_default(&config.geocoder_url)
        .prompt()
        .context("Failed to read geocoder URL")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_unavailable() {
    println!("no data available");
}

fn print_ground(data: &GroundDataResponse) {
    println!("Location: {}, {}", data.coord.lat, data.coord.lon);
    for item in &data.list {
        let when = DateTime::from_timestamp(item.dt, 0)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| item.dt.to_string());
        let c = &item.components;
        println!(
            "  {when}  AQI {}  NO₂ {}  O₃ {}  PM2.5 {}  PM10 {}  CO {}  SO₂ {}",
            item.main.aqi,
            reading(c.no2),
            reading(c.o3),
            reading(c.pm2_5),
            reading(c.pm10),
            reading(c.co),
            reading(c.so2)
        );
    }
}

fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn print_snapshot(snap: &SatelliteSnapshot) {
    println!("  center NO₂: {:.4} µg/m³", snap.center_no2);
    println!("  range:      {} .. {}", snap.min_no2, snap.max_no2);
}

fn print_dashboard(dashboard: &Dashboard) {
    match &dashboard.ground {
        Some(located) => {
            println!("Station city: {}", located.station_city);
            print_ground(&located.ground);
        }
        None => println!("Ground data: no data available"),
    }
    match &dashboard.snapshot {
        Some(snap) => {
            println!("TEMPO snapshot:");
            print_snapshot(snap);
        }
        None => println!("TEMPO snapshot: no data available"),
    }
    if let Some(at) = dashboard.last_updated {
        println!("Updated {}", at.format("%H:%M:%S"));
    }
}
