//! Application configuration loaded once at startup.
//!
//! The configuration is a static JSON document (`config.json`) describing the
//! initial view, the available basemaps, and which tools are enabled:
//!
//! ```json
//! {
//!   "map": { "center": [46.6, 2.4], "zoom": 6, "maxZoom": 19 },
//!   "basemaps": [
//!     { "name": "OSM", "url": "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
//!       "attribution": "© OpenStreetMap", "maxZoom": 19 }
//!   ],
//!   "tools": ["geojson_upload", "geojson_url"]
//! }
//! ```

use crate::geo::MAX_TILE_ZOOM;
use crate::net::{self, FetchError};
use eframe::egui;
use serde::Deserialize;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Location of the configuration document when none is given.
pub const DEFAULT_CONFIG_URL: &str = "config.json";

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    pub map: MapConfig,
    pub basemaps: Vec<BasemapConfig>,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// Initial map view.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
    #[serde(default)]
    pub min_zoom: f64,
}

/// A basemap tile source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasemapConfig {
    pub name: String,
    /// XYZ URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders.
    pub url: String,
    #[serde(default)]
    pub attribution: String,
    #[serde(default = "default_source_max_zoom")]
    pub max_zoom: u8,
}

fn default_max_zoom() -> f64 {
    19.0
}

fn default_source_max_zoom() -> u8 {
    19
}

/// Errors that can occur while loading the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The document could not be fetched.
    Fetch(FetchError),
    /// The document is not valid JSON or does not have the expected shape.
    Parse(String),
    /// The document parsed but its values are unusable.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Fetch(e) => write!(f, "Error loading the configuration: {}", e),
            ConfigError::Parse(msg) => write!(f, "Error reading the configuration: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Parses and validates a configuration document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: AppConfig =
            serde_json::from_slice(bytes).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.basemaps.is_empty() {
            return Err(ConfigError::Invalid("at least one basemap is required".into()));
        }

        let [lat, lon] = self.map.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ConfigError::Invalid(format!(
                "map center [{}, {}] is out of range",
                lat, lon
            )));
        }

        let map = &self.map;
        let zoom_limit = MAX_TILE_ZOOM as f64;
        if map.min_zoom < 0.0 || map.max_zoom > zoom_limit {
            return Err(ConfigError::Invalid(format!(
                "zoom range [{}, {}] must lie within [0, {}]",
                map.min_zoom, map.max_zoom, MAX_TILE_ZOOM
            )));
        }
        if map.min_zoom > map.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "minZoom {} is greater than maxZoom {}",
                map.min_zoom, map.max_zoom
            )));
        }
        if map.zoom < map.min_zoom || map.zoom > map.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "zoom {} is outside [{}, {}]",
                map.zoom, map.min_zoom, map.max_zoom
            )));
        }

        for basemap in &self.basemaps {
            if basemap.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "basemap '{}' has no URL",
                    basemap.name
                )));
            }
            if basemap.max_zoom > MAX_TILE_ZOOM {
                return Err(ConfigError::Invalid(format!(
                    "basemap '{}' maxZoom {} exceeds {}",
                    basemap.name, basemap.max_zoom, MAX_TILE_ZOOM
                )));
            }
        }

        Ok(())
    }

    pub fn center_lat(&self) -> f64 {
        self.map.center[0]
    }

    pub fn center_lon(&self) -> f64 {
        self.map.center[1]
    }
}

/// Channel-based configuration loader.
///
/// The fetch is async but egui's update() is synchronous; the result is
/// passed back to the UI thread through this channel.
pub struct ConfigChannel {
    sender: Sender<Result<AppConfig, ConfigError>>,
    receiver: Receiver<Result<AppConfig, ConfigError>>,
}

impl Default for ConfigChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
        }
    }

    /// Starts loading the configuration from `location`.
    pub fn load(&self, ctx: egui::Context, location: String) {
        log::info!("Loading configuration from {}", location);

        let sender = self.sender.clone();
        net::spawn_fetch(ctx, location, move |result| {
            let parsed = result
                .map_err(ConfigError::Fetch)
                .and_then(|bytes| AppConfig::from_json(&bytes));
            let _ = sender.send(parsed);
        });
    }

    /// Non-blocking check for the loaded configuration.
    pub fn try_recv(&self) -> Option<Result<AppConfig, ConfigError>> {
        self.receiver.try_recv().ok()
    }
}
