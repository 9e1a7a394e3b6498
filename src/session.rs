//! The live map: everything that only exists once a configuration loaded.

use crate::config::AppConfig;
use crate::geo::{BasemapSet, MapProjection, OverlaySlot, TileCache};
use crate::state::{AppState, MapPopup};
use crate::tools::import::{ImportOutcome, ImportSource};
use crate::tools::locate::{LocateControl, LocateResult, LOCATE_ZOOM};
use crate::tools::minimap::MiniMap;
use crate::tools::ToolSet;
use web_time::Instant;

/// Padding, in screen pixels, kept around an imported overlay when fitting.
pub const FIT_PADDING: f32 = 50.0;

/// Map view, layers and tools built from a loaded configuration.
pub struct MapSession {
    pub projection: MapProjection,
    pub basemaps: BasemapSet,
    pub overlay: OverlaySlot,
    pub tools: ToolSet,
    pub minimap: MiniMap,
    pub locate: LocateControl,
    pub tiles: TileCache,
}

impl MapSession {
    /// Builds the map from a validated configuration, first basemap active.
    ///
    /// Returns None if the configuration has no basemaps.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let basemaps = BasemapSet::from_config(&config.basemaps)?;
        let projection = MapProjection::with_range(
            config.center_lat(),
            config.center_lon(),
            config.map.zoom,
            config.map.min_zoom,
            config.map.max_zoom,
        );
        let tools = ToolSet::from_names(&config.tools);

        log::info!(
            "Map ready at [{}, {}] zoom {} with {} basemap(s)",
            config.center_lat(),
            config.center_lon(),
            projection.zoom,
            config.basemaps.len()
        );

        Some(Self {
            projection,
            basemaps,
            overlay: OverlaySlot::new(),
            tools,
            minimap: MiniMap::new(),
            locate: LocateControl::new(),
            tiles: TileCache::new(),
        })
    }

    /// Applies a finished import.
    ///
    /// The overlay is only replaced after the data parsed; on failure the
    /// previous overlay stays and an error banner is shown.
    pub fn apply_import(&mut self, outcome: ImportOutcome, state: &mut AppState, now: Instant) {
        if matches!(outcome.source, ImportSource::Url(_)) {
            state.import.url_pending = state.import.url_pending.saturating_sub(1);
        }

        match outcome.result {
            Ok(layer) => {
                let count = layer.features.len();
                let bounds = layer.bounds;
                log::info!(
                    "Imported {} feature(s), {} shape(s) from {}",
                    count,
                    layer.shape_count(),
                    layer.source
                );

                self.overlay.replace(layer);
                if state
                    .popup
                    .as_ref()
                    .is_some_and(|p| p.is_stale(self.overlay.generation()))
                {
                    state.popup = None;
                }

                match bounds {
                    Some(bounds) => self.projection.fit_bounds(&bounds, FIT_PADDING),
                    None => log::warn!("Imported GeoJSON has no geometry; view unchanged"),
                }

                state.banner.success(
                    format!("Imported {} feature(s) from {}", count, outcome.source.label()),
                    now,
                );
            }
            Err(e) => {
                log::error!("Import from '{}' failed: {}", outcome.source.label(), e);
                state.banner.error(e.to_string(), now);
            }
        }
    }

    /// Applies a finished geolocation request.
    pub fn apply_location(&mut self, result: LocateResult, state: &mut AppState, now: Instant) {
        match result {
            Ok(position) => {
                log::info!(
                    "Located at [{}, {}] (±{:.0} m)",
                    position.lat,
                    position.lon,
                    position.accuracy_m
                );
                self.projection.set_view(position.coord(), LOCATE_ZOOM);
                state.popup = Some(MapPopup::location(position.coord()));
            }
            Err(e) => state.banner.error(e.to_string(), now),
        }
    }
}
