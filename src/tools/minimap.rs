//! Overview minimap in the bottom-left corner.

use crate::geo::{Basemap, GeoBounds, MapProjection};
use eframe::egui::{Rect, Vec2};

/// Side length of the expanded minimap.
pub const EXPANDED_SIZE: f32 = 150.0;
/// Side length of the collapsed toggle.
pub const COLLAPSED_SIZE: f32 = 19.0;
/// Zoom difference between the main map and the minimap.
pub const ZOOM_OFFSET: f64 = 5.0;

const MINIMAP_TILES: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png";
const MINIMAP_ATTRIBUTION: &str = "© OpenStreetMap contributors © CARTO";

pub struct MiniMap {
    pub basemap: Basemap,
    expanded: bool,
}

impl Default for MiniMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniMap {
    pub fn new() -> Self {
        Self {
            basemap: Basemap::new("Minimap", MINIMAP_TILES, MINIMAP_ATTRIBUTION, 19),
            expanded: true,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn size(&self) -> Vec2 {
        if self.expanded {
            Vec2::splat(EXPANDED_SIZE)
        } else {
            Vec2::splat(COLLAPSED_SIZE)
        }
    }

    /// Projection for the minimap drawn in `rect`: same center as the main
    /// map, zoomed out by `ZOOM_OFFSET`.
    pub fn projection_for(&self, main: &MapProjection, rect: Rect) -> MapProjection {
        let mut projection = MapProjection::new(main.center.y, main.center.x, 0.0)
            .with_zoom_range(0.0, self.basemap.max_zoom as f64);
        projection.set_zoom((main.zoom - ZOOM_OFFSET).max(0.0));
        projection.update(rect);
        projection
    }

    /// Screen rectangle, inside the minimap, covered by the main viewport.
    pub fn footprint(main: &MapProjection, minimap: &MapProjection) -> Rect {
        let visible: GeoBounds = main.visible_bounds();
        let a = minimap.geo_to_screen(visible.min);
        let b = minimap.geo_to_screen(visible.max);
        Rect::from_two_pos(a, b)
    }
}
