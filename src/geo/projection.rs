//! Map projection and viewport state.
//!
//! Uses spherical Web Mercator (EPSG:3857) so that overlays line up with
//! standard XYZ raster tiles. Positions are expressed in "world pixels": at
//! zoom `z` the whole world is a square of `256 * 2^z` pixels.

use super::GeoBounds;
use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;
use std::f64::consts::PI;

/// Edge length of a raster tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Deepest zoom level the tile math supports; `2^30` tiles per side still
/// fits in a `u32` index.
pub const MAX_TILE_ZOOM: u8 = 30;

/// Equatorial circumference used for ground resolution.
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// Viewport state: center, zoom and the screen rectangle the map occupies.
#[derive(Debug, Clone)]
pub struct MapProjection {
    /// View center (x = lon, y = lat)
    pub center: Coord<f64>,
    /// Current (possibly fractional) zoom level
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Screen rectangle for the map canvas
    pub screen_rect: Rect,
}

impl Default for MapProjection {
    fn default() -> Self {
        Self {
            center: Coord { x: 0.0, y: 0.0 },
            zoom: 2.0,
            min_zoom: 0.0,
            max_zoom: 19.0,
            screen_rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
        }
    }
}

/// Size of the world square in pixels at `zoom`.
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Projects lon/lat to world pixels at `zoom`.
pub fn project(coord: Coord<f64>, zoom: f64) -> Coord<f64> {
    let size = world_size(zoom);
    let lat = coord.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin = lat.to_radians().sin();

    Coord {
        x: (coord.x + 180.0) / 360.0 * size,
        y: (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * size,
    }
}

/// Converts world pixels at `zoom` back to lon/lat.
pub fn unproject(point: Coord<f64>, zoom: f64) -> Coord<f64> {
    let size = world_size(zoom);
    let n = PI - 2.0 * PI * point.y / size;

    Coord {
        x: point.x / size * 360.0 - 180.0,
        y: n.sinh().atan().to_degrees(),
    }
}

impl MapProjection {
    /// Creates a projection centered on `(lat, lon)` with the default zoom range.
    pub fn new(center_lat: f64, center_lon: f64, zoom: f64) -> Self {
        Self::with_range(center_lat, center_lon, zoom, 0.0, 19.0)
    }

    /// Creates a projection whose zoom is clamped to `[min_zoom, max_zoom]`.
    ///
    /// The range is applied before the initial zoom so a configured zoom
    /// above the default maximum is kept.
    pub fn with_range(
        center_lat: f64,
        center_lon: f64,
        zoom: f64,
        min_zoom: f64,
        max_zoom: f64,
    ) -> Self {
        let mut projection = Self::default().with_zoom_range(min_zoom, max_zoom);
        projection.set_center(Coord {
            x: center_lon,
            y: center_lat,
        });
        projection.set_zoom(zoom);
        projection
    }

    /// Sets the allowed zoom range and re-clamps the current zoom.
    pub fn with_zoom_range(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        let limit = MAX_TILE_ZOOM as f64;
        self.min_zoom = min_zoom.clamp(0.0, limit);
        self.max_zoom = max_zoom.clamp(self.min_zoom, limit);
        self.set_zoom(self.zoom);
        self
    }

    /// Updates the screen rectangle the map is drawn into.
    pub fn update(&mut self, screen_rect: Rect) {
        self.screen_rect = screen_rect;
    }

    pub fn set_center(&mut self, center: Coord<f64>) {
        self.center = Coord {
            x: center.x.clamp(-180.0, 180.0),
            y: center.y.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        };
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Centers the view on `center` at `zoom` (the locate control's "set view").
    pub fn set_view(&mut self, center: Coord<f64>, zoom: f64) {
        self.set_zoom(zoom);
        self.set_center(center);
    }

    /// Converts geographic coordinates (lon, lat) to screen position.
    pub fn geo_to_screen(&self, coord: Coord<f64>) -> Pos2 {
        let center_px = project(self.center, self.zoom);
        let point_px = project(coord, self.zoom);
        let screen_center = self.screen_rect.center();

        Pos2::new(
            screen_center.x + (point_px.x - center_px.x) as f32,
            screen_center.y + (point_px.y - center_px.y) as f32,
        )
    }

    /// Converts a screen position to geographic coordinates (lon, lat).
    pub fn screen_to_geo(&self, pos: Pos2) -> Coord<f64> {
        let center_px = project(self.center, self.zoom);
        let offset = pos - self.screen_rect.center();

        unproject(
            Coord {
                x: center_px.x + offset.x as f64,
                y: center_px.y + offset.y as f64,
            },
            self.zoom,
        )
    }

    /// Moves the view by a screen-space drag delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        let center_px = project(self.center, self.zoom);
        let moved = Coord {
            x: center_px.x - delta.x as f64,
            y: center_px.y - delta.y as f64,
        };
        self.set_center(unproject(moved, self.zoom));
    }

    /// Changes zoom while keeping the geographic point under `anchor` fixed.
    pub fn zoom_around(&mut self, zoom: f64, anchor: Pos2) {
        let anchored = self.screen_to_geo(anchor);
        self.set_zoom(zoom);

        let anchored_px = project(anchored, self.zoom);
        let offset = anchor - self.screen_rect.center();
        let center_px = Coord {
            x: anchored_px.x - offset.x as f64,
            y: anchored_px.y - offset.y as f64,
        };
        self.set_center(unproject(center_px, self.zoom));
    }

    /// Returns the highest whole zoom at which `bounds` fits inside the
    /// screen rectangle shrunk by `padding` on every side.
    pub fn bounds_zoom(&self, bounds: &GeoBounds, padding: f32) -> f64 {
        let available =
            (self.screen_rect.size() - Vec2::splat(padding * 2.0)).max(Vec2::splat(1.0));

        let top_left = project(bounds.north_west(), 0.0);
        let bottom_right = project(bounds.south_east(), 0.0);
        let span_x = (bottom_right.x - top_left.x).abs();
        let span_y = (bottom_right.y - top_left.y).abs();

        let scale_x = if span_x > 0.0 {
            available.x as f64 / span_x
        } else {
            f64::INFINITY
        };
        let scale_y = if span_y > 0.0 {
            available.y as f64 / span_y
        } else {
            f64::INFINITY
        };
        let scale = scale_x.min(scale_y);

        if !scale.is_finite() {
            return self.max_zoom;
        }

        scale.log2().floor().clamp(self.min_zoom, self.max_zoom)
    }

    /// Fits the view to `bounds` with `padding` screen pixels on every side.
    pub fn fit_bounds(&mut self, bounds: &GeoBounds, padding: f32) {
        let zoom = self.bounds_zoom(bounds, padding);

        // Center in projected space so the box is visually centered.
        let top_left = project(bounds.north_west(), zoom);
        let bottom_right = project(bounds.south_east(), zoom);
        let middle = Coord {
            x: (top_left.x + bottom_right.x) / 2.0,
            y: (top_left.y + bottom_right.y) / 2.0,
        };

        self.set_view(unproject(middle, zoom), zoom);
    }

    /// Returns the visible geographic bounds.
    pub fn visible_bounds(&self) -> GeoBounds {
        let mut bounds = GeoBounds::from_coord(self.screen_to_geo(self.screen_rect.left_top()));
        bounds.extend(self.screen_to_geo(self.screen_rect.right_bottom()));
        bounds
    }

    /// Ground distance covered by one screen pixel at the view center.
    pub fn meters_per_pixel(&self) -> f64 {
        EARTH_CIRCUMFERENCE_M * self.center.y.to_radians().cos() / world_size(self.zoom)
    }

    /// Whole zoom level used to pick tiles from a source capped at `source_max_zoom`.
    pub fn tile_zoom(&self, source_max_zoom: u8) -> u8 {
        (self.zoom.round().max(0.0) as u8)
            .min(source_max_zoom)
            .min(MAX_TILE_ZOOM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(lat: f64, lon: f64, zoom: f64) -> MapProjection {
        let mut projection = MapProjection::new(lat, lon, zoom);
        projection.update(Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)));
        projection
    }

    #[test]
    fn test_project_known_points() {
        let origin = project(Coord { x: 0.0, y: 0.0 }, 0.0);
        assert!((origin.x - 128.0).abs() < 1e-9);
        assert!((origin.y - 128.0).abs() < 1e-9);

        let corner = Coord {
            x: -180.0,
            y: MAX_LATITUDE,
        };
        let top_left = project(corner, 1.0);
        assert!(top_left.x.abs() < 1e-6);
        assert!(top_left.y.abs() < 1e-6);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let paris = Coord {
            x: 2.3522,
            y: 48.8566,
        };
        let back = unproject(project(paris, 12.0), 12.0);
        assert!((back.x - paris.x).abs() < 1e-9);
        assert!((back.y - paris.y).abs() < 1e-9);
    }

    #[test]
    fn test_center_maps_to_screen_center() {
        let projection = view(45.0, 5.0, 8.0);
        let pos = projection.geo_to_screen(Coord { x: 5.0, y: 45.0 });
        assert!((pos.x - 400.0).abs() < 1e-3);
        assert!((pos.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut projection = view(0.0, 0.0, 4.0).with_zoom_range(2.0, 10.0);
        projection.set_zoom(25.0);
        assert_eq!(projection.zoom, 10.0);
        projection.set_zoom(-3.0);
        assert_eq!(projection.zoom, 2.0);
    }

    #[test]
    fn test_pan_moves_center_opposite_to_drag() {
        let mut projection = view(0.0, 0.0, 3.0);
        projection.pan_by(Vec2::new(100.0, 0.0));
        assert!(projection.center.x < 0.0);
        assert!(projection.center.y.abs() < 1e-9);
    }

    #[test]
    fn test_zoom_around_keeps_anchor_fixed() {
        let mut projection = view(40.0, -3.0, 6.0);
        let anchor = Pos2::new(650.0, 120.0);
        let before = projection.screen_to_geo(anchor);

        projection.zoom_around(8.5, anchor);

        let after = projection.geo_to_screen(before);
        assert!((after.x - anchor.x).abs() < 0.01);
        assert!((after.y - anchor.y).abs() < 0.01);
        assert_eq!(projection.zoom, 8.5);
    }

    #[test]
    fn test_fit_bounds_contains_box_with_padding() {
        let mut projection = view(0.0, 0.0, 2.0);
        let bounds = GeoBounds {
            min: Coord { x: 2.0, y: 48.0 },
            max: Coord { x: 3.0, y: 49.0 },
        };

        projection.fit_bounds(&bounds, 50.0);

        assert_eq!(projection.zoom.fract(), 0.0);
        let top_left = projection.geo_to_screen(Coord { x: 2.0, y: 49.0 });
        let bottom_right = projection.geo_to_screen(Coord { x: 3.0, y: 48.0 });
        assert!(top_left.x >= 50.0 - 0.01 && top_left.y >= 50.0 - 0.01);
        assert!(bottom_right.x <= 750.0 + 0.01 && bottom_right.y <= 550.0 + 0.01);

        // One more zoom level would no longer fit.
        let span_x = bottom_right.x - top_left.x;
        let span_y = (bottom_right.y - top_left.y) * 700.0 / 500.0;
        let span = span_x.max(span_y);
        assert!(span * 2.0 > 700.0);
    }

    #[test]
    fn test_fit_single_point_uses_max_zoom() {
        let mut projection = view(0.0, 0.0, 2.0).with_zoom_range(0.0, 18.0);
        let point = GeoBounds::from_coord(Coord { x: 10.0, y: 20.0 });
        projection.fit_bounds(&point, 50.0);
        assert_eq!(projection.zoom, 18.0);
        assert!((projection.center.x - 10.0).abs() < 1e-9);
        assert!((projection.center.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_meters_per_pixel_at_equator() {
        let projection = view(0.0, 0.0, 0.0);
        let expected = EARTH_CIRCUMFERENCE_M / 256.0;
        assert!((projection.meters_per_pixel() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_range_applied_before_initial_zoom() {
        let projection = MapProjection::with_range(0.0, 0.0, 21.0, 0.0, 22.0);
        assert_eq!(projection.zoom, 21.0);

        let capped = MapProjection::with_range(0.0, 0.0, 40.0, 0.0, 64.0);
        assert_eq!(capped.max_zoom, MAX_TILE_ZOOM as f64);
        assert_eq!(capped.zoom, MAX_TILE_ZOOM as f64);
        assert_eq!(capped.tile_zoom(u8::MAX), MAX_TILE_ZOOM);
    }

    #[test]
    fn test_tile_zoom_respects_source_limit() {
        let projection = view(0.0, 0.0, 12.6);
        assert_eq!(projection.tile_zoom(19), 13);
        assert_eq!(projection.tile_zoom(10), 10);
    }
}
