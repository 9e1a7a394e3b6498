//! XYZ raster tiles: addressing, viewport coverage, and a texture cache.
//!
//! Tile downloads are async but egui's update() is synchronous. Each fetch
//! decodes the image off the update loop and sends it back through a channel;
//! `TileCache::poll` uploads finished images as textures.

use super::{Basemap, MapProjection, MAX_TILE_ZOOM, TILE_SIZE};
use crate::net;
use eframe::egui::{self, ColorImage, Pos2, Rect, TextureHandle, TextureOptions, Vec2};
use geo_types::Coord;
use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Maximum number of tiles kept in memory.
const CACHE_CAPACITY: usize = 512;

/// Maximum number of concurrent tile downloads.
const MAX_IN_FLIGHT: usize = 8;

/// Address of a tile in the XYZ scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }
}

/// A tile together with where it lands on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub id: TileId,
    pub rect: Rect,
}

/// Returns the tiles at `zoom` covering the projection's screen rectangle.
///
/// The projection zoom may be fractional; tiles are scaled accordingly.
pub fn visible_tiles(projection: &MapProjection, zoom: u8) -> Vec<TilePlacement> {
    let zoom = zoom.min(MAX_TILE_ZOOM);
    let rect = projection.screen_rect;
    let scale = 2f64.powf(projection.zoom - zoom as f64);
    let tile_px = TILE_SIZE * scale;
    let tiles_per_side = 1u64 << zoom;

    let center = super::projection::project(projection.center, zoom as f64);
    let screen_center = rect.center();

    let to_world = |pos: Pos2| Coord {
        x: center.x + (pos.x - screen_center.x) as f64 / scale,
        y: center.y + (pos.y - screen_center.y) as f64 / scale,
    };
    let top_left = to_world(rect.min);
    let bottom_right = to_world(rect.max);

    let clamp_index = |v: f64| v.floor().clamp(0.0, (tiles_per_side - 1) as f64) as u32;
    let min_x = clamp_index(top_left.x / TILE_SIZE);
    let max_x = clamp_index(bottom_right.x / TILE_SIZE);
    let min_y = clamp_index(top_left.y / TILE_SIZE);
    let max_y = clamp_index(bottom_right.y / TILE_SIZE);

    // Nothing to draw when the view is entirely outside the world square.
    if bottom_right.x < 0.0
        || bottom_right.y < 0.0
        || top_left.x > (tiles_per_side as f64) * TILE_SIZE
        || top_left.y > (tiles_per_side as f64) * TILE_SIZE
    {
        return Vec::new();
    }

    let mut placements = Vec::with_capacity(((max_x - min_x + 1) * (max_y - min_y + 1)) as usize);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let min = Pos2::new(
                screen_center.x + ((x as f64 * TILE_SIZE - center.x) * scale) as f32,
                screen_center.y + ((y as f64 * TILE_SIZE - center.y) * scale) as f32,
            );
            placements.push(TilePlacement {
                id: TileId::new(zoom, x, y),
                rect: Rect::from_min_size(min, Vec2::splat(tile_px as f32)),
            });
        }
    }

    placements
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TileKey {
    source: String,
    id: TileId,
}

enum TileState {
    Pending,
    Ready(TextureHandle),
    Failed,
}

struct TileResult {
    key: TileKey,
    image: Result<ColorImage, String>,
}

/// Cache of tile textures shared by all tile sources.
pub struct TileCache {
    tiles: HashMap<TileKey, TileState>,
    order: VecDeque<TileKey>,
    in_flight: usize,
    sender: Sender<TileResult>,
    receiver: Receiver<TileResult>,
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TileCache {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            tiles: HashMap::new(),
            order: VecDeque::new(),
            in_flight: 0,
            sender,
            receiver,
        }
    }

    /// Returns the texture for a tile, scheduling a download if it is not cached.
    ///
    /// Returns None while the tile is loading or if it failed to load.
    pub fn get_or_request(
        &mut self,
        ctx: &egui::Context,
        source: &Basemap,
        id: TileId,
    ) -> Option<TextureHandle> {
        let key = TileKey {
            source: source.url_template.clone(),
            id,
        };

        match self.tiles.get(&key) {
            Some(TileState::Ready(texture)) => return Some(texture.clone()),
            Some(TileState::Pending) | Some(TileState::Failed) => return None,
            None => {}
        }

        if self.in_flight >= MAX_IN_FLIGHT {
            return None;
        }

        let url = source.tile_url(id);
        log::debug!("Requesting tile {}", url);

        self.in_flight += 1;
        self.tiles.insert(key.clone(), TileState::Pending);
        self.order.push_back(key.clone());

        let sender = self.sender.clone();
        net::spawn_fetch(ctx.clone(), url, move |result| {
            let image = result
                .map_err(|e| e.to_string())
                .and_then(|bytes| decode_tile(&bytes));
            let _ = sender.send(TileResult { key, image });
        });

        None
    }

    /// Uploads finished downloads as textures and evicts old tiles.
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);

            let state = match result.image {
                Ok(image) => {
                    let name = format!(
                        "tile_{}_{}_{}",
                        result.key.id.zoom, result.key.id.x, result.key.id.y
                    );
                    TileState::Ready(ctx.load_texture(name, image, TextureOptions::LINEAR))
                }
                Err(e) => {
                    log::debug!(
                        "Tile {}/{}/{} failed: {}",
                        result.key.id.zoom,
                        result.key.id.x,
                        result.key.id.y,
                        e
                    );
                    TileState::Failed
                }
            };

            // The tile may have been evicted while downloading.
            if let Some(slot) = self.tiles.get_mut(&result.key) {
                *slot = state;
            }
        }

        self.evict();
    }

    /// Drops the oldest finished tiles once the cache is over capacity.
    fn evict(&mut self) {
        let mut skipped = 0;
        while self.tiles.len() > CACHE_CAPACITY && skipped < self.order.len() {
            let Some(key) = self.order.pop_front() else {
                break;
            };
            if matches!(self.tiles.get(&key), Some(TileState::Pending)) {
                self.order.push_back(key);
                skipped += 1;
                continue;
            }
            self.tiles.remove(&key);
        }
    }
}

/// Decodes PNG/JPEG tile bytes into an egui image.
fn decode_tile(bytes: &[u8]) -> Result<ColorImage, String> {
    let image = image::load_from_memory(bytes).map_err(|e| format!("decode failed: {}", e))?;
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection(lat: f64, lon: f64, zoom: f64, width: f32, height: f32) -> MapProjection {
        let mut projection = MapProjection::new(lat, lon, zoom);
        projection.update(Rect::from_min_size(Pos2::ZERO, Vec2::new(width, height)));
        projection
    }

    #[test]
    fn test_whole_world_at_zoom_zero() {
        let projection = projection(0.0, 0.0, 0.0, 256.0, 256.0);
        let tiles = visible_tiles(&projection, 0);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].id, TileId::new(0, 0, 0));
        assert_eq!(tiles[0].rect, Rect::from_min_size(Pos2::ZERO, Vec2::splat(256.0)));
    }

    #[test]
    fn test_tiles_cover_viewport() {
        let projection = projection(48.85, 2.35, 10.0, 800.0, 600.0);
        let tiles = visible_tiles(&projection, 10);

        assert!(!tiles.is_empty());
        let covered = tiles
            .iter()
            .fold(tiles[0].rect, |acc, tile| acc.union(tile.rect));
        assert!(covered.contains_rect(projection.screen_rect));

        for tile in &tiles {
            assert_eq!(tile.id.zoom, 10);
            assert!((tile.rect.width() - 256.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_fractional_zoom_scales_tiles() {
        let projection = projection(0.0, 0.0, 3.5, 800.0, 600.0);
        let tiles = visible_tiles(&projection, 4);
        let expected = 256.0 * 2f32.powf(-0.5);
        assert!(tiles.iter().all(|t| (t.rect.width() - expected).abs() < 1e-2));
    }

    #[test]
    fn test_indices_stay_in_range() {
        let projection = projection(80.0, 179.0, 2.0, 1600.0, 1200.0);
        for tile in visible_tiles(&projection, 2) {
            assert!(tile.id.x < 4);
            assert!(tile.id.y < 4);
        }
    }

    #[test]
    fn test_deep_zoom_is_capped() {
        let mut projection =
            projection(48.85, 2.35, 2.0, 800.0, 600.0).with_zoom_range(0.0, 64.0);
        projection.set_zoom(64.0);
        assert_eq!(projection.zoom, 30.0);

        let tiles = visible_tiles(&projection, 64);
        assert!(!tiles.is_empty());
        for tile in &tiles {
            assert_eq!(tile.id.zoom, MAX_TILE_ZOOM);
            assert!(tile.id.x > 1 << 29 && tile.id.x < 1 << 30);
            assert!(tile.id.y < 1 << 30);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_tile(b"not an image").is_err());
    }
}
