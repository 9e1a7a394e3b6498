//! Map model: projection, basemap tiles, and the GeoJSON overlay.

mod basemap;
mod bounds;
mod layer;
mod projection;
mod renderer;
mod tiles;

pub use basemap::{Basemap, BasemapSet};
pub use bounds::GeoBounds;
pub use hit_test::pick_feature;
pub use layer::{GeoJsonError, GeoShape, OverlayLayer, OverlaySlot, OverlayStyle};
pub use projection::{MapProjection, MAX_TILE_ZOOM, TILE_SIZE};
pub use renderer::{render_overlay, render_tiles};
pub use tiles::{visible_tiles, TileCache, TileId};
