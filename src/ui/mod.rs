//! UI for the map viewer.
//!
//! - Canvas: tiles, overlay, popups, pan/zoom
//! - Controls: zoom, attribution, locate, scale, minimap, panel toggle
//! - Side panel: basemap selection and GeoJSON import
//! - Banner: transient messages

mod banner;
mod canvas;
mod colors;
mod controls;
mod side_panel;

pub use banner::render_banner;
pub use canvas::render_canvas;
pub use controls::{render_map_controls, render_panel_toggle};
pub use side_panel::{render_side_panel, ImportHandles};
