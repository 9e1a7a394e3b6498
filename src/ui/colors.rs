//! Centralized color constants for the UI.

use eframe::egui::Color32;

/// Banner backgrounds.
pub mod banner {
    use super::Color32;

    pub const ERROR: Color32 = Color32::from_rgb(198, 40, 40);
    pub const SUCCESS: Color32 = Color32::from_rgb(46, 125, 50);
    pub const INFO: Color32 = Color32::from_rgb(21, 101, 192);
    pub const TEXT: Color32 = Color32::WHITE;
}

/// Map chrome drawn over the tiles.
pub mod map {
    use super::Color32;

    /// Locate marker and accuracy circle.
    pub const LOCATION: Color32 = Color32::from_rgb(19, 109, 232);
    /// Accuracy circle fill.
    pub const LOCATION_FILL: Color32 = Color32::from_rgba_premultiplied(3, 17, 36, 40);
    /// Viewport footprint inside the minimap.
    pub const FOOTPRINT: Color32 = Color32::from_rgb(255, 120, 0);
    /// Scale bar line and label.
    pub const SCALE: Color32 = Color32::from_rgb(51, 51, 51);
    /// Translucent backdrop behind the scale and attribution.
    pub const BACKDROP: Color32 = Color32::from_rgba_premultiplied(180, 180, 180, 180);
}
