//! Map popups: overlay feature info and the locate result.

use geo_types::Coord;

/// What the open popup shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent {
    /// Properties of an overlay feature, by index.
    Feature { index: usize, generation: u64 },
    /// The "You are here!" popup.
    Location,
}

/// The single open popup, anchored to a map coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPopup {
    pub content: PopupContent,
    /// Map position the popup points at (x = lon, y = lat)
    pub anchor: Coord<f64>,
}

impl MapPopup {
    pub fn feature(index: usize, generation: u64, anchor: Coord<f64>) -> Self {
        Self {
            content: PopupContent::Feature { index, generation },
            anchor,
        }
    }

    pub fn location(anchor: Coord<f64>) -> Self {
        Self {
            content: PopupContent::Location,
            anchor,
        }
    }

    /// True if the popup belongs to an overlay that has since been replaced.
    pub fn is_stale(&self, overlay_generation: u64) -> bool {
        matches!(
            self.content,
            PopupContent::Feature { generation, .. } if generation != overlay_generation
        )
    }
}
