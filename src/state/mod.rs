//! UI state that exists whether or not a map could be created.
//!
//! The side panel and the banner keep working when the configuration fails
//! to load, so they live here rather than in the map session.

mod banner;
mod panel;
mod popup;

pub use banner::{BannerKind, MessageBanner};
pub use panel::{PanelState, CONTROL_MARGIN, PANEL_WIDTH};
pub use popup::{MapPopup, PopupContent};

use crate::tools::import::ImportState;

/// Root UI state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Side panel open/closed
    pub panel: PanelState,

    /// Transient error/success message
    pub banner: MessageBanner,

    /// Import section inputs and busy flags
    pub import: ImportState,

    /// Popup currently open on the map
    pub popup: Option<MapPopup>,
}
