//! Side panel open/closed state.

use eframe::egui::{Pos2, Rect};

/// Width of the side panel in pixels.
pub const PANEL_WIDTH: f32 = 350.0;

/// Gap between the window edge (or panel edge) and map controls.
pub const CONTROL_MARGIN: f32 = 15.0;

/// Open/closed state of the side panel.
///
/// Left-anchored map controls derive their offset from this so they are
/// never hidden behind the panel.
#[derive(Debug, Default)]
pub struct PanelState {
    open: bool,
    /// Screen area covered by the panel during the last frame
    rect: Option<Rect>,
}

impl PanelState {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.rect = None;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Horizontal offset for controls anchored to the left edge.
    pub fn left_control_offset(&self) -> f32 {
        if self.open {
            PANEL_WIDTH + CONTROL_MARGIN
        } else {
            CONTROL_MARGIN
        }
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = Some(rect);
    }

    /// True if pointer input at `pos` belongs to the panel, not the map.
    pub fn blocks_pointer(&self, pos: Pos2) -> bool {
        self.open && self.rect.is_some_and(|rect| rect.contains(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::Vec2;

    #[test]
    fn test_offset_follows_open_state() {
        let mut panel = PanelState::default();
        assert!(!panel.is_open());
        assert_eq!(panel.left_control_offset(), 15.0);

        panel.open();
        assert_eq!(panel.left_control_offset(), 365.0);

        panel.close();
        assert_eq!(panel.left_control_offset(), 15.0);
    }

    #[test]
    fn test_offset_after_toggle_sequence() {
        let mut panel = PanelState::default();
        let sequence = [true, true, false, true, false, false, true];
        for (i, toggle) in sequence.iter().enumerate() {
            if *toggle {
                panel.toggle();
            } else if i % 2 == 0 {
                panel.open();
            } else {
                panel.close();
            }
            let expected = if panel.is_open() { 365.0 } else { 15.0 };
            assert_eq!(panel.left_control_offset(), expected);
        }
    }

    #[test]
    fn test_pointer_blocked_only_when_open() {
        let mut panel = PanelState::default();
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(PANEL_WIDTH, 600.0));

        panel.open();
        panel.set_rect(rect);
        assert!(panel.blocks_pointer(Pos2::new(100.0, 100.0)));
        assert!(!panel.blocks_pointer(Pos2::new(500.0, 100.0)));

        panel.close();
        assert!(!panel.blocks_pointer(Pos2::new(100.0, 100.0)));
    }
}
