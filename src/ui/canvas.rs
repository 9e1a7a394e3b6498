//! Central map canvas: tiles, overlay, location marker, popups and
//! pan/zoom interaction.

use super::colors;
use crate::geo::{pick_feature, render_overlay, render_tiles, MapProjection};
use crate::session::MapSession;
use crate::state::{AppState, MapPopup, PopupContent};
use crate::tools::locate::LocatedPosition;
use eframe::egui::{self, Color32, Painter, RichText, Sense, Stroke};

/// Pixel tolerance when clicking points and lines.
const PICK_TOLERANCE: f32 = 6.0;

/// Scroll distance (in points) that changes the zoom by one level.
const SCROLL_PER_ZOOM_LEVEL: f32 = 120.0;

/// Background shown when no map could be created.
const EMPTY_BACKGROUND: Color32 = Color32::from_rgb(230, 230, 230);

/// Renders the map, or an empty canvas when there is no session.
pub fn render_canvas(
    ctx: &egui::Context,
    state: &mut AppState,
    mut session: Option<&mut MapSession>,
) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
            let rect = response.rect;

            let Some(session) = session.as_deref_mut() else {
                painter.rect_filled(rect, 0.0, EMPTY_BACKGROUND);
                return;
            };

            session.projection.update(rect);
            session.tiles.poll(ctx);

            let basemap = session.basemaps.active().clone();
            render_tiles(ctx, &painter, &session.projection, &basemap, &mut session.tiles);

            if let Some(layer) = session.overlay.current() {
                render_overlay(&painter, layer, &session.projection);
            }

            if let Some(position) = session.locate.position {
                render_location(&painter, &session.projection, &position);
            }

            handle_interaction(ctx, &response, state, session);
        });

    if let Some(session) = session {
        render_popup(ctx, state, session);
    }
}

/// Draws the accuracy circle and the position marker.
fn render_location(painter: &Painter, projection: &MapProjection, position: &LocatedPosition) {
    let center = projection.geo_to_screen(position.coord());
    let radius = (position.accuracy_m / projection.meters_per_pixel()) as f32;

    painter.circle(
        center,
        radius,
        colors::map::LOCATION_FILL,
        Stroke::new(1.0, colors::map::LOCATION),
    );
    painter.circle(
        center,
        6.0,
        colors::map::LOCATION,
        Stroke::new(2.0, Color32::WHITE),
    );
}

fn handle_interaction(
    ctx: &egui::Context,
    response: &egui::Response,
    state: &mut AppState,
    session: &mut MapSession,
) {
    let pointer = response.hover_pos();

    // The open panel sits above the canvas; its input never reaches the map.
    if pointer.is_some_and(|pos| state.panel.blocks_pointer(pos)) {
        return;
    }

    if response.dragged() {
        session.projection.pan_by(response.drag_delta());
    }

    if let Some(pos) = pointer {
        let (scroll, pinch) = ctx.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta()));
        let mut zoom_change = scroll / SCROLL_PER_ZOOM_LEVEL;
        if pinch != 1.0 {
            zoom_change += pinch.log2();
        }
        if zoom_change != 0.0 {
            let zoom = session.projection.zoom + zoom_change as f64;
            session.projection.zoom_around(zoom, pos);
        }
    }

    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let zoom = session.projection.zoom.floor() + 1.0;
            session.projection.zoom_around(zoom, pos);
        }
        return;
    }

    if response.clicked() {
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };

        let picked = session.overlay.current().and_then(|layer| {
            pick_feature(layer, &session.projection, pos, PICK_TOLERANCE)
                .filter(|&index| layer.features[index].popup.is_some())
        });

        state.popup = picked.map(|index| {
            MapPopup::feature(
                index,
                session.overlay.generation(),
                session.projection.screen_to_geo(pos),
            )
        });
    }
}

/// Renders the open popup above its anchor.
fn render_popup(ctx: &egui::Context, state: &mut AppState, session: &MapSession) {
    let Some(popup) = state.popup.clone() else {
        return;
    };
    if popup.is_stale(session.overlay.generation()) {
        state.popup = None;
        return;
    }

    if !session.projection.visible_bounds().contains(popup.anchor) {
        return;
    }
    let anchor = session.projection.geo_to_screen(popup.anchor);

    let mut close = false;
    egui::Area::new(egui::Id::new("map_popup"))
        .fixed_pos(anchor)
        .pivot(egui::Align2::CENTER_BOTTOM)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                        if ui.small_button(egui_phosphor::regular::X).clicked() {
                            close = true;
                        }
                    });
                });

                match &popup.content {
                    PopupContent::Feature { index, .. } => {
                        let rows = session
                            .overlay
                            .current()
                            .and_then(|layer| layer.features.get(*index))
                            .and_then(|feature| feature.popup.as_ref());
                        match rows {
                            Some(rows) => feature_rows(ui, rows),
                            None => close = true,
                        }
                    }
                    PopupContent::Location => {
                        ui.label(RichText::new("You are here!").strong());
                        if let Some(heading) =
                            session.locate.position.and_then(|p| p.heading)
                        {
                            ui.label(format!("Heading: {:.0}°", heading));
                        }
                    }
                }
            });
        });

    if close {
        state.popup = None;
    }
}

fn feature_rows(ui: &mut egui::Ui, rows: &[(String, String)]) {
    egui::Grid::new("popup_rows")
        .num_columns(2)
        .spacing([8.0, 2.0])
        .show(ui, |ui| {
            for (key, value) in rows {
                ui.label(RichText::new(format!("{}:", key)).strong());
                ui.label(value);
                ui.end_row();
            }
        });
}
