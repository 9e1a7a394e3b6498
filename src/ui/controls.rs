//! Map controls anchored to the canvas corners.
//!
//! Left-anchored controls follow `PanelState::left_control_offset` so the
//! side panel never covers them.

use super::colors;
use crate::geo::render_tiles;
use crate::session::MapSession;
use crate::state::{AppState, CONTROL_MARGIN};
use crate::tools::minimap::{MiniMap, COLLAPSED_SIZE};
use crate::tools::scale::{imperial_scale, metric_scale, ScaleBar};
use eframe::egui::{self, Align2, RichText, Sense, Stroke, Vec2};
use egui_phosphor::regular as icons;

const BUTTON_SIZE: Vec2 = Vec2::splat(30.0);

/// Panel toggle button; shown with or without a map.
pub fn render_panel_toggle(ctx: &egui::Context, state: &mut AppState) {
    let offset = state.panel.left_control_offset();
    egui::Area::new(egui::Id::new("panel_toggle"))
        .anchor(Align2::LEFT_TOP, Vec2::new(offset, CONTROL_MARGIN))
        .show(ctx, |ui| {
            let icon = if state.panel.is_open() {
                icons::CARET_LEFT
            } else {
                icons::LIST
            };
            let button = egui::Button::new(RichText::new(icon).size(18.0)).min_size(BUTTON_SIZE);
            if ui.add(button).on_hover_text("Toggle panel").clicked() {
                state.panel.toggle();
            }
        });
}

/// All map controls that need a live map.
pub fn render_map_controls(ctx: &egui::Context, state: &mut AppState, session: &mut MapSession) {
    render_zoom_and_attribution(ctx, session);
    render_locate(ctx, session);
    render_bottom_left(ctx, state, session);
}

fn render_zoom_and_attribution(ctx: &egui::Context, session: &mut MapSession) {
    egui::Area::new(egui::Id::new("zoom_control"))
        .anchor(Align2::RIGHT_BOTTOM, Vec2::new(-CONTROL_MARGIN, -CONTROL_MARGIN))
        .show(ctx, |ui| {
            ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                let projection = &mut session.projection;
                let center = projection.screen_rect.center();

                let zoom_in = egui::Button::new(RichText::new(icons::PLUS).size(18.0))
                    .min_size(BUTTON_SIZE);
                if ui
                    .add_enabled(projection.zoom < projection.max_zoom, zoom_in)
                    .on_hover_text("Zoom in")
                    .clicked()
                {
                    projection.zoom_around(projection.zoom.floor() + 1.0, center);
                }

                let zoom_out = egui::Button::new(RichText::new(icons::MINUS).size(18.0))
                    .min_size(BUTTON_SIZE);
                if ui
                    .add_enabled(projection.zoom > projection.min_zoom, zoom_out)
                    .on_hover_text("Zoom out")
                    .clicked()
                {
                    projection.zoom_around(projection.zoom.ceil() - 1.0, center);
                }

                let attribution = &session.basemaps.active().attribution;
                if !attribution.is_empty() {
                    ui.add_space(4.0);
                    egui::Frame::NONE
                        .fill(colors::map::BACKDROP)
                        .inner_margin(egui::Margin::symmetric(4, 1))
                        .show(ui, |ui| {
                            ui.label(RichText::new(attribution).small().color(colors::map::SCALE));
                        });
                }
            });
        });
}

fn render_locate(ctx: &egui::Context, session: &mut MapSession) {
    egui::Area::new(egui::Id::new("locate_control"))
        .anchor(Align2::RIGHT_TOP, Vec2::new(-CONTROL_MARGIN, CONTROL_MARGIN))
        .show(ctx, |ui| {
            let locating = session.locate.is_locating();
            let button = egui::Button::new(RichText::new(icons::CROSSHAIR).size(18.0))
                .min_size(BUTTON_SIZE);
            if ui
                .add_enabled(!locating, button)
                .on_hover_text("Show my location")
                .clicked()
            {
                session.locate.request(ctx.clone());
            }
        });
}

/// Scale above minimap, stacked in the bottom-left corner.
fn render_bottom_left(ctx: &egui::Context, state: &AppState, session: &mut MapSession) {
    let offset = state.panel.left_control_offset();
    egui::Area::new(egui::Id::new("bottom_left_controls"))
        .anchor(Align2::LEFT_BOTTOM, Vec2::new(offset, -CONTROL_MARGIN))
        .show(ctx, |ui| {
            let meters_per_pixel = session.projection.meters_per_pixel();
            render_scale(ui, &metric_scale(meters_per_pixel));
            render_scale(ui, &imperial_scale(meters_per_pixel));
            ui.add_space(6.0);
            render_minimap(ctx, ui, session);
        });
}

fn render_scale(ui: &mut egui::Ui, bar: &ScaleBar) {
    let (rect, _) = ui.allocate_exact_size(Vec2::new(bar.width.max(1.0), 16.0), Sense::hover());
    let painter = ui.painter();
    let stroke = Stroke::new(2.0, colors::map::SCALE);

    painter.rect_filled(rect, 0.0, colors::map::BACKDROP);
    painter.line_segment([rect.left_bottom(), rect.right_bottom()], stroke);
    painter.line_segment([rect.left_top(), rect.left_bottom()], stroke);
    painter.line_segment([rect.right_top(), rect.right_bottom()], stroke);
    painter.text(
        rect.left_center() + Vec2::new(3.0, 0.0),
        Align2::LEFT_CENTER,
        &bar.label,
        egui::FontId::proportional(11.0),
        colors::map::SCALE,
    );
}

fn render_minimap(ctx: &egui::Context, ui: &mut egui::Ui, session: &mut MapSession) {
    if !session.minimap.is_expanded() {
        let button = egui::Button::new(RichText::new(icons::ARROWS_OUT_SIMPLE).size(12.0))
            .min_size(session.minimap.size());
        if ui.add(button).on_hover_text("Show minimap").clicked() {
            session.minimap.toggle();
        }
        return;
    }

    let (response, painter) = ui.allocate_painter(session.minimap.size(), Sense::click());
    let rect = response.rect;
    let projection = session.minimap.projection_for(&session.projection, rect);

    render_tiles(ctx, &painter, &projection, &session.minimap.basemap, &mut session.tiles);

    let footprint = MiniMap::footprint(&session.projection, &projection);
    painter.rect_stroke(
        footprint,
        0.0,
        Stroke::new(1.5, colors::map::FOOTPRINT),
        egui::StrokeKind::Middle,
    );
    painter.rect_stroke(
        rect,
        0.0,
        Stroke::new(1.0, colors::map::SCALE),
        egui::StrokeKind::Inside,
    );

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let target = projection.screen_to_geo(pos);
            session.projection.set_center(target);
        }
    }

    // Collapse toggle in the minimap's top-right corner
    let toggle_rect = egui::Rect::from_min_size(
        rect.right_top() - Vec2::new(COLLAPSED_SIZE, 0.0),
        Vec2::splat(COLLAPSED_SIZE),
    );
    let toggle = ui.put(
        toggle_rect,
        egui::Button::new(RichText::new(icons::ARROWS_IN_SIMPLE).size(12.0)),
    );
    if toggle.on_hover_text("Hide minimap").clicked() {
        session.minimap.toggle();
    }
}
