//! Collapsible side panel: basemap selection and GeoJSON import.

use crate::file_ops::FilePickerChannel;
use crate::session::MapSession;
use crate::state::{AppState, PANEL_WIDTH};
use crate::tools::import::{import_file, validate_url, ImportChannel};
use eframe::egui::{self, RichText};
use egui_phosphor::regular as icons;
use web_time::Instant;

/// Async handles the panel's import section starts work on.
pub struct ImportHandles<'a> {
    pub file_picker: &'a mut FilePickerChannel,
    pub import_channel: &'a ImportChannel,
}

pub fn render_side_panel(
    ctx: &egui::Context,
    state: &mut AppState,
    session: Option<&mut MapSession>,
    handles: ImportHandles<'_>,
    now: Instant,
) {
    if !state.panel.is_open() {
        return;
    }

    let screen = ctx.content_rect();
    let response = egui::Area::new(egui::Id::new("side_panel"))
        .fixed_pos(screen.left_top())
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::side_top_panel(ui.style())
                .inner_margin(egui::Margin::same(12))
                .show(ui, |ui| {
                    let inner = egui::vec2(PANEL_WIDTH - 24.0, screen.height() - 24.0);
                    ui.set_min_size(inner);
                    ui.set_max_width(inner.x);

                    ui.horizontal(|ui| {
                        ui.heading("Map");
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button(icons::X).on_hover_text("Close panel").clicked() {
                                state.panel.close();
                            }
                        });
                    });
                    ui.separator();

                    egui::ScrollArea::vertical().show(ui, |ui| match session {
                        Some(session) => {
                            render_layers_section(ui, session);
                            if session.tools.has_import() {
                                ui.add_space(12.0);
                                render_import_section(ctx, ui, state, session, handles, now);
                            }
                        }
                        None => {
                            ui.label(
                                RichText::new("No map configuration loaded")
                                    .italics()
                                    .weak(),
                            );
                        }
                    });
                });
        })
        .response;

    if state.panel.is_open() {
        state.panel.set_rect(response.rect);
    }
}

/// "Layers" section: one radio button per basemap.
fn render_layers_section(ui: &mut egui::Ui, session: &mut MapSession) {
    ui.label(RichText::new("Layers").strong());
    ui.add_space(4.0);

    let mut selected = None;
    for option in session.basemaps.options() {
        if ui.radio(option.selected, &option.name).clicked() {
            selected = Some(option.index);
        }
    }
    if let Some(index) = selected {
        session.basemaps.select(index);
    }
}

/// "GeoJSON import" section with the file and URL paths.
fn render_import_section(
    ctx: &egui::Context,
    ui: &mut egui::Ui,
    state: &mut AppState,
    session: &mut MapSession,
    handles: ImportHandles<'_>,
    now: Instant,
) {
    ui.label(RichText::new("GeoJSON import").strong());
    ui.add_space(4.0);
    let mut clear = false;

    if session.tools.geojson_file {
        let picking = handles.file_picker.is_picking();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!picking, egui::Button::new("Choose file…"))
                .clicked()
            {
                handles.file_picker.pick_geojson(ctx.clone());
            }
            let name = state
                .import
                .selected_file
                .as_ref()
                .map(|f| f.name.as_str())
                .unwrap_or("No file selected");
            ui.label(RichText::new(name).monospace());
        });

        if ui
            .add_enabled(state.import.can_import_file(), egui::Button::new("Import file"))
            .clicked()
        {
            let outcome = import_file(state.import.selected_file.as_ref());
            session.apply_import(outcome, state, now);
        }
        ui.add_space(8.0);
    }

    if session.tools.geojson_url {
        ui.add(
            egui::TextEdit::singleline(&mut state.import.url_input)
                .hint_text("https://example.com/data.geojson")
                .desired_width(f32::INFINITY),
        );

        let busy = state.import.url_busy();
        let label = if busy { "Loading…" } else { "Import URL" };
        if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
            match validate_url(&state.import.url_input).map(str::to_string) {
                Ok(url) => {
                    state.import.url_pending += 1;
                    handles.import_channel.fetch_url(ctx.clone(), url);
                }
                Err(e) => state.banner.error(e.to_string(), now),
            }
        }
    }

    if let Some(layer) = session.overlay.current() {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new(&layer.source).monospace().small());
            if ui.small_button("Clear overlay").clicked() {
                clear = true;
            }
        });
    }
    if clear {
        session.overlay.clear();
        state.popup = None;
    }
}
