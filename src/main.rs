#![warn(clippy::all)]

//! mviewer - a map viewer with basemap switching and GeoJSON import.
//!
//! The map is configured by a static `config.json` (initial view, basemap
//! tile sources, enabled tools). Users can switch basemaps, locate
//! themselves, and import GeoJSON from a local file or a URL.

mod config;
mod file_ops;
mod geo;
mod net;
mod session;
mod state;
mod tools;
mod ui;

use config::ConfigChannel;
use eframe::egui;
use file_ops::FilePickerChannel;
use session::MapSession;
use state::{AppState, BannerKind};
use tools::import::ImportChannel;
use web_time::Instant;

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let config_location = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_URL.to_string());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "mviewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(MapViewerApp::new(cc, config_location)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document available; the map viewer was not mounted");
            return;
        };

        // The host page must provide the canvas; without it nothing is wired.
        let Some(canvas) = document
            .get_element_by_id("app_canvas")
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("Canvas element 'app_canvas' not found; the map viewer was not mounted");
            return;
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| {
                    Ok(Box::new(MapViewerApp::new(
                        cc,
                        config::DEFAULT_CONFIG_URL.to_string(),
                    )))
                }),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    log::error!("Failed to start eframe: {:?}", e);
                }
            }
        }
    });
}

/// Where the app is in its startup.
enum Startup {
    /// Waiting for the configuration
    Loading,
    /// Map built from the configuration
    Ready(Box<MapSession>),
    /// Configuration failed; only the panel is usable
    Failed,
}

/// Main application state and logic.
pub struct MapViewerApp {
    /// UI state that survives configuration failure
    state: AppState,

    startup: Startup,

    /// Channel for the startup configuration fetch
    config_channel: ConfigChannel,

    /// Channel for async file picker operations
    file_picker: FilePickerChannel,

    /// Channel for URL imports
    import_channel: ImportChannel,
}

impl MapViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config_location: String) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let config_channel = ConfigChannel::new();
        config_channel.load(cc.egui_ctx.clone(), config_location);

        Self {
            state: AppState::default(),
            startup: Startup::Loading,
            config_channel,
            file_picker: FilePickerChannel::new(),
            import_channel: ImportChannel::new(),
        }
    }

    /// Drains finished async work into the state.
    fn poll_channels(&mut self, now: Instant) {
        if let Some(result) = self.config_channel.try_recv() {
            self.startup = match result.and_then(|config| {
                MapSession::from_config(&config).ok_or_else(|| {
                    config::ConfigError::Invalid("at least one basemap is required".into())
                })
            }) {
                Ok(session) => Startup::Ready(Box::new(session)),
                Err(e) => {
                    log::error!("Configuration failed: {}", e);
                    self.state.banner.error(e.to_string(), now);
                    Startup::Failed
                }
            };
        }

        if let Some(result) = self.file_picker.try_recv() {
            match result {
                Some(file) => {
                    self.state
                        .banner
                        .show(BannerKind::Info, format!("Selected {}", file.name), now);
                    self.state.import.selected_file = Some(file);
                }
                None => log::info!("File selection cancelled"),
            }
        }

        let mut outcomes = Vec::new();
        while let Some(outcome) = self.import_channel.try_recv() {
            outcomes.push(outcome);
        }

        let Startup::Ready(session) = &mut self.startup else {
            return;
        };
        for outcome in outcomes {
            session.apply_import(outcome, &mut self.state, now);
        }
        if let Some(result) = session.locate.try_recv() {
            session.apply_location(result, &mut self.state, now);
        }
    }
}

impl eframe::App for MapViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.poll_channels(now);

        let Self {
            state,
            startup,
            file_picker,
            import_channel,
            ..
        } = self;
        let mut session = match startup {
            Startup::Ready(session) => Some(session.as_mut()),
            _ => None,
        };

        ui::render_canvas(ctx, state, session.as_deref_mut());
        if let Some(session) = session.as_deref_mut() {
            ui::render_map_controls(ctx, state, session);
        }
        ui::render_panel_toggle(ctx, state);
        ui::render_side_panel(
            ctx,
            state,
            session,
            ui::ImportHandles {
                file_picker,
                import_channel,
            },
            now,
        );
        ui::render_banner(ctx, &mut state.banner, now);
    }
}
