//! "Show my location" control backed by the browser's geolocation API.

use eframe::egui;
use geo_types::Coord;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Zoom applied when centering on the user's position.
pub const LOCATE_ZOOM: f64 = 14.0;

/// Geolocation request timeout in milliseconds.
#[cfg(target_arch = "wasm32")]
const LOCATE_TIMEOUT_MS: u32 = 10_000;

/// A position reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatedPosition {
    pub lat: f64,
    pub lon: f64,
    /// Accuracy radius in meters
    pub accuracy_m: f64,
    /// Compass heading in degrees, when the device reports one
    pub heading: Option<f64>,
}

impl LocatedPosition {
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub enum LocateError {
    /// The platform has no geolocation service.
    Unavailable,
    /// The user refused the permission prompt.
    Denied,
    /// The lookup failed or timed out.
    Failed(String),
}

impl std::fmt::Display for LocateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocateError::Unavailable => write!(f, "Geolocation is not available"),
            LocateError::Denied => write!(f, "Location permission denied"),
            LocateError::Failed(msg) => write!(f, "Could not determine location: {}", msg),
        }
    }
}

impl std::error::Error for LocateError {}

pub type LocateResult = Result<LocatedPosition, LocateError>;

/// Channel-based geolocation requests plus the last known position.
pub struct LocateControl {
    sender: Sender<LocateResult>,
    receiver: Receiver<LocateResult>,
    locating: bool,
    /// Last successful fix, drawn as a marker with its accuracy circle
    pub position: Option<LocatedPosition>,
}

impl Default for LocateControl {
    fn default() -> Self {
        Self::new()
    }
}

impl LocateControl {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            locating: false,
            position: None,
        }
    }

    pub fn is_locating(&self) -> bool {
        self.locating
    }

    /// Asks the platform for the current position.
    pub fn request(&mut self, ctx: egui::Context) {
        if self.locating {
            return;
        }
        self.locating = true;
        log::info!("Requesting current location");
        request_position(ctx, self.sender.clone());
    }

    /// Returns a finished request, remembering successful fixes.
    pub fn try_recv(&mut self) -> Option<LocateResult> {
        let result = self.receiver.try_recv().ok()?;
        self.locating = false;
        if let Ok(position) = &result {
            self.position = Some(*position);
        }
        Some(result)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn request_position(ctx: egui::Context, sender: Sender<LocateResult>) {
    let _ = sender.send(Err(LocateError::Unavailable));
    ctx.request_repaint();
}

#[cfg(target_arch = "wasm32")]
fn request_position(ctx: egui::Context, sender: Sender<LocateResult>) {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};

    let geolocation = match web_sys::window().map(|w| w.navigator().geolocation()) {
        Some(Ok(geolocation)) => geolocation,
        _ => {
            let _ = sender.send(Err(LocateError::Unavailable));
            ctx.request_repaint();
            return;
        }
    };

    let on_success = {
        let sender = sender.clone();
        let ctx = ctx.clone();
        Closure::once_into_js(move |value: JsValue| {
            let result = match value.dyn_into::<web_sys::Position>() {
                Ok(position) => {
                    let coords = position.coords();
                    Ok(LocatedPosition {
                        lat: coords.latitude(),
                        lon: coords.longitude(),
                        accuracy_m: coords.accuracy(),
                        heading: coords.heading().filter(|h| h.is_finite()),
                    })
                }
                Err(_) => Err(LocateError::Failed("unexpected position value".into())),
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        })
    };

    let on_error = {
        let sender = sender.clone();
        let ctx = ctx.clone();
        Closure::once_into_js(move |value: JsValue| {
            let error = match value.dyn_into::<web_sys::PositionError>() {
                Ok(e) if e.code() == web_sys::PositionError::PERMISSION_DENIED => {
                    LocateError::Denied
                }
                Ok(e) => LocateError::Failed(e.message()),
                Err(_) => LocateError::Failed("unknown error".into()),
            };
            let _ = sender.send(Err(error));
            ctx.request_repaint();
        })
    };

    let options = web_sys::PositionOptions::new();
    options.set_timeout(LOCATE_TIMEOUT_MS);

    if let Err(e) = geolocation.get_current_position_with_error_callback_and_options(
        on_success.unchecked_ref(),
        Some(on_error.unchecked_ref()),
        &options,
    ) {
        let _ = sender.send(Err(LocateError::Failed(crate::net::js_error_message(&e))));
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_reports_unavailable() {
        let ctx = egui::Context::default();
        let mut control = LocateControl::new();

        control.request(ctx);
        assert_eq!(control.try_recv(), Some(Err(LocateError::Unavailable)));
        assert!(!control.is_locating());
        assert!(control.position.is_none());
    }

    #[test]
    fn test_coord_order() {
        let position = LocatedPosition {
            lat: 48.85,
            lon: 2.35,
            accuracy_m: 20.0,
            heading: None,
        };
        assert_eq!(position.coord(), Coord { x: 2.35, y: 48.85 });
    }
}
