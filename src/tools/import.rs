//! GeoJSON import from a local file or a remote URL.
//!
//! Both paths end in the same place: an `ImportOutcome` carrying either a
//! parsed `OverlayLayer` or the reason the import failed. The session applies
//! outcomes to the overlay slot; nothing here touches the map.

use crate::file_ops::PickedFile;
use crate::geo::{GeoJsonError, OverlayLayer};
use crate::net::{self, FetchError};
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Where an import came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSource {
    File(String),
    Url(String),
}

impl ImportSource {
    pub fn label(&self) -> &str {
        match self {
            ImportSource::File(name) => name,
            ImportSource::Url(url) => url,
        }
    }
}

/// Why an import failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// The URL field was blank.
    EmptyUrl,
    /// The URL is not an absolute `http(s)` address.
    InvalidUrl(String),
    /// "Import file" was invoked with no file selected.
    NoFileSelected,
    /// The URL could not be fetched.
    Fetch(FetchError),
    /// The data is not usable GeoJSON.
    Parse(GeoJsonError),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::EmptyUrl => write!(f, "Please enter a URL"),
            ImportError::InvalidUrl(url) => write!(f, "Not an http(s) URL: {}", url),
            ImportError::NoFileSelected => write!(f, "Please choose a file first"),
            ImportError::Fetch(e) => write!(f, "Failed to load GeoJSON: {}", e),
            ImportError::Parse(e) => write!(f, "Invalid GeoJSON: {}", e),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<FetchError> for ImportError {
    fn from(e: FetchError) -> Self {
        ImportError::Fetch(e)
    }
}

impl From<GeoJsonError> for ImportError {
    fn from(e: GeoJsonError) -> Self {
        ImportError::Parse(e)
    }
}

/// The finished result of one import attempt.
#[derive(Debug)]
pub struct ImportOutcome {
    pub source: ImportSource,
    pub result: Result<OverlayLayer, ImportError>,
}

/// UI-side state of the import section.
#[derive(Debug, Default)]
pub struct ImportState {
    /// File chosen in the picker, waiting for "Import file".
    pub selected_file: Option<PickedFile>,
    /// Contents of the URL field.
    pub url_input: String,
    /// Number of URL requests still in flight.
    pub url_pending: usize,
}

impl ImportState {
    /// True while a URL import is running; the trigger is disabled meanwhile.
    pub fn url_busy(&self) -> bool {
        self.url_pending > 0
    }

    pub fn can_import_file(&self) -> bool {
        self.selected_file.is_some()
    }
}

/// Returns the trimmed URL, or an error if it is blank or not absolute.
pub fn validate_url(input: &str) -> Result<&str, ImportError> {
    let url = input.trim();
    if url.is_empty() {
        return Err(ImportError::EmptyUrl);
    }
    if !net::is_remote(url) {
        return Err(ImportError::InvalidUrl(url.to_string()));
    }
    Ok(url)
}

/// Parses the currently selected file.
pub fn import_file(file: Option<&PickedFile>) -> ImportOutcome {
    match file {
        Some(file) => ImportOutcome {
            source: ImportSource::File(file.name.clone()),
            result: OverlayLayer::from_geojson_bytes(&file.contents, &file.name)
                .map_err(ImportError::from),
        },
        None => ImportOutcome {
            source: ImportSource::File(String::new()),
            result: Err(ImportError::NoFileSelected),
        },
    }
}

/// Channel for URL imports.
///
/// The body is parsed on the fetch task so the UI thread only receives the
/// finished layer.
pub struct ImportChannel {
    sender: Sender<ImportOutcome>,
    receiver: Receiver<ImportOutcome>,
}

impl Default for ImportChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Starts fetching `url`.
    pub fn fetch_url(&self, ctx: egui::Context, url: String) {
        log::info!("Importing GeoJSON from {}", url);

        let sender = self.sender.clone();
        let source = ImportSource::Url(url.clone());
        net::spawn_fetch(ctx, url.clone(), move |result| {
            let result = result.map_err(ImportError::from).and_then(|bytes| {
                OverlayLayer::from_geojson_bytes(&bytes, &url).map_err(ImportError::from)
            });
            let _ = sender.send(ImportOutcome { source, result });
        });
    }

    pub fn try_recv(&self) -> Option<ImportOutcome> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picked(name: &str, contents: &str) -> PickedFile {
        PickedFile {
            name: name.to_string(),
            contents: contents.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(
            validate_url("  https://example.com/a.geojson "),
            Ok("https://example.com/a.geojson")
        );
        assert_eq!(validate_url("   "), Err(ImportError::EmptyUrl));
        assert_eq!(validate_url(""), Err(ImportError::EmptyUrl));
    }

    #[test]
    fn test_validate_url_requires_scheme() {
        assert_eq!(
            validate_url("example.com/x.geojson"),
            Err(ImportError::InvalidUrl("example.com/x.geojson".into()))
        );
        assert!(matches!(
            validate_url("/data/local.geojson"),
            Err(ImportError::InvalidUrl(_))
        ));
        assert_eq!(validate_url("HTTP://example.com/a"), Ok("HTTP://example.com/a"));
    }

    #[test]
    fn test_import_selected_file() {
        let file = picked("park.geojson", r#"{"type":"Point","coordinates":[1, 2]}"#);
        let outcome = import_file(Some(&file));
        assert_eq!(outcome.source, ImportSource::File("park.geojson".into()));
        let layer = outcome.result.unwrap();
        assert_eq!(layer.source, "park.geojson");
        assert_eq!(layer.features.len(), 1);
    }

    #[test]
    fn test_import_without_selection() {
        let outcome = import_file(None);
        assert!(matches!(outcome.result, Err(ImportError::NoFileSelected)));
    }

    #[test]
    fn test_malformed_file() {
        let outcome = import_file(Some(&picked("bad.json", "{not valid")));
        assert!(matches!(
            outcome.result,
            Err(ImportError::Parse(GeoJsonError::Json(_)))
        ));
    }

    #[test]
    fn test_status_error_message_has_code() {
        let message = ImportError::from(FetchError::Status(404)).to_string();
        assert!(message.contains("404"));
    }

    #[test]
    fn test_busy_state() {
        let mut state = ImportState::default();
        assert!(!state.url_busy());
        assert!(!state.can_import_file());

        state.url_pending = 1;
        assert!(state.url_busy());

        state.selected_file = Some(picked("a.geojson", "{}"));
        assert!(state.can_import_file());
    }
}
