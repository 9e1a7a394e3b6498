//! Cross-platform fetching of remote (and, natively, local) resources.
//!
//! Used by configuration loading, URL-based GeoJSON import, and tile
//! downloads. On WASM requests go through the browser's `fetch`; natively
//! they run on a worker thread with a blocking `reqwest` client, and plain
//! paths are read from disk.

use eframe::egui;

/// Errors that can occur while fetching a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The server answered with a non-success status code.
    Status(u16),
    /// The request did not produce a response (DNS, CORS, refused, missing file).
    Network(String),
    /// A response arrived but its body could not be read.
    Body(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Status(code) => write!(f, "HTTP error {}", code),
            FetchError::Network(msg) => write!(f, "Network error: {}", msg),
            FetchError::Body(msg) => write!(f, "Failed to read response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

pub type FetchResult = Result<Vec<u8>, FetchError>;

/// Returns true if the location should be fetched over HTTP rather than read from disk.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Spawns a fetch of `url` and hands the result to `on_done`.
///
/// `on_done` runs off the UI update loop (on a worker thread natively, as a
/// local task on WASM); it is expected to forward the result through a
/// channel. A repaint is requested once it returns so the UI drains the
/// channel promptly.
pub fn spawn_fetch<F>(ctx: egui::Context, url: String, on_done: F)
where
    F: FnOnce(FetchResult) + Send + 'static,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::thread::spawn(move || {
            let result = fetch_bytes_blocking(&url);
            on_done(result);
            ctx.request_repaint();
        });
    }

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            let result = fetch_bytes(&url).await;
            on_done(result);
            ctx.request_repaint();
        });
    }
}

/// Fetches `url` with the browser's fetch API.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_bytes(url: &str) -> FetchResult {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let window = web_sys::window().ok_or_else(|| FetchError::Network("no window".into()))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(url, &opts)
        .map_err(|e| FetchError::Network(js_error_message(&e)))?;

    let response_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| FetchError::Network(js_error_message(&e)))?;

    let response: Response = response_value
        .dyn_into()
        .map_err(|_| FetchError::Body("fetch did not return a Response".into()))?;

    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }

    let buffer_promise = response
        .array_buffer()
        .map_err(|e| FetchError::Body(js_error_message(&e)))?;
    let buffer = JsFuture::from(buffer_promise)
        .await
        .map_err(|e| FetchError::Body(js_error_message(&e)))?;

    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Extracts a readable message from a thrown JS value.
#[cfg(target_arch = "wasm32")]
pub fn js_error_message(value: &wasm_bindgen::JsValue) -> String {
    use wasm_bindgen::JsCast;

    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(not(target_arch = "wasm32"))]
const USER_AGENT: &str = concat!("mviewer/", env!("CARGO_PKG_VERSION"));

#[cfg(not(target_arch = "wasm32"))]
static HTTP_CLIENT: std::sync::OnceLock<reqwest::blocking::Client> = std::sync::OnceLock::new();

#[cfg(not(target_arch = "wasm32"))]
fn http_client() -> Result<reqwest::blocking::Client, FetchError> {
    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client.clone());
    }

    // Tile servers reject requests without a User-Agent.
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

    Ok(HTTP_CLIENT.get_or_init(|| client).clone())
}

/// Fetches a URL (or reads a local path) on the calling thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn fetch_bytes_blocking(location: &str) -> FetchResult {
    if !is_remote(location) {
        return std::fs::read(location)
            .map_err(|e| FetchError::Network(format!("{}: {}", location, e)));
    }

    let response = http_client()?
        .get(location)
        .send()
        .map_err(|e| FetchError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    response
        .bytes()
        .map(|bytes| bytes.to_vec())
        .map_err(|e| FetchError::Body(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/data.geojson"));
        assert!(is_remote("HTTP://EXAMPLE.COM/a.json"));
        assert!(!is_remote("config.json"));
        assert!(!is_remote("/srv/maps/config.json"));
        assert!(!is_remote("ftp://example.com/a.json"));
    }

    #[test]
    fn test_status_error_mentions_code() {
        let err = FetchError::Status(404);
        assert!(err.to_string().contains("404"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_missing_local_file_is_network_error() {
        let result = fetch_bytes_blocking("definitely/not/here/config.json");
        match result {
            Err(FetchError::Network(msg)) => assert!(msg.contains("config.json")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_reads_local_file() {
        let path = std::env::temp_dir().join("mviewer_net_test.json");
        std::fs::write(&path, b"{}").unwrap();
        let bytes = fetch_bytes_blocking(path.to_str().unwrap()).unwrap();
        assert_eq!(bytes, b"{}");
        let _ = std::fs::remove_file(path);
    }
}
