//! Async GeoJSON file picking.
//!
//! File dialogs are async but egui's update() is synchronous, so the picked
//! file is passed back to the UI thread through a channel.

use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Extensions offered by the file dialog.
const GEOJSON_EXTENSIONS: [&str; 2] = ["geojson", "json"];

/// A file chosen by the user, read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Channel-based file picker.
pub struct FilePickerChannel {
    sender: Sender<Option<PickedFile>>,
    receiver: Receiver<Option<PickedFile>>,
    picking: bool,
}

impl Default for FilePickerChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl FilePickerChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            picking: false,
        }
    }

    /// Opens the file dialog unless one is already open.
    ///
    /// Native runs the dialog on a thread via pollster; WASM uses spawn_local.
    pub fn pick_geojson(&mut self, ctx: egui::Context) {
        if self.picking {
            return;
        }
        self.picking = true;
        let sender = self.sender.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            std::thread::spawn(move || {
                let result = pollster::block_on(read_picked_file());
                let _ = sender.send(result);
                ctx.request_repaint();
            });
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let result = read_picked_file().await;
                let _ = sender.send(result);
                ctx.request_repaint();
            });
        }
    }

    pub fn is_picking(&self) -> bool {
        self.picking
    }

    /// Returns Some(Some(file)) for a pick, Some(None) for a cancelled
    /// dialog, and None while the dialog is still open.
    pub fn try_recv(&mut self) -> Option<Option<PickedFile>> {
        let result = self.receiver.try_recv().ok()?;
        self.picking = false;
        Some(result)
    }
}

async fn read_picked_file() -> Option<PickedFile> {
    let handle = rfd::AsyncFileDialog::new()
        .set_title("Select GeoJSON file")
        .add_filter("GeoJSON", &GEOJSON_EXTENSIONS)
        .pick_file()
        .await?;

    let name = handle.file_name();
    let contents = handle.read().await;
    log::info!("Picked {} ({} bytes)", name, contents.len());

    Some(PickedFile { name, contents })
}
