//! API handlers for the web client.

pub mod file;
pub mod folder;
pub mod pin;

pub use file::*;
pub use folder::*;
pub use pin::*;

use std::sync::Arc;

use crate::file::MediaLibrary;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The media library.
    pub library: Arc<MediaLibrary>,
}

impl AppState {
    /// Create a new AppState.
    pub fn new(library: Arc<MediaLibrary>) -> Self {
        Self { library }
    }

    /// Maximum accepted size of a single uploaded file.
    pub fn max_upload_bytes(&self) -> u64 {
        self.library.max_upload_bytes()
    }
}
