//! Media library for mediabox.
//!
//! This module provides the file manager core:
//! - An in-memory index of uploaded file records
//! - A folder tree derived from the records and the upload directory
//! - Per-folder PIN locks
//! - Folder create/rename/delete keeping disk, index and PINs in step
//! - Name search, thumbnails, URL fetches and zip downloads

mod archive;
mod fetch;
mod folder;
mod mutator;
pub mod path;
mod pin;
mod record;
mod search;
mod service;
mod storage;
mod thumbnail;
pub mod upload;

pub use archive::build_zip;
pub use fetch::{FetchedFile, UrlFetcher};
pub use folder::{FolderInfo, FolderTreeBuilder};
pub use mutator::PathMutator;
pub use pin::{validate_pin, PinVault, MAX_PIN_LENGTH, MIN_PIN_LENGTH};
pub use record::{FileIndex, FileRecord, NewFile};
pub use search::{search_all, search_files, SearchResults};
pub use service::{FileContent, MediaLibrary, PinRemoval, UploadRequest};
pub use storage::{FileStorage, StoredFile};
pub use thumbnail::{FfmpegProcessor, MediaProcessor, PreviewKind};

/// MIME type prefix shared by all images.
pub const IMAGE_MIME_PREFIX: &str = "image/";
