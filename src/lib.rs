//! mediabox - Personal media file manager
//!
//! Upload, browse and organize images, videos and text files in nested
//! folders, served to a web client over a JSON API.

pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{MediaboxError, Result};
pub use file::{FileRecord, FolderInfo, MediaLibrary};
pub use web::WebServer;
