//! Configuration module for mediabox.

use serde::Deserialize;
use std::path::Path;

use crate::{MediaboxError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve the web client's static files.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to the static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_path() -> String {
    "client/dist".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            serve_static: false,
            static_path: default_static_path(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Root upload directory. Folders are physical subdirectories of it.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Maximum upload size in megabytes, per file.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Bounding box of generated previews, in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
    /// ffmpeg executable used for video previews.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// Total timeout for upload-from-URL fetches.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    100
}

fn default_thumbnail_size() -> u32 {
    300
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_fetch_timeout() -> u64 {
    60
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_size_mb: default_max_upload_size(),
            thumbnail_size: default_thumbnail_size(),
            ffmpeg_path: default_ffmpeg_path(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl FilesConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/mediabox.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(MediaboxError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| MediaboxError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `MEDIABOX_UPLOAD_DIR`: Override the upload directory
    /// - `MEDIABOX_PORT`: Override the listen port
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("MEDIABOX_UPLOAD_DIR") {
            if !dir.is_empty() {
                self.files.upload_dir = dir;
            }
        }

        if let Ok(port) = std::env::var("MEDIABOX_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid MEDIABOX_PORT"),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(MediaboxError::Config("server.port must not be 0".to_string()));
        }
        if self.files.upload_dir.trim().is_empty() {
            return Err(MediaboxError::Config(
                "files.upload_dir must not be empty".to_string(),
            ));
        }
        if self.files.max_upload_size_mb == 0 {
            return Err(MediaboxError::Config(
                "files.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        if self.files.thumbnail_size == 0 {
            return Err(MediaboxError::Config(
                "files.thumbnail_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
