//! Logging initialization for mediabox.
//!
//! `RUST_LOG` takes precedence over the configured level. Without it, the
//! configured level applies to mediabox and the HTTP stack's chattier
//! crates are held at `warn`.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{MediaboxError, Result};

/// Directives applied unless `RUST_LOG` is set.
const QUIET_DEPENDENCIES: [&str; 3] = ["hyper=warn", "h2=warn", "rustls=warn"];

/// Parse log level string to tracing Level.
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn build_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    QUIET_DEPENDENCIES
        .iter()
        .filter_map(|d| d.parse::<Directive>().ok())
        .fold(
            EnvFilter::default().add_directive(parse_level(level).into()),
            EnvFilter::add_directive,
        )
}

/// Initialize logging to stdout and, when `file` is set, to a log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(true);

    if config.file.trim().is_empty() {
        return tracing_subscriber::registry()
            .with(stdout_layer)
            .with(filter)
            .try_init()
            .map_err(|e| MediaboxError::Config(format!("failed to initialize logging: {e}")));
    }

    if let Some(parent) = Path::new(&config.file).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let log_file = Arc::new(File::options().create(true).append(true).open(&config.file)?);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .map_err(|e| MediaboxError::Config(format!("failed to initialize logging: {e}")))
}

/// Initialize console-only logging. Does nothing if a subscriber is already set.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(build_filter(level))
        .try_init();
}
