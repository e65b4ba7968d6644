use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;

use mediabox::{Config, MediaLibrary, WebServer};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = mediabox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        mediabox::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        tracing::error!("Fatal error: {}", e);
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(config: Config) -> mediabox::Result<()> {
    config.validate()?;

    info!("mediabox - Personal media file manager");
    info!(upload_dir = %config.files.upload_dir, "Opening media library");

    let library = Arc::new(MediaLibrary::from_config(&config.files)?);
    let server = WebServer::new(&config.server, library)?;

    info!("Server configured on {}", server.addr());
    server.run().await
}
