//! Web server for mediabox.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::ServerConfig;
use crate::file::MediaLibrary;
use crate::{MediaboxError, Result};

use super::handlers::AppState;
use super::router::{
    create_health_router, create_router, create_static_router, create_swagger_router,
};

/// Web server for the API and the web client.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Server configuration.
    config: ServerConfig,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, library: Arc<MediaLibrary>) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| {
                MediaboxError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    config.host, config.port
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(library)),
            config: config.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_router(self) -> (SocketAddr, Router) {
        let mut router = create_router(self.app_state, &self.config.cors_origins)
            .merge(create_health_router())
            .merge(create_swagger_router());

        if self.config.serve_static {
            if let Some(static_router) = create_static_router(&self.config.static_path) {
                router = router.merge(static_router);
            }
        }

        (self.addr, router.layer(CompressionLayer::new()))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> Result<()> {
        let (addr, router) = self.build_router();

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Run the server in the background and return the bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (addr, router) = self.build_router();

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{FfmpegProcessor, FileStorage, UrlFetcher};
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
            serve_static: false,
            static_path: "web/dist".to_string(),
        }
    }

    fn create_library(temp_dir: &TempDir) -> Arc<MediaLibrary> {
        let storage = FileStorage::new(temp_dir.path().join("uploads")).unwrap();
        let processor = Arc::new(FfmpegProcessor::new("ffmpeg".to_string(), 300));
        let fetcher = UrlFetcher::new(Duration::from_secs(5), 1024).unwrap();
        Arc::new(MediaLibrary::new(storage, processor, fetcher, 1024))
    }

    #[test]
    fn test_web_server_new() {
        let temp_dir = TempDir::new().unwrap();

        let server = WebServer::new(&create_test_config(), create_library(&temp_dir)).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn test_web_server_invalid_host() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = create_test_config();
        config.host = "not a host".to_string();

        let result = WebServer::new(&config, create_library(&temp_dir));
        assert!(matches!(result, Err(MediaboxError::Config(_))));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let temp_dir = TempDir::new().unwrap();
        let server = WebServer::new(&create_test_config(), create_library(&temp_dir)).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "OK");

        let resp = client
            .get(format!("http://{}/api/files", addr))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "[]");
    }
}
