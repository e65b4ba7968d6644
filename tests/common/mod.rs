//! Test helpers for API and library tests.
//!
//! Provides a media library rooted in a temporary directory with a stub
//! media processor, so no ffmpeg binary is needed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::Value;
use tempfile::TempDir;

use mediabox::file::{FileStorage, MediaProcessor, PreviewKind, UrlFetcher};
use mediabox::web::handlers::AppState;
use mediabox::web::router::create_router;
use mediabox::MediaLibrary;

/// Per-file upload limit used by tests.
pub const MAX_UPLOAD_BYTES: u64 = 1024 * 1024;

/// Writes a fixed preview instead of running ffmpeg.
pub struct StubProcessor;

impl MediaProcessor for StubProcessor {
    fn generate_preview(
        &self,
        _source: &Path,
        target: &Path,
        _kind: PreviewKind,
    ) -> mediabox::Result<()> {
        std::fs::write(target, b"preview")?;
        Ok(())
    }
}

/// A media library in a temporary directory.
pub struct TestLibrary {
    pub library: Arc<MediaLibrary>,
    pub temp_dir: TempDir,
}

impl TestLibrary {
    pub fn new() -> Self {
        Self::with_processor(Arc::new(StubProcessor))
    }

    /// A library using the given media processor.
    pub fn with_processor(processor: Arc<dyn MediaProcessor>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = FileStorage::new(temp_dir.path().join("uploads"))
            .expect("Failed to create storage");
        let fetcher = UrlFetcher::new(Duration::from_secs(5), MAX_UPLOAD_BYTES)
            .expect("Failed to create fetcher");
        let library = Arc::new(MediaLibrary::new(
            storage,
            processor,
            fetcher,
            MAX_UPLOAD_BYTES,
        ));

        Self { library, temp_dir }
    }

    /// The upload directory.
    pub fn upload_dir(&self) -> PathBuf {
        self.temp_dir.path().join("uploads")
    }
}

/// Create a test server over the API router.
pub fn create_test_server() -> (TestServer, TestLibrary) {
    let test_library = TestLibrary::new();
    let app_state = Arc::new(AppState::new(Arc::clone(&test_library.library)));
    let router = create_router(app_state, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, test_library)
}

/// Upload one file, optionally with a folder path, and return the stored record.
pub async fn upload_file(
    server: &TestServer,
    name: &str,
    mime_type: &str,
    content: &[u8],
    folder: Option<&str>,
) -> Value {
    let mut form = MultipartForm::new().add_part(
        "files",
        Part::bytes(content.to_vec())
            .file_name(name)
            .mime_type(mime_type),
    );
    if let Some(folder) = folder {
        form = form.add_text("folderPaths", folder);
    }

    let response = server.post("/api/files/upload").multipart(form).await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    body["files"][0].clone()
}

/// Upload a 1024-byte JPEG.
pub async fn upload_jpeg(server: &TestServer, name: &str, folder: Option<&str>) -> Value {
    upload_file(server, name, "image/jpeg", &[0u8; 1024], folder).await
}

/// Percent-encode a folder path into a single route segment.
pub fn folder_route(path: &str, suffix: &str) -> String {
    format!("/api/folders/{}{}", urlencoding::encode(path), suffix)
}

/// Get the error code of an error response body.
pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

/// Serve a router on a random local port and return its base URL.
pub async fn serve_remote(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}

/// A remote server with one PNG, one HTML page and nothing else.
pub async fn serve_remote_media() -> String {
    serve_remote(
        Router::new()
            .route(
                "/images/cat.png",
                get(|| async { ([(axum::http::header::CONTENT_TYPE, "image/png")], vec![1u8, 2, 3]) }),
            )
            .route(
                "/page",
                get(|| async {
                    (
                        StatusCode::OK,
                        [(axum::http::header::CONTENT_TYPE, "text/html")],
                        "<html></html>",
                    )
                }),
            ),
    )
    .await
}
