//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::dto::{
    CreateFolderRequest, CreateFolderResponse, DeleteFolderResponse, DeleteImagesResponse,
    FileResponse, FolderResponse, MessageResponse, PinRequest, RemovePinRequest,
    RenameFileRequest, RenameFolderRequest, RenameFolderResponse, SearchResponse,
    SuccessResponse, UploadForm, UploadResponse, UploadUrlRequest,
};
use super::handlers::{self, AppState};
use super::middleware::create_cors_layer;

/// Maximum number of files in one upload request.
pub const MAX_FILES_PER_UPLOAD: u64 = 50;

/// OpenAPI document for the web API.
#[derive(OpenApi)]
#[openapi(
    info(title = "mediabox API", description = "Personal media file manager"),
    servers((url = "/api")),
    paths(
        // Files
        handlers::list_files,
        handlers::upload_files,
        handlers::upload_url,
        handlers::search,
        handlers::view_file,
        handlers::thumbnail,
        handlers::download_file,
        handlers::delete_file,
        handlers::rename_file,
        // Folders
        handlers::list_folders,
        handlers::create_folder,
        handlers::get_folder_contents,
        handlers::folder_files,
        handlers::download_folder,
        handlers::delete_folder,
        handlers::delete_folder_images,
        handlers::rename_folder,
        // PINs
        handlers::set_pin,
        handlers::verify_pin,
        handlers::remove_pin,
    ),
    components(schemas(
        FileResponse,
        FolderResponse,
        UploadForm,
        UploadResponse,
        UploadUrlRequest,
        SearchResponse,
        RenameFileRequest,
        CreateFolderRequest,
        CreateFolderResponse,
        RenameFolderRequest,
        RenameFolderResponse,
        DeleteFolderResponse,
        DeleteImagesResponse,
        PinRequest,
        RemovePinRequest,
        MessageResponse,
        SuccessResponse,
    )),
    tags(
        (name = "files", description = "Upload, serve, rename and delete files"),
        (name = "folders", description = "Folder tree and folder operations"),
        (name = "pins", description = "Folder PIN locks")
    )
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let upload_limit = usize::try_from(
        app_state
            .max_upload_bytes()
            .saturating_mul(MAX_FILES_PER_UPLOAD),
    )
    .unwrap_or(usize::MAX);

    let file_routes = Router::new()
        .route("/", get(handlers::list_files))
        .route(
            "/upload",
            post(handlers::upload_files).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/upload-url", post(handlers::upload_url))
        .route("/search", get(handlers::search))
        .route("/:id", delete(handlers::delete_file))
        .route("/:id/view", get(handlers::view_file))
        .route("/:id/thumbnail", get(handlers::thumbnail))
        .route("/:id/download", get(handlers::download_file))
        .route("/:id/rename", patch(handlers::rename_file));

    let folder_routes = Router::new()
        .route(
            "/",
            get(handlers::list_folders).post(handlers::create_folder),
        )
        .route("/:path", delete(handlers::delete_folder))
        .route("/:path/contents", get(handlers::get_folder_contents))
        .route("/:path/files", get(handlers::folder_files))
        .route("/:path/download", get(handlers::download_folder))
        .route("/:path/images", delete(handlers::delete_folder_images))
        .route("/:path/rename", patch(handlers::rename_folder))
        .route(
            "/:path/pin",
            post(handlers::set_pin).delete(handlers::remove_pin),
        )
        .route("/:path/unlock", post(handlers::verify_pin));

    let api_routes = Router::new()
        .nest("/files", file_routes)
        .nest("/folders", folder_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

/// Create a router serving the built web client.
///
/// Unknown paths fall back to `index.html` so client-side routes work.
/// Returns `None` when the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let dir = Path::new(static_path);
    if !dir.is_dir() {
        tracing::warn!(path = %static_path, "Static directory not found, not serving web client");
        return None;
    }

    let index = dir.join("index.html");
    let service = ServeDir::new(dir).fallback(ServeFile::new(index));

    Some(Router::new().fallback_service(service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let response = create_health_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[test]
    fn test_openapi_document() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/files/upload"));
        assert!(paths.iter().any(|p| p.as_str() == "/folders/{path}/pin"));
    }

    #[test]
    fn test_static_router_missing_dir() {
        assert!(create_static_router("/nonexistent/mediabox/dist").is_none());
    }

    #[tokio::test]
    async fn test_static_router_serves_index_fallback() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("index.html"), "<html>app</html>").unwrap();

        let router = create_static_router(temp_dir.path().to_str().unwrap()).unwrap();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/folders/trip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<html>app</html>");
    }
}
