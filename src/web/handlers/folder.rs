//! Folder handlers for Web API.
//!
//! Folder paths arrive percent-encoded in a single route segment
//! (`trip%2Fday1`) and are decoded by the `Path` extractor.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
    Json,
};
use std::sync::Arc;
use utoipa;

use crate::web::dto::{
    CreateFolderRequest, CreateFolderResponse, DeleteFolderResponse, DeleteImagesResponse,
    FileResponse, FolderResponse, RenameFolderRequest, RenameFolderResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::file::{content_disposition_header, Disposition};
use crate::web::handlers::AppState;
use crate::MediaboxError;

/// GET /api/folders - The folder tree.
#[utoipa::path(
    get,
    path = "/folders",
    tag = "folders",
    responses(
        (status = 200, description = "Top-level folders with nested subfolders", body = Vec<FolderResponse>)
    )
)]
pub async fn list_folders(State(state): State<Arc<AppState>>) -> Json<Vec<FolderResponse>> {
    let folders = state.library.folders().await;
    Json(folders.into_iter().map(FolderResponse::from).collect())
}

/// POST /api/folders - Create a folder.
#[utoipa::path(
    post,
    path = "/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 200, description = "Folder created", body = CreateFolderResponse),
        (status = 422, description = "Invalid folder name")
    )
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<Json<CreateFolderResponse>, ApiError> {
    let folder_name = state.library.create_folder(&req.folder_name).await?;

    Ok(Json(CreateFolderResponse {
        success: true,
        folder_name,
    }))
}

/// GET /api/folders/:path/contents - One folder with its files and subfolders.
#[utoipa::path(
    get,
    path = "/folders/{path}/contents",
    tag = "folders",
    params(
        ("path" = String, Path, description = "Percent-encoded folder path")
    ),
    responses(
        (status = 200, description = "Folder contents", body = FolderResponse),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn get_folder_contents(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Json<FolderResponse>, ApiError> {
    let folder = state.library.get_folder(&path).await?;
    Ok(Json(FolderResponse::from(folder)))
}

/// GET /api/folders/:path/files - Files directly inside a folder.
#[utoipa::path(
    get,
    path = "/folders/{path}/files",
    tag = "folders",
    params(
        ("path" = String, Path, description = "Percent-encoded folder path")
    ),
    responses(
        (status = 200, description = "Files in the folder", body = Vec<FileResponse>)
    )
)]
pub async fn folder_files(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Json<Vec<FileResponse>>, ApiError> {
    let files = state.library.files_in_folder(&path).await?;
    Ok(Json(files.into_iter().map(FileResponse::from).collect()))
}

/// GET /api/folders/:path/download - Zip of the files directly inside a folder.
#[utoipa::path(
    get,
    path = "/folders/{path}/download",
    tag = "folders",
    params(
        ("path" = String, Path, description = "Percent-encoded folder path")
    ),
    responses(
        (status = 200, description = "Zip archive", content_type = "application/zip"),
        (status = 400, description = "Folder has no files"),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn download_folder(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let (name, content) = state
        .library
        .folder_archive(&path)
        .await
        .map_err(|e| match e {
            MediaboxError::Validation(msg) => ApiError::bad_request(msg),
            e => e.into(),
        })?;

    tracing::info!(folder = %path, size = content.len(), "Folder downloaded");

    let length = content.len();
    Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(Disposition::Attachment, &format!("{name}.zip")),
        )
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// DELETE /api/folders/:path - Delete a folder and everything in it.
#[utoipa::path(
    delete,
    path = "/folders/{path}",
    tag = "folders",
    params(
        ("path" = String, Path, description = "Percent-encoded folder path")
    ),
    responses(
        (status = 200, description = "Folder deleted", body = DeleteFolderResponse),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Json<DeleteFolderResponse>, ApiError> {
    let deleted_files = state.library.delete_folder(&path).await?;

    Ok(Json(DeleteFolderResponse {
        message: "Folder deleted successfully".to_string(),
        deleted: true,
        deleted_files,
    }))
}

/// DELETE /api/folders/:path/images - Delete the images directly inside a folder.
#[utoipa::path(
    delete,
    path = "/folders/{path}/images",
    tag = "folders",
    params(
        ("path" = String, Path, description = "Percent-encoded folder path")
    ),
    responses(
        (status = 200, description = "Images deleted", body = DeleteImagesResponse)
    )
)]
pub async fn delete_folder_images(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Json<DeleteImagesResponse>, ApiError> {
    let deleted_count = state.library.delete_all_images(&path).await?;
    tracing::info!(folder = %path, deleted_count, "Folder images deleted");

    Ok(Json(DeleteImagesResponse {
        message: format!("Deleted {deleted_count} images"),
        deleted_count,
    }))
}

/// PATCH /api/folders/:path/rename - Rename a folder's last segment.
#[utoipa::path(
    patch,
    path = "/folders/{path}/rename",
    tag = "folders",
    params(
        ("path" = String, Path, description = "Percent-encoded folder path")
    ),
    request_body = RenameFolderRequest,
    responses(
        (status = 200, description = "Folder renamed", body = RenameFolderResponse),
        (status = 404, description = "Folder not found"),
        (status = 409, description = "A folder with the new name already exists"),
        (status = 422, description = "Invalid folder name")
    )
)]
pub async fn rename_folder(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    ValidatedJson(req): ValidatedJson<RenameFolderRequest>,
) -> Result<Json<RenameFolderResponse>, ApiError> {
    let new_path = state.library.rename_folder(&path, &req.new_name).await?;

    Ok(Json(RenameFolderResponse {
        success: true,
        message: "Folder renamed successfully".to_string(),
        new_path,
    }))
}
