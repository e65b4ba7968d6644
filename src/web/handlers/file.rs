//! File handlers for Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::Response,
    Json,
};
use std::sync::Arc;
use utoipa;

use crate::file::{FileContent, UploadRequest};
use crate::web::dto::{
    FileResponse, MessageResponse, RenameFileRequest, SearchQuery, SearchResponse,
    UploadForm, UploadResponse, UploadUrlRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// How a browser should present a served file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    /// Display in the browser.
    Inline,
    /// Save to disk.
    Attachment,
}

impl Disposition {
    fn as_str(self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

/// Generate a safe Content-Disposition header value.
///
/// Control characters are dropped and quotes and backslashes replaced in
/// the plain `filename` parameter. Non-ASCII names also get an RFC 5987
/// `filename*` parameter.
pub(crate) fn content_disposition_header(disposition: Disposition, filename: &str) -> String {
    let kind = disposition.as_str();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("{kind}; filename=\"{filename}\"");
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!("{kind}; filename=\"{sanitized}\"; filename*=UTF-8''{encoded}")
}

/// Build a response carrying stored bytes.
pub(crate) fn file_response(
    file: FileContent,
    disposition: Disposition,
) -> Result<Response, ApiError> {
    let length = file.content.len();

    Response::builder()
        .header(header::CONTENT_TYPE, file.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(disposition, &file.filename),
        )
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from(file.content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// GET /api/files - List all files, newest first.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "All files", body = Vec<FileResponse>)
    )
)]
pub async fn list_files(State(state): State<Arc<AppState>>) -> Json<Vec<FileResponse>> {
    let files = state.library.list_files().await;
    Json(files.into_iter().map(FileResponse::from).collect())
}

/// POST /api/files/upload - Upload a batch of files.
///
/// Multipart fields: `files` (repeated) and `folderPaths` (repeated, paired
/// with `files` by position). Files are stored one at a time; a failure
/// stops the batch but keeps the files already stored.
#[utoipa::path(
    post,
    path = "/files/upload",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Files uploaded", body = UploadResponse),
        (status = 400, description = "No files or malformed multipart data"),
        (status = 422, description = "File type or size rejected")
    )
)]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut uploads: Vec<UploadRequest> = Vec::new();
    let mut folder_paths: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "files" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let mime_type = field.content_type().map(|s| s.to_string());
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to read file content: {}", e);
                        ApiError::bad_request("Failed to read file")
                    })?
                    .to_vec();

                let mut request = UploadRequest::new(filename, content);
                if let Some(mime_type) = mime_type {
                    request = request.with_mime_type(mime_type);
                }
                uploads.push(request);
            }
            "folderPaths" => {
                folder_paths.push(field.text().await.map_err(|e| {
                    tracing::error!("Failed to read folder path: {}", e);
                    ApiError::bad_request("Invalid folder path")
                })?);
            }
            _ => {}
        }
    }

    if uploads.is_empty() {
        return Err(ApiError::bad_request("No files uploaded"));
    }

    let mut files = Vec::with_capacity(uploads.len());
    for (i, mut request) in uploads.into_iter().enumerate() {
        if let Some(folder) = folder_paths.get(i).filter(|f| !f.is_empty()) {
            request = request.with_folder(folder.clone());
        }
        let record = state.library.upload(request).await?;
        files.push(FileResponse::from(record));
    }

    Ok(Json(UploadResponse { files }))
}

/// POST /api/files/upload-url - Fetch a file from a URL and store it.
#[utoipa::path(
    post,
    path = "/files/upload-url",
    tag = "files",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "File fetched and stored", body = FileResponse),
        (status = 422, description = "Invalid URL or unsupported content type"),
        (status = 502, description = "Remote server failed")
    )
)]
pub async fn upload_url(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<UploadUrlRequest>,
) -> Result<Json<FileResponse>, ApiError> {
    let record = state
        .library
        .upload_from_url(&req.url, req.folder_path.as_deref())
        .await?;

    Ok(Json(FileResponse::from(record)))
}

/// GET /api/files/search - Search files and folders by name.
#[utoipa::path(
    get,
    path = "/files/search",
    tag = "files",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching files and folders", body = SearchResponse)
    )
)]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = query.q.unwrap_or_default();
    let folder = query.folder.filter(|f| !f.trim().is_empty());

    let results = state.library.search(&q, folder.as_deref()).await?;
    Ok(Json(SearchResponse::from(results)))
}

/// GET /api/files/:id/view - Serve a file inline.
#[utoipa::path(
    get,
    path = "/files/{id}/view",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "File not found")
    )
)]
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let file = state.library.read_file(&id).await?;
    file_response(file, Disposition::Inline)
}

/// GET /api/files/:id/thumbnail - Serve a file's preview image.
#[utoipa::path(
    get,
    path = "/files/{id}/thumbnail",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "JPEG preview", content_type = "image/jpeg"),
        (status = 404, description = "File or thumbnail not found")
    )
)]
pub async fn thumbnail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let file = state.library.read_thumbnail(&id).await?;
    file_response(file, Disposition::Inline)
}

/// GET /api/files/:id/download - Download a file.
#[utoipa::path(
    get,
    path = "/files/{id}/download",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let file = state.library.read_file(&id).await?;
    tracing::info!(file_id = %id, name = %file.filename, "File downloaded");
    file_response(file, Disposition::Attachment)
}

/// DELETE /api/files/:id - Delete a file.
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.library.delete_file(&id).await?;
    Ok(Json(MessageResponse::new("File deleted successfully")))
}

/// PATCH /api/files/:id/rename - Rename a file, keeping its extension.
#[utoipa::path(
    patch,
    path = "/files/{id}/rename",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    request_body = RenameFileRequest,
    responses(
        (status = 200, description = "File renamed", body = FileResponse),
        (status = 404, description = "File not found"),
        (status = 422, description = "Invalid file name")
    )
)]
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<RenameFileRequest>,
) -> Result<Json<FileResponse>, ApiError> {
    let record = state.library.rename_file(&id, &req.new_name).await?;
    tracing::info!(file_id = %id, name = %record.original_name, "File renamed");
    Ok(Json(FileResponse::from(record)))
}
