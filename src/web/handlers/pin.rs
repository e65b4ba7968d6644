//! Folder PIN handlers for Web API.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use utoipa;

use crate::file::PinRemoval;
use crate::web::dto::{PinRequest, RemovePinRequest, SuccessResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/folders/:path/pin - Set or replace a folder's PIN.
#[utoipa::path(
    post,
    path = "/folders/{path}/pin",
    tag = "pins",
    params(
        ("path" = String, Path, description = "Percent-encoded folder path")
    ),
    request_body = PinRequest,
    responses(
        (status = 200, description = "PIN set", body = SuccessResponse),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "PIN must be 4-8 digits")
    )
)]
pub async fn set_pin(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    ValidatedJson(req): ValidatedJson<PinRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.library.set_pin(&path, &req.pin).await?;
    Ok(Json(SuccessResponse::new("PIN set successfully")))
}

/// POST /api/folders/:path/unlock - Check a folder's PIN.
#[utoipa::path(
    post,
    path = "/folders/{path}/unlock",
    tag = "pins",
    params(
        ("path" = String, Path, description = "Percent-encoded folder path")
    ),
    request_body = PinRequest,
    responses(
        (status = 200, description = "PIN accepted", body = SuccessResponse),
        (status = 401, description = "Invalid PIN")
    )
)]
pub async fn verify_pin(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    ValidatedJson(req): ValidatedJson<PinRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !state.library.verify_pin(&path, &req.pin).await? {
        return Err(ApiError::unauthorized("Invalid PIN"));
    }
    Ok(Json(SuccessResponse::new("Folder unlocked successfully")))
}

/// DELETE /api/folders/:path/pin - Remove a folder's PIN.
///
/// The body is optional; when it carries a PIN, that PIN must match.
/// A body that is present but not valid JSON is rejected.
#[utoipa::path(
    delete,
    path = "/folders/{path}/pin",
    tag = "pins",
    params(
        ("path" = String, Path, description = "Percent-encoded folder path")
    ),
    request_body(content = RemovePinRequest, description = "Current PIN (optional)"),
    responses(
        (status = 200, description = "PIN removed", body = SuccessResponse),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Invalid PIN"),
        (status = 404, description = "No PIN found for this folder")
    )
)]
pub async fn remove_pin(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ApiError> {
    let req = parse_remove_body(&body)?;
    let pin = req.pin.as_deref().filter(|p| !p.is_empty());

    match state.library.remove_pin(&path, pin).await? {
        PinRemoval::Removed => Ok(Json(SuccessResponse::new("PIN removed successfully"))),
        PinRemoval::NotSet => Err(ApiError::not_found("No PIN found for this folder")),
        PinRemoval::Rejected => Err(ApiError::unauthorized("Invalid PIN")),
    }
}

fn parse_remove_body(body: &[u8]) -> Result<RemovePinRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RemovePinRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("Invalid JSON: {e}")))
}
