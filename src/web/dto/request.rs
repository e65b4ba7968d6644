//! Request DTOs for the web API.
//!
//! Field names are camelCase on the wire to match the web client.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// File rename request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameFileRequest {
    /// New base name. The current extension is kept.
    #[validate(length(min = 1, max = 255, message = "Invalid file name"))]
    pub new_name: String,
}

/// Multipart form of a batch upload. Used for API documentation.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadForm {
    /// Files to upload.
    #[schema(value_type = Vec<String>, format = Binary)]
    pub files: Vec<Vec<u8>>,
    /// Target folder or browser-relative path for each file, by position.
    #[serde(default)]
    pub folder_paths: Vec<String>,
}

/// Upload-from-URL request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    /// Remote image or video URL.
    #[validate(url(message = "Must be a valid URL"))]
    pub url: String,
    /// Target folder (root when absent).
    #[serde(default)]
    pub folder_path: Option<String>,
}

/// Folder creation request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Full path of the new folder, e.g. `trip/day1`.
    #[validate(length(min = 1, max = 1024, message = "Folder name is required"))]
    pub folder_name: String,
}

/// Folder rename request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameFolderRequest {
    /// New last segment for the folder.
    #[validate(length(min = 1, max = 255, message = "Invalid folder name"))]
    pub new_name: String,
}

/// PIN set or verify request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PinRequest {
    /// 4 to 8 digit PIN.
    #[validate(length(min = 4, max = 8, message = "PIN must be 4-8 digits"))]
    pub pin: String,
}

/// PIN removal request. The body is optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RemovePinRequest {
    /// Current PIN; checked before removal when present.
    #[serde(default)]
    pub pin: Option<String>,
}

/// Search query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive name fragment.
    #[serde(default)]
    pub q: Option<String>,
    /// Folder to search in; root files and folders when absent.
    #[serde(default)]
    pub folder: Option<String>,
}
