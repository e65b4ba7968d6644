//! Response DTOs for the web API.
//!
//! Field names are camelCase on the wire to match the web client.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::file::{FileRecord, FolderInfo, SearchResults};

// ============================================================================
// Files
// ============================================================================

/// File information in responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// File ID.
    pub id: String,
    /// On-disk filename.
    pub name: String,
    /// User-facing filename.
    pub original_name: String,
    /// Stored location.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    pub mime_type: String,
    /// Preview image location, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    /// Containing folder (absent for root).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    /// Upload time.
    pub created_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            original_name: record.original_name,
            path: record.path.display().to_string(),
            size: record.size,
            mime_type: record.mime_type,
            thumbnail_path: record.thumbnail_path.map(|p| p.display().to_string()),
            folder_path: record.folder_path,
            created_at: record.created_at,
        }
    }
}

/// Batch upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Files stored by this request.
    pub files: Vec<FileResponse>,
}

// ============================================================================
// Folders
// ============================================================================

/// Folder information in responses, with nested subfolders.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    /// Last path segment.
    pub name: String,
    /// Full path from the root.
    pub path: String,
    /// Parent path (absent for top-level folders).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
    /// Number of files directly inside.
    pub file_count: usize,
    /// Number of direct subfolders.
    pub subfolder_count: usize,
    /// Files directly inside, newest first.
    pub files: Vec<FileResponse>,
    /// Direct subfolders, ordered by name.
    pub subfolders: Vec<FolderResponse>,
    /// Whether a PIN locks the folder.
    pub is_locked: bool,
    /// Whether a PIN is set.
    pub has_pin: bool,
}

impl From<FolderInfo> for FolderResponse {
    fn from(folder: FolderInfo) -> Self {
        Self {
            name: folder.name,
            path: folder.path,
            parent_path: folder.parent_path,
            file_count: folder.file_count,
            subfolder_count: folder.subfolder_count,
            files: folder.files.into_iter().map(FileResponse::from).collect(),
            subfolders: folder
                .subfolders
                .into_iter()
                .map(FolderResponse::from)
                .collect(),
            is_locked: folder.is_locked,
            has_pin: folder.has_pin,
        }
    }
}

/// Search results.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    /// Matching files.
    pub files: Vec<FileResponse>,
    /// Matching folders.
    pub folders: Vec<FolderResponse>,
}

impl From<SearchResults> for SearchResponse {
    fn from(results: SearchResults) -> Self {
        Self {
            files: results.files.into_iter().map(FileResponse::from).collect(),
            folders: results
                .folders
                .into_iter()
                .map(FolderResponse::from)
                .collect(),
        }
    }
}

/// Folder creation response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderResponse {
    /// Always true.
    pub success: bool,
    /// Sanitized folder path.
    pub folder_name: String,
}

/// Folder rename response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameFolderResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Path after the rename.
    pub new_path: String,
}

/// Folder deletion response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderResponse {
    /// Human-readable message.
    pub message: String,
    /// Always true.
    pub deleted: bool,
    /// Number of files removed with the folder.
    pub deleted_files: usize,
}

/// Image bulk deletion response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImagesResponse {
    /// Human-readable message.
    pub message: String,
    /// Number of images removed.
    pub deleted_count: usize,
}

// ============================================================================
// Generic
// ============================================================================

/// Plain message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Success flag with a message.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl SuccessResponse {
    /// Create a new success response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{FileIndex, NewFile};

    #[test]
    fn test_file_response_is_camel_case() {
        let mut index = FileIndex::new();
        let record = index.create(
            NewFile::new("1-a.jpg", "a.jpg", "/uploads/trip/1-a.jpg", 10, "image/jpeg")
                .with_folder("trip"),
        );

        let json = serde_json::to_value(FileResponse::from(record)).unwrap();

        assert_eq!(json["originalName"], "a.jpg");
        assert_eq!(json["mimeType"], "image/jpeg");
        assert_eq!(json["folderPath"], "trip");
        assert_eq!(json["path"], "/uploads/trip/1-a.jpg");
        assert!(json.get("thumbnailPath").is_none());
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_folder_response_nests() {
        let child = FolderInfo {
            name: "day1".to_string(),
            path: "trip/day1".to_string(),
            parent_path: Some("trip".to_string()),
            file_count: 0,
            subfolder_count: 0,
            files: vec![],
            subfolders: vec![],
            has_pin: true,
            is_locked: true,
        };
        let parent = FolderInfo {
            name: "trip".to_string(),
            path: "trip".to_string(),
            parent_path: None,
            file_count: 0,
            subfolder_count: 1,
            files: vec![],
            subfolders: vec![child],
            has_pin: false,
            is_locked: false,
        };

        let json = serde_json::to_value(FolderResponse::from(parent)).unwrap();

        assert_eq!(json["subfolderCount"], 1);
        assert!(json.get("parentPath").is_none());
        assert_eq!(json["subfolders"][0]["parentPath"], "trip");
        assert_eq!(json["subfolders"][0]["isLocked"], true);
    }

    #[test]
    fn test_success_response() {
        let json = serde_json::to_value(SuccessResponse::new("PIN set successfully")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "PIN set successfully");
    }
}
