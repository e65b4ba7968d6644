//! Media library service for mediabox.
//!
//! This module ties the core together for the serving context:
//! - Upload (multipart and from URL) with type and size checks
//! - File lookup, download, rename and deletion
//! - Folder tree, folder mutations and PINs
//! - Search and zip download
//!
//! The file index and PIN vault sit behind one `RwLock`. Reads share it;
//! every mutation takes it exclusively, so structural changes never
//! interleave. Slow work (fetching, thumbnailing, zipping) happens outside
//! the exclusive lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use super::archive::build_zip;
use super::fetch::UrlFetcher;
use super::folder::{FolderInfo, FolderTreeBuilder};
use super::mutator::PathMutator;
use super::path as folder_path;
use super::pin::PinVault;
use super::record::{FileIndex, FileRecord, NewFile};
use super::search::{search_all, search_files, SearchResults};
use super::storage::{FileStorage, StoredFile};
use super::thumbnail::{FfmpegProcessor, MediaProcessor, PreviewKind};
use super::upload;
use crate::config::FilesConfig;
use crate::{MediaboxError, Result};

/// Request data for a single uploaded file.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Filename as sent by the client.
    pub original_name: String,
    /// Content type as sent by the client.
    pub mime_type: Option<String>,
    /// Target folder, or the browser-relative path of the file.
    pub folder: Option<String>,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request for the root folder.
    pub fn new(original_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            mime_type: None,
            folder: None,
            content,
        }
    }

    /// Set the reported content type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the target folder.
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }
}

/// Bytes of a stored object ready to be served.
#[derive(Debug, Clone)]
pub struct FileContent {
    /// Filename to present to the client.
    pub filename: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// The bytes.
    pub content: Vec<u8>,
}

/// Outcome of a PIN removal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRemoval {
    /// The PIN was removed.
    Removed,
    /// The folder had no PIN.
    NotSet,
    /// A PIN was supplied and did not match.
    Rejected,
}

struct LibraryState {
    index: FileIndex,
    vault: PinVault,
}

/// The media library owned by the serving context.
pub struct MediaLibrary {
    storage: FileStorage,
    state: RwLock<LibraryState>,
    processor: Arc<dyn MediaProcessor>,
    fetcher: UrlFetcher,
    max_upload_bytes: u64,
}

impl MediaLibrary {
    /// Create a new MediaLibrary.
    pub fn new(
        storage: FileStorage,
        processor: Arc<dyn MediaProcessor>,
        fetcher: UrlFetcher,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            storage,
            state: RwLock::new(LibraryState {
                index: FileIndex::new(),
                vault: PinVault::new(),
            }),
            processor,
            fetcher,
            max_upload_bytes,
        }
    }

    /// Create a MediaLibrary from configuration, with the ffmpeg processor.
    pub fn from_config(config: &FilesConfig) -> Result<Self> {
        let storage = FileStorage::new(&config.upload_dir)?;
        let processor = Arc::new(FfmpegProcessor::new(
            config.ffmpeg_path.clone(),
            config.thumbnail_size,
        ));
        let fetcher = UrlFetcher::new(
            Duration::from_secs(config.fetch_timeout_secs),
            config.max_upload_bytes(),
        )?;

        Ok(Self::new(
            storage,
            processor,
            fetcher,
            config.max_upload_bytes(),
        ))
    }

    /// Get the file storage.
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Maximum accepted upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    // ------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------

    /// All files, newest first.
    pub async fn list_files(&self) -> Vec<FileRecord> {
        self.state.read().await.index.list()
    }

    /// Get a file record by ID.
    pub async fn get_file(&self, id: &str) -> Result<FileRecord> {
        self.state
            .read()
            .await
            .index
            .get(id)
            .cloned()
            .ok_or_else(|| MediaboxError::NotFound("File".to_string()))
    }

    /// Upload a file.
    ///
    /// # Validation
    /// - File size: at most the configured limit
    /// - Type: an accepted MIME type or extension
    /// - Folder: no traversal, not the thumbnails directory
    ///
    /// Videos get a preview; a failed preview is logged and skipped.
    pub async fn upload(&self, request: UploadRequest) -> Result<FileRecord> {
        let original_name = display_name(&request.original_name)?;
        upload::check_size(request.content.len() as u64, self.max_upload_bytes)?;

        let mime_type = upload::resolve_mime_type(request.mime_type.as_deref(), &original_name);
        upload::check_allowed(&mime_type, &original_name)?;

        let folder = upload::resolve_target_folder(request.folder.as_deref(), &original_name)?;
        let preview = PreviewKind::for_mime(&mime_type).filter(|k| *k == PreviewKind::Video);

        self.store(original_name, mime_type, folder, request.content, preview)
            .await
    }

    /// Fetch an image or video from a URL and store it.
    ///
    /// Raster images and videos get a preview.
    pub async fn upload_from_url(&self, url: &str, folder: Option<&str>) -> Result<FileRecord> {
        let folder = folder_path::normalize_optional(folder)?;
        if let Some(folder) = &folder {
            folder_path::ensure_not_reserved(folder)?;
        }

        let fetched = self.fetcher.fetch(url).await?;
        let preview = PreviewKind::for_mime(&fetched.mime_type);

        self.store(
            fetched.original_name,
            fetched.mime_type,
            folder,
            fetched.content,
            preview,
        )
        .await
    }

    async fn store(
        &self,
        original_name: String,
        mime_type: String,
        folder: Option<String>,
        content: Vec<u8>,
        preview: Option<PreviewKind>,
    ) -> Result<FileRecord> {
        let size = content.len() as u64;
        let staged = self.storage.stage(&content, &original_name)?;

        let thumbnail = match preview {
            Some(kind) => self.generate_thumbnail(&staged, kind).await,
            None => None,
        };

        let mut state = self.state.write().await;

        // The folder is created under the lock, so a concurrent rename or
        // delete is ordered before this upload.
        let stored = match self.storage.commit(&staged, folder.as_deref()) {
            Ok(stored) => stored,
            Err(e) => {
                self.discard(&staged.path);
                if let Some(thumbnail) = &thumbnail {
                    self.discard(thumbnail);
                }
                return Err(e);
            }
        };

        let mut new_file = NewFile::new(stored.name, original_name, stored.path, size, mime_type);
        if let Some(folder) = folder {
            new_file = new_file.with_folder(folder);
        }
        if let Some(thumbnail) = thumbnail {
            new_file = new_file.with_thumbnail(thumbnail);
        }

        let record = state.index.create(new_file);
        tracing::info!(
            file_id = %record.id,
            name = %record.original_name,
            folder = record.folder_path.as_deref().unwrap_or(""),
            size = record.size,
            "File uploaded"
        );
        Ok(record)
    }

    fn discard(&self, path: &Path) {
        if let Err(e) = self.storage.remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove abandoned upload");
        }
    }

    async fn generate_thumbnail(&self, stored: &StoredFile, kind: PreviewKind) -> Option<PathBuf> {
        let processor = Arc::clone(&self.processor);
        let source = stored.path.clone();
        let target = self.storage.thumbnail_path(&stored.name);
        let output = target.clone();

        let result = tokio::task::spawn_blocking(move || {
            processor.generate_preview(&source, &output, kind)
        })
        .await;

        match result {
            Ok(Ok(())) => Some(target),
            Ok(Err(e)) => {
                tracing::warn!(file = %stored.name, error = %e, "Thumbnail generation failed");
                None
            }
            Err(e) => {
                tracing::error!(file = %stored.name, error = %e, "Thumbnail task panicked");
                None
            }
        }
    }

    /// Delete a file and its stored objects.
    pub async fn delete_file(&self, id: &str) -> Result<()> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if !PathMutator::new(&mut state.index, &mut state.vault, &self.storage).delete_file(id) {
            return Err(MediaboxError::NotFound("File".to_string()));
        }
        tracing::info!(file_id = %id, "File deleted");
        Ok(())
    }

    /// Rename a file's display name, keeping its extension.
    pub async fn rename_file(&self, id: &str, new_name: &str) -> Result<FileRecord> {
        self.state.write().await.index.rename(id, new_name)
    }

    /// Read a file's stored bytes.
    pub async fn read_file(&self, id: &str) -> Result<FileContent> {
        let record = self.get_file(id).await?;
        let content = self.storage.read(&record.path)?;

        Ok(FileContent {
            filename: record.original_name,
            mime_type: record.mime_type,
            content,
        })
    }

    /// Read a file's preview image.
    pub async fn read_thumbnail(&self, id: &str) -> Result<FileContent> {
        let record = self.get_file(id).await?;
        let thumbnail = record
            .thumbnail_path
            .ok_or_else(|| MediaboxError::NotFound("Thumbnail".to_string()))?;
        let content = self.storage.read(&thumbnail)?;

        Ok(FileContent {
            filename: format!("thumb_{}.jpg", record.id),
            mime_type: "image/jpeg".to_string(),
            content,
        })
    }

    // ------------------------------------------------------------------
    // Folders
    // ------------------------------------------------------------------

    /// The folder tree's top-level folders.
    pub async fn folders(&self) -> Vec<FolderInfo> {
        let state = self.state.read().await;
        FolderTreeBuilder::new(&state.index, &self.storage, &state.vault).build()
    }

    /// One folder with its files and subfolders.
    pub async fn get_folder(&self, path: &str) -> Result<FolderInfo> {
        let path = folder_path::normalize(path)?;
        let state = self.state.read().await;

        FolderTreeBuilder::new(&state.index, &self.storage, &state.vault)
            .find(&path)
            .ok_or_else(|| MediaboxError::NotFound(format!("Folder '{path}'")))
    }

    /// Files directly in a folder, newest first.
    pub async fn files_in_folder(&self, path: &str) -> Result<Vec<FileRecord>> {
        let path = folder_path::normalize(path)?;
        Ok(self.state.read().await.index.in_folder(Some(&path)))
    }

    /// Create a folder. Returns its sanitized path.
    pub async fn create_folder(&self, raw: &str) -> Result<String> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        PathMutator::new(&mut state.index, &mut state.vault, &self.storage).create_folder(raw)
    }

    /// Delete a folder and everything in it.
    ///
    /// # Returns
    /// The number of files removed.
    pub async fn delete_folder(&self, path: &str) -> Result<usize> {
        let path = folder_path::normalize(path)?;
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let exists = FolderTreeBuilder::new(&state.index, &self.storage, &state.vault)
            .folder_paths()
            .contains(&path);
        if !exists {
            return Err(MediaboxError::NotFound(format!("Folder '{path}'")));
        }

        PathMutator::new(&mut state.index, &mut state.vault, &self.storage).delete_folder(&path)
    }

    /// Delete the images directly inside a folder.
    ///
    /// # Returns
    /// The number of images removed.
    pub async fn delete_all_images(&self, path: &str) -> Result<usize> {
        let path = folder_path::normalize(path)?;
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        Ok(PathMutator::new(&mut state.index, &mut state.vault, &self.storage)
            .delete_all_images(&path))
    }

    /// Rename a folder's last segment. Returns the new path.
    pub async fn rename_folder(&self, path: &str, new_name: &str) -> Result<String> {
        let path = folder_path::normalize(path)?;
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        PathMutator::new(&mut state.index, &mut state.vault, &self.storage)
            .rename_folder(&path, new_name)
    }

    // ------------------------------------------------------------------
    // PINs
    // ------------------------------------------------------------------

    /// Set or replace a folder's PIN. The folder must exist.
    pub async fn set_pin(&self, path: &str, pin: &str) -> Result<()> {
        let path = folder_path::normalize(path)?;
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let exists = FolderTreeBuilder::new(&state.index, &self.storage, &state.vault)
            .folder_paths()
            .contains(&path);
        if !exists {
            return Err(MediaboxError::NotFound(format!("Folder '{path}'")));
        }

        state.vault.set_pin(&path, pin)?;
        tracing::info!(folder = %path, "Folder PIN set");
        Ok(())
    }

    /// Check a folder's PIN. False when the folder has no PIN.
    pub async fn verify_pin(&self, path: &str, pin: &str) -> Result<bool> {
        let path = folder_path::normalize(path)?;
        let verified = self.state.read().await.vault.verify_pin(&path, pin);
        if !verified {
            tracing::debug!(folder = %path, "PIN verification failed");
        }
        Ok(verified)
    }

    /// Remove a folder's PIN, checking `pin` first when one is supplied.
    pub async fn remove_pin(&self, path: &str, pin: Option<&str>) -> Result<PinRemoval> {
        let path = folder_path::normalize(path)?;
        let mut state = self.state.write().await;

        if let Some(pin) = pin {
            if !state.vault.verify_pin(&path, pin) {
                return Ok(PinRemoval::Rejected);
            }
        }

        if state.vault.remove_pin(&path) {
            tracing::info!(folder = %path, "Folder PIN removed");
            Ok(PinRemoval::Removed)
        } else {
            Ok(PinRemoval::NotSet)
        }
    }

    /// Whether a folder has a PIN.
    pub async fn is_locked(&self, path: &str) -> bool {
        self.state.read().await.vault.is_locked(path)
    }

    // ------------------------------------------------------------------
    // Search and archives
    // ------------------------------------------------------------------

    /// Search by name.
    ///
    /// With a folder, only that folder's files are searched and a blank
    /// query lists them all. Without one, root files and top-level folders
    /// are searched and a blank query finds nothing.
    pub async fn search(&self, query: &str, folder: Option<&str>) -> Result<SearchResults> {
        let folder = folder_path::normalize_optional(folder)?;
        let state = self.state.read().await;

        match folder {
            Some(folder) => Ok(SearchResults {
                files: search_files(&state.index, query, Some(&folder)),
                folders: Vec::new(),
            }),
            None => {
                let tree = FolderTreeBuilder::new(&state.index, &self.storage, &state.vault);
                Ok(search_all(&state.index, &tree, query))
            }
        }
    }

    /// Zip the files directly inside a folder.
    ///
    /// # Returns
    /// The archive's base name and its bytes.
    pub async fn folder_archive(&self, path: &str) -> Result<(String, Vec<u8>)> {
        let path = folder_path::normalize(path)?;

        let files = {
            let state = self.state.read().await;
            let exists = FolderTreeBuilder::new(&state.index, &self.storage, &state.vault)
                .folder_paths()
                .contains(&path);
            if !exists {
                return Err(MediaboxError::NotFound(format!("Folder '{path}'")));
            }
            state.index.in_folder(Some(&path))
        };

        if files.is_empty() {
            return Err(MediaboxError::Validation(
                "Folder has no files to download".to_string(),
            ));
        }

        let bytes = tokio::task::spawn_blocking(move || build_zip(&files))
            .await
            .map_err(|e| MediaboxError::Archive(format!("archive task failed: {e}")))??;

        Ok((folder_path::name(&path).to_string(), bytes))
    }
}

/// Reduce a client-supplied filename to its final component.
fn display_name(raw: &str) -> Result<String> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    if name.is_empty() || name == "." || name == ".." {
        return Err(MediaboxError::Validation(
            "file name must not be empty".to_string(),
        ));
    }
    Ok(name)
}
