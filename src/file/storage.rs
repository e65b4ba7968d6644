//! Physical file storage for mediabox.
//!
//! Folders are real directories under the upload root, so the on-disk
//! layout mirrors what the user sees:
//! ```text
//! {root}/
//! ├── thumbnails/
//! │   ├── incoming/
//! │   └── thumb_1754152117647-a1b2c3.jpg
//! ├── 1754152000000-9f8e7d.txt
//! └── trip/
//!     └── day1/
//!         └── 1754152117647-a1b2c3.mp4
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::path::{self as folder_path, THUMBNAILS_DIR};
use crate::{MediaboxError, Result};

/// Staging directory for uploads not yet placed in a folder.
const INCOMING_DIR: &str = "incoming";

/// A file written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// On-disk filename, unique within the upload tree.
    pub name: String,
    /// Full path to the stored object.
    pub path: PathBuf,
}

/// File storage service for the upload directory tree.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Root upload directory.
    root: PathBuf,
    /// Reserved directory for previews.
    thumbnails: PathBuf,
    /// Staging area inside the reserved directory.
    incoming: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage rooted at the given directory.
    ///
    /// The root, its thumbnails directory and the staging area are
    /// created if missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let thumbnails = root.join(THUMBNAILS_DIR);
        let incoming = thumbnails.join(INCOMING_DIR);
        fs::create_dir_all(&incoming)?;

        Ok(Self {
            root,
            thumbnails,
            incoming,
        })
    }

    /// Get the root upload directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the thumbnails directory.
    pub fn thumbnails_dir(&self) -> &Path {
        &self.thumbnails
    }

    /// Physical directory for a folder path, or the root for `None`.
    pub fn folder_dir(&self, folder: Option<&str>) -> PathBuf {
        let mut dir = self.root.clone();
        if let Some(folder) = folder {
            for segment in folder_path::segments(folder) {
                dir.push(segment);
            }
        }
        dir
    }

    /// Preview path for a stored file.
    pub fn thumbnail_path(&self, stored_name: &str) -> PathBuf {
        let stem = Path::new(stored_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(stored_name);
        self.thumbnails.join(format!("thumb_{stem}.jpg"))
    }

    /// Generate a unique on-disk name that keeps the original extension.
    ///
    /// Format: `{unix millis}-{6 random hex chars}{.ext}`.
    pub fn generate_stored_name(original_name: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let random = Uuid::new_v4().simple().to_string();
        let ext = Self::extension_with_dot(original_name);
        format!("{millis}-{}{ext}", &random[..6])
    }

    /// Extension of a filename including the leading dot, or empty.
    pub fn extension_with_dot(filename: &str) -> String {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }

    /// Write content to the staging area under a newly generated name.
    ///
    /// Folder renames and deletes never touch staged objects.
    pub fn stage(&self, content: &[u8], original_name: &str) -> Result<StoredFile> {
        let name = Self::generate_stored_name(original_name);
        fs::create_dir_all(&self.incoming)?;

        let path = self.incoming.join(&name);
        fs::write(&path, content)?;
        Ok(StoredFile { name, path })
    }

    /// Move a staged object into a folder, creating the folder if needed.
    pub fn commit(&self, staged: &StoredFile, folder: Option<&str>) -> Result<StoredFile> {
        let dir = self.folder_dir(folder);
        fs::create_dir_all(&dir)?;

        let path = dir.join(&staged.name);
        fs::rename(&staged.path, &path)?;
        Ok(StoredFile {
            name: staged.name.clone(),
            path,
        })
    }

    /// Save content straight into a folder under a newly generated name.
    pub fn save(
        &self,
        content: &[u8],
        original_name: &str,
        folder: Option<&str>,
    ) -> Result<StoredFile> {
        let staged = self.stage(content, original_name)?;
        self.commit(&staged, folder)
    }

    /// Read a stored object.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match fs::read(path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Stored object missing from disk");
                Err(MediaboxError::NotFound("File on disk".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored object.
    ///
    /// Returns `false` if it was already gone.
    pub fn remove_file(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Create a folder directory and any missing ancestors. Idempotent.
    pub fn create_dir(&self, folder: &str) -> Result<()> {
        fs::create_dir_all(self.folder_dir(Some(folder)))?;
        Ok(())
    }

    /// Recursively remove a folder directory.
    ///
    /// Returns `false` if it did not exist.
    pub fn remove_dir(&self, folder: &str) -> Result<bool> {
        match fs::remove_dir_all(self.folder_dir(Some(folder))) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Rename a folder directory in place.
    pub fn rename_dir(&self, from: &str, to: &str) -> Result<()> {
        let target = self.folder_dir(Some(to));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(self.folder_dir(Some(from)), target)?;
        Ok(())
    }

    /// Whether a folder exists as a directory.
    pub fn dir_exists(&self, folder: &str) -> bool {
        self.folder_dir(Some(folder)).is_dir()
    }

    /// Move a stored object's path from one folder to another.
    ///
    /// Matching is by path components, so only the folder prefix is
    /// replaced. Returns `None` if the object is not under `from`.
    pub fn rebase_file_path(&self, path: &Path, from: &str, to: &str) -> Option<PathBuf> {
        let rest = path.strip_prefix(self.folder_dir(Some(from))).ok()?;
        Some(self.folder_dir(Some(to)).join(rest))
    }

    /// Discover every folder directory under the root.
    ///
    /// The thumbnails directory is skipped. Unreadable directories are
    /// logged and skipped; their siblings are still scanned.
    pub fn scan_folders(&self) -> Vec<String> {
        let mut found = Vec::new();
        self.scan_dir(&self.root, None, &mut found);
        found
    }

    fn scan_dir(&self, dir: &Path, relative: Option<&str>, found: &mut Vec<String>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Failed to scan folder");
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Failed to read directory entry");
                    continue;
                }
            };

            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(entry = ?entry.file_name(), "Skipping folder with non UTF-8 name");
                continue;
            };

            if relative.is_none() && name == THUMBNAILS_DIR {
                continue;
            }

            let path = match relative {
                Some(parent) => format!("{parent}/{name}"),
                None => name,
            };
            self.scan_dir(&entry.path(), Some(&path), found);
            found.push(path);
        }
    }
}
