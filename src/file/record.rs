//! File records and the in-memory file index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{MediaboxError, Result};

/// Metadata for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Unique record ID.
    pub id: String,
    /// On-disk filename.
    pub name: String,
    /// User-facing filename. May repeat across records.
    pub original_name: String,
    /// Location of the stored object.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    pub mime_type: String,
    /// Preview image, set only when one was generated.
    pub thumbnail_path: Option<PathBuf>,
    /// Containing folder (None for root).
    pub folder_path: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Whether the record is an image.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with(super::IMAGE_MIME_PREFIX)
    }

    /// Whether the record lives directly in the given folder.
    pub fn is_in(&self, folder: Option<&str>) -> bool {
        self.folder_path.as_deref() == folder
    }
}

/// Data for creating a new record.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// On-disk filename.
    pub name: String,
    /// User-facing filename.
    pub original_name: String,
    /// Location of the stored object.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    pub mime_type: String,
    /// Preview image.
    pub thumbnail_path: Option<PathBuf>,
    /// Containing folder.
    pub folder_path: Option<String>,
}

impl NewFile {
    /// Create a new NewFile in the root folder.
    pub fn new(
        name: impl Into<String>,
        original_name: impl Into<String>,
        path: impl Into<PathBuf>,
        size: u64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            original_name: original_name.into(),
            path: path.into(),
            size,
            mime_type: mime_type.into(),
            thumbnail_path: None,
            folder_path: None,
        }
    }

    /// Set the containing folder.
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder_path = Some(folder.into());
        self
    }

    /// Set the preview image.
    pub fn with_thumbnail(mut self, thumbnail: impl Into<PathBuf>) -> Self {
        self.thumbnail_path = Some(thumbnail.into());
        self
    }
}

/// In-memory index of file records keyed by ID.
#[derive(Debug, Default)]
pub struct FileIndex {
    records: HashMap<String, FileRecord>,
    last_created: Option<DateTime<Utc>>,
}

impl FileIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new record with a fresh ID and creation time.
    ///
    /// Creation times are strictly increasing so newest-first ordering
    /// is stable even for records created in the same instant.
    pub fn create(&mut self, new_file: NewFile) -> FileRecord {
        let mut created_at = Utc::now();
        if let Some(last) = self.last_created {
            if created_at <= last {
                created_at = last + Duration::microseconds(1);
            }
        }
        self.last_created = Some(created_at);

        let record = FileRecord {
            id: Uuid::new_v4().to_string(),
            name: new_file.name,
            original_name: new_file.original_name,
            path: new_file.path,
            size: new_file.size,
            mime_type: new_file.mime_type,
            thumbnail_path: new_file.thumbnail_path,
            folder_path: new_file.folder_path.filter(|f| !f.is_empty()),
            created_at,
        };
        self.records.insert(record.id.clone(), record.clone());
        record
    }

    /// Get a record by ID.
    pub fn get(&self, id: &str) -> Option<&FileRecord> {
        self.records.get(id)
    }

    /// All records, newest first.
    pub fn list(&self) -> Vec<FileRecord> {
        sort_newest_first(self.records.values().cloned().collect())
    }

    /// Records directly in a folder (root for `None`), newest first.
    pub fn in_folder(&self, folder: Option<&str>) -> Vec<FileRecord> {
        sort_newest_first(
            self.records
                .values()
                .filter(|r| r.is_in(folder))
                .cloned()
                .collect(),
        )
    }

    /// Remove a record. Returns it so the caller can clean up its objects.
    pub fn remove(&mut self, id: &str) -> Option<FileRecord> {
        self.records.remove(id)
    }

    /// Replace a record's user-facing name, keeping its current extension.
    ///
    /// `holiday.jpg` renamed to `beach` becomes `beach.jpg`.
    pub fn rename(&mut self, id: &str, new_base_name: &str) -> Result<FileRecord> {
        let base = new_base_name.trim();
        if base.is_empty() {
            return Err(MediaboxError::Validation(
                "file name must not be empty".to_string(),
            ));
        }
        if base.contains(['/', '\\']) {
            return Err(MediaboxError::Validation(
                "file name must not contain path separators".to_string(),
            ));
        }

        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| MediaboxError::NotFound("File".to_string()))?;

        let ext = Path::new(&record.original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        record.original_name = format!("{base}{ext}");

        Ok(record.clone())
    }

    /// Mutable access to every record, for folder moves.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut FileRecord> {
        self.records.values_mut()
    }

    /// Iterate over every record in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sort records newest first.
pub fn sort_newest_first(mut records: Vec<FileRecord>) -> Vec<FileRecord> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}
