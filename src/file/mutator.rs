//! Folder and file mutations.
//!
//! Every operation here keeps three things in step: the physical upload
//! directory, the record paths in the file index, and the PIN vault.
//! Physical removal failures are logged rather than returned; the folder
//! tree is derived fresh on every read, so a leftover directory or object
//! reappears or disappears on its own at the next scan.

use super::path as folder_path;
use super::pin::PinVault;
use super::record::FileIndex;
use super::storage::FileStorage;
use crate::{MediaboxError, Result};

/// Applies structural changes to the library.
pub struct PathMutator<'a> {
    index: &'a mut FileIndex,
    vault: &'a mut PinVault,
    storage: &'a FileStorage,
}

impl<'a> PathMutator<'a> {
    /// Create a new PathMutator.
    pub fn new(index: &'a mut FileIndex, vault: &'a mut PinVault, storage: &'a FileStorage) -> Self {
        Self {
            index,
            vault,
            storage,
        }
    }

    /// Create a folder from a user-supplied path.
    ///
    /// Each segment is sanitized. Creating an existing folder succeeds.
    /// Returns the sanitized path.
    pub fn create_folder(&mut self, raw: &str) -> Result<String> {
        let path = folder_path::sanitize(raw)?;
        folder_path::ensure_not_reserved(&path)?;

        self.storage.create_dir(&path)?;
        tracing::info!(folder = %path, "Folder created");
        Ok(path)
    }

    /// Delete a file record and its stored objects.
    ///
    /// Returns `false` if the ID is unknown. Failing to remove the objects
    /// from disk does not undo the record removal.
    pub fn delete_file(&mut self, id: &str) -> bool {
        let Some(record) = self.index.remove(id) else {
            return false;
        };

        if let Err(e) = self.storage.remove_file(&record.path) {
            tracing::warn!(
                file_id = %record.id,
                path = %record.path.display(),
                error = %e,
                "Failed to remove stored file"
            );
        }

        if let Some(thumbnail) = &record.thumbnail_path {
            if let Err(e) = self.storage.remove_file(thumbnail) {
                tracing::warn!(
                    file_id = %record.id,
                    path = %thumbnail.display(),
                    error = %e,
                    "Failed to remove thumbnail"
                );
            }
        }

        true
    }

    /// Delete a folder, everything nested in it, and its PINs.
    ///
    /// Returns the number of file records removed.
    pub fn delete_folder(&mut self, path: &str) -> Result<usize> {
        let path = folder_path::normalize(path)?;
        let path = path.as_str();
        folder_path::ensure_not_reserved(path)?;

        let doomed: Vec<String> = self
            .index
            .iter()
            .filter(|r| {
                r.folder_path
                    .as_deref()
                    .is_some_and(|f| folder_path::is_within(f, path))
            })
            .map(|r| r.id.clone())
            .collect();

        let mut removed = 0;
        for id in &doomed {
            if self.delete_file(id) {
                removed += 1;
            }
        }

        if let Err(e) = self.storage.remove_dir(path) {
            tracing::error!(folder = %path, error = %e, "Failed to remove folder directory");
        }

        let pins = self.vault.remove_within(path);
        tracing::info!(folder = %path, files = removed, pins, "Folder deleted");
        Ok(removed)
    }

    /// Delete every image directly inside a folder.
    ///
    /// Files in nested folders and non-image files are kept.
    pub fn delete_all_images(&mut self, path: &str) -> usize {
        let doomed: Vec<String> = self
            .index
            .iter()
            .filter(|r| r.is_in(Some(path)) && r.is_image())
            .map(|r| r.id.clone())
            .collect();

        let removed = doomed.iter().filter(|id| self.delete_file(id)).count();
        tracing::info!(folder = %path, files = removed, "Images deleted");
        removed
    }

    /// Rename the last segment of a folder.
    ///
    /// The destination must not exist. Records in the folder and in every
    /// nested folder are moved, as are their PINs. Returns the new path.
    pub fn rename_folder(&mut self, old_path: &str, new_name: &str) -> Result<String> {
        let old_path = folder_path::normalize(old_path)?;
        let old_path = old_path.as_str();
        let name = folder_path::sanitize_segment(new_name);
        if name.is_empty() || name == "." || name == ".." {
            return Err(MediaboxError::Validation("Invalid folder name".to_string()));
        }

        let new_path = folder_path::with_name(old_path, &name);
        folder_path::ensure_not_reserved(old_path)?;
        folder_path::ensure_not_reserved(&new_path)?;

        if !self.storage.dir_exists(old_path) {
            return Err(MediaboxError::NotFound(format!("Folder '{old_path}'")));
        }
        if self.storage.folder_dir(Some(&new_path)).exists() {
            return Err(MediaboxError::Conflict(format!(
                "folder '{new_path}' already exists"
            )));
        }

        self.storage.rename_dir(old_path, &new_path)?;

        let mut moved = 0;
        for record in self.index.values_mut() {
            let Some(folder) = record.folder_path.as_deref() else {
                continue;
            };
            let Some(rebased) = folder_path::rebase(folder, old_path, &new_path) else {
                continue;
            };

            record.path = match self
                .storage
                .rebase_file_path(&record.path, old_path, &new_path)
            {
                Some(path) => path,
                None => {
                    let path = self
                        .storage
                        .folder_dir(Some(&rebased))
                        .join(&record.name);
                    tracing::warn!(
                        file_id = %record.id,
                        old = %record.path.display(),
                        new = %path.display(),
                        "Stored path was outside its folder; recomputed"
                    );
                    path
                }
            };
            record.folder_path = Some(rebased);
            moved += 1;
        }

        self.vault.rebase(old_path, &new_path);

        tracing::info!(old = %old_path, new = %new_path, files = moved, "Folder renamed");
        Ok(new_path)
    }
}
