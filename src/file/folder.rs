//! Folder tree derivation.
//!
//! Folders are never stored. The tree is rebuilt on every read from the
//! file index, a scan of the upload directory and the PIN vault, so it
//! always reflects what is actually there.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use super::path as folder_path;
use super::pin::PinVault;
use super::record::{sort_newest_first, FileIndex, FileRecord};
use super::storage::FileStorage;

/// A folder in the derived tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderInfo {
    /// Last path segment.
    pub name: String,
    /// Full path from the root.
    pub path: String,
    /// Parent path (None for top-level folders).
    pub parent_path: Option<String>,
    /// Number of files directly in this folder.
    pub file_count: usize,
    /// Number of direct subfolders.
    pub subfolder_count: usize,
    /// Files directly in this folder, newest first.
    pub files: Vec<FileRecord>,
    /// Direct subfolders, ordered by name.
    pub subfolders: Vec<FolderInfo>,
    /// Whether a PIN is set.
    pub has_pin: bool,
    /// Whether the folder is locked by a PIN.
    pub is_locked: bool,
}

impl FolderInfo {
    fn new(path: &str, files: Vec<FileRecord>, locked: bool) -> Self {
        Self {
            name: folder_path::name(path).to_string(),
            path: path.to_string(),
            parent_path: folder_path::parent(path).map(str::to_string),
            file_count: files.len(),
            subfolder_count: 0,
            files,
            subfolders: Vec::new(),
            has_pin: locked,
            is_locked: locked,
        }
    }
}

/// Order folders by name, case-insensitively first.
fn by_name(a: &FolderInfo, b: &FolderInfo) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Builds the folder tree from its three sources.
pub struct FolderTreeBuilder<'a> {
    index: &'a FileIndex,
    storage: &'a FileStorage,
    vault: &'a PinVault,
}

impl<'a> FolderTreeBuilder<'a> {
    /// Create a new FolderTreeBuilder.
    pub fn new(index: &'a FileIndex, storage: &'a FileStorage, vault: &'a PinVault) -> Self {
        Self {
            index,
            storage,
            vault,
        }
    }

    /// Every folder path, from file records (with ancestors) and from disk.
    pub fn folder_paths(&self) -> BTreeSet<String> {
        let mut paths = BTreeSet::new();

        for record in self.index.iter() {
            if let Some(folder) = &record.folder_path {
                paths.extend(folder_path::ancestors(folder));
            }
        }

        for scanned in self.storage.scan_folders() {
            paths.extend(folder_path::ancestors(&scanned));
        }

        paths
    }

    /// Build the tree and return its top-level folders, ordered by name.
    pub fn build(&self) -> Vec<FolderInfo> {
        let paths = self.folder_paths();

        let mut buckets: HashMap<&str, Vec<FileRecord>> = HashMap::new();
        for record in self.index.iter() {
            if let Some(folder) = record.folder_path.as_deref() {
                buckets.entry(folder).or_default().push(record.clone());
            }
        }

        let mut nodes: HashMap<String, FolderInfo> = paths
            .iter()
            .map(|path| {
                let files = sort_newest_first(buckets.remove(path.as_str()).unwrap_or_default());
                let node = FolderInfo::new(path, files, self.vault.is_locked(path));
                (path.clone(), node)
            })
            .collect();

        // Attach deepest folders first so each child is complete when moved.
        let mut ordered: Vec<&String> = paths.iter().collect();
        ordered.sort_by_key(|p| std::cmp::Reverse(folder_path::depth(p)));

        for path in ordered {
            let Some(parent) = folder_path::parent(path) else {
                continue;
            };
            if !nodes.contains_key(parent) {
                // Dangling parent: the node stays at the top level.
                continue;
            }
            if let Some(mut child) = nodes.remove(path.as_str()) {
                child.subfolders.sort_by(by_name);
                if let Some(parent_node) = nodes.get_mut(parent) {
                    parent_node.subfolders.push(child);
                    parent_node.subfolder_count += 1;
                }
            }
        }

        let mut roots: Vec<FolderInfo> = nodes
            .into_values()
            .map(|mut node| {
                node.subfolders.sort_by(by_name);
                node
            })
            .collect();
        roots.sort_by(by_name);
        roots
    }

    /// Find one folder, with its subtree, by path.
    pub fn find(&self, path: &str) -> Option<FolderInfo> {
        let chain = folder_path::ancestors(path);
        let last = chain.len().checked_sub(1)?;

        let mut level = self.build();
        for (i, prefix) in chain.iter().enumerate() {
            let idx = level.iter().position(|f| &f.path == prefix)?;
            let node = level.swap_remove(idx);
            if i == last {
                return Some(node);
            }
            level = node.subfolders;
        }
        None
    }
}
