//! Name search over files and folders.
//!
//! Matching is a case-insensitive substring test and never recurses:
//! a search sees one folder level at a time.

use super::folder::{FolderInfo, FolderTreeBuilder};
use super::record::{FileIndex, FileRecord};

/// Files and folders matched by [`search_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// Matching root-level files, newest first.
    pub files: Vec<FileRecord>,
    /// Matching top-level folders, ordered by name.
    pub folders: Vec<FolderInfo>,
}

fn matches(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

/// Search the files directly in one folder (root for `None`).
///
/// A blank query returns the folder's files unfiltered.
pub fn search_files(index: &FileIndex, query: &str, folder: Option<&str>) -> Vec<FileRecord> {
    let needle = query.trim().to_lowercase();
    let mut files = index.in_folder(folder);
    if !needle.is_empty() {
        files.retain(|f| matches(&f.original_name, &needle));
    }
    files
}

/// Search root-level files and top-level folders together.
///
/// A blank query returns nothing.
pub fn search_all(index: &FileIndex, tree: &FolderTreeBuilder<'_>, query: &str) -> SearchResults {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchResults::default();
    }

    let files = search_files(index, &needle, None);
    let folders = tree
        .build()
        .into_iter()
        .filter(|f| matches(&f.name, &needle))
        .collect();

    SearchResults { files, folders }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::pin::PinVault;
    use crate::file::record::NewFile;
    use crate::file::storage::FileStorage;
    use tempfile::TempDir;

    fn add(index: &mut FileIndex, original: &str, folder: Option<&str>) -> FileRecord {
        let mut new_file = NewFile::new(original, original, original, 1, "text/plain");
        if let Some(folder) = folder {
            new_file = new_file.with_folder(folder);
        }
        index.create(new_file)
    }

    #[test]
    fn test_search_files_case_insensitive() {
        let mut index = FileIndex::new();
        add(&mut index, "Beach.JPG", None);
        add(&mut index, "mountain.jpg", None);

        let found = search_files(&index, "beach", None);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].original_name, "Beach.JPG");
        assert_eq!(search_files(&index, "  .JPG ", None).len(), 2);
    }

    #[test]
    fn test_search_files_scoped_to_one_level() {
        let mut index = FileIndex::new();
        add(&mut index, "a-root.txt", None);
        add(&mut index, "a-top.txt", Some("folderA"));
        add(&mut index, "a-nested.txt", Some("folderA/sub"));

        let found = search_files(&index, "a-", Some("folderA"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].original_name, "a-top.txt");

        let root = search_files(&index, "a-", None);
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].original_name, "a-root.txt");
    }

    #[test]
    fn test_search_files_empty_query_returns_scope() {
        let mut index = FileIndex::new();
        let first = add(&mut index, "one.txt", Some("folderA"));
        let second = add(&mut index, "two.txt", Some("folderA"));
        add(&mut index, "three.txt", None);

        let found = search_files(&index, "", Some("folderA"));

        let ids: Vec<_> = found.into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_search_all() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        storage.create_dir("Summer 2024").unwrap();
        storage.create_dir("winter/summer-camp").unwrap();
        let vault = PinVault::new();
        let mut index = FileIndex::new();
        add(&mut index, "summer.jpg", None);
        add(&mut index, "summer-nested.jpg", Some("winter"));

        let tree = FolderTreeBuilder::new(&index, &storage, &vault);
        let results = search_all(&index, &tree, "SUMMER");

        assert_eq!(results.files.len(), 1);
        assert_eq!(results.files[0].original_name, "summer.jpg");
        assert_eq!(results.folders.len(), 1);
        assert_eq!(results.folders[0].name, "Summer 2024");
    }

    #[test]
    fn test_search_all_blank_query() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        storage.create_dir("a").unwrap();
        let vault = PinVault::new();
        let mut index = FileIndex::new();
        add(&mut index, "a.txt", None);

        let tree = FolderTreeBuilder::new(&index, &storage, &vault);

        assert_eq!(search_all(&index, &tree, ""), SearchResults::default());
        assert_eq!(search_all(&index, &tree, "   "), SearchResults::default());
    }
}
