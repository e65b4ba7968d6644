//! Zip archives of folder contents.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::record::FileRecord;
use crate::Result;

/// Build an in-memory zip of the given files.
///
/// Entries are named by each file's original name; repeated names get a
/// ` (n)` suffix. Files missing from disk are skipped.
pub fn build_zip(files: &[FileRecord]) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used = HashSet::new();

    for file in files {
        let content = match std::fs::read(&file.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    file_id = %file.id,
                    path = %file.path.display(),
                    error = %e,
                    "Skipping file missing from archive"
                );
                continue;
            }
        };

        let entry = unique_entry_name(&file.original_name, &mut used);
        writer.start_file(entry, options)?;
        writer.write_all(&content)?;
    }

    Ok(writer.finish()?.into_inner())
}

fn unique_entry_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = format!("{stem} ({n}){ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
