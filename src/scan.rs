//! JPEG discovery under a root folder

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Whether a path looks like a JPEG by extension
///
/// Matches `jp*g` case-insensitively: `.jpg`, `.jpeg`, `.JPG`, ...
pub fn is_jpeg_path(path: &Path) -> bool {
    match path.extension() {
        Some(extension) => {
            let ext = extension.to_string_lossy().to_lowercase();
            ext.starts_with("jp") && ext.ends_with('g') && ext.len() >= 3
        }
        None => false,
    }
}

/// Every JPEG under `root`, recursively, sorted by path
///
/// Entries that can't be read are skipped.
pub fn find_jpegs(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_jpeg_path(path))
        .collect();

    files.sort();
    files
}
