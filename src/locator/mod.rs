//! Recursive discovery of vector files under a data directory

pub mod filter;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{GeoshrinkError, GeoshrinkResult};

/// Find every regular file under `root` whose name ends with `suffix`.
///
/// Traversal is depth-first and visits entries in the order the filesystem
/// lists them. Symbolic links are followed. Any directory that cannot be read
/// aborts the whole search; no partial result is returned.
pub fn find_files_by_suffix(root: &Path, suffix: &str) -> GeoshrinkResult<Vec<PathBuf>> {
    if !root.exists() {
        return Err(GeoshrinkError::NotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(GeoshrinkError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            GeoshrinkError::traversal(path, e)
        })?;

        if entry.file_type().is_file() && filter::has_suffix(entry.file_name(), suffix) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!(root = %root.display(), suffix, count = files.len(), "located files");
    Ok(files)
}
