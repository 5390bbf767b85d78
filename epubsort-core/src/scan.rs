//! Directory scanning

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Conventional container extension
pub const CONTAINER_EXTENSION: &str = "epub";

/// Whether `path` has the container extension (case-insensitive)
pub fn is_container(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(CONTAINER_EXTENSION))
        .unwrap_or(false)
}

/// List container files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into, so files already moved into a
/// classification folder are not picked up again.
pub fn scan_containers(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_container(p))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
