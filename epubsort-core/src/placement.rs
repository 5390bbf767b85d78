//! Collision-safe placement of containers
//!
//! Two policies: [`place`] moves a file into a folder and never overwrites,
//! [`place_unique`] renames a file in place and picks a numbered name when the
//! desired one is taken.

use crate::error::PlaceError;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result of moving a container into a classification folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// Moved to the contained path
    Moved(PathBuf),
    /// A file already exists at the contained path; nothing was touched
    SkippedExists(PathBuf),
}

/// Result of renaming a container in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Renamed; holds the new file name
    RenamedTo(String),
    /// The file already carries the chosen name
    Unchanged,
}

/// Move `container` into `destination` under `file_name`.
///
/// The destination folder is created if needed. An existing file at the
/// target is never overwritten.
pub fn place(
    container: &Path,
    destination: &Path,
    file_name: &OsStr,
) -> Result<PlaceOutcome, PlaceError> {
    fs::create_dir_all(destination).map_err(|source| PlaceError::CreateDir {
        path: destination.to_path_buf(),
        source,
    })?;

    let target = destination.join(file_name);
    if is_taken(&target) {
        return Ok(PlaceOutcome::SkippedExists(target));
    }

    move_file(container, &target).map_err(|source| PlaceError::Move {
        from: container.to_path_buf(),
        to: target.clone(),
        source,
    })?;

    Ok(PlaceOutcome::Moved(target))
}

/// Rename `original` to `desired_name` in its own directory.
///
/// If the name is taken, `stem_1.ext`, `stem_2.ext`, ... are tried in order.
/// Existence is checked right before the rename, so another process could
/// claim the name in between; that window is accepted for a single-operator
/// batch tool.
pub fn place_unique(original: &Path, desired_name: &str) -> Result<RenameOutcome, PlaceError> {
    let current_name = original
        .file_name()
        .ok_or_else(|| PlaceError::NoFileName(original.to_path_buf()))?;
    let dir = original.parent().unwrap_or_else(|| Path::new(""));

    let desired = Path::new(desired_name);
    let stem = desired
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = desired
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut candidate = desired_name.to_string();
    let mut counter = 1;
    loop {
        if OsStr::new(&candidate) == current_name {
            return Ok(RenameOutcome::Unchanged);
        }
        if !is_taken(&dir.join(&candidate)) {
            break;
        }
        candidate = format!("{}_{}{}", stem, counter, extension);
        counter += 1;
    }

    let target = dir.join(&candidate);
    fs::rename(original, &target).map_err(|source| PlaceError::Rename {
        from: original.to_path_buf(),
        to: target,
        source,
    })?;

    Ok(RenameOutcome::RenamedTo(candidate))
}

/// Whether a directory entry exists at `path`. Symlinks count as entries
/// even when they dangle.
fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Rename, falling back to copy + delete only when the destination is on
/// another filesystem.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!("rename {} crosses devices, copying instead", from.display());
            copy_then_remove(from, to)
        }
        Err(e) => Err(e),
    }
}

/// Copy `from` to `to`, then delete `from`. On any failure the copy is
/// removed again so only the original is left.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    if is_taken(to) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }

    if let Err(e) = fs::copy(from, to) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}
