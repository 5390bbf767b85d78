//! Error types for epubsort core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using EpubsortError
pub type Result<T> = std::result::Result<T, EpubsortError>;

/// Errors from configuring the core
#[derive(Debug, Error)]
pub enum EpubsortError {
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Reasons a metadata field could not be read from a container.
///
/// Callers of [`crate::container::read_field`] never see these; they are kept
/// so the reason can be logged at debug level.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("not a zip archive: {0}")]
    NotAnArchive(String),

    #[error("missing archive entry: {0}")]
    MissingEntry(String),

    #[error("malformed XML in {entry}: {reason}")]
    MalformedXml { entry: String, reason: String },

    #[error("container.xml has no rootfile with a full-path")]
    MissingRootfile,

    #[error("no non-empty <{0}> element in the package document")]
    MissingField(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem failures while moving or renaming a container
#[derive(Debug, Error)]
pub enum PlaceError {
    #[error("cannot create folder {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot move {} to {}: {source}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),
}

/// Errors from plain-text extraction
#[derive(Debug, Error)]
pub enum TextError {
    #[error("cannot read package: {0}")]
    Package(#[from] MetadataError),

    #[error("package document lists no readable spine documents")]
    EmptySpine,

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
