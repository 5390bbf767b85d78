//! epubsort Core Library
//!
//! Reads package metadata out of EPUB containers, turns it into filesystem-safe
//! names and moves or renames the containers without ever overwriting a file.
//! The classification and rename pipelines built on top run sequentially over
//! one directory and report through a [`RunObserver`].

pub mod classify;
pub mod container;
pub mod error;
pub mod normalize;
pub mod placement;
pub mod rename;
pub mod report;
pub mod runlog;
pub mod scan;
pub mod text;
mod xml;

pub use classify::{classify_directory, FolderRule, LanguageRule, PublisherRule};
pub use container::{read_field, read_metadata, try_read_field, MetadataField, PackageMetadata};
pub use error::{EpubsortError, MetadataError, PlaceError, Result, TextError};
pub use normalize::{normalize, NameKind, Normalizer};
pub use placement::{place, place_unique, PlaceOutcome, RenameOutcome};
pub use rename::rename_directory;
pub use report::{RenameCounters, RunCounters, RunEvent, RunObserver, Silent};
pub use runlog::RunLog;
pub use scan::scan_containers;
pub use text::{extract_text, write_text};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_reexport() {
        assert_eq!(normalize(Some("jpn"), NameKind::Language), "Japanese");
    }
}
