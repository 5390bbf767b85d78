//! Rename pipeline: rename containers in place after their title

use crate::container::{read_field, MetadataField};
use crate::normalize::{NameKind, Normalizer};
use crate::placement::{place_unique, RenameOutcome};
use crate::report::{RenameCounters, RunEvent, RunObserver};
use crate::scan::{scan_containers, CONTAINER_EXTENSION};
use std::io;
use std::path::Path;

/// File name a container with `title` should carry
pub fn title_file_name(normalizer: &Normalizer, title: &str) -> String {
    format!(
        "{}.{}",
        normalizer.normalize(Some(title), NameKind::Title),
        CONTAINER_EXTENSION
    )
}

/// Rename every container directly inside `dir` to its normalized title.
///
/// Containers without a readable title are left alone.
pub fn rename_directory(
    dir: &Path,
    normalizer: &Normalizer,
    observer: &mut dyn RunObserver,
) -> io::Result<RenameCounters> {
    let files = scan_containers(dir)?;
    let mut counters = RenameCounters {
        total: files.len(),
        ..RenameCounters::default()
    };
    observer.started(files.len());

    for file in &files {
        let Some(title) = read_field(file, MetadataField::Title) else {
            counters.skipped_no_title += 1;
            observer.event(&RunEvent::NoTitle { file });
            observer.advanced();
            continue;
        };

        let desired = title_file_name(normalizer, &title);
        match place_unique(file, &desired) {
            Ok(RenameOutcome::RenamedTo(new_name)) => {
                counters.renamed += 1;
                tracing::info!("Renamed {} -> {}", file.display(), new_name);
                observer.event(&RunEvent::Renamed {
                    file,
                    new_name: &new_name,
                });
            }
            Ok(RenameOutcome::Unchanged) => {
                counters.unchanged += 1;
                observer.event(&RunEvent::Unchanged { file });
            }
            Err(error) => {
                counters.failed += 1;
                tracing::error!("Failed to rename {}: {}", file.display(), error);
                observer.event(&RunEvent::Failed {
                    file,
                    error: &error,
                });
            }
        }

        observer.advanced();
    }

    Ok(counters)
}
