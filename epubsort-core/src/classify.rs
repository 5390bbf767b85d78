//! Classification pipeline: move containers into folders named after metadata

use crate::container::{read_field, MetadataField};
use crate::normalize::{normalize, NameKind, Normalizer};
use crate::placement::{place, PlaceOutcome};
use crate::report::{RunCounters, RunEvent, RunObserver};
use crate::scan::scan_containers;
use std::io;
use std::path::Path;

/// Decides which folder a container belongs in
pub trait FolderRule {
    /// Short name of the rule ("publisher", "language")
    fn name(&self) -> &'static str;

    /// Metadata field the folder is derived from
    fn field(&self) -> MetadataField;

    /// Folder name for a raw field value (`None` when absent)
    fn folder_name(&self, raw: Option<&str>) -> String;
}

/// Folders named after the publisher, corporate suffix removed
#[derive(Debug, Clone, Default)]
pub struct PublisherRule {
    normalizer: Normalizer,
}

impl PublisherRule {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }
}

impl FolderRule for PublisherRule {
    fn name(&self) -> &'static str {
        "publisher"
    }

    fn field(&self) -> MetadataField {
        MetadataField::Publisher
    }

    fn folder_name(&self, raw: Option<&str>) -> String {
        self.normalizer.normalize(raw, NameKind::Publisher)
    }
}

/// Folders named after the language label
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageRule;

impl FolderRule for LanguageRule {
    fn name(&self) -> &'static str {
        "language"
    }

    fn field(&self) -> MetadataField {
        MetadataField::Language
    }

    fn folder_name(&self, raw: Option<&str>) -> String {
        normalize(raw, NameKind::Language)
    }
}

/// Classify every container directly inside `dir`.
///
/// Only a failure to list `dir` is returned as an error. Per-file problems
/// are counted and reported to `observer`, and the run carries on.
pub fn classify_directory(
    dir: &Path,
    rule: &dyn FolderRule,
    observer: &mut dyn RunObserver,
) -> io::Result<RunCounters> {
    let files = scan_containers(dir)?;
    let mut counters = RunCounters {
        total: files.len(),
        ..RunCounters::default()
    };
    observer.started(files.len());

    for file in &files {
        let Some(file_name) = file.file_name() else {
            continue;
        };

        let raw = read_field(file, rule.field());
        let folder = rule.folder_name(raw.as_deref());
        let destination = dir.join(&folder);

        match place(file, &destination, file_name) {
            Ok(PlaceOutcome::Moved(target)) => {
                counters.moved += 1;
                tracing::info!("Moved {} -> {}", file.display(), target.display());
                observer.event(&RunEvent::Moved {
                    file,
                    target: &target,
                });
            }
            Ok(PlaceOutcome::SkippedExists(target)) => {
                counters.skipped_exists += 1;
                observer.event(&RunEvent::SkippedExists {
                    file,
                    target: &target,
                });
            }
            Err(error) => {
                counters.skipped_error += 1;
                tracing::error!("Failed to classify {}: {}", file.display(), error);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_fall_back_to_placeholders() {
        assert_eq!(PublisherRule::default().folder_name(None), "unknown publisher");
        assert_eq!(LanguageRule::default().folder_name(None), "unknown language");
        assert_eq!(LanguageRule.folder_name(Some("ja-JP")), "Japanese");
    }
}
