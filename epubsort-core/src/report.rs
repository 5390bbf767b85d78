//! Run counters and per-file events

use crate::error::PlaceError;
use serde::Serialize;
use std::path::Path;

/// Tally of one classification run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub total: usize,
    pub moved: usize,
    pub skipped_exists: usize,
    pub skipped_error: usize,
}

impl RunCounters {
    /// Multi-line human readable summary
    pub fn summary(&self) -> String {
        format!(
            "Moved:                    {}\nSkipped (already exists): {}\nFailed:                   {}\nTotal:                    {}",
            self.moved, self.skipped_exists, self.skipped_error, self.total
        )
    }
}

/// Tally of one rename run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenameCounters {
    pub total: usize,
    pub renamed: usize,
    pub unchanged: usize,
    pub skipped_no_title: usize,
    pub failed: usize,
}

impl RenameCounters {
    /// Multi-line human readable summary
    pub fn summary(&self) -> String {
        format!(
            "Renamed:              {}\nUnchanged:            {}\nSkipped (no title):   {}\nFailed:               {}\nTotal:                {}",
            self.renamed, self.unchanged, self.skipped_no_title, self.failed, self.total
        )
    }
}

/// Something that happened to one file during a run
#[derive(Debug)]
pub enum RunEvent<'a> {
    Moved {
        file: &'a Path,
        target: &'a Path,
    },
    SkippedExists {
        file: &'a Path,
        target: &'a Path,
    },
    Renamed {
        file: &'a Path,
        new_name: &'a str,
    },
    Unchanged {
        file: &'a Path,
    },
    NoTitle {
        file: &'a Path,
    },
    Failed {
        file: &'a Path,
        error: &'a PlaceError,
    },
}

impl RunEvent<'_> {
    /// One-line description, keyed by the file name
    pub fn message(&self) -> String {
        match self {
            RunEvent::Moved { file, target } => {
                format!("[moved] {} -> {}", file_label(file), target.display())
            }
            RunEvent::SkippedExists { file, target } => format!(
                "[skipped] {} -> target already exists: {}",
                file_label(file),
                target.display()
            ),
            RunEvent::Renamed { file, new_name } => {
                format!("[renamed] {} -> {}", file_label(file), new_name)
            }
            RunEvent::Unchanged { file } => {
                format!("[unchanged] {} already has its title as name", file_label(file))
            }
            RunEvent::NoTitle { file } => {
                format!("[skipped] {} -> no title in metadata", file_label(file))
            }
            RunEvent::Failed { file, error } => {
                format!("[error] {} -> {}", file_label(file), error)
            }
        }
    }

    /// Whether the event is noteworthy enough to show during a run
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            RunEvent::SkippedExists { .. } | RunEvent::NoTitle { .. } | RunEvent::Failed { .. }
        )
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Receives progress and per-file events from a pipeline
pub trait RunObserver {
    /// Called once with the number of files found
    fn started(&mut self, _total: usize) {}

    /// Called for every per-file outcome
    fn event(&mut self, _event: &RunEvent<'_>) {}

    /// Called after each file, whatever its outcome
    fn advanced(&mut self) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct Silent;

impl RunObserver for Silent {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_run_summary() {
        let counters = RunCounters {
            total: 4,
            moved: 2,
            skipped_exists: 1,
            skipped_error: 1,
        };
        insta::assert_snapshot!(counters.summary(), @r"
        Moved:                    2
        Skipped (already exists): 1
        Failed:                   1
        Total:                    4
        ");
    }

    #[test]
    fn test_counters_json() {
        let counters = RenameCounters {
            total: 3,
            renamed: 1,
            unchanged: 1,
            skipped_no_title: 1,
            failed: 0,
        };
        insta::assert_json_snapshot!(counters, @r#"
        {
          "total": 3,
          "renamed": 1,
          "unchanged": 1,
          "skipped_no_title": 1,
          "failed": 0
        }
        "#);
    }

    #[test]
    fn test_event_messages_use_file_name() {
        let file = PathBuf::from("/library/some book.epub");
        let error = PlaceError::Move {
            from: file.clone(),
            to: PathBuf::from("/library/X/some book.epub"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        let failed = RunEvent::Failed {
            file: &file,
            error: &error,
        };
        assert!(failed.message().starts_with("[error] some book.epub -> "));
        assert!(failed.is_problem());

        let renamed = RunEvent::Renamed {
            file: &file,
            new_name: "Title.epub",
        };
        assert_eq!(renamed.message(), "[renamed] some book.epub -> Title.epub");
        assert!(!renamed.is_problem());
    }
}
