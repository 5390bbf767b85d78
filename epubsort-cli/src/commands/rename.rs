//! Rename command implementation

use super::console::{Console, ConsoleObserver};
use anyhow::{Context, Result};
use epubsort_core::{rename_directory, Normalizer};
use std::path::Path;

/// Rename every ebook in `dir` after its title
pub fn rename(dir: &Path, json: bool) -> Result<()> {
    let console = Console::new(json);
    let normalizer = Normalizer::new();

    let mut observer = ConsoleObserver::new(console, None, true);
    let counters = rename_directory(dir, &normalizer, &mut observer)
        .with_context(|| format!("Failed to scan directory {}", dir.display()))?;
    observer.finish();

    if counters.total == 0 {
        console.line("No EPUB files found");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&counters)?);
    } else {
        console.line("");
        console.line(&counters.summary());
    }

    Ok(())
}
