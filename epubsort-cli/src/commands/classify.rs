//! Publisher and language classification commands

use super::console::{announce, Console, ConsoleObserver, FileLog};
use anyhow::{Context, Result};
use epubsort_core::runlog::DEFAULT_LOG_FILE;
use epubsort_core::{
    classify_directory, FolderRule, LanguageRule, Normalizer, PublisherRule, RunCounters, RunLog,
};
use std::path::{Path, PathBuf};

/// Move ebooks into folders named after their publisher
pub fn publisher(
    dir: &Path,
    strip_suffix: &str,
    log_file: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let normalizer = Normalizer::with_corporate_suffix(strip_suffix)
        .with_context(|| format!("Invalid corporate suffix '{}'", strip_suffix))?;
    let rule = PublisherRule::new(normalizer);
    classify(dir, &rule, log_file, json, verbose)
}

/// Move ebooks into folders named after their language
pub fn language(dir: &Path, log_file: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
    let log_file = log_file.unwrap_or_else(|| dir.join(DEFAULT_LOG_FILE));
    classify(dir, &LanguageRule::default(), Some(log_file), json, verbose)
}

fn classify(
    dir: &Path,
    rule: &dyn FolderRule,
    log_file: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let mut log = match &log_file {
        Some(path) => Some(
            RunLog::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?,
        ),
        None => None,
    };

    let result = run(dir, rule, log.as_mut(), Console::new(json), verbose);

    if let (Err(e), Some(log)) = (&result, log.as_mut()) {
        log.line("Fatal error:");
        log.raw(&format!("{:?}", e));
    }
    if let (Ok(_), Some(path)) = (&result, &log_file) {
        announce(
            Console::new(json),
            log.as_mut(),
            &format!("Full run log: {}", path.display()),
        );
    }

    result.map(|_| ())
}

fn run(
    dir: &Path,
    rule: &dyn FolderRule,
    mut log: Option<&mut FileLog>,
    console: Console,
    verbose: bool,
) -> Result<RunCounters> {
    announce(
        console,
        log.as_deref_mut(),
        &format!("Scanning {} by {}", dir.display(), rule.name()),
    );

    let mut observer = ConsoleObserver::new(console, log.as_deref_mut(), verbose);
    let counters = classify_directory(dir, rule, &mut observer)
        .with_context(|| format!("Failed to scan directory {}", dir.display()))?;
    observer.finish();

    tracing::debug!("Classification by {} finished: {:?}", rule.name(), counters);

    if counters.total == 0 {
        announce(console, log.as_deref_mut(), "No EPUB files found");
    }

    announce(
        console,
        log.as_deref_mut(),
        &format!(
            "Done. Moved: {}, skipped (exists): {}, failed: {}",
            counters.moved, counters.skipped_exists, counters.skipped_error
        ),
    );

    if console.is_json() {
        println!("{}", serde_json::to_string_pretty(&counters)?);
    } else {
        console.line("");
        console.line(&counters.summary());
    }

    Ok(counters)
}
