//! Text extraction command implementation

use anyhow::{Context, Result};
use epubsort_core::scan::is_container;
use epubsort_core::{scan_containers, write_text};
use std::fs;
use std::path::{Path, PathBuf};

/// Strip the quoting some shells add to drag-and-dropped paths
fn clean_argument(arg: &str) -> &str {
    arg.trim()
        .trim_matches('"')
        .trim_matches(|c: char| c == '{' || c == '}')
}

/// Extract plain text from the given ebooks, or every ebook in the current directory
pub fn to_text(files: &[String], output_dir: &Path) -> Result<()> {
    let inputs: Vec<PathBuf> = if files.is_empty() {
        let found = scan_containers(Path::new("."))
            .context("Failed to scan the current directory")?;
        if found.is_empty() {
            println!("No EPUB files found in the current directory");
            return Ok(());
        }
        found
    } else {
        files
            .iter()
            .filter_map(|arg| {
                let path = PathBuf::from(clean_argument(arg));
                if is_container(&path) && path.is_file() {
                    Some(path)
                } else {
                    println!("Invalid file: {} (expected an existing .epub file)", arg);
                    None
                }
            })
            .collect()
    };

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let mut extracted = 0;
    let mut failed = 0;
    for input in &inputs {
        match write_text(input, output_dir) {
            Ok(output) => {
                extracted += 1;
                println!("Extracted text to {}", output.display());
            }
            Err(e) => {
                failed += 1;
                tracing::debug!("Extraction error for {}: {:?}", input.display(), e);
                eprintln!("Failed to extract {}: {}", input.display(), e);
            }
        }
    }

    if inputs.len() > 1 || failed > 0 {
        println!("\nExtracted: {}, failed: {}", extracted, failed);
    }

    Ok(())
}
