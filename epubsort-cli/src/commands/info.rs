//! Info command implementation

use anyhow::{Context, Result};
use epubsort_core::rename::title_file_name;
use epubsort_core::{read_metadata, NameKind, Normalizer};
use serde::Serialize;
use std::path::Path;

/// Book info output
#[derive(Serialize)]
struct BookInfo {
    title: Option<String>,
    language: Option<String>,
    publisher: Option<String>,
    publisher_folder: String,
    language_folder: String,
    file_name: Option<String>,
}

/// Display the metadata of an ebook and the names the tools would derive from it
pub fn info(input: &Path, json: bool) -> Result<()> {
    let metadata = read_metadata(input)
        .with_context(|| format!("Failed to read metadata from {}", input.display()))?;

    let normalizer = Normalizer::new();
    let info = BookInfo {
        publisher_folder: normalizer.normalize(metadata.publisher.as_deref(), NameKind::Publisher),
        language_folder: normalizer.normalize(metadata.language.as_deref(), NameKind::Language),
        file_name: metadata
            .title
            .as_deref()
            .map(|title| title_file_name(&normalizer, title)),
        title: metadata.title,
        language: metadata.language,
        publisher: metadata.publisher,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        println!("Title:            {}", show(&info.title));
        println!("Language:         {}", show(&info.language));
        println!("Publisher:        {}", show(&info.publisher));
        println!("Publisher folder: {}", info.publisher_folder);
        println!("Language folder:  {}", info.language_folder);
        if let Some(name) = &info.file_name {
            println!("Renamed to:       {}", name);
        }
    }

    Ok(())
}
