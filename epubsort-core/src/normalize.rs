//! Name normalizer
//!
//! Turns raw metadata strings into names that are safe to use as a folder or
//! file name on Windows, macOS and Linux.

use crate::error::{EpubsortError, Result};
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

/// Characters illegal in file or folder names on common filesystems
pub const ILLEGAL_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Corporate suffix stripped from publisher names by default
pub const DEFAULT_CORPORATE_SUFFIX: &str = "株式会社";

pub const UNKNOWN_PUBLISHER: &str = "unknown publisher";
pub const UNKNOWN_LANGUAGE: &str = "unknown language";
pub const UNTITLED: &str = "untitled";

/// Maximum length of a title used as a file name, in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// ISO 639-1 and 639-2 (B and T) codes mapped to one label per language
const LANGUAGE_LABELS: &[(&str, &str)] = &[
    ("zh", "Chinese"),
    ("chi", "Chinese"),
    ("zho", "Chinese"),
    ("ja", "Japanese"),
    ("jpn", "Japanese"),
    ("en", "English"),
    ("eng", "English"),
    ("fr", "French"),
    ("fra", "French"),
    ("fre", "French"),
    ("de", "German"),
    ("deu", "German"),
    ("ger", "German"),
    ("ru", "Russian"),
    ("rus", "Russian"),
    ("ko", "Korean"),
    ("kor", "Korean"),
    ("es", "Spanish"),
    ("spa", "Spanish"),
    ("it", "Italian"),
    ("ita", "Italian"),
    ("pt", "Portuguese"),
    ("por", "Portuguese"),
    ("nl", "Dutch"),
    ("nld", "Dutch"),
    ("dut", "Dutch"),
];

/// What a normalized name is going to be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// Classification folder named after the publisher
    Publisher,
    /// Classification folder named after the language label
    Language,
    /// File name (without extension) derived from the title
    Title,
}

/// Look up the label for a primary language subtag
pub fn language_label(code: &str) -> Option<&'static str> {
    LANGUAGE_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

/// Normalizer configuration
#[derive(Debug, Clone)]
pub struct Normalizer {
    corporate_suffix: Option<Regex>,
    max_title_chars: usize,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::with_corporate_suffix(DEFAULT_CORPORATE_SUFFIX)
            .expect("escaped literal is always a valid pattern")
    }

    /// Use `token` as the corporate suffix. An empty token disables stripping.
    pub fn with_corporate_suffix(token: &str) -> Result<Self> {
        let token = token.trim();
        let corporate_suffix = if token.is_empty() {
            None
        } else {
            let pattern = format!(r"\s*{}\s*", regex::escape(token));
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| EpubsortError::InvalidOption(e.to_string()))?;
            Some(regex)
        };

        Ok(Self {
            corporate_suffix,
            max_title_chars: MAX_TITLE_CHARS,
        })
    }

    /// Set the title length limit (at least one character)
    pub fn with_max_title_chars(mut self, max: usize) -> Self {
        self.max_title_chars = max.max(1);
        self
    }

    /// Normalize `raw` for use as `kind`. The result is never empty.
    pub fn normalize(&self, raw: Option<&str>, kind: NameKind) -> String {
        let raw = raw.unwrap_or_default();
        match kind {
            NameKind::Publisher => self.publisher(raw),
            NameKind::Language => language(raw),
            NameKind::Title => self.title(raw),
        }
    }

    fn publisher(&self, raw: &str) -> String {
        let stripped = match &self.corporate_suffix {
            Some(re) => re.replace_all(raw, ""),
            None => raw.into(),
        };
        folder_name(&stripped).unwrap_or_else(|| UNKNOWN_PUBLISHER.to_string())
    }

    fn title(&self, raw: &str) -> String {
        let replaced: String = raw
            .chars()
            .map(|c| {
                if ILLEGAL_CHARS.contains(&c) {
                    '_'
                } else if c.is_control() {
                    ' '
                } else {
                    c
                }
            })
            .collect();

        let trimmed = trim_title(&replaced);
        let truncated: String = trimmed.chars().take(self.max_title_chars).collect();
        let title = trim_title(&truncated);

        if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title.to_string()
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with the default configuration
pub fn normalize(raw: Option<&str>, kind: NameKind) -> String {
    static DEFAULT: OnceLock<Normalizer> = OnceLock::new();
    DEFAULT.get_or_init(Normalizer::new).normalize(raw, kind)
}

fn language(raw: &str) -> String {
    let code = raw.trim().to_lowercase();
    let primary = code.split('-').next().unwrap_or_default();
    let label = language_label(primary).unwrap_or(primary);
    folder_name(label).unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string())
}

/// Delete illegal and control characters and trim. `None` if nothing usable remains.
fn folder_name(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !c.is_control())
        .collect();
    let cleaned = cleaned.trim();

    // "." and ".." would resolve to the scanned directory or its parent
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn trim_title(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_publisher_strips_corporate_suffix() {
        assert_eq!(
            normalize(Some("Example Inc. 株式会社"), NameKind::Publisher),
            "Example Inc."
        );
        assert_eq!(
            normalize(Some("株式会社 KADOKAWA"), NameKind::Publisher),
            "KADOKAWA"
        );
    }

    #[test]
    fn test_publisher_suffix_is_case_insensitive() {
        let normalizer = Normalizer::with_corporate_suffix("GmbH").unwrap();
        assert_eq!(
            normalizer.normalize(Some("Verlag gmbh"), NameKind::Publisher),
            "Verlag"
        );
    }

    #[test]
    fn test_publisher_removes_illegal_characters() {
        assert_eq!(
            normalize(Some(" AC/DC: \"Records\" "), NameKind::Publisher),
            "ACDC Records"
        );
    }

    #[test]
    fn test_publisher_placeholder() {
        assert_eq!(normalize(None, NameKind::Publisher), UNKNOWN_PUBLISHER);
        assert_eq!(normalize(Some(""), NameKind::Publisher), UNKNOWN_PUBLISHER);
        assert_eq!(
            normalize(Some("\\/*?:\"<>|"), NameKind::Publisher),
            UNKNOWN_PUBLISHER
        );
        assert_eq!(normalize(Some("株式会社"), NameKind::Publisher), UNKNOWN_PUBLISHER);
        assert_eq!(normalize(Some(".."), NameKind::Publisher), UNKNOWN_PUBLISHER);
    }

    #[test]
    fn test_empty_suffix_disables_stripping() {
        let normalizer = Normalizer::with_corporate_suffix("").unwrap();
        assert_eq!(
            normalizer.normalize(Some("Foo 株式会社"), NameKind::Publisher),
            "Foo 株式会社"
        );
    }

    #[test]
    fn test_language_labels() {
        let chinese = normalize(Some("zh-CN"), NameKind::Language);
        assert_eq!(chinese, "Chinese");
        assert_eq!(normalize(Some("chi"), NameKind::Language), chinese);
        assert_eq!(normalize(Some("ZHO"), NameKind::Language), chinese);
        assert_eq!(normalize(Some("jpn"), NameKind::Language), "Japanese");
        assert_eq!(normalize(Some("\n  en-US \n"), NameKind::Language), "English");
        assert_eq!(normalize(Some("fre"), NameKind::Language), "French");
    }

    #[test]
    fn test_language_unknown_code_passes_through() {
        assert_eq!(normalize(Some("xx"), NameKind::Language), "xx");
        assert_eq!(normalize(Some("Tlh-KLINGON"), NameKind::Language), "tlh");
    }

    #[test]
    fn test_language_placeholder() {
        assert_eq!(normalize(None, NameKind::Language), UNKNOWN_LANGUAGE);
        assert_eq!(normalize(Some("   "), NameKind::Language), UNKNOWN_LANGUAGE);
        assert_eq!(normalize(Some("-CN"), NameKind::Language), UNKNOWN_LANGUAGE);
        assert_eq!(normalize(Some("??"), NameKind::Language), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_title_replaces_illegal_characters() {
        assert_eq!(normalize(Some("A/B:C?"), NameKind::Title), "A_B_C_");
        assert_eq!(
            normalize(Some("Vol. 2: The <End>"), NameKind::Title),
            "Vol. 2_ The _End_"
        );
    }

    #[test]
    fn test_title_trims_whitespace_and_dots() {
        assert_eq!(normalize(Some("  ...Hello...  "), NameKind::Title), "Hello");
        assert_eq!(normalize(Some("Line\nBreak"), NameKind::Title), "Line Break");
    }

    #[test]
    fn test_title_truncates_by_characters() {
        let long = "字".repeat(250);
        let title = normalize(Some(&long), NameKind::Title);
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS);

        let exact = "a".repeat(MAX_TITLE_CHARS);
        assert_eq!(normalize(Some(&exact), NameKind::Title), exact);
    }

    #[test]
    fn test_title_placeholder() {
        assert_eq!(normalize(Some(" ... "), NameKind::Title), UNTITLED);
        assert_eq!(normalize(None, NameKind::Title), UNTITLED);
    }

    proptest! {
        #[test]
        fn prop_never_empty_or_illegal(raw in "\\PC{0,300}") {
            for kind in [NameKind::Publisher, NameKind::Language, NameKind::Title] {
                let name = normalize(Some(&raw), kind);
                prop_assert!(!name.is_empty());
                prop_assert!(!name.contains(ILLEGAL_CHARS));
                prop_assert_eq!(name.trim(), name.as_str());
            }
        }

        #[test]
        fn prop_title_keeps_length_unless_too_long(raw in "[a-zA-Z0-9/:?]{1,300}") {
            let name = normalize(Some(&raw), NameKind::Title);
            prop_assert_eq!(name.chars().count(), raw.chars().count().min(MAX_TITLE_CHARS));
        }
    }
}
