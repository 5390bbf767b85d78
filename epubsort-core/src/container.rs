//! Container metadata reader
//!
//! Opens an EPUB as a zip archive, follows `META-INF/container.xml` to the
//! package document and pulls single Dublin Core fields out of it. Every
//! failure along the way collapses to "absent" at the [`read_field`]
//! boundary; [`try_read_field`] keeps the reason for diagnostics.

use crate::error::MetadataError;
use crate::xml::{local_name, resolve_entity, strip_bom};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// Fixed location of the pointer record inside every EPUB
pub const POINTER_PATH: &str = "META-INF/container.xml";

/// Metadata fields the tools know how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataField {
    Title,
    Language,
    Publisher,
}

impl MetadataField {
    /// Local element name in the package document
    pub fn tag(self) -> &'static str {
        match self {
            MetadataField::Title => "title",
            MetadataField::Language => "language",
            MetadataField::Publisher => "publisher",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Raw (un-normalized) package metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    pub title: Option<String>,
    pub language: Option<String>,
    pub publisher: Option<String>,
}

/// An opened container with its package document located
pub struct Package<R> {
    archive: ZipArchive<R>,
    manifest_path: String,
}

impl Package<BufReader<File>> {
    /// Open a container file from disk
    pub fn open(path: &Path) -> Result<Self, MetadataError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> Package<R> {
    /// Read the archive directory and resolve the pointer record
    pub fn from_reader(reader: R) -> Result<Self, MetadataError> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| MetadataError::NotAnArchive(e.to_string()))?;
        let pointer = read_entry(&mut archive, POINTER_PATH)?;
        let manifest_path = parse_pointer(&pointer)?;

        Ok(Self {
            archive,
            manifest_path,
        })
    }

    /// Internal path of the package document (OPF)
    pub fn manifest_path(&self) -> &str {
        &self.manifest_path
    }

    /// Raw bytes of the package document
    pub fn manifest(&mut self) -> Result<Vec<u8>, MetadataError> {
        read_entry(&mut self.archive, &self.manifest_path)
    }

    /// Raw bytes of any archive entry
    pub fn entry(&mut self, name: &str) -> Result<Vec<u8>, MetadataError> {
        read_entry(&mut self.archive, name)
    }

    /// First non-empty value of `field`, trimmed
    pub fn field(&mut self, field: MetadataField) -> Result<String, MetadataError> {
        let manifest = self.manifest()?;
        find_field(&manifest, &self.manifest_path, field)
    }

    /// All known fields; a missing field is `None`, a broken document is an error
    pub fn metadata(&mut self) -> Result<PackageMetadata, MetadataError> {
        let manifest = self.manifest()?;
        let lookup = |field| match find_field(&manifest, &self.manifest_path, field) {
            Ok(value) => Ok(Some(value)),
            Err(MetadataError::MissingField(_)) => Ok(None),
            Err(e) => Err(e),
        };

        Ok(PackageMetadata {
            title: lookup(MetadataField::Title)?,
            language: lookup(MetadataField::Language)?,
            publisher: lookup(MetadataField::Publisher)?,
        })
    }
}

/// Read one metadata field, or `None` if anything along the way fails
pub fn read_field(path: &Path, field: MetadataField) -> Option<String> {
    match try_read_field(path, field) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("No {} in {}: {}", field, path.display(), e);
            None
        }
    }
}

/// Read one metadata field, keeping the reason it is absent
pub fn try_read_field(path: &Path, field: MetadataField) -> Result<String, MetadataError> {
    Package::open(path)?.field(field)
}

/// Read title, language and publisher with a single archive open
pub fn read_metadata(path: &Path) -> Result<PackageMetadata, MetadataError> {
    Package::open(path)?.metadata()
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, MetadataError> {
    let mut entry = archive.by_name(name).map_err(|e| match e {
        ZipError::FileNotFound => MetadataError::MissingEntry(name.to_string()),
        other => MetadataError::NotAnArchive(other.to_string()),
    })?;

    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(data)
}

/// Extract the `full-path` of the first `rootfile` in container.xml
fn parse_pointer(data: &[u8]) -> Result<String, MetadataError> {
    let mut reader = Reader::from_reader(strip_bom(data));
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if local_name(e.name().as_ref()) == "rootfile" =>
            {
                for attr in e.attributes().flatten() {
                    if local_name(attr.key.as_ref()) != "full-path" {
                        continue;
                    }
                    let value = attr.unescape_value().map_err(|e| MetadataError::MalformedXml {
                        entry: POINTER_PATH.to_string(),
                        reason: e.to_string(),
                    })?;
                    let value = value.trim();
                    if !value.is_empty() {
                        return Ok(value.to_string());
                    }
                }
            }
            Ok(Event::Eof) => return Err(MetadataError::MissingRootfile),
            Err(e) => {
                return Err(MetadataError::MalformedXml {
                    entry: POINTER_PATH.to_string(),
                    reason: e.to_string(),
                })
            }
            _ => {}
        }
        buf.clear();
    }
}

/// Find the first element with local name `field.tag()` that has non-empty text.
///
/// Text of nested children counts towards the element's text. Parsing stops at
/// the first match, so damage after it does not hide an earlier value.
fn find_field(data: &[u8], entry: &str, field: MetadataField) -> Result<String, MetadataError> {
    let wanted = field.tag();
    let mut reader = Reader::from_reader(strip_bom(data));
    let mut buf = Vec::new();

    // Depth of nested children inside the matched element, None when not capturing
    let mut capture: Option<usize> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match capture.as_mut() {
                Some(depth) => *depth += 1,
                None if local_name(e.name().as_ref()) == wanted => {
                    capture = Some(0);
                    text.clear();
                }
                None => {}
            },
            Ok(Event::Text(e)) if capture.is_some() => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(e)) if capture.is_some() => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) if capture.is_some() => {
                if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    text.push_str(&resolved);
                }
            }
            Ok(Event::End(_)) => match capture {
                Some(0) => {
                    capture = None;
                    let value = text.trim();
                    if !value.is_empty() {
                        return Ok(value.to_string());
                    }
                }
                Some(depth) => capture = Some(depth - 1),
                None => {}
            },
            Ok(Event::Eof) => return Err(MetadataError::MissingField(wanted.to_string())),
            Err(e) => {
                return Err(MetadataError::MalformedXml {
                    entry: entry.to_string(),
                    reason: e.to_string(),
                })
            }
            _ => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    pub(crate) const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    /// Build an in-memory zip from (name, content) pairs
    pub(crate) fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn opf(metadata: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">{}</metadata>
</package>"#,
            metadata
        )
    }

    fn package(opf_body: &str) -> Package<Cursor<Vec<u8>>> {
        let data = build_zip(&[
            (POINTER_PATH, CONTAINER_XML),
            ("OEBPS/content.opf", opf_body),
        ]);
        Package::from_reader(Cursor::new(data)).unwrap()
    }

    #[test]
    fn test_reads_trimmed_field() {
        let mut pkg = package(&opf("<dc:title>\n   The Title  \n</dc:title>"));
        assert_eq!(pkg.manifest_path(), "OEBPS/content.opf");
        assert_eq!(pkg.field(MetadataField::Title).unwrap(), "The Title");
    }

    #[test]
    fn test_first_non_empty_occurrence_wins() {
        let mut pkg = package(&opf(
            "<dc:language>  </dc:language><dc:language>ja</dc:language><dc:language>en</dc:language>",
        ));
        assert_eq!(pkg.field(MetadataField::Language).unwrap(), "ja");
    }

    #[test]
    fn test_matches_by_local_name_regardless_of_prefix() {
        let mut pkg = package(&opf(
            r#"<publisher xmlns="http://purl.org/dc/elements/1.1/">Plain</publisher>"#,
        ));
        assert_eq!(pkg.field(MetadataField::Publisher).unwrap(), "Plain");

        let mut pkg = package(&opf("<opf:publisher>Prefixed</opf:publisher>"));
        assert_eq!(pkg.field(MetadataField::Publisher).unwrap(), "Prefixed");
    }

    #[test]
    fn test_resolves_entities_and_cdata() {
        let mut pkg = package(&opf(
            "<dc:title>Tom &amp; Jerry &#x4E2D;<![CDATA[ <raw>]]></dc:title>",
        ));
        assert_eq!(pkg.field(MetadataField::Title).unwrap(), "Tom & Jerry 中 <raw>");
    }

    #[test]
    fn test_missing_field() {
        let mut pkg = package(&opf("<dc:title>Only a title</dc:title>"));
        assert!(matches!(
            pkg.field(MetadataField::Publisher),
            Err(MetadataError::MissingField(_))
        ));

        let meta = pkg.metadata().unwrap();
        assert_eq!(meta.title.as_deref(), Some("Only a title"));
        assert_eq!(meta.publisher, None);
        assert_eq!(meta.language, None);
    }

    #[test]
    fn test_not_an_archive() {
        let result = Package::from_reader(Cursor::new(b"definitely not a zip".to_vec()));
        assert!(matches!(result, Err(MetadataError::NotAnArchive(_))));
    }

    #[test]
    fn test_missing_pointer() {
        let data = build_zip(&[("OEBPS/content.opf", opf("<dc:title>x</dc:title>").as_str())]);
        let result = Package::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(MetadataError::MissingEntry(_))));
    }

    #[test]
    fn test_pointer_without_rootfile() {
        let data = build_zip(&[(POINTER_PATH, "<container><rootfiles/></container>")]);
        let result = Package::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(MetadataError::MissingRootfile)));
    }

    #[test]
    fn test_missing_manifest() {
        let data = build_zip(&[(POINTER_PATH, CONTAINER_XML)]);
        let mut pkg = Package::from_reader(Cursor::new(data)).unwrap();
        assert!(matches!(
            pkg.field(MetadataField::Title),
            Err(MetadataError::MissingEntry(_))
        ));
    }

    #[test]
    fn test_malformed_manifest() {
        let mut pkg = package("<package><metadata><dc:title>Broken</dc:creator></metadata>");
        assert!(matches!(
            pkg.field(MetadataField::Title),
            Err(MetadataError::MalformedXml { .. })
        ));
    }
}
