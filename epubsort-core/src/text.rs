//! Plain-text extraction
//!
//! Walks the spine of the package document in reading order and flattens
//! each XHTML document to text. Block elements become line breaks; styling,
//! images and scripts are dropped.

use crate::container::Package;
use crate::error::{MetadataError, TextError};
use crate::xml::{local_name, strip_bom};
use ego_tree::iter::Edge;
use percent_encoding::percent_decode_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{Html, Node, Selector};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Elements that end a line of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "nav", "ol",
    "p", "pre", "section", "table", "tr", "ul",
];

/// Elements whose content is never text
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "svg", "math"];

/// Extract the text of a container, spine documents separated by a blank line
pub fn extract_text(path: &Path) -> Result<String, TextError> {
    let mut package = Package::open(path)?;
    let opf = package.manifest()?;
    let documents = spine_documents(&opf, package.manifest_path())?;

    let mut parts = Vec::new();
    let mut readable = 0;
    for href in &documents {
        match package.entry(href) {
            Ok(bytes) => {
                readable += 1;
                let text = html_to_text(&String::from_utf8_lossy(strip_bom(&bytes)));
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            Err(e) => tracing::warn!("Skipping spine document {}: {}", href, e),
        }
    }

    if readable == 0 {
        return Err(TextError::EmptySpine);
    }
    Ok(parts.join("\n\n"))
}

/// Output path for the text of `container` inside `output_dir`
pub fn text_output_path(container: &Path, output_dir: &Path) -> PathBuf {
    let stem = container
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "book".into());
    let mut name = stem;
    name.push(".txt");
    output_dir.join(name)
}

/// Extract the text of `container` and write it to `output_dir/<stem>.txt`
pub fn write_text(container: &Path, output_dir: &Path) -> Result<PathBuf, TextError> {
    let text = extract_text(container)?;
    let output = text_output_path(container, output_dir);
    fs::write(&output, text).map_err(|source| TextError::Write {
        path: output.clone(),
        source,
    })?;
    Ok(output)
}

/// Archive paths of the HTML documents in the spine, in reading order
pub fn spine_documents(opf: &[u8], opf_path: &str) -> Result<Vec<String>, MetadataError> {
    let base_dir = match opf_path.rfind('/') {
        Some(i) => &opf_path[..i],
        None => "",
    };

    let mut reader = Reader::from_reader(strip_bom(opf));
    let mut buf = Vec::new();
    let mut items: HashMap<String, (String, String)> = HashMap::new();
    let mut spine: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let local = local_name(e.name().as_ref());
                if local == "item" || local == "itemref" {
                    let mut attrs: HashMap<String, String> = HashMap::new();
                    for attr in e.attributes().flatten() {
                        if let Ok(value) = attr.unescape_value() {
                            attrs.insert(local_name(attr.key.as_ref()), value.into_owned());
                        }
                    }

                    if local == "item" {
                        if let (Some(id), Some(href)) = (attrs.get("id"), attrs.get("href")) {
                            let media_type = attrs.get("media-type").cloned().unwrap_or_default();
                            items.insert(id.clone(), (href.clone(), media_type));
                        }
                    } else if let Some(idref) = attrs.remove("idref") {
                        spine.push(idref);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(MetadataError::MalformedXml {
                    entry: opf_path.to_string(),
                    reason: e.to_string(),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(spine
        .iter()
        .filter_map(|idref| items.get(idref))
        .filter(|(href, media_type)| is_html(href, media_type))
        .map(|(href, _)| resolve_href(base_dir, href))
        .collect())
}

fn is_html(href: &str, media_type: &str) -> bool {
    if !media_type.is_empty() {
        return media_type.contains("html");
    }
    let lower = href.to_lowercase();
    lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
}

/// Resolve a manifest href against the package document's directory
fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let decoded = percent_decode_str(href).decode_utf8_lossy();

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Flatten an (X)HTML document to plain text
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").expect("static selector");
    let root = document
        .select(&body_selector)
        .next()
        .map(|body| *body)
        .unwrap_or_else(|| document.tree.root());

    let mut out = String::new();
    let mut skip_depth = 0usize;

    for edge in root.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(el) if SKIPPED_ELEMENTS.contains(&el.name()) => skip_depth += 1,
                Node::Element(el) if el.name() == "br" && skip_depth == 0 => out.push('\n'),
                Node::Text(text) if skip_depth == 0 => push_collapsed(&mut out, text),
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(el) = node.value() {
                    if SKIPPED_ELEMENTS.contains(&el.name()) {
                        skip_depth = skip_depth.saturating_sub(1);
                    } else if skip_depth == 0 && BLOCK_ELEMENTS.contains(&el.name()) {
                        out.push('\n');
                    }
                }
            }
        }
    }

    tidy_lines(&out)
}

/// Append text with whitespace runs collapsed to one space
fn push_collapsed(out: &mut String, text: &str) {
    let mut last_space = out.ends_with(' ') || out.ends_with('\n') || out.is_empty();
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(c);
            last_space = false;
        }
    }
}

/// Trim every line and keep at most one blank line between paragraphs
fn tidy_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_blocks_and_inline() {
        let html = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Ignored</title><style>p { color: red }</style></head>
<body>
  <h1>Chapter   One</h1>
  <p>This is <strong>bold</strong> and
     <em>italic</em>.</p>
  <p>Line<br/>break</p>
  <script>var x = 1;</script>
</body>
</html>"#;

        assert_eq!(
            html_to_text(html),
            "Chapter One\nThis is bold and italic.\nLine\nbreak"
        );
    }

    #[test]
    fn test_spine_documents_in_reading_order() {
        let opf = br#"<package xmlns="http://www.idpf.org/2007/opf">
  <manifest>
    <item id="c2" href="text/ch%202.xhtml" media-type="application/xhtml+xml"/>
    <item id="c1" href="text/ch1.xhtml#start" media-type="application/xhtml+xml"/>
    <item id="css" href="style.css" media-type="text/css"/>
    <item id="img" href="../images/cover.jpg" media-type="image/jpeg"/>
  </manifest>
  <spine>
    <itemref idref="c1"/>
    <itemref idref="css"/>
    <itemref idref="missing"/>
    <itemref idref="c2"/>
  </spine>
</package>"#;

        let docs = spine_documents(opf, "OEBPS/content.opf").unwrap();
        assert_eq!(docs, vec!["OEBPS/text/ch1.xhtml", "OEBPS/text/ch 2.xhtml"]);
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(resolve_href("", "ch1.xhtml"), "ch1.xhtml");
        assert_eq!(resolve_href("OPS/pkg", "../text/./a.html"), "OPS/text/a.html");
    }

    #[test]
    fn test_text_output_path() {
        assert_eq!(
            text_output_path(Path::new("/books/My Book.epub"), Path::new("out")),
            PathBuf::from("out/My Book.txt")
        );
    }
}
