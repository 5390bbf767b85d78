//! Namespace-tolerant helpers over quick-xml events
//!
//! EPUB packages in the wild declare namespaces inconsistently (`dc:title`,
//! `title` under a default namespace, `opf:title`, ...). Everything here
//! matches on the local part of a qualified name and ignores the prefix.

/// Local part of a qualified XML name, lowercased
pub(crate) fn local_name(qname: &[u8]) -> String {
    let local = qname
        .iter()
        .rposition(|&b| b == b':')
        .map(|i| &qname[i + 1..])
        .unwrap_or(qname);
    String::from_utf8_lossy(local).to_lowercase()
}

/// Resolve a general entity reference (`amp`, `#233`, `#x4E2D`, ...)
pub(crate) fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };

    char::from_u32(code).map(|c| c.to_string())
}

/// Strip a UTF-8 byte order mark
pub(crate) fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}
