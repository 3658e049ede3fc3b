//! Document version detection from the DOCTYPE declaration
//!
//! Only the leading bytes matter: after BOM strip and decompression,
//! the first KiB is scanned case-insensitively for a `<!DOCTYPE ...>`
//! declaration and mapped to a version label.

use crate::html::gunzip_if_needed;

/// How far into the document a DOCTYPE is looked for
const SCAN_WINDOW: usize = 1024;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Detects the declared document version from raw body bytes.
///
/// Always yields a label; an unrecognized declaration maps to
/// `Unknown DOCTYPE` and a missing one to `Unknown/No DOCTYPE`.
pub fn detect_document_version(bytes: &[u8]) -> String {
    let bytes = gunzip_if_needed(bytes);
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    let head = &bytes[..bytes.len().min(SCAN_WINDOW)];
    let head = String::from_utf8_lossy(head).to_lowercase();

    let Some(start) = head.find("<!doctype") else {
        return "Unknown/No DOCTYPE".to_string();
    };

    // The declaration runs to the closing '>'; a truncated one is
    // classified from what is visible.
    let declaration = match head[start..].find('>') {
        Some(end) => &head[start..start + end + 1],
        None => &head[start..],
    };

    classify(declaration).to_string()
}

fn classify(declaration: &str) -> &'static str {
    let guts = declaration
        .trim_start_matches("<!doctype")
        .trim_end_matches('>')
        .trim();

    if guts == "html" {
        return "HTML5";
    }

    if guts.contains("xhtml 1.1") {
        return "XHTML 1.1";
    }

    if guts.contains("xhtml 1.0") {
        return match variant(guts) {
            Some("strict") => "XHTML 1.0 Strict",
            Some("transitional") => "XHTML 1.0 Transitional",
            Some("frameset") => "XHTML 1.0 Frameset",
            _ => "XHTML 1.0",
        };
    }

    if guts.contains("html 4.01") {
        return match variant(guts) {
            Some("strict") => "HTML 4.01 Strict",
            Some("transitional") => "HTML 4.01 Transitional",
            Some("frameset") => "HTML 4.01 Frameset",
            _ => "HTML 4.01",
        };
    }

    if guts.contains("html 3.2") {
        return "HTML 3.2";
    }

    if guts.contains("html 2.0") {
        return "HTML 2.0";
    }

    "Unknown DOCTYPE"
}

fn variant(guts: &str) -> Option<&'static str> {
    for candidate in ["strict", "transitional", "frameset"] {
        if guts.contains(candidate) {
            return Some(candidate);
        }
    }
    None
}
