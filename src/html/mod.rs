//! Document inspection: DOCTYPE version detection and the single-pass
//! walker that extracts title, headings, links, and the login-form
//! flag from a parsed page.

mod doctype;
mod walker;

pub use doctype::detect_document_version;
pub use walker::{walk, WalkSummary};

use std::borrow::Cow;
use std::io::Read;

/// Decompresses a body that is still gzip-encoded (magic `1f 8b`).
///
/// Transports normally decompress for us; this covers origins that
/// mislabel the encoding. Anything that fails to inflate is passed
/// through untouched.
pub(crate) fn gunzip_if_needed(bytes: &[u8]) -> Cow<'_, [u8]> {
    if bytes.len() < 2 || bytes[0] != 0x1f || bytes[1] != 0x8b {
        return Cow::Borrowed(bytes);
    }

    let mut decoder = flate2::read::GzDecoder::new(bytes);
    let mut decompressed = Vec::new();
    match decoder.read_to_end(&mut decompressed) {
        Ok(_) => Cow::Owned(decompressed),
        Err(_) => Cow::Borrowed(bytes),
    }
}
