//! Rendering of binary fields as text.
//!
//! Payloads, passwords and authentication data are shown verbatim when every
//! decoded character is printable ASCII. Otherwise the whole original byte
//! sequence is shown as hex (plain text) or base64 (JSON).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Placeholder emitted instead of a password when redaction is on.
pub const REDACTED: &str = "<redacted>";

/// How a binary field ends up in a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryText {
    /// Every character printable; the decoded text.
    Printable(String),
    /// The original bytes, hex for plain text and base64 for JSON.
    Encoded(String),
}

/// Whether every character is in the printable ASCII range 0x20..=0x7E.
/// The empty string counts as printable.
pub fn is_printable(text: &str) -> bool {
    text.chars().all(|c| (' '..='~').contains(&c))
}

/// Lossy UTF-8 decode. Invalid sequences become U+FFFD, which is never
/// printable, so such fields always take the hex/base64 branch.
pub fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Encoding for the plain text formatter.
pub fn for_text(bytes: &[u8]) -> BinaryText {
    let decoded = decode(bytes);
    if is_printable(&decoded) {
        BinaryText::Printable(decoded)
    } else {
        BinaryText::Encoded(hex::encode(bytes))
    }
}

/// Encoding for the JSON formatter.
pub fn for_json(bytes: &[u8]) -> BinaryText {
    let decoded = decode(bytes);
    if is_printable(&decoded) {
        BinaryText::Printable(decoded)
    } else {
        BinaryText::Encoded(STANDARD.encode(bytes))
    }
}
