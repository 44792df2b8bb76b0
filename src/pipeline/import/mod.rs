//! Format importers: raw bytes → semantic [`Block`]s.
//!
//! Dispatch is by file extension, checked *before* any byte is inspected,
//! so an unsupported upload is rejected without running the pipeline.
//! Inside a registered format the importers never fail on malformed
//! content: a broken document degrades to fewer (or zero) blocks. The one
//! exception is a byte buffer that is not text at all — there is nothing
//! printable to degrade to.

pub mod markdown;
pub mod plain;

use crate::capabilities;
use crate::document::{Block, DocumentFormat, ParsedDocument};
use crate::error::MicroprintError;
use tracing::{debug, warn};

/// Parse raw bytes into a document, dispatching on the file extension.
///
/// `name` is the uploaded file name (only its extension matters). The input
/// is never mutated; the returned blocks are in document order.
///
/// # Errors
/// - [`MicroprintError::UnsupportedFormat`] for an unregistered extension
/// - [`MicroprintError::UnreadableInput`] when the bytes are not text
pub fn import(bytes: &[u8], name: &str) -> Result<ParsedDocument, MicroprintError> {
    let format = detect_format(name)?;
    let text = decode_text(bytes)?;

    let blocks: Vec<Block> = match format {
        DocumentFormat::PlainText => plain::parse(&text),
        DocumentFormat::Markdown => markdown::parse(&text),
    };

    debug!(
        "Imported '{}' as {}: {} blocks",
        name,
        format,
        blocks.len()
    );

    Ok(ParsedDocument { format, blocks })
}

/// Map a file name to its registered format.
pub fn detect_format(name: &str) -> Result<DocumentFormat, MicroprintError> {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => Ok(DocumentFormat::PlainText),
        "md" | "markdown" => Ok(DocumentFormat::Markdown),
        _ => Err(MicroprintError::UnsupportedFormat {
            name: name.to_string(),
            accepted: capabilities::accepted_extensions_display(),
        }),
    }
}

/// Decode bytes to text, tolerating scattered invalid sequences.
///
/// Strict UTF-8 is accepted as-is. Otherwise the lossy decoding is used,
/// but only while undecodable characters stay below one in five — past
/// that the buffer is binary, not a text document with a bad byte.
fn decode_text(bytes: &[u8]) -> Result<String, MicroprintError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(_) => {
            let lossy = String::from_utf8_lossy(bytes);
            let total = lossy.chars().count();
            let replaced = lossy.chars().filter(|&c| c == '\u{FFFD}').count();
            if replaced * 5 > total {
                return Err(MicroprintError::UnreadableInput { replaced, total });
            }
            warn!(
                "Input is not valid UTF-8; replaced {} of {} characters",
                replaced, total
            );
            Ok(lossy.into_owned())
        }
    }
}
