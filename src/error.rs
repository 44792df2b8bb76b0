//! Error types for the microprint library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`MicroprintError`] — **Fatal**: generation cannot proceed at all
//!   (unknown format, unreadable bytes, measurement capability broke down).
//!   Returned as `Err(MicroprintError)` from the top-level `generate*`
//!   functions.
//!
//! * [`crate::measure::MeasureError`] — the error the measurement capability
//!   reports when it cannot decide whether a cell overflows. The pagination
//!   engine has no recovery path for it, so it is wrapped into
//!   [`MicroprintError::MeasurementFailed`] and aborts the run.
//!
//! Malformed *content* is deliberately absent from this taxonomy: importers
//! degrade to fewer or empty blocks instead of raising, because a slightly
//! thinner booklet is more useful than no booklet. Only a byte buffer that
//! is not text at all is rejected.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the microprint library.
#[derive(Debug, Error)]
pub enum MicroprintError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension (or declared name) is not a registered format.
    #[error(
        "Unsupported format: '{name}'\nAccepted extensions: {accepted}.\n\
         Rename the file or convert it to plain text or Markdown first."
    )]
    UnsupportedFormat { name: String, accepted: String },

    /// The document exceeds the maximum accepted upload size.
    #[error("Document is too large: {size} bytes (maximum {max} bytes)")]
    DocumentTooLarge { size: u64, max: u64 },

    /// The byte buffer is not decodable text in any tolerable way.
    #[error(
        "Input is not readable text ({replaced} of {total} characters undecodable)\n\
         Only UTF-8 (or near-UTF-8) text documents are accepted."
    )]
    UnreadableInput { replaced: usize, total: usize },

    // ── Pagination errors ─────────────────────────────────────────────────
    /// The measurement capability could not decide an overflow question.
    ///
    /// Fatal by design: overflow detection order is load-bearing, so a
    /// single undecidable placement invalidates everything after it.
    #[error("Measurement failed while packing cell {cell} of page {page}: {detail}")]
    MeasurementFailed {
        page: usize,
        cell: usize,
        detail: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let e = MicroprintError::UnsupportedFormat {
            name: "thesis.docx".into(),
            accepted: ".txt, .md, .markdown".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("thesis.docx"), "got: {msg}");
        assert!(msg.contains(".markdown"));
    }

    #[test]
    fn measurement_failed_display() {
        let e = MicroprintError::MeasurementFailed {
            page: 3,
            cell: 15,
            detail: "surface disconnected".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("cell 15"));
        assert!(msg.contains("page 3"));
        assert!(msg.contains("surface disconnected"));
    }

    #[test]
    fn too_large_display() {
        let e = MicroprintError::DocumentTooLarge {
            size: 9_000_000,
            max: 2_097_152,
        };
        assert!(e.to_string().contains("9000000"));
    }
}
