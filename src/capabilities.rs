//! Capability discovery: what this installation accepts, queryable without
//! starting a generation.
//!
//! Upload surfaces and UIs need to know the accepted file extensions, the
//! size ceiling, and the installed font catalog before a document is ever
//! submitted. Everything here is cheap and side-effect free apart from the
//! system font scan.

use crate::fonts;
use serde::{Deserialize, Serialize};

/// File extensions accepted by the importer registry, without dots.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// Default maximum accepted document size in bytes (2 MiB).
///
/// A 2 MiB plain-text novel is ~350k words — already north of 100 sheets.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 2 * 1024 * 1024;

/// The discoverable capabilities of this installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Accepted file extensions, without dots.
    pub extensions: Vec<String>,
    /// Maximum accepted document size in bytes.
    pub max_document_bytes: u64,
    /// Installed font families available to the stylesheet.
    pub fonts: Vec<String>,
    /// Family used when a requested font is unavailable.
    pub fallback_font: String,
}

/// Query the current installation's capabilities.
pub fn capabilities() -> Capabilities {
    Capabilities {
        extensions: ACCEPTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        fonts: fonts::font_catalog(),
        fallback_font: fonts::FALLBACK_FAMILY.to_string(),
    }
}

/// Human-readable accepted-extension list for error messages.
pub fn accepted_extensions_display() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(", ")
}
