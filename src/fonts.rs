//! Installed-font discovery and fallback resolution.
//!
//! The stylesheet handed to the rendering surface names a concrete font
//! family. Which families exist is installation-dependent, so the catalog is
//! enumerated from the system font database at query time. Resolution is
//! all-or-nothing: a requested family either matches the catalog exactly
//! (case-insensitive) or the fixed fallback is used — there is no fuzzy
//! matching, because a surprising near-match is worse at 4 pt than the
//! predictable fallback.

use std::collections::BTreeSet;
use tracing::debug;

/// Family used when the requested one is unavailable or unspecified.
///
/// A generic CSS keyword rather than a concrete face: every rendering
/// surface can satisfy it, and monospace metrics keep the character-budget
/// measurer honest.
pub const FALLBACK_FAMILY: &str = "monospace";

/// Sorted, deduplicated list of installed font family names.
///
/// Loading the system database takes tens of milliseconds; callers that
/// query repeatedly (e.g. a capability endpoint) should cache the result.
pub fn font_catalog() -> Vec<String> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let families: BTreeSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
        .collect();

    debug!("Discovered {} installed font families", families.len());
    families.into_iter().collect()
}

/// Resolve a requested family against the catalog.
///
/// Returns the catalog's spelling on a case-insensitive match, otherwise
/// [`FALLBACK_FAMILY`].
pub fn resolve_family(requested: Option<&str>, catalog: &[String]) -> String {
    let Some(requested) = requested else {
        return FALLBACK_FAMILY.to_string();
    };
    let wanted = requested.trim();
    if wanted.is_empty() {
        return FALLBACK_FAMILY.to_string();
    }

    catalog
        .iter()
        .find(|family| family.eq_ignore_ascii_case(wanted))
        .cloned()
        .unwrap_or_else(|| {
            debug!("Font family '{}' not installed, using fallback", wanted);
            FALLBACK_FAMILY.to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<String> {
        vec!["DejaVu Sans".to_string(), "Liberation Mono".to_string()]
    }

    #[test]
    fn unspecified_family_falls_back() {
        assert_eq!(resolve_family(None, &catalog()), FALLBACK_FAMILY);
        assert_eq!(resolve_family(Some("  "), &catalog()), FALLBACK_FAMILY);
    }

    #[test]
    fn unknown_family_falls_back() {
        assert_eq!(resolve_family(Some("Comic Sans MS"), &catalog()), FALLBACK_FAMILY);
    }

    #[test]
    fn known_family_keeps_catalog_spelling() {
        assert_eq!(
            resolve_family(Some("liberation mono"), &catalog()),
            "Liberation Mono"
        );
    }
}
