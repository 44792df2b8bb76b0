//! Configuration types for booklet generation.
//!
//! All generation behaviour is controlled through [`BookletConfig`], built
//! via its [`BookletConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads, log them, and diff two runs
//! to understand why their layouts differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest.

use crate::error::MicroprintError;
use crate::measure::Measure;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default reading speed used for the remaining-time estimate.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 215;

/// Configuration for one booklet generation.
///
/// Built via [`BookletConfig::builder()`] or [`BookletConfig::default()`].
///
/// # Example
/// ```rust
/// use microprint::{BookletConfig, GridLineStyle};
///
/// let config = BookletConfig::builder()
///     .title("Moby-Dick")
///     .font_size_pt(4.0)
///     .grid_line(GridLineStyle::Dotted)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BookletConfig {
    /// Requested font family. Resolved against the installed catalog at
    /// generation time; unknown or unset families fall back to
    /// [`crate::fonts::FALLBACK_FAMILY`].
    pub font_family: Option<String>,

    /// Body font size in points. Range: 2.0–12.0. Default: 4.5.
    ///
    /// Micro-print lives at the small end: 4–5 pt keeps a full novel within
    /// a handful of sheets while staying legible under a loupe. Sizes above
    /// ~8 pt defeat the purpose but are allowed for proofreading runs.
    pub font_size_pt: f32,

    /// Grid-line style drawn between cells. Default: dashed.
    pub grid_line: GridLineStyle,

    /// Reading speed for the running header's remaining-time estimate.
    /// Default: 215 words/minute.
    pub words_per_minute: u32,

    /// Visible-character budget per cell used by the built-in measurer when
    /// no external capability is injected. Default: 850.
    ///
    /// Roughly a 34×25 monospace grid at the default font size. An injected
    /// [`Measure`] supersedes this entirely.
    pub chars_per_cell: usize,

    /// Maximum accepted document size in bytes. Default: 2 MiB.
    pub max_document_bytes: u64,

    /// Book metadata shown in the first page's main header.
    pub meta: BookletMeta,

    /// External measurement capability. When `None`, a
    /// [`crate::measure::CharBudgetMeasure`] built from `chars_per_cell`
    /// is used.
    pub measure: Option<Arc<dyn Measure>>,

    /// Progress callback fired at stage boundaries and per packed page.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BookletConfig {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size_pt: 4.5,
            grid_line: GridLineStyle::default(),
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            chars_per_cell: 850,
            max_document_bytes: crate::capabilities::DEFAULT_MAX_DOCUMENT_BYTES,
            meta: BookletMeta::default(),
            measure: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BookletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookletConfig")
            .field("font_family", &self.font_family)
            .field("font_size_pt", &self.font_size_pt)
            .field("grid_line", &self.grid_line)
            .field("words_per_minute", &self.words_per_minute)
            .field("chars_per_cell", &self.chars_per_cell)
            .field("max_document_bytes", &self.max_document_bytes)
            .field("meta", &self.meta)
            .field("measure", &self.measure.as_ref().map(|_| "<dyn Measure>"))
            .finish()
    }
}

impl BookletConfig {
    /// Create a new builder for `BookletConfig`.
    pub fn builder() -> BookletConfigBuilder {
        BookletConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BookletConfig`].
#[derive(Debug)]
pub struct BookletConfigBuilder {
    config: BookletConfig,
}

impl BookletConfigBuilder {
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.config.font_family = Some(family.into());
        self
    }

    pub fn font_size_pt(mut self, pt: f32) -> Self {
        self.config.font_size_pt = pt.clamp(2.0, 12.0);
        self
    }

    pub fn grid_line(mut self, style: GridLineStyle) -> Self {
        self.config.grid_line = style;
        self
    }

    pub fn words_per_minute(mut self, wpm: u32) -> Self {
        self.config.words_per_minute = wpm.max(1);
        self
    }

    pub fn chars_per_cell(mut self, chars: usize) -> Self {
        self.config.chars_per_cell = chars.max(8);
        self
    }

    pub fn max_document_bytes(mut self, bytes: u64) -> Self {
        self.config.max_document_bytes = bytes.max(1);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.meta.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.config.meta.author = Some(author.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.config.meta.subject = Some(subject.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.config.meta.date = Some(date.into());
        self
    }

    pub fn measure(mut self, measure: Arc<dyn Measure>) -> Self {
        self.config.measure = Some(measure);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BookletConfig, MicroprintError> {
        let c = &self.config;
        if !(2.0..=12.0).contains(&c.font_size_pt) {
            return Err(MicroprintError::InvalidConfig(format!(
                "Font size must be 2.0–12.0 pt, got {}",
                c.font_size_pt
            )));
        }
        if c.words_per_minute == 0 {
            return Err(MicroprintError::InvalidConfig(
                "Reading speed must be ≥ 1 word/minute".into(),
            ));
        }
        if c.chars_per_cell < 8 {
            return Err(MicroprintError::InvalidConfig(format!(
                "Cell budget must be ≥ 8 characters, got {}",
                c.chars_per_cell
            )));
        }
        Ok(self.config)
    }
}

// ── Enums & metadata ─────────────────────────────────────────────────────

/// Style of the grid lines separating cells on a printed face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridLineStyle {
    /// Dashed cutting guides. (default)
    #[default]
    Dashed,
    /// Solid frame lines.
    Solid,
    /// Dotted, least ink.
    Dotted,
}

impl GridLineStyle {
    /// CSS `border-style` keyword for this style.
    pub fn css_keyword(&self) -> &'static str {
        match self {
            GridLineStyle::Dashed => "dashed",
            GridLineStyle::Solid => "solid",
            GridLineStyle::Dotted => "dotted",
        }
    }
}

/// Book metadata rendered in the first page's main header.
///
/// Only non-empty fields appear in the metadata table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookletMeta {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
}

impl BookletMeta {
    /// The non-empty `(label, value)` rows, title first.
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        let mut rows = Vec::new();
        let fields: [(&'static str, &Option<String>); 4] = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Date", &self.date),
        ];
        for (label, value) in fields {
            if let Some(v) = value {
                if !v.trim().is_empty() {
                    rows.push((label, v.as_str()));
                }
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_are_valid() {
        let config = BookletConfig::builder().build().unwrap();
        assert_eq!(config.words_per_minute, 215);
        assert_eq!(config.grid_line, GridLineStyle::Dashed);
        assert!(config.font_family.is_none());
    }

    #[test]
    fn default_size_limit_matches_advertised_capability() {
        let config = BookletConfig::default();
        assert_eq!(
            config.max_document_bytes,
            crate::capabilities::DEFAULT_MAX_DOCUMENT_BYTES
        );
        assert_eq!(
            crate::capabilities::capabilities().max_document_bytes,
            config.max_document_bytes
        );
    }

    #[test]
    fn builder_clamps_font_size() {
        let config = BookletConfig::builder().font_size_pt(0.5).build().unwrap();
        assert_eq!(config.font_size_pt, 2.0);
        let config = BookletConfig::builder().font_size_pt(99.0).build().unwrap();
        assert_eq!(config.font_size_pt, 12.0);
    }

    #[test]
    fn meta_rows_skip_empty_fields() {
        let meta = BookletMeta {
            title: Some("Walden".into()),
            author: Some("  ".into()),
            subject: None,
            date: Some("1854".into()),
        };
        let rows = meta.rows();
        assert_eq!(rows, vec![("Title", "Walden"), ("Date", "1854")]);
    }

    #[test]
    fn grid_line_css_keywords() {
        assert_eq!(GridLineStyle::Dashed.css_keyword(), "dashed");
        assert_eq!(GridLineStyle::Solid.css_keyword(), "solid");
        assert_eq!(GridLineStyle::Dotted.css_keyword(), "dotted");
    }
}
