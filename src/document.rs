//! The semantic document model shared by every pipeline stage.
//!
//! Importers produce [`Block`]s, the normalizer wraps them in a
//! [`NormalizedDocument`], and the tokenizer flattens them into [`Token`]s.
//! Blocks are created once per parse and never mutated after normalization;
//! Tokens are derived once and consumed in order. Keeping the whole model in
//! one module means every stage agrees on exactly one vocabulary instead of
//! converting between near-identical structs at each boundary.

use serde::{Deserialize, Serialize};

/// Source format of an imported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    /// Plain text: paragraphs separated by blank lines, no inline styling.
    PlainText,
    /// CommonMark-flavoured Markdown.
    Markdown,
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::PlainText => write!(f, "plain-text"),
            DocumentFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Inline styling applied to a run of words.
///
/// The variants are mutually exclusive: nested markup collapses to a single
/// style, with `Code` taking precedence over `Strong` and `Emphasis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineStyle {
    Strong,
    Emphasis,
    Code,
}

/// One styled run inside a block: either plain text or a link.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineSegment {
    Text {
        text: String,
        style: Option<InlineStyle>,
    },
    Link {
        /// Visible label. May equal `url` (a bare URL) or be empty, in which
        /// case the tokenizer substitutes the URL.
        text: String,
        url: String,
        /// True when the segment came from an image (`![alt](src)`).
        is_image: bool,
        style: Option<InlineStyle>,
    },
}

impl InlineSegment {
    /// The human-visible text of the segment (label for links).
    pub fn visible_text(&self) -> &str {
        match self {
            InlineSegment::Text { text, .. } => text,
            InlineSegment::Link { text, .. } => text,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            InlineSegment::Text { text, .. } => text.is_empty(),
            InlineSegment::Link { text, url, .. } => text.is_empty() && url.is_empty(),
        }
    }
}

/// The semantic role of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    #[default]
    Paragraph,
    Heading,
    Quote,
    Separator,
}

/// One semantic unit of the source document, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub kind: BlockKind,
    /// Heading level, clamped to `1..=6` by the normalizer.
    pub level: Option<u8>,
    /// Plain-text content. Recomputed from `inlines` when those are present.
    pub text: String,
    /// Styled runs. Empty for plain-text imports and separators.
    pub inlines: Vec<InlineSegment>,
    /// List-continuation flag: suppresses the inter-block paragraph gap so
    /// consecutive list blocks stay visually contiguous.
    pub compact_break: bool,
}

impl Block {
    /// Concatenated visible text of the inline runs, whitespace-normalized.
    ///
    /// Used for word counting so link labels are counted rather than URLs.
    pub fn inline_text(&self) -> String {
        let joined = self
            .inlines
            .iter()
            .map(InlineSegment::visible_text)
            .collect::<Vec<_>>()
            .join(" ");
        collapse_whitespace(&joined)
    }

    /// Number of whitespace-delimited words, preferring inline text.
    pub fn word_count(&self) -> usize {
        if self.kind == BlockKind::Separator {
            return 0;
        }
        let text = if self.inlines.is_empty() {
            self.text.clone()
        } else {
            self.inline_text()
        };
        text.split_whitespace().count()
    }
}

/// Importer output: blocks in document order, before normalization.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub format: DocumentFormat,
    pub blocks: Vec<Block>,
}

/// Normalized document: every retained block has content (or is a
/// separator) and `word_count` is the document-wide word total.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub format: DocumentFormat,
    pub blocks: Vec<Block>,
    pub word_count: usize,
}

/// Rendering role of a word or link token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenVariant {
    Body,
    Quote,
    /// Heading with its level (`1..=6`).
    Heading(u8),
}

impl TokenVariant {
    /// Class name used in the inline markup (`body`, `quote`, `h1`..`h6`).
    pub fn class(&self) -> String {
        match self {
            TokenVariant::Body => "body".to_string(),
            TokenVariant::Quote => "quote".to_string(),
            TokenVariant::Heading(level) => format!("h{level}"),
        }
    }
}

/// Kind of a break token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// Inter-block gap, rendered as a fixed small spacer run.
    Paragraph,
    /// Horizontal-rule separation inside a cell.
    Separator,
}

/// The atomic, indivisible packing unit for layout.
///
/// A `Word` token never contains internal whitespace; multi-word link labels
/// stay a single `Link` token because a link cannot be split mid-label.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Word {
        text: String,
        variant: TokenVariant,
        style: Option<InlineStyle>,
    },
    Link {
        text: String,
        url: String,
        variant: TokenVariant,
        style: Option<InlineStyle>,
        /// True iff the cleaned label equals the cleaned URL.
        is_bare_url: bool,
        is_image: bool,
    },
    Break(BreakKind),
}

impl Token {
    /// Whether this token counts toward the document word total.
    pub fn is_countable(&self) -> bool {
        matches!(self, Token::Word { .. } | Token::Link { .. })
    }
}

/// Collapse all runs of whitespace to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Merge consecutive text segments with identical style, collapse whitespace
/// inside each run, and drop segments left empty.
///
/// Merging happens before tokenization so a styled run that was split across
/// several parser events becomes one segment, and the tokenizer can split it
/// back into per-word tokens cleanly.
pub fn merge_segments(segments: Vec<InlineSegment>) -> Vec<InlineSegment> {
    let mut merged: Vec<InlineSegment> = Vec::with_capacity(segments.len());

    for segment in segments {
        match (merged.last_mut(), segment) {
            (
                Some(InlineSegment::Text { text: prev, style: prev_style }),
                InlineSegment::Text { text, style },
            ) if *prev_style == style => {
                prev.push(' ');
                prev.push_str(&text);
            }
            (_, segment) => merged.push(segment),
        }
    }

    for segment in &mut merged {
        match segment {
            InlineSegment::Text { text, .. } => *text = collapse_whitespace(text),
            InlineSegment::Link { text, url, .. } => {
                *text = collapse_whitespace(text);
                *url = url.trim().to_string();
            }
        }
    }

    merged.retain(|s| !s.is_empty());
    merged
}
