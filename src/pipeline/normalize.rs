//! Normalization: uniform block cleanup, regardless of source format.
//!
//! Importers are allowed to be sloppy in format-specific ways; this stage
//! guarantees the invariants the tokenizer relies on:
//!
//! - heading levels are clamped to 1–6
//! - `text` is recomputed from inline runs whenever those are present
//! - blocks with neither text nor inlines are dropped (separators excepted)
//! - the document word count is fixed here, once, counting link labels
//!   rather than URLs
//!
//! Every pass is pure; normalizing twice is a no-op.

use crate::document::{merge_segments, Block, BlockKind, NormalizedDocument, ParsedDocument};
use tracing::debug;

/// Normalize a parsed document into the tokenizer's input form.
pub fn normalize(parsed: ParsedDocument) -> NormalizedDocument {
    let mut blocks: Vec<Block> = Vec::with_capacity(parsed.blocks.len());

    for mut block in parsed.blocks {
        if block.kind == BlockKind::Heading {
            block.level = Some(block.level.unwrap_or(1).clamp(1, 6));
        } else {
            block.level = None;
        }

        block.inlines = merge_segments(std::mem::take(&mut block.inlines));
        if !block.inlines.is_empty() {
            block.text = block.inline_text();
        } else {
            block.text = crate::document::collapse_whitespace(&block.text);
        }

        let retained = block.kind == BlockKind::Separator || !block.text.is_empty();
        if retained {
            blocks.push(block);
        }
    }

    let word_count = blocks.iter().map(Block::word_count).sum();
    debug!("Normalized document: {} blocks, {} words", blocks.len(), word_count);

    NormalizedDocument {
        format: parsed.format,
        blocks,
        word_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentFormat, InlineSegment, InlineStyle};

    fn doc(blocks: Vec<Block>) -> ParsedDocument {
        ParsedDocument {
            format: DocumentFormat::Markdown,
            blocks,
        }
    }

    #[test]
    fn clamps_heading_levels() {
        let normalized = normalize(doc(vec![Block {
            kind: BlockKind::Heading,
            level: Some(9),
            text: "Title".into(),
            ..Block::default()
        }]));
        assert_eq!(normalized.blocks[0].level, Some(6));
    }

    #[test]
    fn recomputes_text_from_inlines() {
        let normalized = normalize(doc(vec![Block {
            kind: BlockKind::Paragraph,
            inlines: vec![
                InlineSegment::Text {
                    text: "hello".into(),
                    style: None,
                },
                InlineSegment::Link {
                    text: "world".into(),
                    url: "https://w.example".into(),
                    is_image: false,
                    style: Some(InlineStyle::Strong),
                },
            ],
            ..Block::default()
        }]));
        assert_eq!(normalized.blocks[0].text, "hello world");
        assert_eq!(normalized.word_count, 2);
    }

    #[test]
    fn drops_empty_non_separator_blocks() {
        let normalized = normalize(doc(vec![
            Block::default(),
            Block {
                kind: BlockKind::Separator,
                ..Block::default()
            },
            Block {
                text: "  kept  ".into(),
                ..Block::default()
            },
        ]));
        assert_eq!(normalized.blocks.len(), 2);
        assert_eq!(normalized.blocks[0].kind, BlockKind::Separator);
        assert_eq!(normalized.blocks[1].text, "kept");
    }

    #[test]
    fn word_count_sums_blocks_ignoring_separators() {
        let normalized = normalize(doc(vec![
            Block {
                text: "Alpha one two.".into(),
                ..Block::default()
            },
            Block {
                kind: BlockKind::Separator,
                ..Block::default()
            },
            Block {
                text: "Beta three four.".into(),
                ..Block::default()
            },
        ]));
        assert_eq!(normalized.word_count, 6);
    }

    #[test]
    fn normalizing_is_idempotent() {
        let once = normalize(doc(vec![Block {
            kind: BlockKind::Heading,
            level: Some(3),
            inlines: vec![InlineSegment::Text {
                text: " Spaced   Title ".into(),
                style: None,
            }],
            ..Block::default()
        }]));
        let twice = normalize(ParsedDocument {
            format: once.format,
            blocks: once.blocks.clone(),
        });
        assert_eq!(once.blocks, twice.blocks);
        assert_eq!(once.word_count, twice.word_count);
    }
}
