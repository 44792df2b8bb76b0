//! Plain-text importer: blank-line paragraph splitting.
//!
//! The simplest possible reading of a text file: one or more blank lines
//! end a paragraph, all internal whitespace collapses to single spaces, and
//! no inline styling exists. Anything fancier (indentation, underlined
//! headings) is out of scope — authors who want structure use Markdown.

use crate::document::{collapse_whitespace, Block, BlockKind};

/// Split text on blank-line boundaries into paragraph blocks.
pub fn parse(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph = String::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut paragraph, &mut blocks);
        } else {
            if !paragraph.is_empty() {
                paragraph.push(' ');
            }
            paragraph.push_str(line);
        }
    }
    flush(&mut paragraph, &mut blocks);

    blocks
}

fn flush(paragraph: &mut String, blocks: &mut Vec<Block>) {
    let text = collapse_whitespace(paragraph);
    paragraph.clear();
    if !text.is_empty() {
        blocks.push(Block {
            kind: BlockKind::Paragraph,
            text,
            ..Block::default()
        });
    }
}
