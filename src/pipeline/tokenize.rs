//! Tokenization: normalized blocks → the linear token stream.
//!
//! Tokens are the atomic packing unit: a word token never contains internal
//! whitespace, so the pagination engine can move any single token to the
//! next cell without splitting text. Styled runs are split into per-word
//! tokens *after* normalization on purpose — one long styled span would let
//! a rendering engine collapse the inter-word spacing inside it, and the
//! packing would no longer match what gets printed.
//!
//! Deterministic by construction: the same [`NormalizedDocument`] always
//! yields the same token sequence.

use crate::document::{
    Block, BlockKind, BreakKind, InlineSegment, NormalizedDocument, Token, TokenVariant,
};
use tracing::debug;

/// Flatten a normalized document into tokens, preserving total order.
pub fn tokenize(doc: &NormalizedDocument) -> Vec<Token> {
    let mut tokens = Vec::new();

    for block in &doc.blocks {
        match block.kind {
            BlockKind::Separator => {
                tokens.push(Token::Break(BreakKind::Separator));
                tokens.push(Token::Break(BreakKind::Paragraph));
            }
            BlockKind::Heading => {
                let variant = TokenVariant::Heading(block.level.unwrap_or(1));
                push_block_content(&mut tokens, block, variant);
                // Headings always close with a gap, compact or not.
                tokens.push(Token::Break(BreakKind::Paragraph));
            }
            BlockKind::Quote => {
                push_block_content(&mut tokens, block, TokenVariant::Quote);
                if !block.compact_break {
                    tokens.push(Token::Break(BreakKind::Paragraph));
                }
            }
            BlockKind::Paragraph => {
                push_block_content(&mut tokens, block, TokenVariant::Body);
                if !block.compact_break {
                    tokens.push(Token::Break(BreakKind::Paragraph));
                }
            }
        }
    }

    debug!("Tokenized document: {} tokens", tokens.len());
    tokens
}

/// Expand one block's content into word/link tokens of the given variant.
fn push_block_content(tokens: &mut Vec<Token>, block: &Block, variant: TokenVariant) {
    if block.inlines.is_empty() {
        for word in block.text.split_whitespace() {
            tokens.push(Token::Word {
                text: word.to_string(),
                variant,
                style: None,
            });
        }
        return;
    }

    for segment in &block.inlines {
        match segment {
            InlineSegment::Text { text, style } => {
                for word in text.split_whitespace() {
                    tokens.push(Token::Word {
                        text: word.to_string(),
                        variant,
                        style: *style,
                    });
                }
            }
            InlineSegment::Link {
                text,
                url,
                is_image,
                style,
            } => {
                let url = url.trim();
                let label = if text.trim().is_empty() {
                    url.to_string()
                } else {
                    text.trim().to_string()
                };
                tokens.push(Token::Link {
                    is_bare_url: label == url,
                    text: label,
                    url: url.to_string(),
                    variant,
                    style: *style,
                    is_image: *is_image,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentFormat, InlineStyle};
    use crate::pipeline::{import, normalize::normalize};

    fn tokenize_str(input: &str, name: &str) -> Vec<Token> {
        tokenize(&normalize(import::import(input.as_bytes(), name).unwrap()))
    }

    fn word_texts(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Word { text, .. } => Some(text.as_str()),
                Token::Link { text, .. } => Some(text.as_str()),
                Token::Break(_) => None,
            })
            .collect()
    }

    #[test]
    fn plain_paragraphs_scenario() {
        // Scenario: two plain paragraphs, six words, two trailing gaps.
        let tokens = tokenize_str("Alpha one two.\n\nBeta three four.", "a.txt");
        let words = word_texts(&tokens);
        assert_eq!(words, vec!["Alpha", "one", "two.", "Beta", "three", "four."]);
        let breaks = tokens
            .iter()
            .filter(|t| matches!(t, Token::Break(BreakKind::Paragraph)))
            .count();
        assert_eq!(breaks, 2);
        assert!(tokens
            .iter()
            .filter(|t| t.is_countable())
            .all(|t| matches!(t, Token::Word { variant: TokenVariant::Body, .. })));
    }

    #[test]
    fn quote_tokens_carry_quote_variant() {
        let tokens = tokenize_str("# Intro\n\n> A quote\n\nBody.", "a.md");
        assert!(tokens.iter().any(|t| matches!(
            t,
            Token::Word { variant: TokenVariant::Quote, .. }
        )));
        assert!(tokens.iter().any(|t| matches!(
            t,
            Token::Word { variant: TokenVariant::Heading(1), .. }
        )));
    }

    #[test]
    fn compact_list_blocks_suppress_gaps() {
        // Scenario: the only paragraph gap is the one after "After list".
        let tokens = tokenize_str("- One\n- Two\n\nAfter list", "a.md");
        let gaps: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter_map(|(i, t)| matches!(t, Token::Break(BreakKind::Paragraph)).then_some(i))
            .collect();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0], tokens.len() - 1);
    }

    #[test]
    fn bare_url_link_token() {
        let tokens = tokenize_str("See [https://x.com](https://x.com)", "a.md");
        let link = tokens
            .iter()
            .find(|t| matches!(t, Token::Link { .. }))
            .unwrap();
        match link {
            Token::Link {
                text,
                url,
                is_bare_url,
                ..
            } => {
                assert_eq!(text, "https://x.com");
                assert_eq!(url, "https://x.com");
                assert!(*is_bare_url);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_link_label_falls_back_to_url() {
        use crate::document::{Block, NormalizedDocument};
        let doc = NormalizedDocument {
            format: DocumentFormat::Markdown,
            word_count: 1,
            blocks: vec![Block {
                inlines: vec![InlineSegment::Link {
                    text: String::new(),
                    url: "https://only-url.example".into(),
                    is_image: false,
                    style: None,
                }],
                text: "https://only-url.example".into(),
                ..Block::default()
            }],
        };
        let tokens = tokenize(&doc);
        match &tokens[0] {
            Token::Link { text, is_bare_url, .. } => {
                assert_eq!(text, "https://only-url.example");
                assert!(*is_bare_url);
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn separator_emits_both_breaks() {
        let tokens = tokenize_str("before\n\n---\n\nafter", "a.md");
        let pair = tokens
            .windows(2)
            .any(|w| {
                matches!(w[0], Token::Break(BreakKind::Separator))
                    && matches!(w[1], Token::Break(BreakKind::Paragraph))
            });
        assert!(pair, "separator must emit break(separator) then break(paragraph)");
    }

    #[test]
    fn styled_runs_split_into_word_tokens() {
        let tokens = tokenize_str("**three bold words** here", "a.md");
        let bold: Vec<_> = tokens
            .iter()
            .filter(|t| matches!(
                t,
                Token::Word { style: Some(InlineStyle::Strong), .. }
            ))
            .collect();
        assert_eq!(bold.len(), 3);
    }

    #[test]
    fn tokenizing_twice_is_identical() {
        let doc = normalize(
            import::import(b"# T\n\nSome *styled* text with [a](https://b.c) link.", "a.md")
                .unwrap(),
        );
        assert_eq!(tokenize(&doc), tokenize(&doc));
    }

    #[test]
    fn word_and_link_tokens_match_word_count_modulo_multiword_labels() {
        let input = "Alpha [two word](https://l.example) beta.";
        let doc = normalize(import::import(input.as_bytes(), "a.md").unwrap());
        let tokens = tokenize(&doc);
        let countable = tokens.iter().filter(|t| t.is_countable()).count();
        // "two word" is 2 words in the count but 1 link token.
        assert_eq!(doc.word_count, 4);
        assert_eq!(countable, 3);
    }
}
