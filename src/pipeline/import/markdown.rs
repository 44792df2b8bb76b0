//! Markdown importer: pulldown-cmark events → semantic [`Block`]s.
//!
//! The walker folds the event stream into blocks while tracking four pieces
//! of context: a style stack (strong/emphasis, with inline code winning over
//! both), an active-link accumulator (labels may span styled runs and
//! images), the open list stack (markers and compact breaks), and the
//! blockquote depth (quote paragraphs become `Quote` blocks).
//!
//! Malformed Markdown never fails here: whatever pulldown-cmark cannot make
//! sense of simply contributes fewer events, and the document degrades to
//! fewer blocks. HTML blocks, footnotes, and task-list markers are dropped
//! for the same reason — there is no sensible micro-print rendering for
//! them.

use crate::document::{merge_segments, Block, BlockKind, InlineSegment, InlineStyle};
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;

/// Tolerates the non-standard tight-bold syntax `**bold**text` by inserting
/// a space after the closing marker, so the parser sees `**bold** text`.
static RE_TIGHT_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*\*[^*\n]+\*\*)([A-Za-z0-9])").unwrap());

/// Parse Markdown source into blocks, in document order.
pub fn parse(text: &str) -> Vec<Block> {
    let text = RE_TIGHT_BOLD.replace_all(text, "$1 $2");
    let parser = Parser::new_ext(&text, Options::empty());

    let mut walker = Walker::default();
    for event in parser {
        walker.event(event);
    }
    walker.finish()
}

// ── Walker state ─────────────────────────────────────────────────────────

/// A block being accumulated.
struct OpenBlock {
    kind: BlockKind,
    level: Option<u8>,
    inlines: Vec<InlineSegment>,
    compact_break: bool,
    /// Fenced/indented code block: every text run is `code`-styled.
    code: bool,
}

/// An open link or image whose label is still being collected.
struct LinkFrame {
    url: String,
    label: String,
    is_image: bool,
    style: Option<InlineStyle>,
}

#[derive(Default)]
struct Walker {
    blocks: Vec<Block>,
    current: Option<OpenBlock>,
    /// Strong/emphasis nesting; the innermost marker wins.
    style_stack: Vec<InlineStyle>,
    link_stack: Vec<LinkFrame>,
    /// Open lists; `Some(n)` holds the next ordered-item number.
    list_stack: Vec<Option<u64>>,
    /// Marker for the current list item, consumed by its first block.
    pending_marker: Option<String>,
    quote_depth: usize,
}

impl Walker {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(t) => self.push_text(&t, false),
            Event::Code(t) => self.push_text(&t, true),
            Event::SoftBreak | Event::HardBreak => self.push_text(" ", false),
            Event::Rule => {
                self.finish_block();
                self.blocks.push(Block {
                    kind: BlockKind::Separator,
                    ..Block::default()
                });
            }
            // HTML, footnotes, task markers, math: no micro-print rendering.
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.finish_block();
                self.open_block(self.ambient_kind(), None, false);
            }
            Tag::Heading { level, .. } => {
                self.finish_block();
                self.open_block(BlockKind::Heading, Some(heading_level(level)), false);
            }
            Tag::BlockQuote(_) => {
                self.finish_block();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.finish_block();
                self.open_block(self.ambient_kind(), None, true);
            }
            Tag::List(start) => {
                self.finish_block();
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.finish_block();
                self.pending_marker = Some(self.next_marker());
            }
            Tag::Emphasis => self.style_stack.push(InlineStyle::Emphasis),
            Tag::Strong => self.style_stack.push(InlineStyle::Strong),
            Tag::Link { dest_url, .. } => self.link_stack.push(LinkFrame {
                url: dest_url.to_string(),
                label: String::new(),
                is_image: false,
                style: self.span_style(),
            }),
            Tag::Image { dest_url, .. } => self.link_stack.push(LinkFrame {
                url: dest_url.to_string(),
                label: String::new(),
                is_image: true,
                style: self.span_style(),
            }),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock => self.finish_block(),
            TagEnd::BlockQuote(_) => {
                self.finish_block();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::List(_) => {
                self.finish_block();
                self.list_stack.pop();
            }
            TagEnd::Item => {
                self.finish_block();
                self.pending_marker = None;
            }
            TagEnd::Emphasis | TagEnd::Strong => {
                self.style_stack.pop();
            }
            TagEnd::Link => self.close_link(),
            TagEnd::Image => self.close_image(),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.finish_block();
        // Unbalanced links at EOF degrade to their labels as plain text.
        while let Some(frame) = self.link_stack.pop() {
            if !frame.label.trim().is_empty() {
                self.ensure_block();
                self.current.as_mut().unwrap().inlines.push(InlineSegment::Text {
                    text: frame.label,
                    style: frame.style,
                });
            }
        }
        self.finish_block();
        self.blocks
    }

    // ── Block lifecycle ──────────────────────────────────────────────────

    /// Kind for an implicit or paragraph-level block at the current depth.
    fn ambient_kind(&self) -> BlockKind {
        if self.quote_depth > 0 {
            BlockKind::Quote
        } else {
            BlockKind::Paragraph
        }
    }

    fn open_block(&mut self, kind: BlockKind, level: Option<u8>, code: bool) {
        let mut inlines = Vec::new();
        // Inside a list item the first block carries the item marker; every
        // list block suppresses the inter-block gap.
        if let Some(marker) = self.pending_marker.take() {
            inlines.push(InlineSegment::Text {
                text: marker,
                style: None,
            });
        }
        self.current = Some(OpenBlock {
            kind,
            level,
            inlines,
            compact_break: !self.list_stack.is_empty(),
            code,
        });
    }

    /// Open an implicit paragraph when inline content arrives outside any
    /// block (tight list items emit their text directly inside `Item`).
    fn ensure_block(&mut self) {
        if self.current.is_none() {
            self.open_block(self.ambient_kind(), None, false);
        }
    }

    fn finish_block(&mut self) {
        if let Some(open) = self.current.take() {
            let inlines = merge_segments(open.inlines);
            if inlines.is_empty() {
                return;
            }
            self.blocks.push(Block {
                kind: open.kind,
                level: open.level,
                text: String::new(),
                inlines,
                compact_break: open.compact_break,
            });
        }
    }

    // ── Inline content ───────────────────────────────────────────────────

    /// Style for a new span at the current nesting, before the code-block
    /// override is known.
    fn span_style(&self) -> Option<InlineStyle> {
        self.style_stack.last().copied()
    }

    fn push_text(&mut self, text: &str, code_span: bool) {
        // An active link swallows all inline content into its label.
        if let Some(frame) = self.link_stack.last_mut() {
            frame.label.push_str(text);
            return;
        }
        self.ensure_block();
        let open = self.current.as_mut().unwrap();
        let style = if code_span || open.code {
            Some(InlineStyle::Code)
        } else {
            self.style_stack.last().copied()
        };
        open.inlines.push(InlineSegment::Text {
            text: text.to_string(),
            style,
        });
    }

    fn close_link(&mut self) {
        let Some(frame) = self.link_stack.pop() else {
            return;
        };
        self.ensure_block();
        self.current.as_mut().unwrap().inlines.push(InlineSegment::Link {
            text: frame.label,
            url: frame.url,
            is_image: frame.is_image,
            style: frame.style,
        });
    }

    fn close_image(&mut self) {
        let Some(frame) = self.link_stack.pop() else {
            return;
        };
        // An image inside a link contributes its alt text to the link label
        // and flags the whole link as an image.
        if let Some(parent) = self.link_stack.last_mut() {
            if !parent.label.is_empty() && !frame.label.is_empty() {
                parent.label.push(' ');
            }
            parent.label.push_str(&frame.label);
            parent.is_image = true;
            return;
        }
        self.ensure_block();
        let open = self.current.as_mut().unwrap();
        if frame.url.trim().is_empty() {
            // Sourceless image: the alt text is all there is to print.
            if !frame.label.trim().is_empty() {
                open.inlines.push(InlineSegment::Text {
                    text: frame.label,
                    style: frame.style,
                });
            }
        } else {
            open.inlines.push(InlineSegment::Link {
                text: frame.label,
                url: frame.url,
                is_image: true,
                style: frame.style,
            });
        }
    }

    /// Marker for the next item of the innermost list.
    fn next_marker(&mut self) -> String {
        match self.list_stack.last_mut() {
            Some(Some(n)) => {
                let marker = format!("{n}.");
                *n += 1;
                marker
            }
            _ => "-".to_string(),
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_quote_paragraph_order() {
        let blocks = parse("# Intro\n\n> A quote\n\nBody.");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].kind, BlockKind::Heading);
        assert_eq!(blocks[0].level, Some(1));
        assert_eq!(blocks[1].kind, BlockKind::Quote);
        assert_eq!(blocks[2].kind, BlockKind::Paragraph);
    }

    #[test]
    fn heading_levels_map() {
        let blocks = parse("###### Deep");
        assert_eq!(blocks[0].level, Some(6));
    }

    #[test]
    fn emphasis_and_strong_styles() {
        let blocks = parse("plain *em* **strong**");
        let styles: Vec<_> = blocks[0]
            .inlines
            .iter()
            .map(|s| match s {
                InlineSegment::Text { style, .. } => *style,
                InlineSegment::Link { style, .. } => *style,
            })
            .collect();
        assert_eq!(
            styles,
            vec![
                None,
                Some(InlineStyle::Emphasis),
                Some(InlineStyle::Strong),
            ]
        );
    }

    #[test]
    fn inline_code_beats_surrounding_emphasis() {
        let blocks = parse("*styled `code` run*");
        let code = blocks[0]
            .inlines
            .iter()
            .find(|s| s.visible_text() == "code")
            .unwrap();
        assert!(matches!(
            code,
            InlineSegment::Text {
                style: Some(InlineStyle::Code),
                ..
            }
        ));
    }

    #[test]
    fn fenced_code_block_is_code_styled_paragraph() {
        let blocks = parse("```\nlet x = 1;\nlet y = 2;\n```");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert!(blocks[0].inlines.iter().all(|s| matches!(
            s,
            InlineSegment::Text {
                style: Some(InlineStyle::Code),
                ..
            }
        )));
        // Whitespace (incl. the newline) collapsed by segment merging.
        assert_eq!(blocks[0].inline_text(), "let x = 1; let y = 2;");
    }

    #[test]
    fn unordered_list_markers_and_compact_breaks() {
        // Segment merging folds the unstyled marker into the item text.
        let blocks = parse("- One\n- Two\n\nAfter list");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].inline_text(), "- One");
        assert_eq!(blocks[1].inline_text(), "- Two");
        assert!(blocks[0].compact_break);
        assert!(blocks[1].compact_break);
        assert!(!blocks[2].compact_break);
    }

    #[test]
    fn ordered_list_counts_from_declared_start() {
        let blocks = parse("4. four\n5. five");
        assert_eq!(blocks[0].inline_text(), "4. four");
        assert_eq!(blocks[1].inline_text(), "5. five");
    }

    #[test]
    fn marker_only_on_first_block_of_item() {
        let blocks = parse("- first paragraph\n\n  second paragraph\n");
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].inline_text().starts_with("- "));
        assert_eq!(blocks[1].inline_text(), "second paragraph");
        assert!(blocks[1].compact_break);
    }

    #[test]
    fn bare_url_link() {
        let blocks = parse("See [https://x.com](https://x.com)");
        let link = &blocks[0].inlines[1];
        match link {
            InlineSegment::Link { text, url, is_image, .. } => {
                assert_eq!(text, "https://x.com");
                assert_eq!(url, "https://x.com");
                assert!(!*is_image);
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn image_inside_link_contributes_alt_text() {
        let blocks = parse("[![badge](img.png)](https://ci.example.org)");
        match &blocks[0].inlines[0] {
            InlineSegment::Link { text, url, is_image, .. } => {
                assert_eq!(text, "badge");
                assert_eq!(url, "https://ci.example.org");
                assert!(*is_image);
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn standalone_image_with_source_becomes_image_link() {
        let blocks = parse("![figure one](fig1.png)");
        match &blocks[0].inlines[0] {
            InlineSegment::Link { text, url, is_image, .. } => {
                assert_eq!(text, "figure one");
                assert_eq!(url, "fig1.png");
                assert!(*is_image);
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn sourceless_image_degrades_to_alt_text() {
        let blocks = parse("![just alt]()");
        assert!(matches!(
            &blocks[0].inlines[0],
            InlineSegment::Text { text, .. } if text == "just alt"
        ));
    }

    #[test]
    fn horizontal_rule_is_separator() {
        let blocks = parse("before\n\n---\n\nafter");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].kind, BlockKind::Separator);
        assert!(blocks[1].text.is_empty());
    }

    #[test]
    fn soft_breaks_become_spaces() {
        let blocks = parse("line one\nline two");
        assert_eq!(blocks[0].inline_text(), "line one line two");
    }

    #[test]
    fn tight_bold_pre_pass() {
        let blocks = parse("**bold**text");
        let styles: Vec<_> = blocks[0]
            .inlines
            .iter()
            .map(|s| (s.visible_text().to_string(), matches!(s, InlineSegment::Text { style: Some(InlineStyle::Strong), .. })))
            .collect();
        assert_eq!(
            styles,
            vec![("bold".to_string(), true), ("text".to_string(), false)]
        );
    }

    #[test]
    fn empty_input_degrades_to_no_blocks() {
        assert!(parse("").is_empty());
        assert!(parse("<div>html only</div>").is_empty());
    }
}
