//! End-to-end pipeline tests: import → normalize → tokenize → paginate.

use microprint::document::{BlockKind, BreakKind, Token, TokenVariant};
use microprint::pipeline::markup::END_MARK;
use microprint::pipeline::{import, normalize, tokenize};
use microprint::{
    generate_from_bytes, Booklet, BookletConfig, HeaderSlot, MicroprintError, PageSide,
    TokenBudgetMeasure,
};
use std::sync::Arc;

fn config(tokens_per_cell: usize) -> BookletConfig {
    BookletConfig::builder()
        .measure(Arc::new(TokenBudgetMeasure::new(tokens_per_cell)))
        .build()
        .unwrap()
}

async fn pack(input: &str, name: &str, tokens_per_cell: usize) -> Booklet {
    generate_from_bytes(input.as_bytes(), name, &config(tokens_per_cell))
        .await
        .unwrap()
}

fn tokens_of(input: &str, name: &str) -> Vec<Token> {
    tokenize::tokenize(&normalize::normalize(
        import::import(input.as_bytes(), name).unwrap(),
    ))
}

fn placed_token_count(content: &str) -> usize {
    content
        .trim_end_matches(END_MARK)
        .trim_end()
        .matches("</")
        .count()
}

// ── Tokenization scenarios ───────────────────────────────────────────────

#[test]
fn two_plain_paragraphs() {
    let doc = normalize::normalize(
        import::import(b"Alpha one two.\n\nBeta three four.", "a.txt").unwrap(),
    );
    assert_eq!(doc.blocks.len(), 2);
    assert!(doc.blocks.iter().all(|b| b.kind == BlockKind::Paragraph));
    assert_eq!(doc.word_count, 6);

    let tokens = tokenize::tokenize(&doc);
    let words = tokens
        .iter()
        .filter(|t| matches!(t, Token::Word { variant: TokenVariant::Body, .. }))
        .count();
    let gaps = tokens
        .iter()
        .filter(|t| matches!(t, Token::Break(BreakKind::Paragraph)))
        .count();
    assert_eq!(words, 6);
    assert_eq!(gaps, 2);
}

#[test]
fn heading_quote_paragraph_in_order() {
    let doc = normalize::normalize(
        import::import(b"# Intro\n\n> A quote\n\nBody.", "a.md").unwrap(),
    );
    let kinds: Vec<BlockKind> = doc.blocks.iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![BlockKind::Heading, BlockKind::Quote, BlockKind::Paragraph]
    );

    let tokens = tokenize::tokenize(&doc);
    assert!(tokens
        .iter()
        .any(|t| matches!(t, Token::Word { variant: TokenVariant::Quote, .. })));
}

#[test]
fn list_items_suppress_inter_item_gaps() {
    let tokens = tokens_of("- One\n- Two\n\nAfter list", "a.md");
    let gap_positions: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter_map(|(i, t)| matches!(t, Token::Break(BreakKind::Paragraph)).then_some(i))
        .collect();
    // The only gap in the whole stream comes after "After list".
    assert_eq!(gap_positions, vec![tokens.len() - 1]);
}

#[test]
fn bare_url_link() {
    let tokens = tokens_of("See [https://x.com](https://x.com)", "a.md");
    let link = tokens.iter().find_map(|t| match t {
        Token::Link { text, url, is_bare_url, .. } => Some((text, url, is_bare_url)),
        _ => None,
    });
    let (text, url, is_bare_url) = link.expect("link token");
    assert_eq!(text, "https://x.com");
    assert_eq!(url, "https://x.com");
    assert!(*is_bare_url);
}

#[test]
fn tokenization_is_deterministic() {
    let input = "# T\n\nSome **bold words** and a [link](https://a.b).\n\n---\n\n> quoted";
    assert_eq!(tokens_of(input, "a.md"), tokens_of(input, "a.md"));
}

#[test]
fn countable_tokens_match_word_count_modulo_link_labels() {
    let input = "Alpha beta [two words](https://l.example) gamma.";
    let doc = normalize::normalize(import::import(input.as_bytes(), "a.md").unwrap());
    let tokens = tokenize::tokenize(&doc);
    let countable = tokens.iter().filter(|t| t.is_countable()).count();
    let multiword_labels = 1;
    assert_eq!(doc.word_count, 5);
    assert_eq!(countable, doc.word_count - multiword_labels);
}

// ── Packing scenarios ────────────────────────────────────────────────────

#[tokio::test]
async fn seventeenth_word_starts_the_second_cell() {
    let words: Vec<String> = (0..17).map(|i| format!("w{i}")).collect();
    let booklet = pack(&words.join(" "), "doc.txt", 16).await;

    let page = &booklet.pages[0];
    assert_eq!(placed_token_count(&page.cells[0].content), 16);
    assert!(page.cells[1]
        .content
        .starts_with("<span class=\"body\">w16</span>"));
}

#[tokio::test]
async fn short_document_keeps_only_used_cells() {
    let booklet = pack("one two three four five", "doc.txt", 2).await;

    assert_eq!(booklet.pages.len(), 1);
    // Five words at two per cell use cells 0..=2.
    assert_eq!(booklet.pages[0].cells.len(), 3);
    assert!(booklet.pages[0].cells[2].content.contains(END_MARK));
}

#[tokio::test]
async fn grid_and_numbering_invariants() {
    // One token per cell; 40 words span three pages.
    let words: Vec<String> = (0..40).map(|i| format!("w{i}")).collect();
    let booklet = pack(&words.join(" "), "doc.txt", 1).await;

    assert_eq!(booklet.pages.len(), 3);
    let total_sheets = booklet.pages.len().div_ceil(2) as u32;

    for (i, page) in booklet.pages.iter().enumerate() {
        assert_eq!(page.index, i);
        let expected_side = if i % 2 == 0 { PageSide::Front } else { PageSide::Back };
        assert_eq!(page.side, expected_side);
        assert_eq!(page.sheet_number, (i / 2 + 1) as u32);
        assert!(page.sheet_number <= total_sheets);
    }

    // Full pages keep all 16 cells; only the final page is trimmed.
    assert_eq!(booklet.pages[0].cells.len(), 16);
    assert_eq!(booklet.pages[1].cells.len(), 16);
    assert!(booklet.pages[2].cells.len() < 16);
}

#[tokio::test]
async fn mini_headers_carry_side_suffixed_sheet_labels() {
    let words: Vec<String> = (0..40).map(|i| format!("w{i}")).collect();
    let booklet = pack(&words.join(" "), "doc.txt", 1).await;

    let mini_label = |page_index: usize| {
        booklet.pages[page_index]
            .cells
            .iter()
            .find_map(|c| match &c.header {
                HeaderSlot::Mini { sheet_label, .. } => Some(sheet_label.clone()),
                _ => None,
            })
            .unwrap()
    };
    assert_eq!(mini_label(0), "1/2");
    assert_eq!(mini_label(1), "1b/2");
    assert_eq!(mini_label(2), "2/2");

    // The running header names the upcoming sheet without the side suffix.
    match &booklet.pages[2].cells[0].header {
        HeaderSlot::Running { sheet_label, words_remaining, .. } => {
            assert_eq!(sheet_label, "2/2");
            assert_eq!(*words_remaining, 40 - 32);
        }
        other => panic!("expected running header, got {other:?}"),
    }
}

#[tokio::test]
async fn no_cell_fails_its_own_measurement() {
    let input = "# Heading\n\nSome **styled** prose with a [link](https://x.y).\n\n\
                 ---\n\n> a quotation follows the rule\n\nAnd a closing paragraph.";
    let per_cell = 3;
    let booklet = pack(input, "doc.md", per_cell).await;

    for page in &booklet.pages {
        for cell in &page.cells {
            assert!(
                placed_token_count(&cell.content) <= per_cell,
                "page {} cell {} overfull: {}",
                page.index,
                cell.index,
                cell.content
            );
        }
    }
}

#[tokio::test]
async fn empty_document_yields_one_near_empty_page() {
    let booklet = pack("", "empty.txt", 16).await;

    assert_eq!(booklet.pages.len(), 1);
    assert_eq!(booklet.pages[0].cells.len(), 1);
    assert_eq!(booklet.pages[0].cells[0].content, END_MARK);
    assert_eq!(booklet.stats.word_count, 0);
    assert_eq!(booklet.stats.sheet_count, 1);
}

#[tokio::test]
async fn markdown_styles_survive_to_the_markup() {
    let input = "# Title\n\nBody with **bold** and a [docs](https://d.example) link.";
    let booklet = pack(input, "doc.md", 16).await;

    let all: String = booklet.pages[0]
        .cells
        .iter()
        .map(|c| c.content.as_str())
        .collect();
    assert!(all.contains("class=\"h1\""));
    assert!(all.contains("class=\"body strong\""));
    assert!(all.contains("href=\"https://d.example\""));
}

#[tokio::test]
async fn main_header_lists_configured_metadata() {
    let cfg = BookletConfig::builder()
        .measure(Arc::new(TokenBudgetMeasure::new(16)))
        .title("Walden")
        .author("Thoreau")
        .build()
        .unwrap();
    let booklet = generate_from_bytes(b"Some words to print.", "doc.txt", &cfg)
        .await
        .unwrap();

    match &booklet.pages[0].cells[0].header {
        HeaderSlot::Main { rows } => {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].label, "Title");
            assert_eq!(rows[0].value, "Walden");
        }
        other => panic!("expected main header, got {other:?}"),
    }
}

// ── Failure modes ────────────────────────────────────────────────────────

#[tokio::test]
async fn binary_garbage_is_rejected_not_degraded() {
    let bytes = vec![0xFF, 0xFE, 0xFD, 0x00, 0xC0, 0xC1, 0xF8, 0xFF];
    let err = generate_from_bytes(&bytes, "doc.txt", &config(16))
        .await
        .unwrap_err();
    assert!(matches!(err, MicroprintError::UnreadableInput { .. }));
}

#[tokio::test]
async fn malformed_markdown_degrades_instead_of_failing() {
    // Unterminated emphasis and a dangling link bracket still produce output.
    let booklet = pack("**open emphasis and [dangling", "doc.md", 16).await;
    assert!(booklet.stats.word_count > 0);
}
