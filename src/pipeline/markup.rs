//! Inline-markup rendering of placed tokens.
//!
//! Cells accumulate a flat markup string — the exact text the rendering
//! surface measures and paints. The vocabulary is deliberately tiny: one
//! span per word, one anchor per link, fixed runs for gaps, rules, and the
//! end-of-document mark. Class names are the contract with the stylesheet
//! in [`crate::render`].
//!
//! Paragraph gaps are literal preserved whitespace inside a span, not block
//! margins: margins would be invisible to a content-height measurement at
//! the end of a cell, preserved spaces are not.

use crate::document::{BreakKind, InlineStyle, Token};

/// Fixed spacer run standing in for an inter-block gap.
pub const PARAGRAPH_SPACER: &str = "<span class=\"gap\">   </span>";

/// Visual separation for a horizontal rule, inside the current cell.
pub const SEPARATOR_RULE: &str = "<span class=\"rule\"> · · · </span>";

/// End-of-document mark appended after the last placed token.
pub const END_MARK: &str = "<span class=\"end\">∎</span>";

/// Render one token to its inline markup.
pub fn token_markup(token: &Token) -> String {
    match token {
        Token::Word { text, variant, style } => {
            format!(
                "<span class=\"{}\">{}</span>",
                class_list(&variant.class(), *style, false, false),
                escape_text(text)
            )
        }
        Token::Link {
            text,
            url,
            variant,
            style,
            is_bare_url,
            is_image,
        } => {
            format!(
                "<a class=\"{}\" href=\"{}\">{}</a>",
                class_list(&variant.class(), *style, *is_image, *is_bare_url),
                escape_attr(url),
                escape_text(text)
            )
        }
        Token::Break(BreakKind::Paragraph) => PARAGRAPH_SPACER.to_string(),
        Token::Break(BreakKind::Separator) => SEPARATOR_RULE.to_string(),
    }
}

fn class_list(variant: &str, style: Option<InlineStyle>, is_image: bool, is_bare: bool) -> String {
    let mut classes = variant.to_string();
    if let Some(style) = style {
        classes.push(' ');
        classes.push_str(match style {
            InlineStyle::Strong => "strong",
            InlineStyle::Emphasis => "em",
            InlineStyle::Code => "code",
        });
    }
    if is_image {
        classes.push_str(" img");
    }
    if is_bare {
        classes.push_str(" bare");
    }
    classes
}

/// Escape text content for inline markup.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value (also quotes).
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
