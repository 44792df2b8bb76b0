//! The measurement capability: the engine's only external dependency.
//!
//! ## Why an injected trait?
//!
//! Overflow detection is the one question the core cannot answer itself:
//! whether a cell's content exceeds its fixed height depends on the real
//! rendering surface (font metrics, hyphenation, subpixel rounding). The
//! engine therefore asks an injected [`Measure`] once per token placement
//! and never computes text metrics on its own. The trait is async because
//! the surface may be an out-of-process renderer; a synchronous measurer
//! simply returns immediately.
//!
//! [`CharBudgetMeasure`] is the deterministic built-in: it approximates a
//! cell's capacity as a character budget over the *visible* text. It keeps
//! the CLI self-contained and gives tests exact, reproducible packing.

use async_trait::async_trait;
use thiserror::Error;

/// Identifies one cell of one page during packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellId {
    /// 0-based page index.
    pub page: usize,
    /// 0-based cell index within the page (`0..16`).
    pub cell: usize,
}

/// Error reported by a measurement capability.
///
/// There is exactly one shape: the capability could not decide. The engine
/// treats any instance as fatal (see [`crate::error::MicroprintError`]).
#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct MeasureError {
    pub detail: String,
}

impl MeasureError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Decides whether a cell's proposed content still fits its fixed capacity.
///
/// `fits` is queried once per token placement, with the cell's *entire*
/// accumulated markup. Implementations must answer placements in the order
/// they are asked: the engine awaits each answer before the next placement,
/// and batching or reordering would corrupt the packing.
#[async_trait]
pub trait Measure: Send + Sync {
    /// Does `content` still fit inside the cell identified by `cell`?
    async fn fits(&self, cell: CellId, content: &str) -> Result<bool, MeasureError>;
}

/// Deterministic measurer: a fixed budget of visible characters per cell.
///
/// Markup tags are invisible to the measurement; only rendered characters
/// (including preserved spacer whitespace) count against the budget.
#[derive(Debug, Clone)]
pub struct CharBudgetMeasure {
    pub chars_per_cell: usize,
}

impl CharBudgetMeasure {
    pub fn new(chars_per_cell: usize) -> Self {
        Self { chars_per_cell }
    }
}

#[async_trait]
impl Measure for CharBudgetMeasure {
    async fn fits(&self, _cell: CellId, content: &str) -> Result<bool, MeasureError> {
        Ok(visible_len(content) <= self.chars_per_cell)
    }
}

/// Deterministic measurer: a fixed number of placed tokens per cell.
///
/// Counts closing tags rather than characters, so every word, link, and
/// break weighs the same. Mostly useful in tests ("16 words per cell").
#[derive(Debug, Clone)]
pub struct TokenBudgetMeasure {
    pub tokens_per_cell: usize,
}

impl TokenBudgetMeasure {
    pub fn new(tokens_per_cell: usize) -> Self {
        Self { tokens_per_cell }
    }
}

#[async_trait]
impl Measure for TokenBudgetMeasure {
    async fn fits(&self, _cell: CellId, content: &str) -> Result<bool, MeasureError> {
        Ok(content.matches("</").count() <= self.tokens_per_cell)
    }
}

/// Number of visible (non-tag) characters in a markup string.
pub fn visible_len(markup: &str) -> usize {
    let mut count = 0usize;
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => count += 1,
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> CellId {
        CellId { page: 0, cell: 0 }
    }

    #[test]
    fn visible_len_ignores_tags() {
        assert_eq!(visible_len("<span class=\"body\">word</span>"), 4);
        assert_eq!(visible_len("plain"), 5);
        assert_eq!(visible_len(""), 0);
        // Spacer whitespace is visible content.
        assert_eq!(visible_len("<span class=\"gap\">   </span>"), 3);
    }

    #[tokio::test]
    async fn char_budget_enforced() {
        let m = CharBudgetMeasure::new(4);
        assert!(m.fits(cell(), "<b>word</b>").await.unwrap());
        assert!(!m.fits(cell(), "<b>words</b>").await.unwrap());
    }

    #[tokio::test]
    async fn token_budget_counts_closing_tags() {
        let m = TokenBudgetMeasure::new(2);
        let two = "<span>a</span> <span>b</span>";
        let three = "<span>a</span> <span>b</span> <span>c</span>";
        assert!(m.fits(cell(), two).await.unwrap());
        assert!(!m.fits(cell(), three).await.unwrap());
    }
}
