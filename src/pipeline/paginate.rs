//! The pagination engine: greedy, overflow-driven packing.
//!
//! Tokens are appended to the current cell one at a time, in order. After
//! every append the engine asks the injected [`Measure`] whether the cell
//! still fits; on overflow the token moves to the next cell (allocating a
//! new page past cell 15) and placement continues. Overflow detection order
//! is load-bearing: each `fits` answer is awaited before the next placement,
//! never batched or reordered.
//!
//! Packing runs as explicit state threaded through [`Paginator`] rather than
//! a global cursor, so independent documents can paginate concurrently.
//! After the numbering pass and trailing cleanup the pages are immutable and
//! ready for the rendering surface.

use crate::config::BookletMeta;
use crate::document::Token;
use crate::error::MicroprintError;
use crate::measure::{CellId, Measure};
use crate::pipeline::markup::{token_markup, END_MARK};
use crate::progress::GenerationProgressCallback;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Grid size of one printable face (4×4 mini-sheets).
pub const CELLS_PER_PAGE: usize = 16;

/// Every cell at `index % 4 == 0` carries a mini header unless it already
/// holds the main or running header.
const MINI_HEADER_STRIDE: usize = 4;

/// Which physical side of a sheet a page prints on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSide {
    Front,
    Back,
}

/// One `label: value` row of the main header's metadata table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRow {
    pub label: String,
    pub value: String,
}

/// Header decoration assigned to a cell at page creation.
///
/// Sheet labels start empty and are stamped during numbering resolution,
/// once the page count is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HeaderSlot {
    None,
    /// First page only: the full metadata table.
    Main { rows: Vec<HeaderRow> },
    /// Front pages after the first: remaining words, completion, time left.
    Running {
        words_remaining: usize,
        percent_complete: u8,
        time_remaining: String,
        sheet_label: String,
    },
    /// Per-cell label: resolved sheet number plus live completion percent.
    Mini { sheet_label: String, percent: u8 },
}

/// One grid compartment: fixed capacity, accumulated inline markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Grid position (`0..16`). Preserved through trailing cleanup so the
    /// rendering surface keeps removed cells' neighbours in place.
    pub index: usize,
    pub header: HeaderSlot,
    pub content: String,
}

/// One printable face of a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub side: PageSide,
    /// 1-based sheet number, resolved during numbering.
    pub sheet_number: u32,
    pub cells: Vec<Cell>,
}

/// Explicit packing state for one document.
pub struct Paginator<'a> {
    measure: &'a dyn Measure,
    progress: Option<&'a dyn GenerationProgressCallback>,
    meta: &'a BookletMeta,
    words_per_minute: u32,
    total_words: usize,
    pages: Vec<Page>,
    cell: usize,
    placed_words: usize,
}

impl<'a> Paginator<'a> {
    pub fn new(
        measure: &'a dyn Measure,
        meta: &'a BookletMeta,
        words_per_minute: u32,
        total_words: usize,
    ) -> Self {
        Self {
            measure,
            progress: None,
            meta,
            words_per_minute,
            total_words,
            pages: Vec::new(),
            cell: 0,
            placed_words: 0,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn GenerationProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Pack the token stream into finalized pages.
    ///
    /// An empty stream still yields a single page holding only the
    /// end-of-document mark.
    pub async fn run(mut self, tokens: &[Token]) -> Result<Vec<Page>, MicroprintError> {
        self.push_page();

        for token in tokens {
            self.place(token).await?;
        }

        // An overflow on the very last token can allocate a page that never
        // receives content; drop it before finalizing.
        if self.pages.len() > 1
            && self
                .pages
                .last()
                .is_some_and(|p| p.cells.iter().all(|c| c.content.is_empty()))
        {
            self.pages.pop();
        }

        self.append_end_mark();
        if let Some(progress) = self.progress {
            progress.on_page_packed(self.pages.len() - 1, self.placed_words, self.total_words);
        }

        self.resolve_numbering();
        self.trim_trailing();

        info!(
            "Paginated {} words into {} pages ({} sheets)",
            self.placed_words,
            self.pages.len(),
            self.pages.len().div_ceil(2)
        );
        Ok(self.pages)
    }

    /// Place one token, advancing through cells and pages on overflow.
    async fn place(&mut self, token: &Token) -> Result<(), MicroprintError> {
        let markup = token_markup(token);

        loop {
            let page = self.pages.len() - 1;
            let cell = self.cell;
            let current = &self.pages[page].cells[cell].content;
            let was_empty = current.is_empty();
            let candidate = if was_empty {
                markup.clone()
            } else {
                format!("{current} {markup}")
            };

            let fits = self
                .measure
                .fits(CellId { page, cell }, &candidate)
                .await
                .map_err(|e| MicroprintError::MeasurementFailed {
                    page,
                    cell,
                    detail: e.detail,
                })?;

            if fits || was_empty {
                // A token wider than an empty cell stays anyway: words are
                // never split, so moving it again could not help.
                self.pages[page].cells[cell].content = candidate;
                if token.is_countable() {
                    self.placed_words += 1;
                }
                self.update_mini_percent(page, cell);
                if !fits {
                    self.advance();
                }
                return Ok(());
            }

            self.advance();
        }
    }

    /// Move the cursor to the next cell, allocating a page past cell 15.
    fn advance(&mut self) {
        if self.cell + 1 < CELLS_PER_PAGE {
            self.cell += 1;
            return;
        }

        let packed = self.pages.len() - 1;
        if let Some(progress) = self.progress {
            progress.on_page_packed(packed, self.placed_words, self.total_words);
        }
        self.push_page();
    }

    /// Allocate the next page with its 16 cells and header slots.
    fn push_page(&mut self) {
        let index = self.pages.len();
        let side = if index % 2 == 0 {
            PageSide::Front
        } else {
            PageSide::Back
        };
        let percent = percent(self.placed_words, self.total_words);
        let words_remaining = self.total_words.saturating_sub(self.placed_words);

        let cells = (0..CELLS_PER_PAGE)
            .map(|i| {
                let header = if side == PageSide::Front && i == 0 {
                    if index == 0 {
                        HeaderSlot::Main {
                            rows: self
                                .meta
                                .rows()
                                .into_iter()
                                .map(|(label, value)| HeaderRow {
                                    label: label.to_string(),
                                    value: value.to_string(),
                                })
                                .collect(),
                        }
                    } else {
                        HeaderSlot::Running {
                            words_remaining,
                            percent_complete: percent,
                            time_remaining: format_reading_time(
                                words_remaining,
                                self.words_per_minute,
                            ),
                            sheet_label: String::new(),
                        }
                    }
                } else if i % MINI_HEADER_STRIDE == 0 {
                    HeaderSlot::Mini {
                        sheet_label: String::new(),
                        percent,
                    }
                } else {
                    HeaderSlot::None
                };
                Cell {
                    index: i,
                    header,
                    content: String::new(),
                }
            })
            .collect();

        debug!("Allocated page {index} ({side:?})");
        self.pages.push(Page {
            index,
            side,
            sheet_number: 0,
            cells,
        });
        self.cell = 0;
    }

    /// Refresh the live completion percent of the current cell's mini header.
    fn update_mini_percent(&mut self, page: usize, cell: usize) {
        if let HeaderSlot::Mini { percent: p, .. } = &mut self.pages[page].cells[cell].header {
            *p = percent(self.placed_words, self.total_words);
        }
    }

    /// Append the end-of-document mark to the last non-empty cell, falling
    /// back to the very first cell for an empty document.
    fn append_end_mark(&mut self) {
        for page in self.pages.iter_mut().rev() {
            for cell in page.cells.iter_mut().rev() {
                if !cell.content.is_empty() {
                    cell.content.push(' ');
                    cell.content.push_str(END_MARK);
                    return;
                }
            }
        }
        self.pages[0].cells[0].content = END_MARK.to_string();
    }

    /// Second pass: stamp sheet numbers and header labels.
    ///
    /// Mini headers read `"<n>/<total>"` on front pages and `"<n>b/<total>"`
    /// on back pages. Running headers always take the plain form: they name
    /// the upcoming sheet, not the physical side. Fixed contract.
    fn resolve_numbering(&mut self) {
        let total_sheets = self.pages.len().div_ceil(2).max(1) as u32;

        for page in &mut self.pages {
            let sheet = (page.index / 2 + 1) as u32;
            page.sheet_number = sheet;
            let mini_label = match page.side {
                PageSide::Front => format!("{sheet}/{total_sheets}"),
                PageSide::Back => format!("{sheet}b/{total_sheets}"),
            };

            for cell in &mut page.cells {
                match &mut cell.header {
                    HeaderSlot::Mini { sheet_label, .. } => *sheet_label = mini_label.clone(),
                    HeaderSlot::Running { sheet_label, .. } => {
                        *sheet_label = format!("{sheet}/{total_sheets}")
                    }
                    _ => {}
                }
            }
        }
    }

    /// Drop dangling empty cells from the end of the document.
    ///
    /// Only the final 15 cells are candidates, and never the very first cell
    /// placed. The check is content-based: a cell holding nothing but its
    /// header (or a bare spacer run) counts as empty.
    fn trim_trailing(&mut self) {
        let mut inspected = 0usize;

        'pages: for page_idx in (0..self.pages.len()).rev() {
            for cell_idx in (0..self.pages[page_idx].cells.len()).rev() {
                if page_idx == 0 && cell_idx == 0 {
                    break 'pages;
                }
                if inspected == CELLS_PER_PAGE - 1 {
                    break 'pages;
                }
                inspected += 1;
                if is_blank(&self.pages[page_idx].cells[cell_idx].content) {
                    self.pages[page_idx].cells.remove(cell_idx);
                }
            }
        }
    }
}

/// Whether a markup string has no visible non-whitespace content.
fn is_blank(markup: &str) -> bool {
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag && !ch.is_whitespace() => return false,
            _ => {}
        }
    }
    true
}

/// Rounded completion percentage, `0` for an empty document.
fn percent(placed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((placed as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Estimated reading time for `words` at `words_per_minute`, as prose.
///
/// Zero-valued components are omitted; a zero estimate reads "0 minutes".
pub fn format_reading_time(words: usize, words_per_minute: u32) -> String {
    let minutes = (words as f64 / f64::from(words_per_minute.max(1))).round() as u64;
    if minutes == 0 {
        return "0 minutes".to_string();
    }

    let hours = minutes / 60;
    let rest = minutes % 60;
    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(pluralize(hours, "hour"));
    }
    if rest > 0 {
        parts.push(pluralize(rest, "minute"));
    }
    parts.join(" ")
}

fn pluralize(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
