//! # microprint
//!
//! Turn prose documents (plain text or Markdown) into "micro-print" booklets:
//! dense pages of justified text on a fixed 16-cell grid, annotated with
//! running headers (metadata, remaining words, reading time, sheet numbers).
//!
//! ## Why this crate?
//!
//! Printing a whole novel on a handful of sheets needs more than shrinking a
//! font: words must pack the grid exactly (no word split across cells, no
//! half-empty boxes), sheet numbering must survive two-sided printing, and
//! overflow can only be decided by whatever actually renders the text. This
//! crate owns the deterministic part — parsing, normalization, tokenization,
//! and the greedy packing algorithm — and delegates the one unknowable
//! question ("does this still fit?") to an injected measurement capability.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document bytes
//!  │
//!  ├─ 1. Import     .txt / .md / .markdown → semantic Blocks
//!  ├─ 2. Normalize  clamp levels, merge styled runs, count words
//!  ├─ 3. Tokenize   Blocks → word / link / break Tokens
//!  ├─ 4. Paginate   greedy overflow-driven packing, one fits() per token
//!  └─ 5. Output     Booklet: pages + stylesheet + stats (JSON-ready)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use microprint::{generate, BookletConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BookletConfig::builder()
//!         .title("Moby-Dick")
//!         .font_size_pt(4.5)
//!         .build()?;
//!     let booklet = generate("moby-dick.md", &config).await?;
//!     println!("{} sheets, {}", booklet.stats.sheet_count, booklet.reading_time);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `microprint` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! microprint = { version = "0.4", default-features = false }
//! ```
//!
//! ## Measurement
//!
//! The packing engine never computes text metrics itself. By default it uses
//! [`CharBudgetMeasure`] (a fixed visible-character budget per cell); inject
//! your own [`Measure`] to couple the packing to a real rendering surface.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod booklet;
pub mod capabilities;
pub mod config;
pub mod document;
pub mod error;
pub mod fonts;
pub mod measure;
pub mod pipeline;
pub mod progress;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use booklet::{
    generate, generate_from_bytes, generate_sync, generate_to_file, inspect, Booklet,
    DocumentSummary, GenerationStats,
};
pub use capabilities::{capabilities, Capabilities, ACCEPTED_EXTENSIONS};
pub use config::{
    BookletConfig, BookletConfigBuilder, BookletMeta, GridLineStyle, DEFAULT_WORDS_PER_MINUTE,
};
pub use document::{DocumentFormat, InlineStyle, Token, TokenVariant};
pub use error::MicroprintError;
pub use measure::{CellId, CharBudgetMeasure, Measure, MeasureError, TokenBudgetMeasure};
pub use pipeline::paginate::{Cell, HeaderSlot, Page, PageSide, CELLS_PER_PAGE};
pub use progress::{
    GenerationProgress, GenerationProgressCallback, GenerationStep, NoopProgressCallback,
    ProgressCallback,
};
pub use render::Stylesheet;
