//! Progress reporting for booklet generation.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::BookletConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves through its stages and packs pages.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a channel, a WebSocket, a database row, or a
//! terminal progress bar without the library knowing how the host
//! application communicates. The trait is `Send + Sync` so independent
//! documents can generate concurrently on separate tasks.
//!
//! # Structured state only
//!
//! [`GenerationProgress`] is the single source of truth for "where is this
//! generation". There is deliberately no free-text progress string to parse:
//! callers that need prose render it from the structured fields.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The pipeline stage a generation is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationStep {
    Importing,
    Normalizing,
    Tokenizing,
    Paginating,
    Complete,
    Failed,
}

impl GenerationStep {
    /// Coarse completion percentage attributed to finishing this step.
    ///
    /// The parse stages are fast; pagination dominates wall-clock time, so
    /// it owns the 30–99 band (refined per packed page).
    pub fn base_percentage(&self) -> u8 {
        match self {
            GenerationStep::Importing => 10,
            GenerationStep::Normalizing => 20,
            GenerationStep::Tokenizing => 30,
            GenerationStep::Paginating => 35,
            GenerationStep::Complete => 100,
            GenerationStep::Failed => 100,
        }
    }
}

/// Snapshot of a generation's state, suitable for a polling layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationProgress {
    pub step: GenerationStep,
    /// 0–100.
    pub percentage: u8,
    /// Sheet currently being packed (1-indexed), once pagination starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_sheet: Option<u32>,
    /// Total sheets, known only after numbering resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sheets: Option<u32>,
    pub is_complete: bool,
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GenerationProgress {
    /// Progress at the start of a step, before any pages exist.
    pub fn at_step(step: GenerationStep) -> Self {
        Self {
            step,
            percentage: step.base_percentage(),
            current_sheet: None,
            total_sheets: None,
            is_complete: step == GenerationStep::Complete,
            is_error: false,
            error_message: None,
        }
    }

    /// Terminal error state with a human-readable message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            step: GenerationStep::Failed,
            percentage: 100,
            current_sheet: None,
            total_sheets: None,
            is_complete: false,
            is_error: true,
            error_message: Some(message.into()),
        }
    }
}

/// Called by the generation pipeline as it advances.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pagination within one document is sequential, but
/// separate documents may generate concurrently, so implementations must
/// protect shared mutable state.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once before the importer runs.
    fn on_generation_start(&self) {}

    /// Called when the pipeline enters a new stage.
    fn on_step(&self, progress: &GenerationProgress) {
        let _ = progress;
    }

    /// Called each time the engine finishes packing a page.
    ///
    /// `words_placed` / `total_words` drive fine-grained progress between
    /// the pagination step's base percentage and completion.
    fn on_page_packed(&self, page_index: usize, words_placed: usize, total_words: usize) {
        let _ = (page_index, words_placed, total_words);
    }

    /// Called once with the terminal state (complete or failed).
    fn on_generation_end(&self, progress: &GenerationProgress) {
        let _ = progress;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BookletConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
