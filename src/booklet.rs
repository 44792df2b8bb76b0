//! Eager (full-document) generation entry points.
//!
//! [`generate`] runs the whole pipeline — import, normalize, tokenize,
//! paginate — and returns a [`Booklet`]: finalized pages, the resolved
//! stylesheet, and generation stats, ready for a rendering surface. The
//! structure is fully `serde`-serializable so it can cross a process
//! boundary as JSON.
//!
//! Malformed content never fails here; importers degrade to fewer blocks
//! instead. The errors that do surface are the caller's fault (unknown
//! format, oversized upload) or the measurement capability's.

use crate::config::{BookletConfig, BookletMeta};
use crate::document::DocumentFormat;
use crate::error::MicroprintError;
use crate::measure::{CharBudgetMeasure, Measure};
use crate::pipeline::paginate::{format_reading_time, Page, Paginator};
use crate::pipeline::{import, normalize, tokenize};
use crate::progress::{GenerationProgress, GenerationProgressCallback, GenerationStep};
use crate::render::Stylesheet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Counters and timings for one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub word_count: usize,
    pub token_count: usize,
    pub page_count: usize,
    pub sheet_count: usize,
    /// Cells remaining after trailing cleanup.
    pub cell_count: usize,
    pub parse_duration_ms: u64,
    pub pagination_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// A finalized booklet: everything the rendering surface needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booklet {
    pub format: DocumentFormat,
    pub meta: BookletMeta,
    pub stylesheet: Stylesheet,
    /// Estimated reading time of the whole document, as prose.
    pub reading_time: String,
    pub pages: Vec<Page>,
    pub stats: GenerationStats,
}

/// Lightweight document facts, available without paginating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub format: DocumentFormat,
    pub block_count: usize,
    pub word_count: usize,
    pub reading_time: String,
}

/// Generate a booklet from a document file.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(MicroprintError)` only for fatal errors:
/// - File not found / permission denied
/// - Unsupported extension or undecodable bytes
/// - Document larger than `config.max_document_bytes`
/// - Measurement capability failure during pagination
pub async fn generate(
    path: impl AsRef<Path>,
    config: &BookletConfig,
) -> Result<Booklet, MicroprintError> {
    let path = path.as_ref();
    info!("Starting generation: {}", path.display());

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MicroprintError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => MicroprintError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => MicroprintError::Internal(format!("Failed to read '{}': {e}", path.display())),
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    generate_from_bytes(&bytes, &name, config).await
}

/// Generate a booklet from in-memory document bytes.
///
/// `name` supplies the extension used for format detection (e.g. an upload's
/// original filename). Recommended when the document comes from a network
/// stream or database rather than a file on disk.
pub async fn generate_from_bytes(
    bytes: &[u8],
    name: &str,
    config: &BookletConfig,
) -> Result<Booklet, MicroprintError> {
    let progress = config.progress_callback.as_deref();
    if let Some(cb) = progress {
        cb.on_generation_start();
    }

    let result = run_pipeline(bytes, name, config, progress).await;

    if let Some(cb) = progress {
        match &result {
            Ok(booklet) => {
                let mut done = GenerationProgress::at_step(GenerationStep::Complete);
                done.current_sheet = Some(booklet.stats.sheet_count as u32);
                done.total_sheets = Some(booklet.stats.sheet_count as u32);
                cb.on_generation_end(&done);
            }
            Err(e) => cb.on_generation_end(&GenerationProgress::failed(e.to_string())),
        }
    }

    result
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    path: impl AsRef<Path>,
    config: &BookletConfig,
) -> Result<Booklet, MicroprintError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MicroprintError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(generate(path, config))
}

/// Generate a booklet and write it to `output_path` as pretty JSON.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn generate_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &BookletConfig,
) -> Result<GenerationStats, MicroprintError> {
    let booklet = generate(path, config).await?;
    let out = output_path.as_ref();

    let json = serde_json::to_string_pretty(&booklet)
        .map_err(|e| MicroprintError::Internal(format!("Failed to serialize booklet: {e}")))?;

    if let Some(parent) = out.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| MicroprintError::OutputWriteFailed {
                path: out.to_path_buf(),
                source: e,
            })?;
    }

    let tmp = out.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json)
        .await
        .map_err(|e| MicroprintError::OutputWriteFailed {
            path: out.to_path_buf(),
            source: e,
        })?;
    tokio::fs::rename(&tmp, out)
        .await
        .map_err(|e| MicroprintError::OutputWriteFailed {
            path: out.to_path_buf(),
            source: e,
        })?;

    Ok(booklet.stats)
}

/// Summarize a document without paginating it.
pub async fn inspect(path: impl AsRef<Path>) -> Result<DocumentSummary, MicroprintError> {
    let config = BookletConfig::default();
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MicroprintError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => MicroprintError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => MicroprintError::Internal(format!("Failed to read '{}': {e}", path.display())),
    })?;
    check_size(bytes.len(), config.max_document_bytes)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let doc = normalize::normalize(import::import(&bytes, &name)?);

    Ok(DocumentSummary {
        format: doc.format,
        block_count: doc.blocks.len(),
        word_count: doc.word_count,
        reading_time: format_reading_time(doc.word_count, config.words_per_minute),
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run_pipeline(
    bytes: &[u8],
    name: &str,
    config: &BookletConfig,
    progress: Option<&dyn GenerationProgressCallback>,
) -> Result<Booklet, MicroprintError> {
    let total_start = Instant::now();
    check_size(bytes.len(), config.max_document_bytes)?;

    // ── Parse stages ─────────────────────────────────────────────────────
    let parse_start = Instant::now();
    step(progress, GenerationStep::Importing);
    let parsed = import::import(bytes, name)?;

    step(progress, GenerationStep::Normalizing);
    let doc = normalize::normalize(parsed);

    step(progress, GenerationStep::Tokenizing);
    let tokens = tokenize::tokenize(&doc);
    let parse_duration_ms = parse_start.elapsed().as_millis() as u64;

    // ── Pagination ───────────────────────────────────────────────────────
    step(progress, GenerationStep::Paginating);
    let pagination_start = Instant::now();
    let measure: Arc<dyn Measure> = config
        .measure
        .clone()
        .unwrap_or_else(|| Arc::new(CharBudgetMeasure::new(config.chars_per_cell)));

    let mut paginator = Paginator::new(
        measure.as_ref(),
        &config.meta,
        config.words_per_minute,
        doc.word_count,
    );
    if let Some(cb) = progress {
        paginator = paginator.with_progress(cb);
    }
    let pages = paginator.run(&tokens).await?;
    let pagination_duration_ms = pagination_start.elapsed().as_millis() as u64;

    // ── Assemble ─────────────────────────────────────────────────────────
    let stylesheet = Stylesheet::resolve(config);
    let stats = GenerationStats {
        word_count: doc.word_count,
        token_count: tokens.len(),
        page_count: pages.len(),
        sheet_count: pages.len().div_ceil(2),
        cell_count: pages.iter().map(|p| p.cells.len()).sum(),
        parse_duration_ms,
        pagination_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Generation complete: {} words on {} sheets in {}ms",
        stats.word_count, stats.sheet_count, stats.total_duration_ms
    );

    Ok(Booklet {
        format: doc.format,
        meta: config.meta.clone(),
        stylesheet,
        reading_time: format_reading_time(doc.word_count, config.words_per_minute),
        pages,
        stats,
    })
}

fn check_size(size: usize, max: u64) -> Result<(), MicroprintError> {
    if size as u64 > max {
        return Err(MicroprintError::DocumentTooLarge {
            size: size as u64,
            max,
        });
    }
    Ok(())
}

fn step(progress: Option<&dyn GenerationProgressCallback>, at: GenerationStep) {
    if let Some(cb) = progress {
        cb.on_step(&GenerationProgress::at_step(at));
    }
}
