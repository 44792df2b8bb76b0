//! CLI binary for microprint.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BookletConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use microprint::{
    capabilities, generate, generate_to_file, inspect, BookletConfig, GenerationProgress,
    GenerationProgressCallback, GridLineStyle, ProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a single bar that tracks words placed during
/// pagination, with stage names while the parse stages run.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Bar length is set dynamically by the first `on_page_packed`, once the
    /// document word count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Switch to the full progress-bar style once `total_words` is known.
    fn activate_bar(&self, total_words: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>6}/{len} words  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_words as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Packing");
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_step(&self, progress: &GenerationProgress) {
        self.bar.set_message(format!("{:?}", progress.step).to_lowercase());
    }

    fn on_page_packed(&self, page_index: usize, words_placed: usize, total_words: usize) {
        if self.bar.length().unwrap_or(0) != total_words as u64 {
            self.activate_bar(total_words);
        }
        self.bar.set_position(words_placed as u64);
        self.bar.set_message(format!("page {}", page_index + 1));
    }

    fn on_generation_end(&self, progress: &GenerationProgress) {
        self.bar.finish_and_clear();
        if progress.is_error {
            eprintln!(
                "{} {}",
                red("✘"),
                progress.error_message.as_deref().unwrap_or("generation failed")
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Pack a novel and print the summary
  microprint moby-dick.md

  # Write the full booklet structure as JSON
  microprint moby-dick.md -o moby-dick.json

  # Smaller type, solid cutting guides, custom metadata
  microprint --font-size 4.0 --grid-line solid --title "Moby-Dick" \
      --author "Herman Melville" moby-dick.md -o out.json

  # Inspect a document without packing it
  microprint --inspect-only draft.txt

  # What does this installation accept?
  microprint --capabilities

  # Structured JSON on stdout
  microprint --json essay.md > essay.json

ACCEPTED FORMATS:
  .txt        plain text, blank-line paragraphs
  .md         CommonMark Markdown
  .markdown   CommonMark Markdown

ENVIRONMENT VARIABLES:
  MICROPRINT_OUTPUT       Default output path
  MICROPRINT_FONT_FAMILY  Default font family
  MICROPRINT_NO_PROGRESS  Disable the progress bar

NOTES:
  The built-in measurer packs a fixed character budget per cell
  (--cell-chars). Couple the packing to a real rendering surface by using
  the library's Measure trait instead of the CLI.
"#;

/// Pack prose documents into micro-print booklets.
#[derive(Parser, Debug)]
#[command(
    name = "microprint",
    version,
    about = "Pack plain-text and Markdown documents into micro-print booklets",
    long_about = "Pack a prose document into a micro-print booklet: dense pages of justified \
text on a fixed 16-cell grid with running headers, ready for a rendering surface. Accepts \
plain text and CommonMark Markdown.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to pack (.txt, .md, .markdown).
    #[arg(required_unless_present = "capabilities")]
    input: Option<PathBuf>,

    /// Write the booklet as JSON to this file instead of a stdout summary.
    #[arg(short, long, env = "MICROPRINT_OUTPUT")]
    output: Option<PathBuf>,

    /// Font family; falls back to monospace when not installed.
    #[arg(long, env = "MICROPRINT_FONT_FAMILY")]
    font_family: Option<String>,

    /// Body font size in points (2.0–12.0).
    #[arg(long, default_value_t = 4.5)]
    font_size: f32,

    /// Grid-line style: dashed, solid, dotted.
    #[arg(long, value_enum, default_value = "dashed")]
    grid_line: GridLineArg,

    /// Visible-character budget per cell for the built-in measurer.
    #[arg(long, default_value_t = 850)]
    cell_chars: usize,

    /// Reading speed for the remaining-time headers, in words per minute.
    #[arg(long, default_value_t = 215)]
    words_per_minute: u32,

    /// Booklet title (main header).
    #[arg(long)]
    title: Option<String>,

    /// Booklet author (main header).
    #[arg(long)]
    author: Option<String>,

    /// Booklet subject (main header).
    #[arg(long)]
    subject: Option<String>,

    /// Booklet date (main header).
    #[arg(long)]
    date: Option<String>,

    /// Output structured JSON (the full Booklet) instead of a summary.
    #[arg(long)]
    json: bool,

    /// Print document facts only, no pagination.
    #[arg(long)]
    inspect_only: bool,

    /// Print accepted formats and installed fonts, then exit.
    #[arg(long)]
    capabilities: bool,

    /// Disable progress bar.
    #[arg(long, env = "MICROPRINT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum GridLineArg {
    Dashed,
    Solid,
    Dotted,
}

impl From<GridLineArg> for GridLineStyle {
    fn from(v: GridLineArg) -> Self {
        match v {
            GridLineArg::Dashed => GridLineStyle::Dashed,
            GridLineArg::Solid => GridLineStyle::Solid,
            GridLineArg::Dotted => GridLineStyle::Dotted,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Capabilities mode ────────────────────────────────────────────────
    if cli.capabilities {
        let caps = capabilities();
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&caps).context("Failed to serialize capabilities")?
            );
        } else {
            println!(
                "Extensions:    {}",
                caps.extensions
                    .iter()
                    .map(|e| format!(".{e}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("Max size:      {} bytes", caps.max_document_bytes);
            println!("Fallback font: {}", caps.fallback_font);
            println!("Fonts:         {} installed", caps.fonts.len());
            for font in &caps.fonts {
                println!("  {font}");
            }
        }
        return Ok(());
    }

    let input = cli.input.clone().context("No input document given")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let summary = inspect(&input).await.context("Failed to inspect document")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
            );
        } else {
            println!("File:          {}", input.display());
            println!("Format:        {}", summary.format);
            println!("Blocks:        {}", summary.block_count);
            println!("Words:         {}", summary.word_count);
            println!("Reading time:  {}", summary.reading_time);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run generation ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = generate_to_file(&input, output_path, &config)
            .await
            .context("Generation failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} words on {} sheet(s)  {}ms  →  {}",
                green("✔"),
                stats.word_count,
                stats.sheet_count,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let booklet = generate(&input, &config)
            .await
            .context("Generation failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&booklet).context("Failed to serialize booklet")?;
            println!("{json}");
        } else if !cli.quiet {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{}", bold("Booklet"))?;
            writeln!(out, "  Format:        {}", booklet.format)?;
            writeln!(out, "  Words:         {}", booklet.stats.word_count)?;
            writeln!(out, "  Reading time:  {}", booklet.reading_time)?;
            writeln!(
                out,
                "  Layout:        {} page(s) on {} sheet(s), {} cells",
                booklet.stats.page_count, booklet.stats.sheet_count, booklet.stats.cell_count
            )?;
            writeln!(
                out,
                "  Style:         {} at {}pt, {} grid",
                booklet.stylesheet.font_family,
                booklet.stylesheet.font_size_pt,
                booklet.stylesheet.grid_line.css_keyword()
            )?;
            writeln!(
                out,
                "  {}",
                dim(&format!(
                    "packed in {}ms (use -o or --json for the full structure)",
                    booklet.stats.total_duration_ms
                ))
            )?;
        }
    }

    Ok(())
}

/// Map CLI args to `BookletConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BookletConfig> {
    let mut builder = BookletConfig::builder()
        .font_size_pt(cli.font_size)
        .grid_line(cli.grid_line.clone().into())
        .chars_per_cell(cli.cell_chars)
        .words_per_minute(cli.words_per_minute);

    if let Some(ref family) = cli.font_family {
        builder = builder.font_family(family);
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title);
    }
    if let Some(ref author) = cli.author {
        builder = builder.author(author);
    }
    if let Some(ref subject) = cli.subject {
        builder = builder.subject(subject);
    }
    if let Some(ref date) = cli.date {
        builder = builder.date(date);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
