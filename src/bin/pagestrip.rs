//! CLI binary for pagestrip.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use pagestrip::{
    export_layout, extract, extract_to_file, inspect, BandPolicy, ExtractionConfig,
    ExtractionOutput, ExtractionStats, PageLayoutSummary, PageMarker, StageKind,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Body text of a paper, written next to it as paper.txt
  pagestrip paper.pdf

  # Skip the title page, stop after page 12, print to stdout
  pagestrip --from-page 2 --to-page 12 --stdout paper.pdf

  # Fixed 0.87 / 0.095 header and footer thresholds instead of per-page bands
  pagestrip --policy threshold paper.pdf -o paper.txt

  # Only order columns and strip margins, no page delimiters
  pagestrip --stages detect-bounds,strip-margins paper.pdf

  # Look at block positions before choosing a policy
  pagestrip --inspect-only paper.pdf

  # Save decoded geometry, correct it by hand, then run on the JSON
  pagestrip --dump-layout paper.json paper.pdf
  pagestrip paper.json -o paper.txt

STAGES (default order):
  to-page, from-page, page-numbers, detect-bounds, detect-overlap, strip-margins

ENVIRONMENT VARIABLES:
  RUST_LOG                Override the log filter (e.g. pagestrip=debug)
  PDFIUM_LIB_PATH         Path to an existing libpdfium; skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory
"#;

/// Extract the body text of PDFs, without running headers and footers.
#[derive(Parser, Debug)]
#[command(
    name = "pagestrip",
    version,
    about = "Extract the body text of PDFs, without running headers and footers",
    long_about = "Extract the body text of paginated documents page by page. Running headers, \
footers and page numbers are dropped by looking at where each page's text blocks sit, and \
two-column pages are read left column first. Accepts PDFs and JSON layout files.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file or JSON layout file.
    input: PathBuf,

    /// Write the transcript here. Default: the input path with a `.txt` extension.
    #[arg(short, long, env = "PAGESTRIP_OUTPUT", conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write the transcript to stdout instead of a file.
    #[arg(long)]
    stdout: bool,

    /// First page to emit (1-based).
    #[arg(long, env = "PAGESTRIP_FROM_PAGE",
          value_parser = clap::value_parser!(u64).range(1..))]
    from_page: Option<u64>,

    /// Last page to read (1-based). Later pages are never decoded.
    #[arg(long, env = "PAGESTRIP_TO_PAGE",
          value_parser = clap::value_parser!(u64).range(1..))]
    to_page: Option<u64>,

    /// Comma-separated stage list, applied in the given order.
    #[arg(long, env = "PAGESTRIP_STAGES", value_delimiter = ',')]
    stages: Option<Vec<StageKind>>,

    /// Drop the page-numbers stage from the chain.
    #[arg(long, env = "PAGESTRIP_NO_PAGE_NUMBERS")]
    no_page_numbers: bool,

    /// Header/footer band: per-page extremes or fixed fractions of the height.
    #[arg(long, env = "PAGESTRIP_POLICY", value_enum, default_value = "adaptive")]
    policy: PolicyArg,

    /// Relative bottom at or above which a block is a header (threshold policy).
    #[arg(long, env = "PAGESTRIP_HEADER_THRESHOLD", default_value_t = 0.87)]
    header_threshold: f64,

    /// Relative bottom at or below which a block is a footer (threshold policy).
    #[arg(long, env = "PAGESTRIP_FOOTER_THRESHOLD", default_value_t = 0.095)]
    footer_threshold: f64,

    /// Page delimiter: dashes, comment, or a custom template containing {page}.
    #[arg(long, env = "PAGESTRIP_MARKER", default_value = "dashes")]
    marker: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PAGESTRIP_PASSWORD")]
    password: Option<String>,

    /// Output structured JSON (ExtractionOutput) instead of plain text.
    #[arg(long, env = "PAGESTRIP_JSON")]
    json: bool,

    /// Print per-page block geometry only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Write the decoded page geometry as a JSON layout file and exit.
    #[arg(long, value_name = "PATH")]
    dump_layout: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAGESTRIP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAGESTRIP_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    Adaptive,
    Threshold,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Anomaly warnings are the main diagnostic, so WARN is on by default.
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // Fail on bad flags before touching the input.
    let config = build_config(&cli)?;

    // ── Ensure PDFium engine is available ───────────────────────────────────
    // Only PDF inputs need it; layout files are read without pdfium.
    #[cfg(feature = "pdf")]
    if is_pdf(&cli.input) && !pdfium_auto::is_pdfium_cached() {
        if !cli.quiet {
            eprintln!("{} Downloading PDF engine (first run only)…", dim("◆"));
        }
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let summaries = inspect(&cli.input).await.context("Failed to inspect input")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summaries).context("Failed to serialize summary")?
            );
        } else {
            print_inspection(&cli.input, &summaries);
        }
        return Ok(());
    }

    // ── Layout dump ──────────────────────────────────────────────────────
    if let Some(ref layout_path) = cli.dump_layout {
        let layout = export_layout(&cli.input, cli.password.as_deref())
            .await
            .context("Failed to decode page geometry")?;
        let json = serde_json::to_string_pretty(&layout).context("Failed to serialise layout")?;
        std::fs::write(layout_path, json)
            .with_context(|| format!("Failed to write {}", layout_path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{}  {} pages  →  {}",
                green("✔"),
                layout.pages.len(),
                bold(&layout_path.display().to_string())
            );
        }
        return Ok(());
    }

    // ── Run extraction ───────────────────────────────────────────────────
    if cli.stdout || cli.json {
        let output = extract(&cli.input, &config)
            .await
            .context("Extraction failed")?;

        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            writeln!(handle, "{json}").context("Failed to write to stdout")?;
        } else {
            handle
                .write_all(output.text.as_bytes())
                .context("Failed to write to stdout")?;
        }

        if !cli.quiet {
            print_summary(&output.stats, None);
            print_anomaly_count(&output);
        }
    } else {
        let output_path = cli
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&cli.input));
        let stats = extract_to_file(&cli.input, &output_path, &config)
            .await
            .context("Extraction failed")?;

        if !cli.quiet {
            print_summary(&stats, Some(&output_path));
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .band_policy(match cli.policy {
            PolicyArg::Adaptive => BandPolicy::Adaptive,
            PolicyArg::Threshold => BandPolicy::FixedThreshold {
                header: cli.header_threshold,
                footer: cli.footer_threshold,
            },
        })
        .page_marker(parse_marker(&cli.marker));

    if let Some(ref stages) = cli.stages {
        builder = builder.stages(stages.iter().copied());
    }
    if cli.no_page_numbers {
        builder = builder.without_page_numbers();
    }
    if let Some(from) = cli.from_page {
        builder = builder.from_page(from as usize);
    }
    if let Some(to) = cli.to_page {
        builder = builder.to_page(to as usize);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--marker` string into `PageMarker`.
fn parse_marker(s: &str) -> PageMarker {
    match s.to_lowercase().as_str() {
        "dashes" | "---" => PageMarker::Dashes,
        "comment" => PageMarker::Comment,
        _ => PageMarker::Custom(s.to_string()),
    }
}

/// `paper.pdf` → `paper.txt`
fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("txt")
}

#[cfg(feature = "pdf")]
fn is_pdf(path: &Path) -> bool {
    pagestrip::source::resolve_input(path)
        .map(|r| r.kind == pagestrip::source::InputKind::Pdf)
        .unwrap_or(false)
}

fn print_summary(stats: &ExtractionStats, written_to: Option<&Path>) {
    let anomalies = stats.ordering_anomalies + stats.overlap_anomalies;
    let tick = if anomalies == 0 { green("✔") } else { yellow("⚠") };
    let target = written_to
        .map(|p| format!("  →  {}", bold(&p.display().to_string())))
        .unwrap_or_default();
    eprintln!(
        "{}  {}/{} pages  {}ms{}",
        tick, stats.pages_emitted, stats.pages_read, stats.duration_ms, target
    );
    if anomalies > 0 {
        eprintln!(
            "   {} ordering  /  {} overlap anomalies",
            dim(&stats.ordering_anomalies.to_string()),
            dim(&stats.overlap_anomalies.to_string()),
        );
    }
}

fn print_anomaly_count(output: &ExtractionOutput) {
    let pages: Vec<String> = output
        .pages
        .iter()
        .filter(|p| !p.anomalies.is_empty())
        .map(|p| p.page_id.to_string())
        .collect();
    if !pages.is_empty() {
        eprintln!("   pages to check: {}", pages.join(", "));
    }
}

fn print_inspection(input: &Path, summaries: &[PageLayoutSummary]) {
    println!("File:   {}", input.display());
    println!("Pages:  {}", summaries.len());
    for s in summaries {
        let fmt_opt = |v: Option<f64>| v.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".into());
        println!(
            "\nPage {:>3}  {:.0} x {:.0}  {} blocks  bottoms {} .. {}  (relative {} .. {})",
            s.page_id,
            s.bounding_box.width(),
            s.bounding_box.height(),
            s.block_count,
            fmt_opt(s.min_bottom),
            fmt_opt(s.max_bottom),
            fmt_opt(s.min_relative_bottom),
            fmt_opt(s.max_relative_bottom),
        );
        for c in &s.margin_candidates {
            let first_line = c.text.lines().next().unwrap_or("");
            println!("   margin  {:.3}  {}", c.relative.bottom, dim(first_line));
        }
    }
}
