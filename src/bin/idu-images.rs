//! CLI binary for idu-images.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints progress and results.

use anyhow::{Context, Result};
use clap::Parser;
use idu_images::config::{DEFAULT_DPI, DEFAULT_OUT_ROOT, DEFAULT_RAW_ROOT, MIN_DPI};
use idu_images::{
    convert_dataset, plan, ClassStatus, ConversionConfig, ConversionJob, ConversionPlan,
    ConversionProgressCallback, ConversionReport, DocumentClass, FileError, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal callback: prints the `[WARN]` / `[INFO]` lines on stdout and,
/// when enabled, one progress bar per class advancing once per source file.
struct CliProgressCallback {
    /// Whether to draw bars at all (`--no-progress` turns them off).
    bars: bool,
    /// Bar of the class currently being converted.
    current: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new(bars: bool) -> Arc<Self> {
        Arc::new(Self {
            bars,
            current: Mutex::new(None),
        })
    }

    fn class_bar(class: DocumentClass, total: usize) -> ProgressBar {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix(format!("{class:<8}"));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    /// Print above the bar when one is active, else straight to stderr.
    fn println(&self, line: String) {
        match self.current.lock().unwrap().as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_class_skipped(&self, _class: DocumentClass, input_dir: &Path, status: ClassStatus) {
        match status {
            ClassStatus::MissingFolder => {
                println!("{} Missing folder: {}", yellow("[WARN]"), input_dir.display())
            }
            ClassStatus::Empty => {
                println!("{} No files found in: {}", yellow("[WARN]"), input_dir.display())
            }
            ClassStatus::Ready => {}
        }
    }

    fn on_class_start(&self, class: DocumentClass, _input_dir: &Path, total_files: usize) {
        println!("\n[INFO] Converting {class}: {total_files} files");
        if self.bars {
            *self.current.lock().unwrap() = Some(Self::class_bar(class, total_files));
        }
    }

    fn on_file_start(&self, _index: usize, _total: usize, source: &Path) {
        if let Some(bar) = self.current.lock().unwrap().as_ref() {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            bar.set_message(dim(&name));
        }
    }

    fn on_file_complete(&self, _index: usize, _total: usize, _source: &Path, _outputs: usize) {
        if let Some(bar) = self.current.lock().unwrap().as_ref() {
            bar.inc(1);
        }
    }

    fn on_file_error(&self, index: usize, total: usize, error: &FileError) {
        let msg = error.to_string();
        // Truncate very long error messages to keep output tidy.
        let msg = match msg.char_indices().nth(120) {
            Some((cut, _)) => format!("{}\u{2026}", &msg[..cut]),
            None => msg,
        };
        self.println(format!("  {} {:>4}/{:<4} {}", red("✗"), index, total, red(&msg)));

        if let Some(bar) = self.current.lock().unwrap().as_ref() {
            bar.inc(1);
        }
    }

    fn on_class_complete(&self, class: DocumentClass, converted: usize, failed: usize) {
        if let Some(bar) = self.current.lock().unwrap().take() {
            bar.finish_and_clear();
        }
        let mark = if failed == 0 { green("✔") } else { red("✘") };
        if failed == 0 {
            eprintln!("{mark} {class}: {} files converted", bold(&converted.to_string()));
        } else {
            eprintln!(
                "{mark} {class}: {} converted, {} failed",
                bold(&converted.to_string()),
                red(&failed.to_string())
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert the default tree (idu_data/raw → idu_data/images) at 300 DPI
  idu-images

  # Custom roots, lower resolution
  idu-images --raw_root data/raw --out_root data/png --dpi 150

  # Only some classes, stop at the first bad file
  idu-images --classes invoice,form --fail-fast

  # Show what would be written without converting anything
  idu-images --dry-run

  # Machine-readable report
  idu-images --json > report.json

INPUT LAYOUT:
  <raw_root>/invoice/**/*.{pdf,png,jpg,jpeg,bmp,tif,tiff,webp,jfif,heic}
  <raw_root>/contract/**/...
  <raw_root>/form/**/...

OUTPUT LAYOUT:
  <out_root>/<class>/<stem>.png        one per image
  <out_root>/<class>/<stem>_pNN.png    one per PDF page (NN from 01)

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH    Path to an existing libpdfium
  RUST_LOG           Override the log filter (e.g. idu_images=debug)
"#;

/// Convert a class-partitioned folder of PDFs and images into PNGs.
#[derive(Parser, Debug)]
#[command(
    name = "idu-images",
    version,
    about = "Convert a class-partitioned folder of PDFs and images into PNGs",
    long_about = "Walks <raw_root>/{invoice,contract,form}, rasterises every PDF page at the \
requested DPI and re-encodes every image as RGB PNG under <out_root>/<class>/. Missing or \
empty class folders are skipped with a warning.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Raw root containing invoice/, contract/ and form/.
    #[arg(long = "raw_root", visible_alias = "raw-root", env = "IDU_RAW_ROOT",
          default_value = DEFAULT_RAW_ROOT)]
    raw_root: PathBuf,

    /// Output root for PNG images.
    #[arg(long = "out_root", visible_alias = "out-root", env = "IDU_OUT_ROOT",
          default_value = DEFAULT_OUT_ROOT)]
    out_root: PathBuf,

    /// PDF render DPI (at least 1).
    #[arg(long, env = "IDU_DPI", default_value_t = DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(i64::from(MIN_DPI)..))]
    dpi: u32,

    /// Comma-separated classes to process, in order.
    #[arg(long, env = "IDU_CLASSES", value_delimiter = ',',
          default_values_t = DocumentClass::ALL)]
    classes: Vec<DocumentClass>,

    /// Abort on the first file that fails instead of continuing.
    #[arg(long, env = "IDU_FAIL_FAST")]
    fail_fast: bool,

    /// Print the planned outputs and exit without converting.
    #[arg(long)]
    dry_run: bool,

    /// Print the run report (or plan, with --dry-run) as JSON on stdout.
    #[arg(long, env = "IDU_JSON")]
    json: bool,

    /// Disable progress bars.
    #[arg(long, env = "IDU_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IDU_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IDU_QUIET")]
    quiet: bool,
}

impl Cli {
    /// Whether the terminal callback prints the `[WARN]` / `[INFO]` lines.
    fn prints_events(&self) -> bool {
        !self.quiet && !self.json && !self.dry_run
    }
}

/// Default tracing filter when `RUST_LOG` is unset.
///
/// While the terminal callback is printing, the library's own `warn!` and
/// `info!` lines would repeat its output on stderr, so only errors pass.
fn log_filter(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet || cli.prints_events() {
        "error"
    } else {
        "info"
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter(&cli))),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if cli.prints_events() {
        let cb = CliProgressCallback::new(!cli.no_progress);
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let planned = plan(&config);
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&planned).context("Failed to serialise plan")?
            );
        } else {
            print_plan(&planned);
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let report = convert_dataset(&config).context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        print_summary(&report);
    }

    // Non-zero exit when any file failed; every file was still attempted.
    report.into_result().context("Some files could not be converted")?;
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .raw_root(&cli.raw_root)
        .out_root(&cli.out_root)
        .dpi(cli.dpi)
        .classes(cli.classes.iter().copied())
        .fail_fast(cli.fail_fast);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_plan(planned: &ConversionPlan) {
    for class in &planned.classes {
        match class.status {
            ClassStatus::MissingFolder => {
                println!("[WARN] Missing folder: {}", class.input_dir.display());
                continue;
            }
            ClassStatus::Empty => {
                println!("[WARN] No files found in: {}", class.input_dir.display());
                continue;
            }
            ClassStatus::Ready => {}
        }

        println!("\n[PLAN] {}: {} files", class.class, class.jobs.len());
        for job in &class.jobs {
            let target = match job {
                ConversionJob::Pdf { source, out_dir, .. } => {
                    let stem = source
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    out_dir.join(format!("{stem}_pNN.png"))
                }
                ConversionJob::Image { out_path, .. } => out_path.clone(),
            };
            println!("  {} → {}", job.source().display(), target.display());
        }
        for path in &class.collisions {
            println!("  {} {} is produced by more than one source", yellow("!"), path.display());
        }
    }
    println!("\n{} files planned", planned.total_jobs());
}

fn print_summary(report: &ConversionReport) {
    let failed = report.failed_files();
    if failed > 0 {
        eprintln!("\n{} {} file(s) failed:", red("✘"), failed);
        for err in report.failures() {
            eprintln!("  - {err}");
        }
    }

    println!("\n[DONE] Conversion finished.");
    println!("Output: {}", report.out_root.display());
    eprintln!(
        "   {} files → {} PNGs  —  {}ms total",
        dim(&report.total_files().to_string()),
        dim(&report.total_outputs().to_string()),
        report.total_duration_ms,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("idu-images").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn dpi_has_no_upper_bound() {
        assert_eq!(parse(&["--dpi", "2400"]).dpi, 2400);
        assert!(Cli::try_parse_from(["idu-images", "--dpi", "0"]).is_err());
    }

    #[test]
    fn library_logs_stay_quiet_while_callback_prints() {
        assert_eq!(log_filter(&parse(&[])), "error");
        assert_eq!(log_filter(&parse(&["--no-progress"])), "error");
        assert_eq!(log_filter(&parse(&["--json"])), "info");
        assert_eq!(log_filter(&parse(&["--dry-run"])), "info");
        assert_eq!(log_filter(&parse(&["-v", "--no-progress"])), "debug");
    }
}
