//! CLI binary for hagaki.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GenerationConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use hagaki::{
    generate_to_file, plan_file, GenerationConfig, GenerationProgressCallback, LayoutConfig,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar showing the recipient being
/// rendered, plus one log line per record warning. Records complete out of
/// order, so the bar only counts.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Spinner until `on_batch_start` tells us the record count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading address book…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} cards  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Printing");
        self.bar.reset_eta();
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_records: usize) {
        self.activate_bar(total_records);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {total_records} postcards…"))
        ));
    }

    fn on_record_start(&self, _page_num: usize, _total: usize, recipient: &str) {
        self.bar.set_message(recipient.to_string());
    }

    fn on_record_complete(&self, _page_num: usize, _total: usize, _recipient: &str) {
        self.bar.inc(1);
    }

    fn on_record_warning(&self, _page_num: usize, warning: &str) {
        self.bar.println(format!("  {} {}", yellow("⚠"), warning));
    }

    fn on_batch_complete(&self, total_records: usize, warning_count: usize) {
        self.bar.finish_and_clear();
        if warning_count == 0 {
            eprintln!(
                "{} {} postcards rendered",
                green("✔"),
                bold(&total_records.to_string())
            );
        } else {
            eprintln!(
                "{} {} postcards rendered  ({} warnings)",
                cyan("⚠"),
                bold(&total_records.to_string()),
                yellow(&warning_count.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Address book → postcards.pdf next to it
  hagaki address_book.csv --font NotoSansJP-Regular.ttf

  # Explicit output, printed over a scanned card template
  hagaki address_book.csv -o 2026_nengajo.pdf --template card.jpg

  # Shift_JIS export from an old spreadsheet, honorific 殿
  hagaki old.csv --encoding shift_jis --title 殿

  # Tuned coordinates for one printer
  hagaki address_book.csv --layout my_printer.json

  # Inspect glyph positions without rendering
  hagaki --plan-only address_book.csv > plans.json

INPUT COLUMNS (header row required, any order):
  氏名 / name1         primary recipient, "surname given"
  氏名２ / name2       co-addressee (optional)
  郵便番号 / postal_code  7 digits, punctuation ignored
  住所１ / address1    first address line
  住所２ / address2    building / room (optional)
  敬称 / title         honorific; blank cell = none
                       (default 様 when the column is absent)
  敬称２ / title2      co-addressee honorific (optional)

ENVIRONMENT VARIABLES:
  HAGAKI_FONT          Font file with Japanese glyphs (same as --font)
  RUST_LOG             Override log filter (e.g. hagaki=debug)
"#;

/// Print Japanese postcards from a CSV address book.
#[derive(Parser, Debug)]
#[command(
    name = "hagaki",
    version,
    about = "Print Japanese postcards from a CSV address book",
    long_about = "Lay out each address book record on a postcard following Japanese postal \
conventions: vertical address and name columns with kanji numerals, and the postal code in \
the seven pre-printed boxes. Writes one PDF page per record, sized to the card.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// CSV address book (UTF-8, Shift_JIS or EUC-JP).
    input: PathBuf,

    /// Write the PDF here. Default: the input path with a .pdf extension.
    #[arg(short, long, env = "HAGAKI_OUTPUT")]
    output: Option<PathBuf>,

    /// TrueType/OpenType font with Japanese glyphs.
    #[arg(long, env = "HAGAKI_FONT")]
    font: Option<PathBuf>,

    /// Card background image. Default: a blank white card.
    #[arg(long, env = "HAGAKI_TEMPLATE")]
    template: Option<PathBuf>,

    /// JSON file overriding any layout coordinate or size.
    #[arg(long, env = "HAGAKI_LAYOUT")]
    layout: Option<PathBuf>,

    /// Input encoding label (utf-8, shift_jis, cp932, euc-jp). Default: detect.
    #[arg(long, env = "HAGAKI_ENCODING")]
    encoding: Option<String>,

    /// Raster resolution (72–1200). Rescales the layout's pixel
    /// coordinates and font sizes so the printed card is unchanged.
    #[arg(long, env = "HAGAKI_DPI",
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    dpi: Option<u32>,

    /// Honorific used when the table has no 敬称/title column.
    #[arg(long, env = "HAGAKI_TITLE")]
    title: Option<String>,

    /// Number of cards rendered at once.
    #[arg(short, long, env = "HAGAKI_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Also write each card as page-NNNN.png into this directory.
    #[arg(long, env = "HAGAKI_PAGES_DIR")]
    pages_dir: Option<PathBuf>,

    /// Print the draw plans as JSON and write no PDF.
    #[arg(long)]
    plan_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "HAGAKI_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HAGAKI_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "HAGAKI_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.plan_only;
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── Plan-only mode ───────────────────────────────────────────────────
    if cli.plan_only {
        let plans = plan_file(&cli.input, &config)
            .await
            .context("Layout failed")?;
        println!(
            "{}",
            serde_json::to_string_pretty(&plans).context("Failed to serialise draw plans")?
        );
        return Ok(());
    }

    // ── Run generation ───────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("pdf"));
    let stats = generate_to_file(&cli.input, &output_path, &config)
        .await
        .context("Postcard generation failed")?;

    if !cli.quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            if stats.warning_count == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.rendered_pages,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        if stats.zip_omitted > 0 {
            eprintln!(
                "   {}",
                dim(&format!("{} cards without a postal code", stats.zip_omitted))
            );
        }
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mut layout = match cli.layout {
        Some(ref path) => read_layout(path).await?,
        None => LayoutConfig::default(),
    };
    layout.validate().context("Invalid layout")?;
    if let Some(dpi) = cli.dpi {
        layout = layout.at_dpi(dpi);
    }
    if let Some(ref title) = cli.title {
        layout.default_title = title.clone();
    }

    let document_title = cli
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Postcards".to_string());

    let mut builder = GenerationConfig::builder()
        .layout(layout)
        .document_title(document_title);

    if let Some(ref font) = cli.font {
        builder = builder.font_path(font);
    }
    if let Some(ref template) = cli.template {
        builder = builder.template_path(template);
    }
    if let Some(ref encoding) = cli.encoding {
        builder = builder.encoding(encoding);
    }
    if let Some(n) = cli.concurrency {
        builder = builder.concurrency(n);
    }
    if let Some(ref dir) = cli.pages_dir {
        builder = builder.page_image_dir(dir);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Read a layout override file. Missing keys keep their defaults.
async fn read_layout(path: &Path) -> Result<LayoutConfig> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read layout from {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid layout JSON in {:?}", path))
}
