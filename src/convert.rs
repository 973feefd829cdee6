//! Batch entry points: address book in, pages (and a PDF) out.
//!
//! The pure core (`text`, `layout`, `record`) knows nothing about files,
//! threads or progress. This module is the orchestration layer around it:
//! it loads the inputs, fans records out over the blocking thread pool,
//! reports progress, and puts the pages back in input order.

use crate::config::GenerationConfig;
use crate::error::HagakiError;
use crate::layout::{plan_record, DrawPlan, FieldFonts, ScaledFace};
use crate::output::{GenerationOutput, GenerationStats, PageResult};
use crate::pipeline::{document, encode, input, render};
use crate::progress::ProgressCallback;
use crate::record::Record;
use ab_glyph::FontArc;
use futures::stream::{self, StreamExt};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Environment variable consulted when no font is configured.
pub const FONT_ENV_VAR: &str = "HAGAKI_FONT";

/// Render one page per record of an address book.
///
/// # Errors
/// Returns `Err(HagakiError)` only for fatal errors:
/// - address book missing, unreadable or undecodable
/// - no records
/// - font or template cannot be loaded
/// - a page cannot be encoded or exported
///
/// Per-record problems (bad postal code, blank name) are not errors; they
/// are collected in [`PageResult::warnings`].
pub async fn generate(
    input_path: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, HagakiError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Starting batch: {}", input_path.display());

    // ── Step 1: Load records ─────────────────────────────────────────────
    let records = input::load_records(input_path, config.encoding.as_deref()).await?;
    let total = records.len();

    // ── Step 2: Resolve rendering resources ──────────────────────────────
    let font = resolve_font(config).await?;
    let canvas = match config.template_path {
        Some(ref path) => render::load_template(path, &config.layout).await?,
        None => render::blank_canvas(&config.layout),
    };
    if let Some(ref dir) = config.page_image_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| HagakiError::OutputWriteFailed {
                path: dir.clone(),
                source: e,
            })?;
    }

    let ctx = Arc::new(BatchContext {
        fonts: FieldFonts::from_font(&font, &config.layout),
        canvas,
        config: config.clone(),
    });

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 3: Render records concurrently ──────────────────────────────
    let render_start = Instant::now();
    let worker = move |record: &Record| process_record(record, &ctx);
    let pages = render_in_order(
        records,
        config.concurrency,
        config.progress_callback.clone(),
        worker,
    )
    .await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Step 4: Stats ────────────────────────────────────────────────────
    let stats = GenerationStats {
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
        ..GenerationStats::from_pages(&pages)
    };
    info!(
        "Batch complete: {} pages, {} warnings, {}ms total",
        stats.rendered_pages, stats.warning_count, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, stats.warning_count);
    }

    Ok(GenerationOutput { pages, stats })
}

/// Render an address book and write the cards as one PDF.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn generate_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationStats, HagakiError> {
    let mut output = generate(input_path, config).await?;
    let path = output_path.as_ref();

    let pages: Vec<encode::EncodedPage> = output
        .pages
        .iter_mut()
        .map(|p| encode::EncodedPage {
            width: p.width,
            height: p.height,
            jpeg: std::mem::take(&mut p.jpeg),
        })
        .collect();
    let dpi = config.layout.dpi;
    let title = config.document_title.clone();
    let pdf = tokio::task::spawn_blocking(move || document::assemble_pdf(&pages, dpi, &title))
        .await
        .map_err(|e| HagakiError::Internal(format!("PDF task panicked: {}", e)))??;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| HagakiError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &pdf)
        .await
        .map_err(|e| HagakiError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| HagakiError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    info!("Wrote {} ({} bytes)", path.display(), pdf.len());

    Ok(output.stats)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    input_path: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, HagakiError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| HagakiError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(input_path, config))
}

/// Compute the draw plans of an address book without rendering anything.
///
/// Needs the font (glyph widths centre each character) but no template.
/// Record warnings are logged, not returned.
pub async fn plan_file(
    input_path: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<Vec<DrawPlan>, HagakiError> {
    let records = input::load_records(input_path.as_ref(), config.encoding.as_deref()).await?;
    let font = resolve_font(config).await?;
    let fonts = FieldFonts::from_font(&font, &config.layout);

    let plans = records
        .iter()
        .map(|record| {
            let (prepared, warnings) = record.prepare(&config.layout);
            for w in &warnings {
                warn!("{}", w);
            }
            plan_record(&prepared, &config.layout, &fonts)
        })
        .collect();
    Ok(plans)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run `work` over every record on the blocking pool, at most `concurrency`
/// at a time, and return the pages in input order.
///
/// Completion order is arbitrary; the result is sorted by record index.
async fn render_in_order<F>(
    records: Vec<Record>,
    concurrency: usize,
    progress: Option<ProgressCallback>,
    work: F,
) -> Result<Vec<PageResult>, HagakiError>
where
    F: Fn(&Record) -> Result<PageResult, HagakiError> + Send + Sync + 'static,
{
    let total = records.len();
    let work = Arc::new(work);
    let results: Vec<Result<PageResult, HagakiError>> = stream::iter(records.into_iter().map(|record| {
        let work = Arc::clone(&work);
        let cb = progress.clone();
        async move {
            let page_num = record.page_num();
            let recipient = record.name1.clone();
            if let Some(ref cb) = cb {
                cb.on_record_start(page_num, total, &recipient);
            }

            let page = tokio::task::spawn_blocking(move || work(&record))
                .await
                .map_err(|e| HagakiError::Internal(format!("Render task panicked: {}", e)))??;

            if let Some(ref cb) = cb {
                for w in &page.warnings {
                    cb.on_record_warning(page_num, &w.to_string());
                }
                cb.on_record_complete(page_num, total, &recipient);
            }
            Ok::<_, HagakiError>(page)
        }
    }))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await;

    let mut pages = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    pages.sort_by_key(|p| p.index);
    Ok(pages)
}

/// Read-only state shared by every record of a batch.
struct BatchContext {
    fonts: FieldFonts<ScaledFace>,
    canvas: RgbImage,
    config: GenerationConfig,
}

/// Prepare, plan, render and encode one record. Runs on the blocking pool.
fn process_record(record: &Record, ctx: &BatchContext) -> Result<PageResult, HagakiError> {
    let config = &ctx.config;
    let page_num = record.page_num();

    let (prepared, warnings) = record.prepare(&config.layout);
    for w in &warnings {
        warn!("{}", w);
    }
    let plan = plan_record(&prepared, &config.layout, &ctx.fonts);

    let page = render::render_page(&plan, &ctx.canvas, &ctx.fonts, Rgb(config.layout.text_color));
    let encoded = encode::encode_jpeg(&page, config.jpeg_quality, page_num)?;

    let image_path = match config.page_image_dir {
        Some(ref dir) => Some(encode::write_page_png(&page, dir, page_num)?),
        None => None,
    };
    debug!("Rendered page {} ({})", page_num, prepared.recipient);

    Ok(PageResult {
        index: record.index,
        page_num,
        recipient: prepared.recipient,
        plan,
        warnings,
        width: encoded.width,
        height: encoded.height,
        image_path,
        jpeg: encoded.jpeg,
    })
}

/// Resolve the font, from most-specific to least-specific.
///
/// 1. **Pre-loaded font** (`config.font`): used as-is.
/// 2. **Font path** (`config.font_path`).
/// 3. **Environment** (`HAGAKI_FONT`).
pub async fn resolve_font(config: &GenerationConfig) -> Result<FontArc, HagakiError> {
    if let Some(ref font) = config.font {
        return Ok(font.clone());
    }
    if let Some(ref path) = config.font_path {
        return render::load_font(path).await;
    }
    match std::env::var(FONT_ENV_VAR) {
        Ok(path) if !path.is_empty() => render::load_font(&PathBuf::from(path)).await,
        _ => Err(HagakiError::FontNotConfigured),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::metrics::FixedMetrics;
    use crate::progress::GenerationProgressCallback;
    use std::sync::Mutex;
    use std::time::Duration;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|index| Record {
                index,
                name1: format!("宛名 {index}"),
                postal_code: "1000001".into(),
                address1: "東京都".into(),
                ..Default::default()
            })
            .collect()
    }

    fn page_for(record: &Record) -> PageResult {
        let layout = LayoutConfig::default();
        let (prepared, warnings) = record.prepare(&layout);
        let plan = plan_record(&prepared, &layout, &FieldFonts::uniform(FixedMetrics { width: 50.0 }));
        PageResult {
            index: record.index,
            page_num: record.page_num(),
            recipient: prepared.recipient,
            plan,
            warnings,
            width: 0,
            height: 0,
            image_path: None,
            jpeg: Vec::new(),
        }
    }

    #[derive(Default)]
    struct CompletionOrder(Mutex<Vec<usize>>);

    impl GenerationProgressCallback for CompletionOrder {
        fn on_record_complete(&self, page_num: usize, _total: usize, _recipient: &str) {
            self.0.lock().unwrap().push(page_num);
        }
    }

    #[tokio::test]
    async fn pages_follow_input_order_when_completion_is_reversed() {
        const N: usize = 8;
        let order = Arc::new(CompletionOrder::default());
        let worker = |record: &Record| -> Result<PageResult, HagakiError> {
            // Earlier records take longer, so they finish last.
            std::thread::sleep(Duration::from_millis(((N - record.index) * 25) as u64));
            Ok(page_for(record))
        };

        let pages = render_in_order(records(N), N, Some(order.clone() as ProgressCallback), worker)
            .await
            .unwrap();

        let indices: Vec<usize> = pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, (0..N).collect::<Vec<_>>());
        assert_eq!(pages[0].recipient, "宛名 0");

        let completed = order.0.lock().unwrap().clone();
        assert_eq!(completed.len(), N);
        assert_ne!(completed, (1..=N).collect::<Vec<_>>(), "records did not overlap");
    }

    #[tokio::test]
    async fn failing_record_fails_the_batch() {
        let worker = |record: &Record| -> Result<PageResult, HagakiError> {
            if record.index == 2 {
                Err(HagakiError::EncodeFailed {
                    page: record.page_num(),
                    detail: "boom".into(),
                })
            } else {
                Ok(page_for(record))
            }
        };
        let err = render_in_order(records(4), 2, None, worker).await.unwrap_err();
        assert!(matches!(err, HagakiError::EncodeFailed { page: 3, .. }));
    }

    #[tokio::test]
    async fn font_path_takes_precedence_over_env() {
        let config = GenerationConfig::builder()
            .font_path("/nonexistent/font.ttf")
            .build()
            .unwrap();
        let err = resolve_font(&config).await.unwrap_err();
        assert!(matches!(err, HagakiError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn missing_input_fails_before_font_lookup() {
        let config = GenerationConfig::default();
        let err = generate("/nonexistent/address_book.csv", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, HagakiError::FileNotFound { .. }));
    }

    #[test]
    fn sync_wrapper_propagates_errors() {
        let config = GenerationConfig::default();
        let err = generate_sync("/nonexistent/address_book.csv", &config).unwrap_err();
        assert!(matches!(err, HagakiError::FileNotFound { .. }));
    }
}
