//! # hagaki
//!
//! Print Japanese postcards (hagaki) from an address book.
//!
//! Addresses and names are written vertically, one character per row, with
//! block numbers in kanji numerals; the postal code is written horizontally
//! into the seven pre-printed boxes. Each record of a CSV address book
//! becomes one page of a PDF sized to the card.
//!
//! ## Pipeline Overview
//!
//! ```text
//! CSV
//!  │
//!  ├─ 1. Input      read, detect encoding (UTF-8 / Shift_JIS / EUC-JP), parse
//!  ├─ 2. Normalize  half-width → full-width, name spacing
//!  ├─ 3. Address    digits → kanji numerals, hyphens → ｜, unit numbers kept
//!  ├─ 4. Layout     per-glyph coordinates, shared name and title baselines
//!  ├─ 5. Render     draw onto the template (CPU-bound, spawn_blocking)
//!  └─ 6. Output     JPEG pages → one PDF, optional PNG per page
//! ```
//!
//! Steps 2–4 are pure functions of one record and the [`LayoutConfig`];
//! they live in [`text`], [`record`] and [`layout`] and can be used without
//! a runtime or a font file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hagaki::{generate_to_file, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GenerationConfig::builder()
//!         .font_path("NotoSansJP-Regular.ttf")
//!         .build()?;
//!     let stats = generate_to_file("address_book.csv", "postcards.pdf", &config).await?;
//!     eprintln!("{} pages, {} warnings", stats.rendered_pages, stats.warning_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `hagaki` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! hagaki = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod text;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    GenerationConfig, GenerationConfigBuilder, LayoutConfig, LayoutConfigBuilder, ZipBoxGeometry,
};
pub use convert::{generate, generate_sync, generate_to_file, plan_file};
pub use error::{HagakiError, RecordWarning};
pub use layout::{plan_record, DrawPlan, FieldFonts, GlyphMetrics, GlyphRun};
pub use output::{GenerationOutput, GenerationStats, PageResult};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use record::{PreparedRecord, Record};
