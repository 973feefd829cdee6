//! Configuration types for postcard generation.
//!
//! Two structs, two concerns:
//!
//! * [`LayoutConfig`]: every coordinate, font size and offset of the card
//!   face. Pure data, serialisable, so a tuned layout for one printer can be
//!   saved as JSON and reloaded (`--layout tuned.json`).
//! * [`GenerationConfig`]: how a batch runs: which font, which template,
//!   how many records in flight, where to put page images. Holds the layout.
//!
//! Both are immutable once built and passed by reference into each stage;
//! no stage reads process-wide state.

use crate::error::HagakiError;
use crate::progress::ProgressCallback;
use ab_glyph::FontArc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

const MM_PER_INCH: f32 = 25.4;

/// Number of postal code digits (and boxes on the card).
pub const ZIP_DIGITS: usize = 7;

/// Physical geometry of the pre-printed postal code boxes, in millimetres.
///
/// Only the height and the two margins place ink: they fix the first digit's
/// origin. `width_mm` and `gap_mm` record the printed box pitch for reference;
/// the horizontal step between digits comes from
/// [`LayoutConfig::zip_digit_offsets`], which absorbs per-printer drift that a
/// uniform pitch cannot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZipBoxGeometry {
    /// Height of each digit box.
    pub height_mm: f32,
    /// Width of each digit box. Informational.
    pub width_mm: f32,
    /// Gap between adjacent boxes. Informational.
    pub gap_mm: f32,
    /// Card top edge → top of the boxes.
    pub top_margin_mm: f32,
    /// Card left edge → left edge of the first box.
    pub left_margin_mm: f32,
}

impl Default for ZipBoxGeometry {
    fn default() -> Self {
        Self {
            height_mm: 8.0,
            width_mm: 5.7,
            gap_mm: 1.3,
            top_margin_mm: 11.0,
            left_margin_mm: 46.0,
        }
    }
}

/// Geometry of the card face.
///
/// All pixel coordinates are in the page raster at [`LayoutConfig::dpi`],
/// origin top-left, y growing downward. Column X values name the column
/// centre line; each glyph is centred on it.
///
/// The defaults are tuned for a 100 × 148 mm card printed at 300 DPI.
/// Millimetre fields follow `dpi` automatically; pixel fields do not, so
/// changing resolution goes through [`LayoutConfig::at_dpi`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Raster resolution. Range: 72–1200. Default: 300.
    pub dpi: u32,
    pub postcard_width_mm: f32,
    pub postcard_height_mm: f32,

    pub name_font_size: f32,
    pub title_font_size: f32,
    pub address_font_size: f32,
    pub zip_font_size: f32,

    /// RGB text colour. Default: black.
    pub text_color: [u8; 3],

    pub address_col1_x: f32,
    pub address_col2_x: f32,
    pub address_start_y: f32,
    pub address_row_height: f32,

    pub name_col_x: f32,
    pub name_start_y: f32,
    pub name_row_height: f32,
    /// Space between the longer surname's end and the shared given-name start.
    pub given_name_gap: f32,
    /// X offset of the co-addressee column from the primary column.
    /// Negative moves it left.
    pub secondary_name_dx: f32,
    /// Space between the longer name's end and the shared title start.
    pub title_gap: f32,
    pub title_row_height: f32,

    pub zip_box: ZipBoxGeometry,
    /// Extra advance after each zip digit, by position, to land digits in
    /// the pre-printed boxes.
    pub zip_digit_offsets: [f32; ZIP_DIGITS],

    /// Honorific used when the table has no title column.
    pub default_title: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            postcard_width_mm: 100.0,
            postcard_height_mm: 148.0,
            name_font_size: 130.0,
            title_font_size: 130.0,
            address_font_size: 68.0,
            zip_font_size: 86.0,
            text_color: [0, 0, 0],
            address_col1_x: 1000.0,
            address_col2_x: 900.0,
            address_start_y: 300.0,
            address_row_height: 70.0,
            name_col_x: 650.0,
            name_start_y: 350.0,
            name_row_height: 150.0,
            given_name_gap: 100.0,
            secondary_name_dx: -150.0,
            title_gap: 10.0,
            title_row_height: 130.0,
            zip_box: ZipBoxGeometry::default(),
            zip_digit_offsets: [35.0, 35.0, 36.0, 35.0, 35.0, 34.0, 0.0],
            default_title: "様".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Create a new builder starting from the defaults.
    pub fn builder() -> LayoutConfigBuilder {
        LayoutConfigBuilder {
            config: Self::default(),
        }
    }

    /// The same layout rastered at `dpi`.
    ///
    /// Every pixel-valued field (coordinates, row heights, gaps, font sizes,
    /// zip digit offsets) is scaled by `dpi / self.dpi` so the card prints
    /// identically. Millimetre fields are unchanged.
    pub fn at_dpi(&self, dpi: u32) -> LayoutConfig {
        let k = dpi as f32 / self.dpi.max(1) as f32;
        let mut out = self.clone();
        out.dpi = dpi;
        for v in [
            &mut out.name_font_size,
            &mut out.title_font_size,
            &mut out.address_font_size,
            &mut out.zip_font_size,
            &mut out.address_col1_x,
            &mut out.address_col2_x,
            &mut out.address_start_y,
            &mut out.address_row_height,
            &mut out.name_col_x,
            &mut out.name_start_y,
            &mut out.name_row_height,
            &mut out.given_name_gap,
            &mut out.secondary_name_dx,
            &mut out.title_gap,
            &mut out.title_row_height,
        ] {
            *v *= k;
        }
        for off in &mut out.zip_digit_offsets {
            *off *= k;
        }
        out
    }

    /// Millimetres → whole pixels at this DPI, truncating.
    pub fn mm_to_px(&self, mm: f32) -> u32 {
        (mm * self.dpi as f32 / MM_PER_INCH).max(0.0) as u32
    }

    /// Raster size of one card, `(width, height)`.
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            self.mm_to_px(self.postcard_width_mm),
            self.mm_to_px(self.postcard_height_mm),
        )
    }

    /// Top-left draw position of the first zip digit.
    ///
    /// Digits are vertically centred in the box; a font taller than the box
    /// sits on the box's top edge.
    pub fn zip_origin(&self) -> (f32, f32) {
        let x = self.mm_to_px(self.zip_box.left_margin_mm) as f32;
        let box_h = self.mm_to_px(self.zip_box.height_mm) as f32;
        let inset = ((box_h - self.zip_font_size) / 2.0).max(0.0);
        let y = self.mm_to_px(self.zip_box.top_margin_mm) as f32 + inset;
        (x, y)
    }

    /// X of the co-addressee column.
    pub fn secondary_name_col_x(&self) -> f32 {
        self.name_col_x + self.secondary_name_dx
    }

    /// Check the invariants the builder enforces. Also used after a JSON
    /// layout is deserialised.
    pub fn validate(&self) -> Result<(), HagakiError> {
        if !(72..=1200).contains(&self.dpi) {
            return Err(HagakiError::InvalidConfig(format!(
                "DPI must be 72–1200, got {}",
                self.dpi
            )));
        }
        if self.postcard_width_mm <= 0.0 || self.postcard_height_mm <= 0.0 {
            return Err(HagakiError::InvalidConfig(
                "Postcard size must be positive".into(),
            ));
        }
        let sizes = [
            ("name_font_size", self.name_font_size),
            ("title_font_size", self.title_font_size),
            ("address_font_size", self.address_font_size),
            ("zip_font_size", self.zip_font_size),
            ("name_row_height", self.name_row_height),
            ("title_row_height", self.title_row_height),
            ("address_row_height", self.address_row_height),
        ];
        for (field, v) in sizes {
            if v.is_nan() || v <= 0.0 {
                return Err(HagakiError::InvalidConfig(format!(
                    "{field} must be > 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`LayoutConfig`].
#[derive(Debug)]
pub struct LayoutConfigBuilder {
    config: LayoutConfig,
}

impl LayoutConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn postcard_size_mm(mut self, width: f32, height: f32) -> Self {
        self.config.postcard_width_mm = width;
        self.config.postcard_height_mm = height;
        self
    }

    /// Set the name and title font sizes together, the usual case.
    pub fn name_font_size(mut self, size: f32) -> Self {
        self.config.name_font_size = size;
        self.config.title_font_size = size;
        self
    }

    pub fn title_font_size(mut self, size: f32) -> Self {
        self.config.title_font_size = size;
        self
    }

    pub fn address_font_size(mut self, size: f32) -> Self {
        self.config.address_font_size = size;
        self
    }

    pub fn zip_font_size(mut self, size: f32) -> Self {
        self.config.zip_font_size = size;
        self
    }

    pub fn text_color(mut self, rgb: [u8; 3]) -> Self {
        self.config.text_color = rgb;
        self
    }

    pub fn address_columns(mut self, col1_x: f32, col2_x: f32) -> Self {
        self.config.address_col1_x = col1_x;
        self.config.address_col2_x = col2_x;
        self
    }

    pub fn address_rows(mut self, start_y: f32, row_height: f32) -> Self {
        self.config.address_start_y = start_y;
        self.config.address_row_height = row_height;
        self
    }

    pub fn name_column(mut self, col_x: f32, start_y: f32, row_height: f32) -> Self {
        self.config.name_col_x = col_x;
        self.config.name_start_y = start_y;
        self.config.name_row_height = row_height;
        self
    }

    pub fn given_name_gap(mut self, gap: f32) -> Self {
        self.config.given_name_gap = gap;
        self
    }

    pub fn secondary_name_dx(mut self, dx: f32) -> Self {
        self.config.secondary_name_dx = dx;
        self
    }

    pub fn title_gap(mut self, gap: f32) -> Self {
        self.config.title_gap = gap;
        self
    }

    pub fn title_row_height(mut self, h: f32) -> Self {
        self.config.title_row_height = h;
        self
    }

    pub fn zip_box(mut self, geometry: ZipBoxGeometry) -> Self {
        self.config.zip_box = geometry;
        self
    }

    pub fn zip_digit_offsets(mut self, offsets: [f32; ZIP_DIGITS]) -> Self {
        self.config.zip_digit_offsets = offsets;
        self
    }

    pub fn default_title(mut self, title: impl Into<String>) -> Self {
        self.config.default_title = title.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<LayoutConfig, HagakiError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration for one batch run.
///
/// Built via [`GenerationConfig::builder()`] or
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use hagaki::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .font_path("NotoSansJP-Regular.ttf")
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Card face geometry.
    pub layout: LayoutConfig,

    /// Path to a TrueType/OpenType font with Japanese coverage.
    /// If None, falls back to the `HAGAKI_FONT` environment variable.
    pub font_path: Option<PathBuf>,

    /// Pre-loaded font. Takes precedence over `font_path`.
    pub font: Option<FontArc>,

    /// Background image for every card. If None, a blank white canvas of
    /// [`LayoutConfig::canvas_size`] is used.
    pub template_path: Option<PathBuf>,

    /// WHATWG encoding label forcing how the address book is decoded
    /// (`shift_jis`, `euc-jp`, `utf-8`). If None, the encoding is detected.
    pub encoding: Option<String>,

    /// Records rendered at once. Default: available parallelism, at most 8.
    pub concurrency: usize,

    /// JPEG quality for pages embedded in the PDF. Range 1–100. Default: 95.
    pub jpeg_quality: u8,

    /// Also write every page as `page-NNNN.png` into this directory.
    pub page_image_dir: Option<PathBuf>,

    /// Title stored in the PDF document info.
    pub document_title: String,

    /// Per-record progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            font_path: None,
            font: None,
            template_path: None,
            encoding: None,
            concurrency: default_concurrency(),
            jpeg_quality: 95,
            page_image_dir: None,
            document_title: "Postcards".to_string(),
            progress_callback: None,
        }
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(8)
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("layout", &self.layout)
            .field("font_path", &self.font_path)
            .field("font", &self.font.as_ref().map(|_| "<FontArc>"))
            .field("template_path", &self.template_path)
            .field("encoding", &self.encoding)
            .field("concurrency", &self.concurrency)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("page_image_dir", &self.page_image_dir)
            .field("document_title", &self.document_title)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ProgressCallback>"),
            )
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    pub fn font(mut self, font: FontArc) -> Self {
        self.config.font = Some(font);
        self
    }

    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_path = Some(path.into());
        self
    }

    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.config.encoding = Some(label.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn page_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.page_image_dir = Some(dir.into());
        self
    }

    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.config.document_title = title.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, HagakiError> {
        let c = &self.config;
        c.layout.validate()?;
        if c.concurrency == 0 {
            return Err(HagakiError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(HagakiError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_canvas_is_postcard_at_300_dpi() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.canvas_size(), (1181, 1748));
    }

    #[test]
    fn default_zip_origin() {
        // 46 mm → 543 px; 11 mm → 129 px; box 8 mm → 94 px, (94 - 86) / 2 = 4.
        let layout = LayoutConfig::default();
        assert_eq!(layout.zip_origin(), (543.0, 133.0));
    }

    #[test]
    fn zip_origin_inset_never_negative() {
        let layout = LayoutConfig::builder().zip_font_size(200.0).build().unwrap();
        assert_eq!(layout.zip_origin().1, 129.0);
    }

    #[test]
    fn secondary_column_is_left_of_primary() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.secondary_name_col_x(), 500.0);
    }

    #[test]
    fn at_dpi_scales_pixel_fields() {
        let base = LayoutConfig::default();
        let hi = base.at_dpi(600);
        assert_eq!(hi.dpi, 600);
        assert_eq!(hi.canvas_size(), (2362, 3496));
        assert_eq!(hi.name_col_x, 1300.0);
        assert_eq!(hi.secondary_name_col_x(), 1000.0);
        assert_eq!(hi.address_row_height, 140.0);
        assert_eq!(hi.name_font_size, 260.0);
        assert_eq!(hi.zip_font_size, 172.0);
        assert_eq!(hi.zip_digit_offsets[2], 72.0);
        assert_eq!(hi.zip_box, base.zip_box);
        assert_eq!(hi.postcard_width_mm, base.postcard_width_mm);
        // 46 mm → 1086 px; 11 mm → 259 px; box 8 mm → 188 px, (188 - 172) / 2 = 8.
        assert_eq!(hi.zip_origin(), (1086.0, 267.0));
    }

    #[test]
    fn at_same_dpi_is_identity() {
        let base = LayoutConfig::default();
        assert_eq!(base.at_dpi(300), base);
    }

    #[test]
    fn zip_box_width_and_gap_do_not_move_digits() {
        let base = LayoutConfig::default();
        let mut wide = base.clone();
        wide.zip_box.width_mm = 9.0;
        wide.zip_box.gap_mm = 4.0;
        assert_eq!(wide.zip_origin(), base.zip_origin());
        assert_eq!(wide.zip_digit_offsets, base.zip_digit_offsets);
    }

    #[test]
    fn builder_rejects_bad_dpi() {
        assert!(LayoutConfig::builder().dpi(10).build().is_err());
        assert!(LayoutConfig::builder().dpi(600).build().is_ok());
    }

    #[test]
    fn builder_rejects_zero_row_height() {
        let err = LayoutConfig::builder()
            .name_column(650.0, 350.0, 0.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("name_row_height"));
    }

    #[test]
    fn partial_json_layout_keeps_defaults() {
        let layout: LayoutConfig =
            serde_json::from_str(r#"{ "name_col_x": 600, "zip_box": { "gap_mm": 1.5 } }"#)
                .unwrap();
        assert_eq!(layout.name_col_x, 600.0);
        assert_eq!(layout.zip_box.gap_mm, 1.5);
        assert_eq!(layout.zip_box.height_mm, 8.0);
        assert_eq!(layout.default_title, "様");
    }

    #[test]
    fn generation_builder_clamps() {
        let c = GenerationConfig::builder()
            .concurrency(0)
            .jpeg_quality(0)
            .build()
            .unwrap();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.jpeg_quality, 1);
    }

    #[test]
    fn debug_hides_font_bytes() {
        let c = GenerationConfig::default();
        let s = format!("{c:?}");
        assert!(s.contains("GenerationConfig"));
        assert!(s.contains("font: None"));
    }
}
