//! Page Compositor: draw a [`DrawPlan`] onto a copy of the card template.
//!
//! Rendering is CPU-bound, so the orchestrator calls [`render_page`] from
//! `spawn_blocking`. The template is decoded once per batch and shared; each
//! page starts from a clone of it.

use crate::config::LayoutConfig;
use crate::error::HagakiError;
use crate::layout::{DrawPlan, FieldFonts, ScaledFace};
use crate::pipeline::input::map_read_error;
use ab_glyph::FontArc;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use std::path::Path;
use tracing::{debug, info, warn};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Load a TrueType/OpenType font from disk.
pub async fn load_font(path: &Path) -> Result<FontArc, HagakiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| map_read_error(path, e))?;
    let font = FontArc::try_from_vec(bytes).map_err(|e| HagakiError::FontLoad {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    info!("Loaded font {}", path.display());
    Ok(font)
}

/// Decode the card template image.
///
/// A template whose size differs from the layout's canvas is used as is;
/// coordinates are not rescaled.
pub async fn load_template(path: &Path, layout: &LayoutConfig) -> Result<RgbImage, HagakiError> {
    let owned = path.to_path_buf();
    let expected = layout.canvas_size();

    let template = tokio::task::spawn_blocking(move || {
        image::open(&owned)
            .map(|img| img.to_rgb8())
            .map_err(|e| HagakiError::TemplateLoad {
                path: owned,
                detail: e.to_string(),
            })
    })
    .await
    .map_err(|e| HagakiError::Internal(format!("Template task panicked: {}", e)))??;

    if template.dimensions() != expected {
        warn!(
            "Template {} is {}x{} px, layout expects {}x{} px",
            path.display(),
            template.width(),
            template.height(),
            expected.0,
            expected.1
        );
    }
    Ok(template)
}

/// A white card of the layout's canvas size.
pub fn blank_canvas(layout: &LayoutConfig) -> RgbImage {
    let (width, height) = layout.canvas_size();
    debug!("Blank canvas {}x{} px", width, height);
    RgbImage::from_pixel(width, height, WHITE)
}

/// Draw every glyph of `plan` onto a copy of `canvas`.
///
/// Each glyph is drawn top-left anchored at its planned position with the
/// face for its field's font class. Glyphs falling outside the canvas are
/// clipped.
pub fn render_page(
    plan: &DrawPlan,
    canvas: &RgbImage,
    fonts: &FieldFonts<ScaledFace>,
    color: Rgb<u8>,
) -> RgbImage {
    let mut page = canvas.clone();
    let mut buf = [0u8; 4];
    for run in plan.runs() {
        let face = fonts.get(run.field.font_class());
        for glyph in &run.glyphs {
            draw_text_mut(
                &mut page,
                color,
                glyph.x as i32,
                glyph.y as i32,
                face.scale(),
                face.font(),
                glyph.ch.encode_utf8(&mut buf),
            );
        }
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_canvas_is_white_and_sized() {
        let layout = LayoutConfig::default();
        let canvas = blank_canvas(&layout);
        assert_eq!(canvas.dimensions(), (1181, 1748));
        assert!(canvas.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn blank_canvas_follows_dpi() {
        let layout = LayoutConfig::builder().dpi(150).build().unwrap();
        assert_eq!(blank_canvas(&layout).dimensions(), (590, 874));
    }

    #[tokio::test]
    async fn missing_template_is_template_error() {
        let err = load_template(Path::new("/nonexistent/template.jpg"), &LayoutConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HagakiError::TemplateLoad { .. }));
    }

    #[tokio::test]
    async fn template_is_loaded_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.png");
        RgbImage::from_pixel(20, 30, Rgb([200, 10, 10])).save(&path).unwrap();

        let img = load_template(&path, &LayoutConfig::default()).await.unwrap();
        assert_eq!(img.dimensions(), (20, 30));
        assert_eq!(*img.get_pixel(0, 0), Rgb([200, 10, 10]));
    }

    #[tokio::test]
    async fn garbage_font_is_font_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        let err = load_font(&path).await.unwrap_err();
        assert!(matches!(err, HagakiError::FontLoad { .. }));
    }

    #[tokio::test]
    async fn missing_font_is_not_found() {
        let err = load_font(Path::new("/nonexistent/font.ttf")).await.unwrap_err();
        assert!(matches!(err, HagakiError::FileNotFound { .. }));
    }
}
