//! Font-metrics seam between the layout engine and a real font.
//!
//! The layout engine only needs two numbers per character: how far the pen
//! advances and how wide the ink is. [`GlyphMetrics`] exposes exactly that, so
//! layout can be computed (and tested) without a font file; [`ScaledFace`] is
//! the production implementation over `ab_glyph`.

use crate::config::LayoutConfig;
use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use serde::{Deserialize, Serialize};

/// Per-character measurements at one font size, in pixels.
pub trait GlyphMetrics {
    /// Horizontal pen advance after drawing `ch`.
    fn advance_width(&self, ch: char) -> f32;

    /// Width of the inked bounding box of `ch`. Blank glyphs measure 0.
    fn ink_width(&self, ch: char) -> f32;
}

impl<M: GlyphMetrics + ?Sized> GlyphMetrics for &M {
    fn advance_width(&self, ch: char) -> f32 {
        (**self).advance_width(ch)
    }

    fn ink_width(&self, ch: char) -> f32 {
        (**self).ink_width(ch)
    }
}

/// The four font size classes on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontClass {
    Name,
    Title,
    Address,
    Zip,
}

/// A font at a fixed pixel size.
#[derive(Clone)]
pub struct ScaledFace {
    font: FontArc,
    scale: PxScale,
}

impl ScaledFace {
    pub fn new(font: FontArc, size: f32) -> Self {
        Self {
            font,
            scale: PxScale::from(size),
        }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    pub fn scale(&self) -> PxScale {
        self.scale
    }
}

impl std::fmt::Debug for ScaledFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaledFace")
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

impl GlyphMetrics for ScaledFace {
    fn advance_width(&self, ch: char) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        scaled.h_advance(self.font.glyph_id(ch))
    }

    fn ink_width(&self, ch: char) -> f32 {
        let glyph = self.font.glyph_id(ch).with_scale(self.scale);
        self.font
            .outline_glyph(glyph)
            .map(|outlined| outlined.px_bounds().width())
            .unwrap_or(0.0)
    }
}

/// One metrics source per [`FontClass`].
#[derive(Debug, Clone)]
pub struct FieldFonts<M> {
    pub name: M,
    pub title: M,
    pub address: M,
    pub zip: M,
}

impl<M> FieldFonts<M> {
    pub fn get(&self, class: FontClass) -> &M {
        match class {
            FontClass::Name => &self.name,
            FontClass::Title => &self.title,
            FontClass::Address => &self.address,
            FontClass::Zip => &self.zip,
        }
    }
}

impl<M: Clone> FieldFonts<M> {
    /// Use the same metrics for every class.
    pub fn uniform(metrics: M) -> Self {
        Self {
            name: metrics.clone(),
            title: metrics.clone(),
            address: metrics.clone(),
            zip: metrics,
        }
    }
}

impl FieldFonts<ScaledFace> {
    /// Scale one font to each class's size from the layout.
    pub fn from_font(font: &FontArc, layout: &LayoutConfig) -> Self {
        Self {
            name: ScaledFace::new(font.clone(), layout.name_font_size),
            title: ScaledFace::new(font.clone(), layout.title_font_size),
            address: ScaledFace::new(font.clone(), layout.address_font_size),
            zip: ScaledFace::new(font.clone(), layout.zip_font_size),
        }
    }
}

/// Monospace metrics for tests: every glyph advances and inks `width`.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedMetrics {
    pub width: f32,
}

#[cfg(test)]
impl GlyphMetrics for FixedMetrics {
    fn advance_width(&self, _ch: char) -> f32 {
        self.width
    }

    fn ink_width(&self, ch: char) -> f32 {
        if ch == '\u{3000}' {
            0.0
        } else {
            self.width
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_fonts_get_by_class() {
        let fonts = FieldFonts {
            name: 1,
            title: 2,
            address: 3,
            zip: 4,
        };
        assert_eq!(*fonts.get(FontClass::Name), 1);
        assert_eq!(*fonts.get(FontClass::Title), 2);
        assert_eq!(*fonts.get(FontClass::Address), 3);
        assert_eq!(*fonts.get(FontClass::Zip), 4);
    }

    #[test]
    fn reference_forwards_metrics() {
        let m = FixedMetrics { width: 12.0 };
        let r: &dyn GlyphMetrics = &m;
        assert_eq!((&r).advance_width('あ'), 12.0);
        assert_eq!((&r).ink_width('\u{3000}'), 0.0);
    }
}
