//! Horizontal Zip Renderer.

use crate::config::ZIP_DIGITS;
use crate::layout::metrics::GlyphMetrics;
use crate::layout::plan::{Field, Glyph, GlyphRun};
use unicode_normalization::UnicodeNormalization;

/// Reduce a postal code cell to its ASCII digits.
///
/// NFKC runs first, so full-width digits count; every other character
/// (hyphens, spaces, a leading 〒) is dropped.
pub fn clean_postal_code(raw: &str) -> String {
    raw.nfkc().filter(|c| c.is_ascii_digit()).collect()
}

/// Place the digits of a postal code left to right from `origin`.
///
/// Non-digits are stripped first. Anything but exactly seven digits yields an
/// empty run. Each digit advances by its measured width plus the extra
/// offset for its position.
pub fn layout_zip<M: GlyphMetrics>(
    raw: &str,
    metrics: &M,
    origin: (f32, f32),
    offsets: &[f32; ZIP_DIGITS],
) -> GlyphRun {
    let digits = clean_postal_code(raw);
    if digits.len() != ZIP_DIGITS {
        return GlyphRun::new(Field::PostalCode, origin, Vec::new());
    }

    let (mut x, y) = origin;
    let glyphs = digits
        .chars()
        .zip(offsets)
        .map(|(ch, offset)| {
            let glyph = Glyph { ch, x, y };
            x += metrics.advance_width(ch) + offset;
            glyph
        })
        .collect();
    GlyphRun::new(Field::PostalCode, origin, glyphs)
}
