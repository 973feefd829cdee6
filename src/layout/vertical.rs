//! Vertical Layout Engine.
//!
//! Every character sits in its own row; rows advance by a fixed per-field
//! height and glyphs are centred on the column line using their measured ink
//! width. Nothing wraps and nothing is clipped: a long field simply runs past
//! the bottom of the card.
//!
//! Names and titles are laid out in two explicit passes. Pass one measures
//! where each surname (and then each whole name) ends; pass two places the
//! dependent fields at the maximum of those ends, so both columns share a
//! given-name baseline and a title baseline.

use crate::config::LayoutConfig;
use crate::layout::metrics::GlyphMetrics;
use crate::layout::plan::Glyph;
use crate::text::name::NameParts;

/// A vertical column: centre line X, first row Y, per-character advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub x: f32,
    pub start_y: f32,
    pub row_height: f32,
}

impl Column {
    pub fn new(x: f32, start_y: f32, row_height: f32) -> Self {
        Self {
            x,
            start_y,
            row_height,
        }
    }

    /// Y just past the last row of `text`, without laying it out.
    pub fn end_y(&self, text: &str) -> f32 {
        self.start_y + text.chars().count() as f32 * self.row_height
    }

    fn at(self, start_y: f32) -> Self {
        Self { start_y, ..self }
    }
}

/// Lay `text` out top to bottom in `column`.
///
/// Returns the positioned glyphs and the Y just past the last row (the start
/// Y for empty text).
pub fn layout_vertical<M: GlyphMetrics>(
    text: &str,
    metrics: &M,
    column: Column,
) -> (Vec<Glyph>, f32) {
    let mut glyphs = Vec::with_capacity(text.len() / 3);
    let mut y = column.start_y;
    for ch in text.chars() {
        let x = column.x - metrics.ink_width(ch) / 2.0;
        glyphs.push(Glyph { ch, x, y });
        y += column.row_height;
    }
    (glyphs, y)
}

/// Laid-out name and title columns for one card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameColumns {
    pub primary: Vec<Glyph>,
    /// Empty when there is no co-addressee.
    pub secondary: Vec<Glyph>,
    pub title: Vec<Glyph>,
    /// Empty when there is no second title.
    pub title2: Vec<Glyph>,
    /// Shared Y at which both given names start.
    pub given_start_y: f32,
    /// Shared Y at which both titles start.
    pub title_start_y: f32,
}

/// Lay out the primary name, the optional co-addressee and their titles.
///
/// The primary title is always placed (an empty title yields no glyphs); the
/// second title only when non-empty. A secondary name counts only when it is
/// present and non-empty.
pub fn layout_names<N: GlyphMetrics, T: GlyphMetrics>(
    primary: &NameParts,
    secondary: Option<&NameParts>,
    title: &str,
    title2: &str,
    name_metrics: &N,
    title_metrics: &T,
    layout: &LayoutConfig,
) -> NameColumns {
    let secondary = secondary.filter(|parts| !parts.is_empty());
    let col1 = Column::new(layout.name_col_x, layout.name_start_y, layout.name_row_height);
    let col2 = Column {
        x: layout.secondary_name_col_x(),
        ..col1
    };

    // Pass 1: surname ends. An absent secondary surname ends where it starts.
    let surname1_end = col1.end_y(&primary.surname);
    let surname2_end = secondary
        .map(|parts| col2.end_y(&parts.surname))
        .unwrap_or(col1.start_y);
    let given_start_y = surname1_end.max(surname2_end) + layout.given_name_gap;

    // Pass 1b: whole-name ends, given the shared given-name start.
    let name_end = |col: Column, parts: &NameParts| {
        if parts.given.is_empty() {
            col.end_y(&parts.surname)
        } else {
            col.at(given_start_y).end_y(&parts.given)
        }
    };
    let name1_end = name_end(col1, primary);
    let name2_end = secondary
        .map(|parts| name_end(col2, parts))
        .unwrap_or(col1.start_y);
    let title_start_y = name1_end.max(name2_end) + layout.title_gap;

    // Pass 2: place everything.
    let place_name = |col: Column, parts: &NameParts| {
        let (mut glyphs, _) = layout_vertical(&parts.surname, name_metrics, col);
        let (given, _) = layout_vertical(&parts.given, name_metrics, col.at(given_start_y));
        glyphs.extend(given);
        glyphs
    };
    let primary_glyphs = place_name(col1, primary);
    let secondary_glyphs = secondary
        .map(|parts| place_name(col2, parts))
        .unwrap_or_default();

    let title_col1 = Column::new(col1.x, title_start_y, layout.title_row_height);
    let title_col2 = Column {
        x: col2.x,
        ..title_col1
    };
    let (title_glyphs, _) = layout_vertical(title, title_metrics, title_col1);
    let title2_glyphs = if title2.is_empty() {
        Vec::new()
    } else {
        layout_vertical(title2, title_metrics, title_col2).0
    };

    tracing::trace!(given_start_y, title_start_y, "name columns unified");

    NameColumns {
        primary: primary_glyphs,
        secondary: secondary_glyphs,
        title: title_glyphs,
        title2: title2_glyphs,
        given_start_y,
        title_start_y,
    }
}

/// Lay out the address columns. The second column is skipped when empty.
pub fn layout_addresses<M: GlyphMetrics>(
    address1: &str,
    address2: &str,
    metrics: &M,
    layout: &LayoutConfig,
) -> (Vec<Glyph>, Vec<Glyph>) {
    let col1 = Column::new(
        layout.address_col1_x,
        layout.address_start_y,
        layout.address_row_height,
    );
    let col2 = Column {
        x: layout.address_col2_x,
        ..col1
    };
    let (first, _) = layout_vertical(address1, metrics, col1);
    let second = if address2.is_empty() {
        Vec::new()
    } else {
        layout_vertical(address2, metrics, col2).0
    };
    (first, second)
}
