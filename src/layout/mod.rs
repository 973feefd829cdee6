//! Layout engine: prepared record → [`DrawPlan`].
//!
//! ## Coordinate system
//!
//! Pixels in the page raster, origin top-left, y growing downward. Vertical
//! runs name their column by its centre line; each glyph is shifted left by
//! half its ink width. The zip run is laid out left to right from its origin.
//!
//! ## Modules
//!
//! - [`metrics`] : `GlyphMetrics` trait, `ab_glyph` implementation
//! - [`vertical`]: vertical columns for names, titles and addresses
//! - [`zip`]     : horizontal postal code digits
//! - [`plan`]    : `Glyph`, `GlyphRun`, `DrawPlan`, `plan_record`

pub mod metrics;
pub mod plan;
pub mod vertical;
pub mod zip;

pub use metrics::{FieldFonts, FontClass, GlyphMetrics, ScaledFace};
pub use plan::{plan_record, DrawPlan, Field, Glyph, GlyphRun};
pub use vertical::{layout_addresses, layout_names, layout_vertical, Column, NameColumns};
pub use zip::{clean_postal_code, layout_zip};
