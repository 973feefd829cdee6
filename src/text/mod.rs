//! Pure text stages that run before layout.
//!
//! ```text
//! raw ──▶ normalize ──▶ address (address fields)
//!                  └──▶ name    (name fields)
//! ```
//!
//! 1. [`normalize`]: fold mixed-width input into canonical full-width form
//! 2. [`address`]  : kanji numerals and vertical separators for addresses,
//!    leaving unit/suite designators in digit form
//! 3. [`name`]     : collapse name spacing and split surname / given name
//!
//! Every function here is total: any string in, a value out, no I/O.

pub mod address;
pub mod name;
pub mod normalize;

pub use address::{transliterate_address, TransliteratedAddress};
pub use name::{normalize_name_spacing, split_name, NameParts, NameRole};
pub use normalize::{normalize_fullwidth, NormalizedText};
