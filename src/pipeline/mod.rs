//! Pipeline stages around the pure core.
//!
//! Each submodule implements exactly one step. The core (`text`, `layout`,
//! `record`) never calls into these; the orchestrator in [`crate::convert`]
//! wires them together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ (core: prepare + plan) ──▶ render ──▶ encode ──▶ document
//! (CSV bytes)                          (raster)   (JPEG/PNG)  (PDF)
//! ```
//!
//! 1. [`input`]   : read the address book, detect its encoding, parse rows
//! 2. [`render`]  : load font and template, draw a plan onto a page; runs in
//!    `spawn_blocking` because rasterisation is CPU-bound
//! 3. [`encode`]  : JPEG for PDF embedding, PNG for `--pages-dir` export
//! 4. [`document`]: one PDF page per card via printpdf

pub mod document;
pub mod encode;
pub mod input;
pub mod render;
