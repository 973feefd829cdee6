//! Error types for the hagaki library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`HagakiError`] is **fatal**: the batch cannot proceed at all (unreadable
//!   address book, undecodable bytes, no font, PDF write failure). Returned as
//!   `Err(HagakiError)` from the top-level `generate*` functions; no partial
//!   PDF is left behind.
//!
//! * [`RecordWarning`] is **non-fatal**: one record has a problem (postal code
//!   is not 7 digits, a required field is blank) but its page is still
//!   produced. Stored inside [`crate::output::PageResult`] so callers can
//!   report them after the run.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the hagaki library.
#[derive(Debug, Error)]
pub enum HagakiError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Address book was not found at the given path.
    #[error("Address book not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure while reading an input file.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Decoding errors ───────────────────────────────────────────────────
    /// None of the candidate encodings decoded the bytes cleanly.
    #[error("Could not detect the text encoding (tried {tried}).\nPass --encoding shift_jis / euc-jp / utf-8 explicitly.")]
    EncodingUndetected { tried: String },

    /// The encoding label given by the caller is not a known WHATWG label.
    #[error("Unknown encoding label '{label}'")]
    UnknownEncoding { label: String },

    /// The caller forced an encoding but the bytes are not valid in it.
    #[error("Input is not valid {encoding}")]
    MalformedEncoding { encoding: String },

    /// The decoded text is not a well-formed table.
    #[error("Malformed CSV: {detail}")]
    CsvParse { detail: String },

    /// The table has a header but no data rows.
    #[error("No records found in '{path}'")]
    NoRecords { path: PathBuf },

    // ── Rendering resources ───────────────────────────────────────────────
    /// No font was supplied by config, path, or environment.
    #[error("No font configured.\nPass --font <FILE> or set HAGAKI_FONT to a TrueType/OpenType font with Japanese glyphs.")]
    FontNotConfigured,

    /// The font file exists but could not be parsed.
    #[error("Failed to load font '{path}': {detail}")]
    FontLoad { path: PathBuf, detail: String },

    /// The template image could not be opened or decoded.
    #[error("Failed to load template image '{path}': {detail}")]
    TemplateLoad { path: PathBuf, detail: String },

    /// A rendered page could not be encoded.
    #[error("Failed to encode page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// printpdf rejected the document.
    #[error("Failed to assemble PDF: {0}")]
    PdfAssembly(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal problem with a single record.
///
/// The record's page is still produced; the warning only explains why part
/// of it may be missing or degenerate.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum RecordWarning {
    /// The cleaned postal code is not exactly 7 digits; the zip is omitted.
    #[error("Row {row}: postal code '{digits}' is not 7 digits, zip omitted")]
    MalformedZip { row: usize, digits: String },

    /// A required field is empty after trimming; rendered as-is.
    #[error("Row {row}: required field '{field}' is empty")]
    MissingRequiredField { row: usize, field: String },
}
