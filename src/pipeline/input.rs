//! Input loading: address book file → decoded text → [`Record`]s.
//!
//! ## Encoding detection
//!
//! Address books exported from Japanese spreadsheet software arrive as
//! UTF-8 (with or without BOM), Shift_JIS or EUC-JP, and nothing in a CSV
//! file says which. Detection is a strict trial decode: a BOM decides
//! outright, then UTF-8 is tried, then both legacy encodings. When both
//! legacy decodes are clean, the one yielding fewer half-width katakana wins
//! (ties go to Shift_JIS). An explicit label bypasses detection entirely.
//! Decoding failures are fatal and abort the batch before any record is
//! processed.

use crate::error::HagakiError;
use crate::record::{HeaderMap, Record, TableColumn};
use encoding_rs::{Encoding, EUC_JP, SHIFT_JIS, UTF_8};
use std::path::Path;
use tracing::{debug, info, warn};

/// Encodings tried, in order, when none is given.
pub const CANDIDATE_ENCODINGS: [&Encoding; 3] = [UTF_8, SHIFT_JIS, EUC_JP];

/// Read the raw bytes of an input file.
pub async fn read_input(path: &Path) -> Result<Vec<u8>, HagakiError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        Err(e) => Err(map_read_error(path, e)),
    }
}

pub(crate) fn map_read_error(path: &Path, e: std::io::Error) -> HagakiError {
    match e.kind() {
        std::io::ErrorKind::NotFound => HagakiError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => HagakiError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => HagakiError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

/// Decode an address book.
///
/// `label` is a WHATWG encoding label (`shift_jis`, `cp932`, `euc-jp`,
/// `utf-8`, …). With a label the bytes must be valid in that encoding.
/// Without one, a BOM decides; failing that, [`CANDIDATE_ENCODINGS`] are
/// tried in order.
///
/// Returns the text (BOM removed) and the encoding used.
pub fn decode_table(
    bytes: &[u8],
    label: Option<&str>,
) -> Result<(String, &'static Encoding), HagakiError> {
    if let Some(label) = label {
        let encoding = encoding_for_label(label).ok_or_else(|| {
            HagakiError::UnknownEncoding {
                label: label.to_string(),
            }
        })?;
        let text = decode_strict(bytes, encoding).ok_or_else(|| HagakiError::MalformedEncoding {
            encoding: encoding.name().to_string(),
        })?;
        return Ok((text, encoding));
    }

    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        debug!("BOM found: {}", encoding.name());
        let text = decode_strict(&bytes[bom_len..], encoding).ok_or_else(|| {
            HagakiError::MalformedEncoding {
                encoding: encoding.name().to_string(),
            }
        })?;
        return Ok((text, encoding));
    }

    if let Some(text) = decode_strict(bytes, UTF_8) {
        return Ok((text, UTF_8));
    }

    // EUC-JP kanji bytes are also valid Shift_JIS half-width katakana, so a
    // clean Shift_JIS decode alone proves little.
    let legacy: Vec<(&'static Encoding, String)> = CANDIDATE_ENCODINGS[1..]
        .iter()
        .filter_map(|&enc| decode_strict(bytes, enc).map(|text| (enc, text)))
        .collect();
    legacy
        .into_iter()
        .min_by_key(|(_, text)| halfwidth_kana_count(text))
        .map(|(enc, text)| (text, enc))
        .ok_or_else(|| HagakiError::EncodingUndetected {
            tried: CANDIDATE_ENCODINGS
                .iter()
                .map(|e| e.name())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// WHATWG label lookup, also accepting the `cp932` / `euc_jp` spellings
/// common in spreadsheet exports.
fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    Encoding::for_label(label.as_bytes())
        .or_else(|| Encoding::for_label(label.replace('_', "-").as_bytes()))
        .or_else(|| label.eq_ignore_ascii_case("cp932").then_some(SHIFT_JIS))
}

fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let text = encoding.decode_without_bom_handling_and_without_replacement(bytes)?;
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text);
    Some(text.to_string())
}

fn halfwidth_kana_count(text: &str) -> usize {
    text.chars()
        .filter(|c| ('\u{FF61}'..='\u{FF9F}').contains(c))
        .count()
}

/// Parse decoded CSV text into records.
///
/// The first row is the header. Rows may be shorter or longer than the
/// header; rows whose cells are all blank are skipped. Record indices count
/// kept rows only, so they equal page positions.
pub fn parse_table(text: &str) -> Result<Vec<Record>, HagakiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| HagakiError::CsvParse {
            detail: e.to_string(),
        })?
        .clone();
    let map = HeaderMap::from_headers(headers.iter());
    for col in [TableColumn::Name1, TableColumn::Address1, TableColumn::PostalCode] {
        if !map.contains(col) {
            warn!(
                "No '{}' column (accepted headers: {})",
                col.name(),
                col.aliases().join(", ")
            );
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| HagakiError::CsvParse {
            detail: e.to_string(),
        })?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cells: Vec<&str> = row.iter().collect();
        records.push(map.record(records.len(), &cells));
    }
    Ok(records)
}

/// Read, decode and parse an address book.
///
/// Fails with [`HagakiError::NoRecords`] when the table has no data rows.
pub async fn load_records(path: &Path, encoding: Option<&str>) -> Result<Vec<Record>, HagakiError> {
    let bytes = read_input(path).await?;
    let (text, used) = decode_table(&bytes, encoding)?;
    info!("Decoded {} as {}", path.display(), used.name());

    let records = parse_table(&text)?;
    if records.is_empty() {
        return Err(HagakiError::NoRecords {
            path: path.to_path_buf(),
        });
    }
    info!("Loaded {} records", records.len());
    Ok(records)
}
