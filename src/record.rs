//! Recipient records and their header-name mapping.
//!
//! A [`Record`] is one row of the address book exactly as read (cells trimmed,
//! nothing else). [`Record::prepare`] runs the text stages over it and yields
//! a [`PreparedRecord`], the input of the layout engine.

use crate::config::{LayoutConfig, ZIP_DIGITS};
use crate::error::RecordWarning;
use crate::layout::zip::clean_postal_code;
use crate::text::{
    normalize_fullwidth, normalize_name_spacing, split_name, transliterate_address, NameParts,
    NameRole, NormalizedText, TransliteratedAddress,
};
use serde::{Deserialize, Serialize};

/// A column of the address book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableColumn {
    Name1,
    Name2,
    PostalCode,
    Address1,
    Address2,
    Title,
    Title2,
}

impl TableColumn {
    pub const ALL: [TableColumn; 7] = [
        TableColumn::Name1,
        TableColumn::Name2,
        TableColumn::PostalCode,
        TableColumn::Address1,
        TableColumn::Address2,
        TableColumn::Title,
        TableColumn::Title2,
    ];

    /// Header names recognised for this column.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            TableColumn::Name1 => &["name1", "氏名", "氏名１", "氏名1"],
            TableColumn::Name2 => &["name2", "氏名２", "氏名2"],
            TableColumn::PostalCode => &["postal_code", "郵便番号"],
            TableColumn::Address1 => &["address1", "住所１", "住所1"],
            TableColumn::Address2 => &["address2", "住所２", "住所2"],
            TableColumn::Title => &["title", "敬称", "敬称１", "敬称1"],
            TableColumn::Title2 => &["title2", "敬称２", "敬称2"],
        }
    }

    /// The canonical (English) header name.
    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }

    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL
            .into_iter()
            .find(|col| col.aliases().contains(&header))
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Cell positions of the known columns in one table.
///
/// When two headers map to the same column the leftmost wins; unknown headers
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    positions: [Option<usize>; 7],
}

impl HeaderMap {
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = Self::default();
        for (pos, header) in headers.into_iter().enumerate() {
            if let Some(col) = TableColumn::from_header(header) {
                map.positions[col.slot()].get_or_insert(pos);
            }
        }
        map
    }

    pub fn position(&self, col: TableColumn) -> Option<usize> {
        self.positions[col.slot()]
    }

    pub fn contains(&self, col: TableColumn) -> bool {
        self.position(col).is_some()
    }

    /// Build the record at input position `index` from one row of cells.
    ///
    /// Missing cells (short rows, absent columns) read as empty.
    pub fn record(&self, index: usize, cells: &[&str]) -> Record {
        let cell = |col: TableColumn| -> String {
            self.position(col)
                .and_then(|pos| cells.get(pos))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        // Only a missing column falls back to the default; a blank cell
        // means "no honorific" for that record.
        let title = self.contains(TableColumn::Title).then(|| cell(TableColumn::Title));
        Record {
            index,
            name1: cell(TableColumn::Name1),
            name2: cell(TableColumn::Name2),
            postal_code: cell(TableColumn::PostalCode),
            address1: cell(TableColumn::Address1),
            address2: cell(TableColumn::Address2),
            title,
            title2: cell(TableColumn::Title2),
        }
    }
}

/// One recipient, as read from the address book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 0-based input position; page `index + 1` of the output.
    pub index: usize,
    pub name1: String,
    /// Co-addressee; empty when absent.
    pub name2: String,
    pub postal_code: String,
    pub address1: String,
    pub address2: String,
    /// `None` (no title column) means "use the configured default
    /// honorific"; `Some("")` means no honorific.
    pub title: Option<String>,
    pub title2: String,
}

/// A record after normalization, transliteration and segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedRecord {
    pub index: usize,
    /// Primary name as read, for progress display.
    pub recipient: String,
    pub name1: NameParts,
    /// `None` when there is no co-addressee.
    pub name2: Option<NameParts>,
    pub title: NormalizedText,
    pub title2: NormalizedText,
    pub address1: TransliteratedAddress,
    pub address2: TransliteratedAddress,
    /// ASCII digits only; may be any length.
    pub postal_code: String,
}

impl Record {
    /// 1-based page number of this record.
    pub fn page_num(&self) -> usize {
        self.index + 1
    }

    /// Run the text stages over every field.
    ///
    /// Never fails. Problems that affect the page are returned as warnings:
    /// a blank `name1` or `address1`, and a postal code that is not exactly
    /// seven digits (the zip is then omitted from the plan).
    pub fn prepare(&self, layout: &LayoutConfig) -> (PreparedRecord, Vec<RecordWarning>) {
        let row = self.page_num();
        let mut warnings = Vec::new();

        let name1 = normalize_name_spacing(&normalize_fullwidth(&self.name1));
        if name1.is_empty() {
            warnings.push(RecordWarning::MissingRequiredField {
                row,
                field: TableColumn::Name1.name().to_string(),
            });
        }
        let name2 = normalize_name_spacing(&normalize_fullwidth(&self.name2));

        let address1 = transliterate_address(&normalize_fullwidth(&self.address1));
        if address1.is_empty() {
            warnings.push(RecordWarning::MissingRequiredField {
                row,
                field: TableColumn::Address1.name().to_string(),
            });
        }
        let address2 = transliterate_address(&normalize_fullwidth(&self.address2));

        let postal_code = clean_postal_code(&self.postal_code);
        if postal_code.len() != ZIP_DIGITS {
            warnings.push(RecordWarning::MalformedZip {
                row,
                digits: postal_code.clone(),
            });
        }

        let title = self.title.as_deref().unwrap_or(&layout.default_title);

        let prepared = PreparedRecord {
            index: self.index,
            recipient: self.name1.clone(),
            name1: split_name(&name1, NameRole::Primary),
            name2: (!name2.is_empty()).then(|| split_name(&name2, NameRole::Secondary)),
            title: normalize_fullwidth(title),
            title2: normalize_fullwidth(&self.title2),
            address1,
            address2,
            postal_code,
        };
        (prepared, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn japanese_and_english_headers() {
        assert_eq!(TableColumn::from_header("氏名"), Some(TableColumn::Name1));
        assert_eq!(TableColumn::from_header("氏名２"), Some(TableColumn::Name2));
        assert_eq!(TableColumn::from_header(" 郵便番号 "), Some(TableColumn::PostalCode));
        assert_eq!(TableColumn::from_header("address2"), Some(TableColumn::Address2));
        assert_eq!(TableColumn::from_header("敬称２"), Some(TableColumn::Title2));
        assert_eq!(TableColumn::from_header("備考"), None);
    }

    #[test]
    fn header_map_is_order_independent() {
        let map = HeaderMap::from_headers(["住所１", "備考", "氏名", "郵便番号"]);
        assert_eq!(map.position(TableColumn::Address1), Some(0));
        assert_eq!(map.position(TableColumn::Name1), Some(2));
        assert_eq!(map.position(TableColumn::PostalCode), Some(3));
        assert!(!map.contains(TableColumn::Title));
    }

    #[test]
    fn duplicate_header_leftmost_wins() {
        let map = HeaderMap::from_headers(["name1", "氏名"]);
        assert_eq!(map.position(TableColumn::Name1), Some(0));
    }

    #[test]
    fn record_trims_and_pads() {
        let map = HeaderMap::from_headers(["氏名", "郵便番号", "住所１", "住所２", "敬称"]);
        let r = map.record(0, &["  山田 太郎 ", "100-0001", "東京都"]);
        assert_eq!(r.name1, "山田 太郎");
        assert_eq!(r.address2, "");
        assert_eq!(r.title.as_deref(), Some(""));
        assert_eq!(r.title2, "");
    }

    #[test]
    fn blank_title_cell_means_no_honorific() {
        let layout = LayoutConfig::default();
        let map = HeaderMap::from_headers(["氏名", "敬称"]);
        let r = map.record(0, &["株式会社山田商店", "  "]);
        assert_eq!(r.title.as_deref(), Some(""));
        let (p, _) = r.prepare(&layout);
        assert_eq!(p.title.as_str(), "");
    }

    #[test]
    fn missing_title_column_uses_default() {
        let layout = LayoutConfig::default();
        let map = HeaderMap::from_headers(["氏名", "住所１"]);
        let r = map.record(0, &["山田", "東京都"]);
        assert_eq!(r.title, None);
        let (p, _) = r.prepare(&layout);
        assert_eq!(p.title.as_str(), "様");
    }

    #[test]
    fn explicit_title_is_normalized() {
        let layout = LayoutConfig::default();
        let r = Record {
            title: Some("ﾄﾉ".into()),
            ..Default::default()
        };
        let (p, _) = r.prepare(&layout);
        assert_eq!(p.title.as_str(), "トノ");
    }

    #[test]
    fn prepare_runs_text_stages() {
        let layout = LayoutConfig::default();
        let r = Record {
            index: 0,
            name1: "ﾔﾏﾀﾞ  ﾀﾛｳ".into(),
            name2: " 花子 ".into(),
            postal_code: "１００－０００１".into(),
            address1: "千代田1-2-3".into(),
            address2: "2F".into(),
            title: None,
            title2: "様".into(),
        };
        let (p, warnings) = r.prepare(&layout);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(p.name1.surname, "ヤマダ");
        assert_eq!(p.name1.given, "タロウ");
        assert_eq!(
            p.name2,
            Some(NameParts {
                surname: String::new(),
                given: "花子".into()
            })
        );
        assert_eq!(p.postal_code, "1000001");
        assert_eq!(p.address1.as_str(), "千代田一｜二｜三");
        assert_eq!(p.address2.as_str(), "２Ｆ");
        assert_eq!(p.title.as_str(), "様");
        assert_eq!(p.title2.as_str(), "様");
    }

    #[test]
    fn blank_name2_is_absent() {
        let layout = LayoutConfig::default();
        let r = Record {
            name2: "　".into(),
            ..Default::default()
        };
        let (p, _) = r.prepare(&layout);
        assert_eq!(p.name2, None);
    }

    #[test]
    fn warnings_for_missing_fields_and_bad_zip() {
        let layout = LayoutConfig::default();
        let r = Record {
            index: 4,
            postal_code: "123-45".into(),
            ..Default::default()
        };
        let (p, warnings) = r.prepare(&layout);
        assert_eq!(
            warnings,
            vec![
                RecordWarning::MissingRequiredField {
                    row: 5,
                    field: "name1".into()
                },
                RecordWarning::MissingRequiredField {
                    row: 5,
                    field: "address1".into()
                },
                RecordWarning::MalformedZip {
                    row: 5,
                    digits: "12345".into()
                },
            ]
        );
        // Degenerate but still prepared.
        assert!(p.name1.is_empty());
    }
}
