//! Draw plans: the positioned glyphs of one card.
//!
//! A [`DrawPlan`] is the only thing the core hands to the compositor. It is
//! plain data, serialisable, and computed without touching a raster.

use crate::config::LayoutConfig;
use crate::layout::metrics::{FieldFonts, FontClass, GlyphMetrics};
use crate::layout::vertical::{layout_addresses, layout_names};
use crate::layout::zip::layout_zip;
use crate::record::PreparedRecord;
use serde::{Deserialize, Serialize};

/// One character at an absolute, top-left anchored position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub ch: char,
    pub x: f32,
    pub y: f32,
}

/// The card field a run renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Address1,
    Address2,
    Name1,
    Name2,
    Title1,
    Title2,
    PostalCode,
}

impl Field {
    pub fn font_class(self) -> FontClass {
        match self {
            Field::Address1 | Field::Address2 => FontClass::Address,
            Field::Name1 | Field::Name2 => FontClass::Name,
            Field::Title1 | Field::Title2 => FontClass::Title,
            Field::PostalCode => FontClass::Zip,
        }
    }
}

/// The glyphs of one field, in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRun {
    pub field: Field,
    /// Column line and first row for vertical runs; first digit for the zip.
    pub origin: (f32, f32),
    pub glyphs: Vec<Glyph>,
}

impl GlyphRun {
    pub fn new(field: Field, origin: (f32, f32), glyphs: Vec<Glyph>) -> Self {
        Self {
            field,
            origin,
            glyphs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// The characters of the run, in order.
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }
}

/// Everything drawn on one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawPlan {
    /// 0-based input position of the record.
    pub index: usize,
    /// `address1`, then `address2` if present.
    pub addresses: Vec<GlyphRun>,
    /// `name1`, then `name2` if present.
    pub names: Vec<GlyphRun>,
    /// `title1`, then `title2` if present.
    pub titles: Vec<GlyphRun>,
    /// Empty when the postal code is not exactly seven digits.
    pub zip: GlyphRun,
}

impl DrawPlan {
    /// All runs: addresses, names, titles, zip.
    pub fn runs(&self) -> impl Iterator<Item = &GlyphRun> {
        self.addresses
            .iter()
            .chain(&self.names)
            .chain(&self.titles)
            .chain(std::iter::once(&self.zip))
    }

    pub fn run(&self, field: Field) -> Option<&GlyphRun> {
        self.runs().find(|r| r.field == field)
    }

    pub fn glyph_count(&self) -> usize {
        self.runs().map(GlyphRun::len).sum()
    }
}

/// Compute the draw plan for one prepared record.
pub fn plan_record<M: GlyphMetrics>(
    record: &PreparedRecord,
    layout: &LayoutConfig,
    fonts: &FieldFonts<M>,
) -> DrawPlan {
    let (address1, address2) = layout_addresses(
        record.address1.as_str(),
        record.address2.as_str(),
        &fonts.address,
        layout,
    );
    let mut addresses = vec![GlyphRun::new(
        Field::Address1,
        (layout.address_col1_x, layout.address_start_y),
        address1,
    )];
    if !address2.is_empty() {
        addresses.push(GlyphRun::new(
            Field::Address2,
            (layout.address_col2_x, layout.address_start_y),
            address2,
        ));
    }

    let columns = layout_names(
        &record.name1,
        record.name2.as_ref(),
        record.title.as_str(),
        record.title2.as_str(),
        &fonts.name,
        &fonts.title,
        layout,
    );
    let secondary_x = layout.secondary_name_col_x();
    let mut names = vec![GlyphRun::new(
        Field::Name1,
        (layout.name_col_x, layout.name_start_y),
        columns.primary,
    )];
    if !columns.secondary.is_empty() {
        names.push(GlyphRun::new(
            Field::Name2,
            (secondary_x, layout.name_start_y),
            columns.secondary,
        ));
    }
    let mut titles = vec![GlyphRun::new(
        Field::Title1,
        (layout.name_col_x, columns.title_start_y),
        columns.title,
    )];
    if !columns.title2.is_empty() {
        titles.push(GlyphRun::new(
            Field::Title2,
            (secondary_x, columns.title_start_y),
            columns.title2,
        ));
    }

    let zip = layout_zip(
        &record.postal_code,
        &fonts.zip,
        layout.zip_origin(),
        &layout.zip_digit_offsets,
    );

    tracing::debug!(
        index = record.index,
        glyphs = addresses.iter().chain(&names).chain(&titles).map(GlyphRun::len).sum::<usize>()
            + zip.len(),
        "planned record"
    );

    DrawPlan {
        index: record.index,
        addresses,
        names,
        titles,
        zip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::FixedMetrics;
    use crate::record::Record;

    fn fonts() -> FieldFonts<FixedMetrics> {
        FieldFonts::uniform(FixedMetrics { width: 60.0 })
    }

    fn record() -> Record {
        Record {
            index: 3,
            name1: "山田 太郎".into(),
            name2: "花子".into(),
            postal_code: "100-0001".into(),
            address1: "東京都千代田区千代田1-1".into(),
            address2: "Ａ棟101号室".into(),
            title: None,
            title2: String::new(),
        }
    }

    #[test]
    fn plan_contains_every_present_field() {
        let layout = LayoutConfig::default();
        let (prepared, warnings) = record().prepare(&layout);
        assert!(warnings.is_empty());
        let plan = plan_record(&prepared, &layout, &fonts());

        assert_eq!(plan.index, 3);
        assert_eq!(plan.addresses.len(), 2);
        assert_eq!(plan.names.len(), 2);
        assert_eq!(plan.titles.len(), 1);
        assert_eq!(plan.zip.len(), 7);
        assert_eq!(plan.run(Field::Address1).unwrap().text(), "東京都千代田区千代田一｜一");
        assert_eq!(plan.run(Field::Address2).unwrap().text(), "Ａ棟１０１号室");
        assert_eq!(plan.run(Field::Name1).unwrap().text(), "山田太郎");
        assert_eq!(plan.run(Field::Name2).unwrap().text(), "花子");
        assert_eq!(plan.run(Field::Title1).unwrap().text(), "様");
        assert!(plan.run(Field::Title2).is_none());
    }

    #[test]
    fn malformed_zip_leaves_empty_run() {
        let layout = LayoutConfig::default();
        let mut r = record();
        r.postal_code = "123-45".into();
        let (prepared, warnings) = r.prepare(&layout);
        assert_eq!(warnings.len(), 1);
        let plan = plan_record(&prepared, &layout, &fonts());
        assert!(plan.zip.is_empty());
        assert_eq!(plan.runs().count(), 6);
    }

    #[test]
    fn glyph_count_sums_runs() {
        let layout = LayoutConfig::default();
        let (prepared, _) = record().prepare(&layout);
        let plan = plan_record(&prepared, &layout, &fonts());
        let manual: usize = plan.runs().map(|r| r.glyphs.len()).sum();
        assert_eq!(plan.glyph_count(), manual);
    }

    #[test]
    fn field_font_classes() {
        assert_eq!(Field::Address2.font_class(), FontClass::Address);
        assert_eq!(Field::Name2.font_class(), FontClass::Name);
        assert_eq!(Field::Title1.font_class(), FontClass::Title);
        assert_eq!(Field::PostalCode.font_class(), FontClass::Zip);
    }

    #[test]
    fn plan_serialises_to_json() {
        let layout = LayoutConfig::default();
        let (prepared, _) = record().prepare(&layout);
        let plan = plan_record(&prepared, &layout, &fonts());
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["index"], 3);
        assert_eq!(json["zip"]["field"], "postal_code");
        assert_eq!(json["names"][0]["glyphs"][0]["ch"], "山");
    }
}
