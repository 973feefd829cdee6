//! Address transliteration: digits → kanji numerals, hyphens → `｜`.
//!
//! Japanese postal convention writes block and lot numbers as kanji numerals
//! in vertical text, but keeps room and unit designators (`１０１号`, `３Ｂ`,
//! `２Ｆ`) in digit form. A digit run directly followed by a letter, katakana,
//! the long-vowel mark or one of `階号室棟` is such a designator and is left
//! untouched.
//!
//! The work happens in three passes over an ordered segment list rather than
//! over a placeholder-substituted string, so protected text can never be
//! confused with input:
//!
//! 1. scan: split the text into `Protected` and `Plain` segments
//! 2. convert: transliterate `Plain` segments only
//! 3. restore: concatenate all segments in their original order

use crate::text::normalize::NormalizedText;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Full-width vertical bar used as the separator glyph in vertical text.
pub const VERTICAL_BAR: char = '｜';

/// Digit run followed by a unit/suite qualifier.
static RE_PROTECTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[０-９]+[a-zA-ZＡ-Ｚａ-ｚァ-ヶーｦ-ﾟ階号室棟]+").unwrap()
});

/// An address ready for vertical layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransliteratedAddress(String);

impl TransliteratedAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for TransliteratedAddress {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransliteratedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Plain(&'a str),
    Protected(&'a str),
}

/// Transliterate a normalized address for vertical writing.
///
/// ```
/// use hagaki::text::{normalize_fullwidth, transliterate_address};
///
/// let addr = transliterate_address(&normalize_fullwidth("1-2-3 101号室"));
/// assert_eq!(addr.as_str(), "一｜二｜三　１０１号室");
/// ```
pub fn transliterate_address(text: &NormalizedText) -> TransliteratedAddress {
    let segments = scan_protected(text.as_str());

    let mut out = String::with_capacity(text.len());
    for segment in segments {
        match segment {
            Segment::Plain(s) => out.extend(s.chars().map(convert_char)),
            Segment::Protected(s) => out.push_str(s),
        }
    }
    TransliteratedAddress(out)
}

/// Split `text` into alternating plain and protected segments, in order.
fn scan_protected(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in RE_PROTECTED.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Plain(&text[last..m.start()]));
        }
        segments.push(Segment::Protected(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::Plain(&text[last..]));
    }
    segments
}

fn convert_char(c: char) -> char {
    match c {
        '０' => '〇',
        '１' => '一',
        '２' => '二',
        '３' => '三',
        '４' => '四',
        '５' => '五',
        '６' => '六',
        '７' => '七',
        '８' => '八',
        '９' => '九',
        '-' | '－' | 'ー' => VERTICAL_BAR,
        other => other,
    }
}
