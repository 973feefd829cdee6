//! Half-width → full-width folding.
//!
//! NFKC runs over the whole string first, then every printable ASCII
//! character is widened to its full-width form. The order matters: NFKC folds
//! full-width Latin, digits and the ideographic space back to ASCII, so a
//! second pass lands in exactly the same place as the first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use unicode_normalization::UnicodeNormalization;

/// Offset between printable ASCII (U+0021..=U+007E) and the Halfwidth and
/// Fullwidth Forms block (U+FF01..=U+FF5E).
const FULLWIDTH_OFFSET: u32 = 0xFEE0;

/// Ideographic (full-width) space.
pub const FULLWIDTH_SPACE: char = '\u{3000}';

/// A string containing no half-width Latin letters, digits, ASCII
/// punctuation or ASCII space.
///
/// Only [`normalize_fullwidth`] constructs one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub(crate) fn from_normalized(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for NormalizedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Convert any string into canonical full-width form.
///
/// * half-width katakana (with separate voiced marks) → precomposed full-width kana
/// * `A-Z a-z 0-9` and ASCII punctuation → `Ａ-Ｚ ａ-ｚ ０-９ ！-～`
/// * ASCII space → `　`
/// * everything else → its NFKC form
///
/// Total and idempotent; the empty string maps to the empty string.
pub fn normalize_fullwidth(text: &str) -> NormalizedText {
    NormalizedText(text.nfkc().map(widen).collect())
}

fn widen(c: char) -> char {
    match c {
        ' ' => FULLWIDTH_SPACE,
        '!'..='~' => char::from_u32(c as u32 + FULLWIDTH_OFFSET).unwrap_or(c),
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_digits_and_space_widen() {
        assert_eq!(normalize_fullwidth("Abc 123").as_str(), "Ａｂｃ　１２３");
    }

    #[test]
    fn halfwidth_katakana_composes() {
        assert_eq!(normalize_fullwidth("ｶﾞｰﾃﾞﾝ").as_str(), "ガーデン");
        assert_eq!(normalize_fullwidth("ﾊﾟﾚｽ").as_str(), "パレス");
    }

    #[test]
    fn already_fullwidth_is_unchanged() {
        let s = "東京都千代田区１－２　Ａ棟";
        assert_eq!(normalize_fullwidth(s).as_str(), s);
    }

    #[test]
    fn ascii_hyphen_becomes_fullwidth_hyphen() {
        assert_eq!(normalize_fullwidth("1-2-3").as_str(), "１－２－３");
    }

    #[test]
    fn compatibility_symbols_expand() {
        assert_eq!(normalize_fullwidth("㈱").as_str(), "（株）");
        assert_eq!(normalize_fullwidth("①").as_str(), "１");
    }

    #[test]
    fn empty_string() {
        assert_eq!(normalize_fullwidth("").as_str(), "");
    }

    #[test]
    fn idempotent_over_mixed_samples() {
        let samples = [
            "",
            "山田 太郎",
            "ﾔﾏﾀﾞ ﾀﾛｳ",
            "〒100-0001 東京都千代田区千代田1-1",
            "Ａｂ12　ｃD",
            "ｺｰﾎﾟ101号室",
            "A\u{0301}e\u{0332}",
            "㍻３１年 ㈱ テスト",
            "~!@#$%^&*()_+{}|:\"<>?",
        ];
        for s in samples {
            let once = normalize_fullwidth(s);
            let twice = normalize_fullwidth(&once);
            assert_eq!(once, twice, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn output_has_no_ascii() {
        let out = normalize_fullwidth("Room 3B, 1-2-3 Tokyo!");
        assert!(out.chars().all(|c| !c.is_ascii()), "got {out}");
    }
}
