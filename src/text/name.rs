//! Name spacing and surname / given-name segmentation.

use crate::text::normalize::{NormalizedText, FULLWIDTH_SPACE};
use serde::{Deserialize, Serialize};

/// Which recipient a name belongs to.
///
/// The two roles fall back differently when a name has no separator: a
/// primary name is all surname, a secondary (co-addressee) name is all given
/// name, since a co-addressee usually shares the primary's surname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameRole {
    Primary,
    Secondary,
}

/// A name split on its first full-width space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameParts {
    pub surname: String,
    pub given: String,
}

impl NameParts {
    pub fn is_empty(&self) -> bool {
        self.surname.is_empty() && self.given.is_empty()
    }
}

/// Trim leading/trailing full-width spaces and collapse interior runs to one.
pub fn normalize_name_spacing(text: &NormalizedText) -> NormalizedText {
    let words: Vec<&str> = text
        .split(FULLWIDTH_SPACE)
        .filter(|w| !w.is_empty())
        .collect();
    // Normalized words joined by U+3000 are still normalized.
    NormalizedText::from_normalized(words.join("\u{3000}"))
}

/// Split a normalized name into surname and given name.
pub fn split_name(text: &NormalizedText, role: NameRole) -> NameParts {
    match text.split_once(FULLWIDTH_SPACE) {
        Some((surname, given)) => NameParts {
            surname: surname.to_string(),
            given: given.to_string(),
        },
        None => match role {
            NameRole::Primary => NameParts {
                surname: text.to_string(),
                given: String::new(),
            },
            NameRole::Secondary => NameParts {
                surname: String::new(),
                given: text.to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize::normalize_fullwidth;

    fn n(s: &str) -> NormalizedText {
        normalize_fullwidth(s)
    }

    #[test]
    fn spacing_trims_and_collapses() {
        assert_eq!(
            normalize_name_spacing(&n("　　山田　　太郎　　")).as_str(),
            "山田　太郎"
        );
    }

    #[test]
    fn spacing_handles_ascii_spaces_after_normalization() {
        assert_eq!(normalize_name_spacing(&n(" 山田  太郎 ")).as_str(), "山田　太郎");
    }

    #[test]
    fn spacing_of_blank_is_empty() {
        assert_eq!(normalize_name_spacing(&n("　　")).as_str(), "");
    }

    #[test]
    fn primary_split_on_space() {
        let parts = split_name(&n("山田　太郎"), NameRole::Primary);
        assert_eq!(parts.surname, "山田");
        assert_eq!(parts.given, "太郎");
    }

    #[test]
    fn split_uses_first_space_only() {
        let parts = split_name(&n("山田　花子　ジュニア"), NameRole::Primary);
        assert_eq!(parts.surname, "山田");
        assert_eq!(parts.given, "花子　ジュニア");
    }

    // The two roles disagree on a name without a separator. This mirrors how
    // existing address books are filled in and is kept deliberately.
    #[test]
    fn no_space_primary_is_surname() {
        let parts = split_name(&n("花子"), NameRole::Primary);
        assert_eq!(parts.surname, "花子");
        assert_eq!(parts.given, "");
    }

    #[test]
    fn no_space_secondary_is_given() {
        let parts = split_name(&n("花子"), NameRole::Secondary);
        assert_eq!(parts.surname, "");
        assert_eq!(parts.given, "花子");
    }

    #[test]
    fn empty_secondary_is_empty_parts() {
        let parts = split_name(&n(""), NameRole::Secondary);
        assert!(parts.is_empty());
    }
}
