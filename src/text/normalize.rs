//! Highlight keys
//!
//! Two tokens share a highlight when their surface forms agree after
//! compatibility composition (NFKC) and lowercasing.

use unicode_normalization::UnicodeNormalization;

/// Normalize a token's surface text into its highlight key
pub fn normalize_word(raw: &str) -> String {
    raw.nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_composition_share_key() {
        let composed = normalize_word("Café");
        assert_eq!(composed, "caf\u{e9}");
        assert_eq!(normalize_word("café"), composed);
        assert_eq!(normalize_word("CAFÉ"), composed);
        // e + combining acute
        assert_eq!(normalize_word("Cafe\u{0301}"), composed);
    }

    #[test]
    fn test_compatibility_forms_fold() {
        // fullwidth letters and the "ﬁ" ligature
        assert_eq!(normalize_word("ＡＢＣ"), "abc");
        assert_eq!(normalize_word("ﬁne"), "fine");
    }

    #[test]
    fn test_greek_and_hebrew() {
        assert_eq!(normalize_word("ΛΌΓΟΣ"), "λόγος".nfkc().collect::<String>());
        assert_eq!(normalize_word("שָׁלוֹם"), "שָׁלוֹם".nfkc().collect::<String>());
    }
}
