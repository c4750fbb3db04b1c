//! Script-based language detection
//!
//! A heuristic, not a language identifier: the first script found wins, in
//! the order Han, Japanese kana (plus the CJK unified block), Latin.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static HAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Han}").unwrap());

/// Hiragana, Katakana and U+4E00..U+9FAF
static JAPANESE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{3041}-\x{309F}\x{30A0}-\x{30FF}\x{4E00}-\x{9FAF}]").unwrap()
});

/// Language of the learner's input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    Zh,
    Ja,
    En,
    Other,
}

impl DetectedLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::Ja => "ja",
            Self::En => "en",
            Self::Other => "other",
        }
    }

    /// Whether the learner wrote in the language Kai coaches (English)
    pub fn is_english(&self) -> bool {
        matches!(self, Self::En)
    }
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `text` by the scripts it contains
pub fn detect_language(text: &str) -> DetectedLanguage {
    if HAN.is_match(text) {
        DetectedLanguage::Zh
    } else if JAPANESE.is_match(text) {
        DetectedLanguage::Ja
    } else if text.chars().any(|c| c.is_ascii_alphabetic()) {
        DetectedLanguage::En
    } else {
        DetectedLanguage::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_han_only_is_zh() {
        assert_eq!(detect_language("你好"), DetectedLanguage::Zh);
    }

    #[test]
    fn test_hiragana_only_is_ja() {
        assert_eq!(detect_language("こんにちは"), DetectedLanguage::Ja);
    }

    #[test]
    fn test_katakana_only_is_ja() {
        assert_eq!(detect_language("コーヒー"), DetectedLanguage::Ja);
    }

    #[test]
    fn test_ascii_letters_are_en() {
        assert_eq!(detect_language("Hello there"), DetectedLanguage::En);
        assert_eq!(detect_language("  x1  "), DetectedLanguage::En);
    }

    #[test]
    fn test_empty_and_digits_are_other() {
        assert_eq!(detect_language(""), DetectedLanguage::Other);
        assert_eq!(detect_language("12345"), DetectedLanguage::Other);
        assert_eq!(detect_language("?!"), DetectedLanguage::Other);
    }

    #[test]
    fn test_non_ascii_latin_is_other() {
        assert_eq!(detect_language("éé"), DetectedLanguage::Other);
    }

    #[test]
    fn test_han_takes_precedence() {
        // Kanji in otherwise Japanese text still classifies as zh
        assert_eq!(detect_language("私はhappy"), DetectedLanguage::Zh);
        assert_eq!(detect_language("I like 火锅"), DetectedLanguage::Zh);
    }

    #[test]
    fn test_kana_takes_precedence_over_latin() {
        assert_eq!(detect_language("OK です"), DetectedLanguage::Ja);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let text = "mixed テキスト 123";
        assert_eq!(detect_language(text), detect_language(text));
    }
}
