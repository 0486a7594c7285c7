//! Alphabet provider
//!
//! Supplies the ordered letters of a language/script in the requested case,
//! and reorders them for scanning.

use tracing::warn;

use crate::settings::{LetterCase, LetterOrder};

/// English letters, most frequent first
const ENGLISH_FREQUENCY: &str = "ETAOINSHRDLCUMWFGYPBVKJXQZ";

/// Localization capability consumed by the engine
pub trait AlphabetProvider: Send {
    /// Ordered single-character letters
    fn letters(&self, language: &str, script: Option<&str>, case: LetterCase) -> Vec<char>;
}

/// Letters for a handful of common languages
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinAlphabet;

impl BuiltinAlphabet {
    fn base_letters(language: &str, script: Option<&str>) -> Option<&'static str> {
        let letters = match (language.to_ascii_lowercase().as_str(), script) {
            ("en", _) => "abcdefghijklmnopqrstuvwxyz",
            ("es", _) => "abcdefghijklmnñopqrstuvwxyz",
            ("de", _) => "abcdefghijklmnopqrstuvwxyzäöüß",
            ("fr", _) => "abcdefghijklmnopqrstuvwxyzàâçéèêëîïôùûü",
            ("el", _) => "αβγδεζηθικλμνξοπρστυφχψω",
            ("ru", _) => "абвгдеёжзийклмнопрстуфхцчшщъыьэюя",
            ("sr", Some(s)) if s.eq_ignore_ascii_case("latn") => "abcčćdđefghijklmnoprsštuvzž",
            ("sr", _) => "абвгдђежзијклљмнњопрстћуфхцчџш",
            _ => return None,
        };
        Some(letters)
    }
}

impl AlphabetProvider for BuiltinAlphabet {
    fn letters(&self, language: &str, script: Option<&str>, case: LetterCase) -> Vec<char> {
        let base = Self::base_letters(language, script).unwrap_or_else(|| {
            warn!(language, ?script, "no alphabet for language, using en");
            "abcdefghijklmnopqrstuvwxyz"
        });
        base.chars().map(|c| apply_case(c, case)).collect()
    }
}

/// Convert one letter to the given case, keeping it when the conversion
/// would not be a single character (e.g. `ß`)
pub fn apply_case(c: char, case: LetterCase) -> char {
    let mut converted: Vec<char> = match case {
        LetterCase::Upper => c.to_uppercase().collect(),
        LetterCase::Lower => c.to_lowercase().collect(),
    };
    if converted.len() == 1 {
        converted.remove(0)
    } else {
        c
    }
}

/// Convert a whole string letter by letter
pub fn apply_case_str(text: &str, case: LetterCase) -> String {
    text.chars().map(|c| apply_case(c, case)).collect()
}

/// Reorder letters for scanning
///
/// Frequency order is known for English only; letters without frequency data
/// keep their alphabetical position after the ranked ones.
pub fn scan_order(letters: Vec<char>, order: LetterOrder, language: &str) -> Vec<char> {
    if order == LetterOrder::Alphabetical || !language.eq_ignore_ascii_case("en") {
        return letters;
    }

    let rank = |c: &char| {
        let upper = apply_case(*c, LetterCase::Upper);
        ENGLISH_FREQUENCY
            .chars()
            .position(|f| f == upper)
            .unwrap_or(usize::MAX)
    };

    let mut ordered = letters;
    ordered.sort_by_key(rank);
    ordered
}
