//! Artist name folding for lookup suggestions.
//!
//! Catalog names are matched verbatim everywhere else; these keys are only
//! used to rank "did you mean" candidates for an unknown artist.

use any_ascii::any_ascii;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Collaboration separators: &, /, comma, +, x, vs, and, with, feat, ft
pub static ARTIST_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:[&/,+×]|(?:\s+(?:x|vs\.?|and|with|feat\.?|ft\.?)\s+))\s*")
        .expect("valid separator pattern")
});

pub static MULTI_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("valid whitespace pattern"));

// ============================================================================
// FOLDING
// ============================================================================

/// Unicode combining mark (diacritic) ranges.
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

/// NFKD, drop combining marks, transliterate the rest and lowercase.
/// e.g., "Beyoncé" → "beyonce", "Mötley Crüe" → "motley crue"
pub fn fold_to_ascii(s: &str) -> String {
    let stripped: String = s.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    any_ascii(&stripped).to_lowercase()
}

/// Straighten curly quotes, spell out " & " and collapse runs of whitespace.
pub fn normalize_punctuation(s: &str) -> String {
    let result = s
        .replace(['\u{2018}', '\u{2019}', '\u{00B4}', '\u{0060}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(" & ", " and ");
    MULTI_SPACE.replace_all(&result, " ").to_string()
}

/// Comparison key for an artist name.
pub fn normalize_name(name: &str) -> String {
    let folded = fold_to_ascii(&normalize_punctuation(name));
    let key = folded.trim();
    key.strip_prefix("the ").unwrap_or(key).trim().to_string()
}

/// First credited artist of a collaboration key, if it has a separator.
/// e.g., "eminem, dido" → Some("eminem"), "beyonce" → None
pub fn primary_artist(key: &str) -> Option<&str> {
    let m = ARTIST_SEPARATOR.find(key)?;
    let primary = key[..m.start()].trim();
    if primary.len() >= 2 {
        Some(primary)
    } else {
        None
    }
}
