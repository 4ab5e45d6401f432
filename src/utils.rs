//! Common utility functions shared across the codebase.

/// Character class of the source-language text the extractors look for:
/// CJK punctuation, hiragana, katakana, full-width forms and ideographs.
///
/// Meant to be embedded inside a regex character class (`[...]`).
pub const SOURCE_SCRIPT_CLASS: &str =
    r"\x{3000}-\x{303f}\x{3040}-\x{309f}\x{30a0}-\x{30ff}\x{ff00}-\x{ff9f}\x{4e00}-\x{9faf}\x{3400}-\x{4dbf}";

/// Checks if a character is Japanese (hiragana, katakana or kanji).
///
/// # Examples
///
/// ```
/// use rpgm_translate::utils::is_japanese;
///
/// assert!(is_japanese('あ'));
/// assert!(is_japanese('カ'));
/// assert!(is_japanese('漢'));
/// assert!(!is_japanese('a'));
/// assert!(!is_japanese('、'));
/// ```
pub fn is_japanese(c: char) -> bool {
    is_hiragana(c) || is_katakana(c) || is_kanji(c)
}

pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309f}').contains(&c)
}

pub fn is_katakana(c: char) -> bool {
    ('\u{30a0}'..='\u{30ff}').contains(&c)
}

pub fn is_kanji(c: char) -> bool {
    ('\u{4e00}'..='\u{9fbf}').contains(&c)
}

/// Checks if the text contains at least one Japanese character.
pub fn contains_japanese(text: &str) -> bool {
    text.chars().any(is_japanese)
}

/// True when every character is Japanese. Vacuously true for the empty string.
pub fn is_all_japanese(text: &str) -> bool {
    text.chars().all(is_japanese)
}

/// Trim surrounding double quotes from a script literal.
pub fn trim_quotes(text: &str) -> &str {
    text.trim_matches('"')
}

/// Wrap text in double quotes, dropping any quotes it already carries at its ends.
pub fn quote_wrap(text: &str) -> String {
    format!("\"{}\"", trim_quotes(text))
}

/// Return the span from the first `start` to the last `end` (inclusive).
///
/// Falls back to the whole text when either delimiter is missing or they are out of order.
pub fn span_between<'a>(text: &'a str, start: &str, end: &str) -> &'a str {
    match (text.find(start), text.rfind(end)) {
        (Some(from), Some(to)) if from <= to => &text[from..to + end.len()],
        _ => text,
    }
}
