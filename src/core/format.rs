//! Final shaping of stored translations before they are written back into game files.

use anyhow::Result;

use crate::config::Config;
use crate::core::classify::policy::CompiledTable;
use crate::core::data::{ExtractRecord, FileKind};

/// Annotations the backend sometimes appends to a translation.
const ANNOTATION_MARKERS: [&str; 3] = [" #OBS:", " #OBS", "#OBS"];

/// Line breaks folded into spaces before re-wrapping. The last one is a
/// literal backslash sequence left in some game texts.
const LINE_BREAKS: [&str; 3] = ["\r\n", "\n", r"\r\n"];

#[derive(Debug, Clone)]
pub struct TranslationFormatter {
    phrase_max_length: usize,
    /// file path pattern -> extract path patterns left unwrapped
    no_format: CompiledTable,
}

impl TranslationFormatter {
    pub fn new(phrase_max_length: usize, no_format: CompiledTable) -> Self {
        Self {
            phrase_max_length,
            no_format,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.phrase_max_length,
            CompiledTable::compile(&config.no_format_patterns, "noFormatPatterns")?,
        ))
    }

    /// Text to write for `record` of `file_path`: annotations stripped, then
    /// re-wrapped unless the path is exempt. Script translations come back
    /// without their quotes.
    pub fn format(&self, file_path: &str, kind: FileKind, record: &ExtractRecord) -> String {
        let text = strip_annotations(record.translated_text(kind).unwrap_or_default());
        if self.no_format.any_match(file_path, &record.path) {
            return text;
        }
        splice_phrase(&text, self.phrase_max_length)
    }
}

pub fn strip_annotations(text: &str) -> String {
    ANNOTATION_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| acc.replace(marker, ""))
}

/// Re-wrap `phrase` into lines joined by `\n`.
///
/// Words are numbered by their running length (each word plus one separator)
/// and a word starts a new line whenever that running length crosses another
/// multiple of `max_length`.
pub fn splice_phrase(phrase: &str, max_length: usize) -> String {
    let max_length = max_length.max(1);
    let flat = LINE_BREAKS
        .iter()
        .fold(phrase.to_string(), |acc, line_break| acc.replace(line_break, " "));

    let mut lines: Vec<Vec<&str>> = Vec::new();
    let mut current_line = None;
    let mut running = 0;
    for word in flat.split(' ').filter(|w| !w.is_empty()) {
        running += word.chars().count() + 1;
        let line = running / max_length;
        if current_line != Some(line) {
            current_line = Some(line);
            lines.push(Vec::new());
        }
        if let Some(words) = lines.last_mut() {
            words.push(word);
        }
    }

    lines
        .iter()
        .map(|words| words.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::config::PatternTable;
    use crate::core::format::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_splice_phrase() {
        assert_eq!(
            splice_phrase("The quick brown fox jumps over the lazy dog", 10),
            "The\nquick brown\nfox jumps\nover the\nlazy dog"
        );
        assert_eq!(splice_phrase("short", 60), "short");
        assert_eq!(splice_phrase("", 60), "");
    }

    #[test]
    fn test_splice_phrase_folds_line_breaks() {
        assert_eq!(splice_phrase("Hello\nthere\r\nfriend", 60), "Hello there friend");
        assert_eq!(splice_phrase(r"Hello\r\nthere", 60), "Hello there");
        assert_eq!(splice_phrase("a  b", 60), "a b");
    }

    #[test]
    fn test_strip_annotations() {
        assert_eq!(strip_annotations("Hello #OBS: note"), "Hello note");
        assert_eq!(strip_annotations("Hello #OBS"), "Hello");
        assert_eq!(strip_annotations("#OBSHello"), "Hello");
    }

    #[test]
    fn test_format_respects_no_format_patterns() {
        let no_format = CompiledTable::compile(
            &PatternTable::from_iter([(r"System\.json$", vec![r"^gameTitle$"])]),
            "noFormatPatterns",
        )
        .unwrap();
        let formatter = TranslationFormatter::new(10, no_format);
        let record = ExtractRecord::new("gameTitle", "タイトル").with_translation("A very long title");

        assert_eq!(
            formatter.format("www/data/System.json", FileKind::Structured, &record),
            "A very long title"
        );
        assert_eq!(
            formatter.format("www/data/Map001.json", FileKind::Structured, &record),
            "A very\nlong title"
        );
    }

    #[test]
    fn test_format_script_drops_quotes() {
        let formatter = TranslationFormatter::new(60, CompiledTable::default());
        let record = ExtractRecord::new("plugins.js:1:0", "\"はい\"").with_translation("\"Yes #OBS\"");
        assert_eq!(
            formatter.format("www/js/plugins.js", FileKind::Script, &record),
            "Yes"
        );
    }
}
