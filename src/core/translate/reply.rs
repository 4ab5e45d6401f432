//! Instruction building and reply parsing.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::core::translate::batch::Question;
use crate::utils::span_between;

/// Separator between a key and its value on one reply line.
static KEY_VALUE_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"":\s*""#).unwrap());

/// answer key -> translated text
pub type Answers = BTreeMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    #[error("reply is not a JSON object of strings: {0}")]
    Unparseable(String),
}

/// Instruction for one question: a header line followed by the pretty-printed
/// answer key -> source text object.
pub fn build_instruction(
    source_language: &str,
    target_language: &str,
    file_name: &str,
    question: &Question,
) -> String {
    let entries: Map<String, Value> = question
        .phrases
        .iter()
        .map(|phrase| {
            (
                phrase.answer_key().to_string(),
                Value::String(phrase.value.clone()),
            )
        })
        .collect();

    format!(
        "Translate the values in json from the {} rpgm game file {} to {}:\n{:#}\n",
        source_language,
        file_name,
        target_language,
        Value::Object(entries)
    )
}

/// Escape unescaped quotes inside the value of `"key": "value"` lines.
///
/// Lines that do not look like a single key/value pair are left untouched.
pub fn repair_quotes(reply: &str) -> String {
    reply
        .lines()
        .map(repair_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn repair_line(line: &str) -> String {
    let framed = line.trim();
    if !(framed.starts_with('"') && (framed.ends_with('"') || framed.ends_with("\","))) {
        return line.to_string();
    }

    let mut separators = KEY_VALUE_SEPARATOR_REGEX.find_iter(line);
    let (Some(separator), None) = (separators.next(), separators.next()) else {
        return line.to_string();
    };

    let value_start = separator.end();
    let Some(value_len) = line[value_start..].rfind('"') else {
        return line.to_string();
    };
    let value = &line[value_start..value_start + value_len];

    let mut fixed = String::with_capacity(value.len() + 4);
    let mut escaped = false;
    for c in value.chars() {
        if c == '"' && !escaped {
            fixed.push('\\');
        }
        escaped = c == '\\' && !escaped;
        fixed.push(c);
    }
    if fixed == value {
        return line.to_string();
    }

    debug!(target: "backend", "Repaired unescaped quote: {} => {}", value, fixed);
    format!(
        "{}{}{}",
        &line[..value_start],
        fixed,
        &line[value_start + value_len..]
    )
}

/// Parse a reply into answers after quote repair.
///
/// Text around the outermost braces is ignored. A reply without braces is
/// read as the body of an object.
pub fn parse_answers(reply: &str) -> Result<Answers, ReplyError> {
    let repaired = repair_quotes(reply);
    let body = if repaired.contains('{') && repaired.contains('}') {
        span_between(&repaired, "{", "}").to_string()
    } else {
        format!("{{{}}}", repaired.trim().trim_end_matches(','))
    };

    serde_json::from_str(&body).map_err(|e| ReplyError::Unparseable(e.to_string()))
}
