//! Detection of script code hiding in text values.
//!
//! Event commands and plugin parameters often carry JavaScript snippets that
//! contain Japanese literals (`$gameVariables.value(1) == "はい"`). Translating
//! those breaks the game, so they are recognized by a table of cheap textual
//! rules and dropped before translation.

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::is_japanese;

static NEGATED_IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!+[a-zA-Z]+").unwrap());

/// One code-detection rule: a name for reporting and a predicate over the
/// comment-stripped, trimmed text.
#[derive(Debug, Clone, Copy)]
pub struct CodeRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
}

/// Ordered rule table. A value is code-like if any rule matches.
pub const CODE_RULES: &[CodeRule] = &[
    CodeRule {
        name: "statement-terminator",
        matches: |s| s.ends_with(';'),
    },
    CodeRule {
        name: "call-parens",
        matches: |s| s.contains("()"),
    },
    CodeRule {
        name: "equality",
        matches: |s| s.contains(" == "),
    },
    CodeRule {
        name: "assignment",
        matches: |s| s.contains(" = "),
    },
    CodeRule {
        name: "inequality",
        matches: |s| s.contains(" != "),
    },
    CodeRule {
        name: "negated-identifier",
        matches: |s| NEGATED_IDENTIFIER_REGEX.is_match(s),
    },
    CodeRule {
        name: "flag-suffix",
        matches: |s| s.to_lowercase().ends_with("flg"),
    },
    CodeRule {
        name: "logical-and",
        matches: |s| s.contains(" && "),
    },
    CodeRule {
        name: "logical-or",
        matches: |s| s.contains(" || "),
    },
    CodeRule {
        name: "member-access",
        matches: |s| s.contains("this."),
    },
];

/// Text before the first line-comment marker, trimmed.
pub fn strip_line_comment(value: &str) -> &str {
    value.split("//").next().unwrap_or(value).trim()
}

/// Name of the first rule that flags `value` as code, if any.
pub fn matching_rule(value: &str) -> Option<&'static str> {
    let text = strip_line_comment(value);
    CODE_RULES
        .iter()
        .find(|rule| (rule.matches)(text))
        .map(|rule| rule.name)
}

/// True when every Japanese character sits between an opening quote and its
/// closing partner.
///
/// Quotes pair up in order (0-1, 2-3, ...). A character is inside a pair when
/// the nearest quote before it has an even ordinal and another quote follows it.
pub fn japanese_only_inside_quotes(text: &str) -> bool {
    let quotes: Vec<usize> = text
        .char_indices()
        .filter(|&(_, c)| c == '"')
        .map(|(i, _)| i)
        .collect();

    text.char_indices()
        .filter(|&(_, c)| is_japanese(c))
        .all(|(pos, _)| {
            let before = quotes.partition_point(|&q| q < pos);
            before % 2 == 1 && before < quotes.len()
        })
}

/// Decide whether a value is script code.
///
/// A flagged value is let through again when it contains one of the
/// whitelisted substrings and all of its Japanese text is quoted, which is
/// how translatable literals inside known-safe expressions look.
pub fn is_script_code(value: &str, whitelist: &[String]) -> bool {
    if matching_rule(value).is_none() {
        return false;
    }

    let text = strip_line_comment(value);
    let overridden = whitelist.iter().any(|safe| text.contains(safe.as_str()))
        && japanese_only_inside_quotes(text);

    !overridden
}
