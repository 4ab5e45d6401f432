//! Reversible addressing of nodes inside a parsed JSON document.
//!
//! Paths use the familiar JSONPath-like notation of .NET game tooling:
//! `events[3].pages[0].list[12].parameters[0]`, with keys that contain
//! separators written in bracket form: `['Actor Name']`.
//!
//! A [`NodePath`] is built one segment per recursion step while walking a
//! document, rendered to a string for storage, and parsed back to select the
//! exact node again when a translation is written into the file.

use std::{fmt, str::FromStr};

use anyhow::{Result, bail};
use serde_json::Value;

/// Characters that force a key into bracket form.
const SPECIAL_CHARS: &[char] = &[
    '.', ' ', '\'', '/', '"', '[', ']', '(', ')', '\t', '\n', '\r', '\u{c}', '\u{8}', '\\',
    '\u{85}', '\u{2028}', '\u{2029}',
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: Vec<Segment>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path of an object member below this node.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Key(key.into()));
        next
    }

    /// Path of an array element below this node.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Index(index));
        next
    }

    pub fn select<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| match (segment, node) {
                (Segment::Key(key), Value::Object(map)) => map.get(key),
                (Segment::Index(i), Value::Array(items)) => items.get(*i),
                _ => None,
            })
    }

    pub fn select_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| match (segment, node) {
                (Segment::Key(key), Value::Object(map)) => map.get_mut(key),
                (Segment::Index(i), Value::Array(items)) => items.get_mut(*i),
                _ => None,
            })
    }
}

fn needs_brackets(key: &str) -> bool {
    key.is_empty() || key.contains(SPECIAL_CHARS)
}

fn write_escaped(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    for c in key.chars() {
        match c {
            '\\' => f.write_str(r"\\")?,
            '\'' => f.write_str(r"\'")?,
            '\n' => f.write_str(r"\n")?,
            '\r' => f.write_str(r"\r")?,
            '\t' => f.write_str(r"\t")?,
            '\u{8}' => f.write_str(r"\b")?,
            '\u{c}' => f.write_str(r"\f")?,
            c => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{}]", index)?,
                Segment::Key(key) if needs_brackets(key) => {
                    f.write_str("['")?;
                    write_escaped(f, key)?;
                    f.write_str("']")?;
                }
                Segment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        let mut segments = Vec::new();
        let mut pos = 0;

        while pos < chars.len() {
            match chars[pos] {
                '[' if chars.get(pos + 1) == Some(&'\'') => {
                    let (key, next) = parse_quoted_key(&chars, pos + 2)
                        .ok_or_else(|| anyhow::anyhow!("Unterminated key in path: {}", s))?;
                    segments.push(Segment::Key(key));
                    pos = next;
                }
                '[' => {
                    let close = chars[pos..]
                        .iter()
                        .position(|&c| c == ']')
                        .map(|offset| pos + offset)
                        .ok_or_else(|| anyhow::anyhow!("Unterminated index in path: {}", s))?;
                    let digits: String = chars[pos + 1..close].iter().collect();
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| anyhow::anyhow!("Invalid index '{}' in path: {}", digits, s))?;
                    segments.push(Segment::Index(index));
                    pos = close + 1;
                }
                '.' if pos > 0 => {
                    pos += 1;
                    let start = pos;
                    while pos < chars.len() && chars[pos] != '.' && chars[pos] != '[' {
                        pos += 1;
                    }
                    if start == pos {
                        bail!("Empty key in path: {}", s);
                    }
                    segments.push(Segment::Key(chars[start..pos].iter().collect()));
                }
                _ if pos == 0 => {
                    while pos < chars.len() && chars[pos] != '.' && chars[pos] != '[' {
                        pos += 1;
                    }
                    segments.push(Segment::Key(chars[..pos].iter().collect()));
                }
                c => bail!("Unexpected '{}' at {} in path: {}", c, pos, s),
            }
        }

        Ok(Self { segments })
    }
}

/// Parse `...']` starting right after the opening `['`.
fn parse_quoted_key(chars: &[char], mut pos: usize) -> Option<(String, usize)> {
    let mut key = String::new();
    while pos < chars.len() {
        match chars[pos] {
            '\\' => {
                let escaped = *chars.get(pos + 1)?;
                key.push(match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    other => other,
                });
                pos += 2;
            }
            '\'' if chars.get(pos + 1) == Some(&']') => return Some((key, pos + 2)),
            c => {
                key.push(c);
                pos += 1;
            }
        }
    }
    None
}
