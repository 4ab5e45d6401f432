use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use regex::Regex;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

pub const CONFIG_FILE_NAME: &str = ".rpgtlrc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_project_root")]
    pub project_root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,
    #[serde(default = "default_translation_threads")]
    pub translation_threads: usize,
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_phrase_max_length")]
    pub phrase_max_length: usize,
    #[serde(default)]
    pub translate_scripts: bool,
    #[serde(default)]
    pub script_file_patterns: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default)]
    pub script_code_whitelist: Vec<String>,
    #[serde(default)]
    pub unsafe_path_patterns: PatternTable,
    #[serde(default)]
    pub unsafe_script_patterns: PatternTable,
    #[serde(default)]
    pub no_format_patterns: PatternTable,
    #[serde(default)]
    pub translated_replace: Vec<ReplaceRule>,
    #[serde(default = "default_timeout_cooldown_secs")]
    pub timeout_cooldown_secs: u64,
    #[serde(default = "default_error_cooldown_secs")]
    pub error_cooldown_secs: u64,
}

/// A literal substitution applied to stored translations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReplaceRule {
    pub from: String,
    pub to: String,
}

impl ReplaceRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Ordered mapping of a selector regex to a list of regexes.
///
/// Stored as a JSON object; the object order is kept because the structured
/// unsafe check stops at the first selector that matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternTable(pub Vec<(String, Vec<String>)>);

impl PatternTable {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Vec<String>)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, Vec<V>)> for PatternTable {
    fn from_iter<I: IntoIterator<Item = (K, Vec<V>)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, vs)| (k.into(), vs.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

impl Serialize for PatternTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, values) in &self.0 {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PatternTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = PatternTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping a pattern to a list of patterns")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<PatternTable, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, values)) = access.next_entry::<String, Vec<String>>()? {
                    entries.push((key, values));
                }
                std::result::Result::Ok(PatternTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

fn default_project_root() -> String {
    "./".to_string()
}

fn default_translation_threads() -> usize {
    4
}

fn default_token_budget() -> usize {
    1000
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_source_language() -> String {
    "japanese".to_string()
}

fn default_target_language() -> String {
    "english".to_string()
}

fn default_phrase_max_length() -> usize {
    60
}

fn default_timeout_cooldown_secs() -> u64 {
    20
}

fn default_error_cooldown_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            store_path: None,
            translation_threads: default_translation_threads(),
            token_budget: default_token_budget(),
            model: default_model(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            phrase_max_length: default_phrase_max_length(),
            translate_scripts: false,
            script_file_patterns: Vec::new(),
            ignores: Vec::new(),
            script_code_whitelist: Vec::new(),
            unsafe_path_patterns: PatternTable::default(),
            unsafe_script_patterns: PatternTable::default(),
            no_format_patterns: PatternTable::default(),
            translated_replace: Vec::new(),
            timeout_cooldown_secs: default_timeout_cooldown_secs(),
            error_cooldown_secs: default_error_cooldown_secs(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error naming the field of the first invalid regex or glob pattern.
    pub fn validate(&self) -> Result<()> {
        if self.translation_threads == 0 {
            anyhow::bail!("'translationThreads' must be at least 1");
        }

        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        for pattern in &self.script_file_patterns {
            Regex::new(pattern).with_context(|| {
                format!("Invalid regex in 'scriptFilePatterns': \"{}\"", pattern)
            })?;
        }

        for (field, table) in [
            ("unsafePathPatterns", &self.unsafe_path_patterns),
            ("unsafeScriptPatterns", &self.unsafe_script_patterns),
            ("noFormatPatterns", &self.no_format_patterns),
        ] {
            for (key, values) in table.iter() {
                for pattern in std::iter::once(key).chain(values) {
                    Regex::new(pattern).with_context(|| {
                        format!("Invalid regex in '{}': \"{}\"", field, pattern)
                    })?;
                }
            }
        }

        Ok(())
    }

    /// Directory name of the project root, used to name the default store file.
    pub fn project_name(&self) -> String {
        let root = Path::new(&self.project_root);
        let canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        canonical
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "project".to_string())
    }

    /// Resolved location of the translation store document.
    pub fn resolved_store_path(&self) -> PathBuf {
        match &self.store_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!("{}_translations.json", self.project_name())),
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
