//! Options for directional stylesheet mirroring.
//!
//! Options are read from `rtl.toml` files (auto-discovered in parent
//! directories) or from JSON text, which is what the in-document `options`
//! directive carries. Keys use snake_case; the camelCase spellings
//! (`autoRename`, `processUrls`, ...) are accepted as aliases.
//!
//! ```toml
//! auto_rename = true
//! process_urls = { atrule = true }
//!
//! [aliases]
//! "--inset-start" = "left"
//!
//! [blacklist.rtlcss]
//! rename = true
//!
//! [[string_map]]
//! name = "prev-next"
//! search = ["prev", "Prev"]
//! replace = ["next", "Next"]
//! scope = "selector"
//! ```

mod string_map;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use string_map::{MapScope, StringMapEntry, default_string_map};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rtl.toml";

/// Whether URL-like text is mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProcessUrls {
    /// Mirror URLs everywhere (or nowhere).
    All(bool),
    /// Mirror URLs in specific places.
    Scoped {
        #[serde(default)]
        atrule: bool,
    },
}

impl Default for ProcessUrls {
    fn default() -> Self {
        Self::All(false)
    }
}

impl ProcessUrls {
    /// Whether at-rule params are mirrored.
    #[must_use]
    pub fn at_rules(&self) -> bool {
        match self {
            Self::All(enabled) => *enabled,
            Self::Scoped { atrule } => *atrule,
        }
    }
}

/// Mirroring options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Strip directive comments once they have been consumed.
    pub clean: bool,
    /// Mirror URL-like text in at-rule params.
    #[serde(alias = "processUrls")]
    pub process_urls: ProcessUrls,
    /// Mirror selectors of rules whose declarations were not flipped.
    #[serde(alias = "autoRename")]
    pub auto_rename: bool,
    /// Only auto-rename rules that have a mirrored counterpart.
    #[serde(alias = "autoRenameStrict")]
    pub auto_rename_strict: bool,
    /// Swap `safe-area-inset-left`/`safe-area-inset-right` in values.
    #[serde(alias = "processEnv")]
    pub process_env: bool,
    /// Swap tokens even inside words.
    pub greedy: bool,
    /// Property aliases used when matching processors.
    pub aliases: HashMap<String, String>,
    /// Disabled control directives: plugin name → directive name → flag.
    pub blacklist: HashMap<String, HashMap<String, bool>>,
    /// Token swap tables for selectors and URLs.
    #[serde(alias = "stringMap")]
    pub string_map: Vec<StringMapEntry>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            clean: true,
            process_urls: ProcessUrls::default(),
            auto_rename: false,
            auto_rename_strict: false,
            process_env: true,
            greedy: false,
            aliases: HashMap::new(),
            blacklist: HashMap::new(),
            string_map: default_string_map(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Options {
    /// Load options from a file, or discover `rtl.toml` from the current
    /// directory upwards. Falls back to defaults when nothing is found.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `path` doesn't exist or parsing fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd));
        match discovered {
            Some(found) => Self::load_from_file(&found),
            None => Ok(Self::default()),
        }
    }

    /// Search for `rtl.toml` in `start` and its parents.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load options from a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML options.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Parse and validate JSON options.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Validate option values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a string map entry is malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.string_map {
            if entry.search.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "string_map entry \"{}\" has no search tokens",
                    entry.name
                )));
            }
            if entry.search.len() != entry.replace.len() {
                return Err(ConfigError::Validation(format!(
                    "string_map entry \"{}\" has {} search tokens but {} replace tokens",
                    entry.name,
                    entry.search.len(),
                    entry.replace.len()
                )));
            }
            if entry.search.iter().chain(&entry.replace).any(String::is_empty) {
                return Err(ConfigError::Validation(format!(
                    "string_map entry \"{}\" contains an empty token",
                    entry.name
                )));
            }
        }
        Ok(())
    }

    /// Whether `directive` is disabled for `plugin`.
    #[must_use]
    pub fn is_blacklisted(&self, plugin: &str, directive: &str) -> bool {
        self.blacklist
            .get(plugin)
            .and_then(|names| names.get(directive))
            .copied()
            .unwrap_or(false)
    }

    /// Canonical property name used for processor matching, if aliased.
    #[must_use]
    pub fn alias(&self, property: &str) -> Option<&str> {
        self.aliases.get(property).map(String::as_str)
    }
}
