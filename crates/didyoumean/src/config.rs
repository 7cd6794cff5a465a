//! Configuration file loading and parsing.
//!
//! Search settings live in `config.toml` inside the data directory.
//! If no config file exists, the system falls back to defaults.
//!
//! ```toml
//! [search]
//! min_word_length = 2
//! limit = 5
//! project_filter = "1"     # "0" single, "1" subtree, "2" global
//! show_only_open = "1"
//! dictionary_path = "dict/nouns.tsv"
//!
//! [[users]]
//! login = "alice"
//! projects = [1, 2]
//! ```

use crate::domain::ProjectId;
use crate::scope::ScopeMode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Minimum token length when `min_word_length` is not configured.
pub const DEFAULT_MIN_WORD_LENGTH: usize = 2;

/// Number of issues returned when `limit` is not configured.
pub const DEFAULT_LIMIT: usize = 5;

/// Root configuration structure loaded from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    /// Search behavior (optional).
    pub search: Option<SearchSettings>,
    /// Known users and their project memberships (optional).
    pub users: Option<Vec<UserConfig>>,
}

/// The `[search]` table.
///
/// `project_filter` and `show_only_open` are kept as raw strings: any value
/// other than the recognized ones is meaningful (it disables the filter).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSettings {
    /// Tokens shorter than this (in characters) are discarded.
    pub min_word_length: Option<usize>,
    /// Maximum number of issues returned.
    pub limit: Option<usize>,
    /// Project scope: "0" single, "1" subtree, "2" global.
    pub project_filter: Option<String>,
    /// "1" restricts results to issues in a non-closed status.
    pub show_only_open: Option<String>,
    /// Noun dictionary for the extractor, read once at startup.
    pub dictionary_path: Option<PathBuf>,
}

/// A `[[users]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub login: String,
    /// Administrators may view every non-archived project.
    #[serde(default)]
    pub admin: bool,
    /// Projects the user is a member of.
    #[serde(default)]
    pub projects: Vec<ProjectId>,
}

impl SearchConfig {
    /// Load configuration from `<data_dir>/config.toml` if it exists.
    ///
    /// Returns an empty config (all fields None) if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");

        if !config_path.exists() {
            return Ok(SearchConfig::default());
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config.toml")?;

        let config: SearchConfig =
            toml::from_str(&content).context("Failed to parse config.toml")?;

        Ok(config)
    }

    fn settings(&self) -> Option<&SearchSettings> {
        self.search.as_ref()
    }

    /// Get minimum token length with default fallback.
    pub fn min_word_length(&self) -> usize {
        self.settings()
            .and_then(|s| s.min_word_length)
            .unwrap_or(DEFAULT_MIN_WORD_LENGTH)
    }

    /// Get result limit with default fallback.
    pub fn limit(&self) -> usize {
        self.settings()
            .and_then(|s| s.limit)
            .unwrap_or(DEFAULT_LIMIT)
    }

    /// Get the project scope mode. Missing or unrecognized values yield
    /// [`ScopeMode::Unset`].
    pub fn scope_mode(&self) -> ScopeMode {
        ScopeMode::parse(self.settings().and_then(|s| s.project_filter.as_deref()))
    }

    pub fn show_only_open(&self) -> bool {
        self.settings()
            .and_then(|s| s.show_only_open.as_deref())
            .map(|v| v == "1")
            .unwrap_or(false)
    }

    /// Get the dictionary path, resolved against `data_dir` when relative.
    pub fn dictionary_path(&self, data_dir: &Path) -> Option<PathBuf> {
        self.settings()
            .and_then(|s| s.dictionary_path.as_ref())
            .map(|p| {
                if p.is_absolute() {
                    p.clone()
                } else {
                    data_dir.join(p)
                }
            })
    }

    pub fn users(&self) -> &[UserConfig] {
        self.users.as_deref().unwrap_or(&[])
    }
}
