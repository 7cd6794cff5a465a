//! Error types for the search engine.
//!
//! Two kinds of errors live here:
//! - [`SearchError`]: typed failures of a single search request, which
//!   transports inspect (via `anyhow::Error::downcast_ref`) to choose a
//!   status code or exit code.
//! - [`ActionableError`]: startup failures rendered for humans, with
//!   possible causes and remediation steps.

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Failures of a single search request.
///
/// Degenerate input (blank query, no usable tokens) is not an error and
/// never produces one of these.
#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    /// The anchor project identifier does not name any project
    #[error("Project not found: {0}")]
    ProjectNotFound(String),
    /// The issue to exclude is not a valid issue identifier
    #[error("Invalid issue id: {0}")]
    InvalidIssueId(String),
    /// The noun extraction collaborator failed
    #[error("Noun extraction failed: {0}")]
    NounExtraction(String),
}

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use didyoumean::errors::ActionableError;
///
/// let error = ActionableError::new("Dictionary not found: dict/nouns.tsv")
///     .with_cause("dictionary_path in config.toml points to a missing file")
///     .with_remedy("Fix dictionary_path in .didyoumean/config.toml");
///
/// eprintln!("{}", error);
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    error: String,
    causes: Vec<String>,
    remediation: Vec<String>,
}

impl ActionableError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step (actionable fix).
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// Convert to a formatted error message suitable for display.
    pub fn to_error_message(&self) -> String {
        let mut msg = format!("Error: {}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

/// Helper for an unreadable noun dictionary.
pub fn dictionary_unreadable(path: &Path, reason: &str) -> ActionableError {
    ActionableError::new(format!("Cannot load noun dictionary: {}", path.display()))
        .with_cause(format!("I/O error: {}", reason))
        .with_cause("dictionary_path may be relative to the wrong directory")
        .with_remedy("Check [search].dictionary_path in config.toml")
        .with_remedy("Remove dictionary_path to search with word splitting only")
}

/// Helper for a missing store snapshot.
pub fn snapshot_missing(data_dir: &Path) -> ActionableError {
    ActionableError::new(format!(
        "No issue snapshot found in {}",
        data_dir.display()
    ))
    .with_cause("The data directory has not been populated")
    .with_cause("DIDYOUMEAN_DATA_DIR may point to the wrong directory")
    .with_remedy(format!(
        "Export issues to {}",
        data_dir.join("data/snapshot.json").display()
    ))
    .with_remedy("Set DIDYOUMEAN_DATA_DIR to an existing data directory")
}

/// Helper for a malformed configuration file.
pub fn config_invalid(config_path: &Path, reason: &str) -> ActionableError {
    ActionableError::new(format!("Invalid configuration: {}", config_path.display()))
        .with_cause(reason.to_string())
        .with_remedy("Validate the file with a TOML linter")
        .with_remedy("Delete the file to fall back to default settings")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_actionable_error_formatting() {
        let error = ActionableError::new("Test error")
            .with_cause("First cause")
            .with_remedy("First remedy");

        let msg = error.to_error_message();

        assert!(msg.contains("Error: Test error"));
        assert!(msg.contains("Possible causes:"));
        assert!(msg.contains("• First cause"));
        assert!(msg.contains("To fix:"));
        assert!(msg.contains("• First remedy"));
    }

    #[test]
    fn test_error_without_causes() {
        let msg = ActionableError::new("Simple error")
            .with_remedy("Just fix it")
            .to_error_message();

        assert!(!msg.contains("Possible causes:"));
        assert!(msg.contains("• Just fix it"));
    }

    #[test]
    fn test_dictionary_unreadable_helper() {
        let msg = dictionary_unreadable(&PathBuf::from("dict/nouns.tsv"), "No such file")
            .to_error_message();

        assert!(msg.contains("dict/nouns.tsv"));
        assert!(msg.contains("No such file"));
        assert!(msg.contains("dictionary_path"));
    }

    #[test]
    fn test_snapshot_missing_helper() {
        let msg = snapshot_missing(&PathBuf::from(".didyoumean")).to_error_message();

        assert!(msg.contains("No issue snapshot found in .didyoumean"));
        assert!(msg.contains("snapshot.json"));
        assert!(msg.contains("DIDYOUMEAN_DATA_DIR"));
    }

    #[test]
    fn test_search_error_messages() {
        assert_eq!(
            SearchError::ProjectNotFound("web".to_string()).to_string(),
            "Project not found: web"
        );
        assert_eq!(
            SearchError::InvalidIssueId("abc".to_string()).to_string(),
            "Invalid issue id: abc"
        );
    }
}
