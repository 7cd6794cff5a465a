//! "Did you mean" issue search.
//!
//! [`SearchEngine`] runs one request through the whole pipeline:
//! trim the query, tokenize it, resolve the anchor project, build the
//! predicate, execute it, and shape the response. Blank queries and
//! queries without usable tokens short-circuit to an empty result without
//! touching the store.
//!
//! # Example
//!
//! ```
//! use didyoumean::permissions::Caller;
//! use didyoumean::search::{SearchEngine, SearchRequest};
//! use didyoumean::storage::InMemoryStorage;
//! use didyoumean::tokenizer::NoNounExtractor;
//! use std::sync::Arc;
//!
//! let engine = SearchEngine::new(
//!     Arc::new(InMemoryStorage::new()),
//!     Arc::new(NoNounExtractor),
//!     Default::default(),
//! );
//!
//! let result = engine
//!     .search(&SearchRequest::new("   "), &Caller::anonymous())
//!     .unwrap();
//! assert_eq!(result.total, 0);
//! assert_eq!(result.query, "");
//! ```

use crate::config::SearchConfig;
use crate::domain::{IssueId, ProjectId};
use crate::errors::{self, SearchError};
use crate::executor::{execute, IssueProjection};
use crate::permissions::{Caller, UserDirectory};
use crate::predicate::{PredicateBuilder, SearchFilter, TokenJoin};
use crate::storage::{InMemoryStorage, IssueStore};
use crate::tokenizer::{
    tokenize, DictionaryNounExtractor, NoNounExtractor, NounExtractor, Token, MAX_TOKENS,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// One search as received from a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchRequest {
    /// Raw query text
    #[serde(default)]
    pub query: String,
    /// Anchor project (numeric id or identifier)
    pub project_id: Option<String>,
    /// Issue to leave out of the results, e.g. the one being edited
    pub issue_id: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_excluded_issue(mut self, issue_id: impl Into<String>) -> Self {
        self.issue_id = Some(issue_id.into());
        self
    }
}

/// Search response envelope: `{ "total": n, "issues": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The query as it was searched; reset to `""` when nothing was searched
    #[serde(skip)]
    pub query: String,
    /// Number of matches, ignoring the limit
    pub total: usize,
    /// Newest matches first, at most `limit` of them
    pub issues: Vec<IssueProjection>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The search pipeline plus its process-wide, read-only resources.
pub struct SearchEngine<S: IssueStore> {
    store: Arc<S>,
    nouns: Arc<dyn NounExtractor>,
    config: SearchConfig,
    users: UserDirectory,
    join: TokenJoin,
}

impl<S: IssueStore> SearchEngine<S> {
    pub fn new(store: Arc<S>, nouns: Arc<dyn NounExtractor>, config: SearchConfig) -> Self {
        let users = UserDirectory::from_config(config.users());
        Self {
            store,
            nouns,
            config,
            users,
            join: TokenJoin::All,
        }
    }

    /// Override how tokens are combined (all words by default).
    pub fn with_token_join(mut self, join: TokenJoin) -> Self {
        self.join = join;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// Tokens the engine would search for, with the configured minimum
    /// length.
    pub fn tokens(&self, query: &str) -> Result<Vec<Token>> {
        tokenize(
            query.trim(),
            self.nouns.as_ref(),
            self.config.min_word_length(),
            MAX_TOKENS,
        )
    }

    /// Run one search on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::ProjectNotFound`] if `project_id` names no project
    /// - [`SearchError::InvalidIssueId`] if `issue_id` is not numeric
    /// - [`SearchError::NounExtraction`] or a store error if a collaborator
    ///   fails
    pub fn search(&self, request: &SearchRequest, caller: &Caller) -> Result<SearchResult> {
        let query = request.query.trim();
        debug!("Got request for [{}]", query);

        if query.is_empty() {
            return Ok(SearchResult::empty());
        }

        let tokens = self.tokens(query)?;
        if tokens.is_empty() {
            return Ok(SearchResult::empty());
        }
        debug!(
            "Searching tokens {:?}",
            tokens.iter().map(|t| t.raw.as_str()).collect::<Vec<_>>()
        );

        let anchor = match non_blank(request.project_id.as_deref()) {
            Some(identifier) => Some(self.store.find_project(identifier)?),
            None => None,
        };

        let filter = SearchFilter {
            tokens,
            join: self.join,
            scope_mode: self.config.scope_mode(),
            anchor,
            open_only: self.config.show_only_open(),
            exclude_issue: parse_issue_id(request.issue_id.as_deref())?,
            limit: self.config.limit(),
        };
        debug!(
            "Search settings: min_word_length={} limit={} scope={:?} open_only={}",
            self.config.min_word_length(),
            filter.limit,
            filter.scope_mode,
            filter.open_only
        );

        let predicate = PredicateBuilder::new(self.store.as_ref())
            .build(&filter, |p| caller.can_view_issues(p))?;
        debug!(
            "Predicate [{}] with parameters {:?}",
            predicate.expression(),
            predicate.params()
        );

        let visible: BTreeSet<ProjectId> = self
            .store
            .list_projects()?
            .iter()
            .filter(|p| caller.can_view_issues(p))
            .map(|p| p.id)
            .collect();

        let (issues, total) = execute(self.store.as_ref(), &predicate, &visible, filter.limit)?;

        Ok(SearchResult {
            query: query.to_string(),
            total,
            issues,
        })
    }
}

impl SearchEngine<InMemoryStorage> {
    /// Build an engine from a data directory: `config.toml`, the noun
    /// dictionary it names, and `data/snapshot.json`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let config = SearchConfig::load(data_dir).map_err(|e| {
            errors::config_invalid(&data_dir.join("config.toml"), &format!("{:#}", e))
        })?;

        let nouns: Arc<dyn NounExtractor> = match config.dictionary_path(data_dir) {
            Some(path) => {
                let dictionary = DictionaryNounExtractor::load(&path)?;
                info!(
                    "Loaded {} dictionary entries from {}",
                    dictionary.len(),
                    path.display()
                );
                Arc::new(dictionary)
            }
            None => Arc::new(NoNounExtractor),
        };

        let store = InMemoryStorage::load(data_dir)?;

        Ok(Self::new(Arc::new(store), nouns, config))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_issue_id(value: Option<&str>) -> Result<Option<IssueId>> {
    match non_blank(value) {
        Some(raw) => raw
            .parse::<IssueId>()
            .map(Some)
            .map_err(|_| SearchError::InvalidIssueId(raw.to_string()).into()),
        None => Ok(None),
    }
}
