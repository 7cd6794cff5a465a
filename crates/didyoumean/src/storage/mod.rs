//! Storage abstraction for the search engine.
//!
//! The engine only reads. This module defines the `IssueStore` trait that
//! answers project hierarchy lookups and executes predicates, so that
//! different backends can sit behind the same engine.

use crate::domain::{Issue, IssueRecord, IssueStatus, Project, ProjectId, Tracker};
use crate::predicate::Predicate;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod json;
pub mod memory;

pub use memory::InMemoryStorage;

/// Result ordering supported by stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Highest issue id first (newest first)
    #[default]
    IdDesc,
}

/// One predicate execution request.
#[derive(Debug, Clone, Copy)]
pub struct IssueQuery<'a> {
    pub predicate: &'a Predicate,
    /// Base visibility: issues outside these projects never match
    pub visible_projects: &'a BTreeSet<ProjectId>,
    pub order: SortOrder,
    /// `None` for an uncapped query
    pub limit: Option<usize>,
}

/// One page of matches plus the uncapped match count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePage {
    pub records: Vec<IssueRecord>,
    pub total: usize,
}

/// Complete store contents, as exchanged with the snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub trackers: Vec<Tracker>,
    #[serde(default)]
    pub statuses: Vec<IssueStatus>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// Read-only access to projects, statuses, and issues.
///
/// Implementations are shared by concurrent requests and must be
/// `Send + Sync`.
///
/// # Examples
///
/// ```
/// use didyoumean::storage::{InMemoryStorage, IssueStore, Snapshot};
/// use didyoumean::domain::Project;
///
/// let storage = InMemoryStorage::from_snapshot(Snapshot {
///     projects: vec![Project {
///         id: 1,
///         identifier: "web".to_string(),
///         name: "Web".to_string(),
///         parent_id: None,
///         status: Default::default(),
///         is_public: true,
///     }],
///     ..Default::default()
/// });
///
/// assert_eq!(storage.find_project("web").unwrap().id, 1);
/// assert_eq!(storage.find_project("1").unwrap().name, "Web");
/// ```
pub trait IssueStore: Send + Sync {
    /// Resolve a project by numeric id or textual identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ProjectNotFound`](crate::errors::SearchError)
    /// if nothing matches.
    fn find_project(&self, identifier: &str) -> Result<Project>;

    /// All projects, ordered by id.
    fn list_projects(&self) -> Result<Vec<Project>>;

    /// `project` and all of its descendants (at any depth), keeping only
    /// active ones: `project` first, then descendants ordered by id. An
    /// inactive project is dropped, its active children are not.
    fn self_and_active_descendants(&self, project: &Project) -> Result<Vec<Project>>;

    /// All issue statuses, ordered by id.
    fn list_statuses(&self) -> Result<Vec<IssueStatus>>;

    /// Issues matching the query, in the requested order and capped at the
    /// query limit, together with the number of matches ignoring the limit.
    ///
    /// Both come from one consistent view of the store, so
    /// `records.len() <= total` always holds.
    fn find_page(&self, query: &IssueQuery<'_>) -> Result<IssuePage>;
}
