//! Core domain types for the issue search engine.
//!
//! This module defines the records the engine reads from the store:
//! projects, trackers, issue statuses, issues, and the joined issue view
//! that query execution returns.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Numeric project identifier
pub type ProjectId = u64;

/// Numeric issue identifier (monotonically increasing, newest is highest)
pub type IssueId = u64;

/// Numeric issue status identifier
pub type StatusId = u64;

/// Numeric tracker identifier
pub type TrackerId = u64;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Open for work
    #[default]
    Active,
    /// Read-only but still visible
    Closed,
    /// Hidden from everyone
    Archived,
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "closed" => Ok(ProjectStatus::Closed),
            "archived" => Ok(ProjectStatus::Archived),
            _ => Err(format!("Invalid project status: {}", s)),
        }
    }
}

/// A project owning issues, optionally nested under a parent project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique numeric identifier
    pub id: ProjectId,
    /// Unique textual identifier used in URLs (e.g. "web-frontend")
    pub identifier: String,
    /// Display name
    pub name: String,
    /// Parent project, if this is a subproject
    #[serde(default)]
    pub parent_id: Option<ProjectId>,
    /// Lifecycle status
    #[serde(default)]
    pub status: ProjectStatus,
    /// Whether anonymous and non-member callers may view its issues
    #[serde(default)]
    pub is_public: bool,
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }
}

/// Workflow status an issue can be in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
    pub id: StatusId,
    pub name: String,
    /// Closed statuses are excluded when searching open issues only
    #[serde(default)]
    pub is_closed: bool,
}

/// Issue category (bug, feature, support, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    pub id: TrackerId,
    pub name: String,
}

/// A tracked work item as persisted by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub project_id: ProjectId,
    pub tracker_id: TrackerId,
    pub status_id: StatusId,
    /// One-line summary, the only text the search matches against
    pub subject: String,
}

/// An issue joined with its tracker, status, and project.
///
/// This is what the store hands back from query execution. It is a
/// full record and must not leave the engine; see
/// [`IssueProjection`](crate::executor::IssueProjection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    pub id: IssueId,
    pub subject: String,
    pub tracker: Tracker,
    pub status: IssueStatus,
    pub project: Project,
}
