//! Predicate execution and result shaping.

use crate::domain::{IssueId, IssueRecord, ProjectId};
use crate::predicate::Predicate;
use crate::storage::{IssueQuery, IssueStore, SortOrder};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Public view of a matched issue. Nothing else about an issue leaves the
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueProjection {
    pub id: IssueId,
    pub tracker_name: String,
    pub subject: String,
    pub status_name: String,
    pub project_name: String,
}

impl From<&IssueRecord> for IssueProjection {
    fn from(record: &IssueRecord) -> Self {
        Self {
            id: record.id,
            tracker_name: record.tracker.name.clone(),
            subject: record.subject.clone(),
            status_name: record.status.name.clone(),
            project_name: record.project.name.clone(),
        }
    }
}

/// Run `predicate` once, newest-first: the first `limit` matches are
/// projected and every match is counted.
///
/// Only issues of `visible_projects` are considered.
pub fn execute<S>(
    store: &S,
    predicate: &Predicate,
    visible_projects: &BTreeSet<ProjectId>,
    limit: usize,
) -> Result<(Vec<IssueProjection>, usize)>
where
    S: IssueStore + ?Sized,
{
    // Newest first stands in for relevance ranking
    let query = IssueQuery {
        predicate,
        visible_projects,
        order: SortOrder::IdDesc,
        limit: Some(limit),
    };
    let page = store.find_page(&query)?;
    let issues: Vec<IssueProjection> = page.records.iter().map(IssueProjection::from).collect();
    let total = page.total;

    debug!("{} results found, returning the first {}", total, issues.len());
    Ok((issues, total))
}
