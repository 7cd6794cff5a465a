//! In-memory storage implementation.
//!
//! Holds the whole store in ordered maps behind an `Arc<RwLock<_>>`, so
//! clones share data and any number of searches can read concurrently.
//! Predicates are executed with [`crate::predicate::evaluator`].

use crate::domain::{
    Issue, IssueId, IssueRecord, IssueStatus, Project, ProjectId, StatusId, Tracker, TrackerId,
};
use crate::errors::SearchError;
use crate::predicate::evaluator;
use crate::storage::{IssuePage, IssueQuery, IssueStore, Snapshot, SortOrder};
use anyhow::{anyhow, Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use tracing::warn;

#[derive(Debug, Default)]
struct Tables {
    projects: BTreeMap<ProjectId, Project>,
    trackers: BTreeMap<TrackerId, Tracker>,
    statuses: BTreeMap<StatusId, IssueStatus>,
    issues: BTreeMap<IssueId, Issue>,
}

impl Tables {
    fn join(&self, issue: &Issue) -> Result<(&Tracker, &IssueStatus, &Project)> {
        let tracker = self
            .trackers
            .get(&issue.tracker_id)
            .with_context(|| format!("Issue {} has unknown tracker {}", issue.id, issue.tracker_id))?;
        let status = self
            .statuses
            .get(&issue.status_id)
            .with_context(|| format!("Issue {} has unknown status {}", issue.id, issue.status_id))?;
        let project = self
            .projects
            .get(&issue.project_id)
            .with_context(|| format!("Issue {} has unknown project {}", issue.id, issue.project_id))?;

        Ok((tracker, status, project))
    }

    /// Matching records in query order, capped at the query limit, and the
    /// uncapped match count.
    ///
    /// The predicate runs on bare issue rows; only matches are joined. A
    /// matching row whose tracker, status, or project is missing is skipped
    /// with a warning and not counted.
    fn page(&self, query: &IssueQuery<'_>) -> Result<IssuePage> {
        let ordered = match query.order {
            SortOrder::IdDesc => self.issues.values().rev(),
        };

        let mut page = IssuePage::default();
        for issue in ordered {
            if !query.visible_projects.contains(&issue.project_id)
                || !evaluator::matches(query.predicate, issue)?
            {
                continue;
            }

            let (tracker, status, project) = match self.join(issue) {
                Ok(joined) => joined,
                Err(e) => {
                    warn!("Skipping issue: {:#}", e);
                    continue;
                }
            };

            page.total += 1;
            if query.limit.map_or(true, |limit| page.records.len() < limit) {
                page.records.push(IssueRecord {
                    id: issue.id,
                    subject: issue.subject.clone(),
                    tracker: tracker.clone(),
                    status: status.clone(),
                    project: project.clone(),
                });
            }
        }

        Ok(page)
    }
}

/// In-memory storage backend.
///
/// # Examples
///
/// ```
/// use didyoumean::storage::{InMemoryStorage, IssueStore};
/// use didyoumean::domain::IssueStatus;
///
/// let storage = InMemoryStorage::new();
/// storage.save_status(IssueStatus { id: 1, name: "New".to_string(), is_closed: false }).unwrap();
///
/// assert_eq!(storage.list_statuses().unwrap().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let tables = Tables {
            projects: snapshot.projects.into_iter().map(|p| (p.id, p)).collect(),
            trackers: snapshot.trackers.into_iter().map(|t| (t.id, t)).collect(),
            statuses: snapshot.statuses.into_iter().map(|s| (s.id, s)).collect(),
            issues: snapshot.issues.into_iter().map(|i| (i.id, i)).collect(),
        };

        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Load `<data_dir>/data/snapshot.json`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        Ok(Self::from_snapshot(super::json::load_snapshot(data_dir)?))
    }

    /// Copy the current contents out as a snapshot.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let tables = self.read()?;
        Ok(Snapshot {
            projects: tables.projects.values().cloned().collect(),
            trackers: tables.trackers.values().cloned().collect(),
            statuses: tables.statuses.values().cloned().collect(),
            issues: tables.issues.values().cloned().collect(),
        })
    }

    pub fn save_project(&self, project: Project) -> Result<()> {
        self.write(|t| {
            t.projects.insert(project.id, project);
        })
    }

    pub fn save_tracker(&self, tracker: Tracker) -> Result<()> {
        self.write(|t| {
            t.trackers.insert(tracker.id, tracker);
        })
    }

    pub fn save_status(&self, status: IssueStatus) -> Result<()> {
        self.write(|t| {
            t.statuses.insert(status.id, status);
        })
    }

    pub fn save_issue(&self, issue: Issue) -> Result<()> {
        self.write(|t| {
            t.issues.insert(issue.id, issue);
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| anyhow!("Issue store lock poisoned"))
    }

    fn write<F: FnOnce(&mut Tables)>(&self, f: F) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| anyhow!("Issue store lock poisoned"))?;
        f(&mut tables);
        Ok(())
    }
}

impl IssueStore for InMemoryStorage {
    fn find_project(&self, identifier: &str) -> Result<Project> {
        let tables = self.read()?;
        let identifier = identifier.trim();

        let found = match identifier.parse::<ProjectId>() {
            Ok(id) => tables.projects.get(&id),
            Err(_) => tables
                .projects
                .values()
                .find(|p| p.identifier == identifier),
        };

        found
            .cloned()
            .ok_or_else(|| SearchError::ProjectNotFound(identifier.to_string()).into())
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.read()?.projects.values().cloned().collect())
    }

    fn self_and_active_descendants(&self, project: &Project) -> Result<Vec<Project>> {
        let tables = self.read()?;

        let mut descendants = BTreeSet::new();
        let mut frontier = vec![project.id];
        while let Some(parent) = frontier.pop() {
            for child in tables
                .projects
                .values()
                .filter(|p| p.parent_id == Some(parent))
            {
                if child.id != project.id && descendants.insert(child.id) {
                    frontier.push(child.id);
                }
            }
        }

        let projects = std::iter::once(project)
            .chain(descendants.iter().filter_map(|id| tables.projects.get(id)))
            .filter(|p| p.is_active())
            .cloned()
            .collect();
        Ok(projects)
    }

    fn list_statuses(&self) -> Result<Vec<IssueStatus>> {
        Ok(self.read()?.statuses.values().cloned().collect())
    }

    fn find_page(&self, query: &IssueQuery<'_>) -> Result<IssuePage> {
        self.read()?.page(query)
    }
}
