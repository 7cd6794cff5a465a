//! Project scope resolution.
//!
//! Decides which projects a search may look into, based on the configured
//! [`ScopeMode`] and the project the query was issued from (the anchor).
//!
//! "No restriction" and "restricted to nothing" are different outcomes and
//! are kept apart by [`ProjectScope`]: an empty restriction matches no
//! issue at all, it never widens the search.

use crate::domain::{Project, ProjectId};
use crate::storage::IssueStore;
use anyhow::Result;
use tracing::{debug, warn};

/// Which projects are eligible for search, before permission filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeMode {
    /// `"0"`: the anchor project only
    Single,
    /// `"1"`: the anchor project and its descendants, active ones only
    Subtree,
    /// `"2"`: every project
    Global,
    /// Missing or unrecognized setting: no scope filter at all
    Unset { raw: Option<String> },
}

impl ScopeMode {
    /// Parse the `project_filter` setting.
    ///
    /// ```
    /// use didyoumean::scope::ScopeMode;
    ///
    /// assert_eq!(ScopeMode::parse(Some("1")), ScopeMode::Subtree);
    /// assert_eq!(ScopeMode::parse(None), ScopeMode::Unset { raw: None });
    /// ```
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("0") => ScopeMode::Single,
            Some("1") => ScopeMode::Subtree,
            Some("2") => ScopeMode::Global,
            other => ScopeMode::Unset {
                raw: other.map(String::from),
            },
        }
    }
}

/// Result of scope resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectScope {
    /// No project constraint is applied
    Unrestricted,
    /// Only issues of these projects match (none, if empty)
    RestrictedTo(Vec<Project>),
}

impl ProjectScope {
    /// Keep only the projects `can_view` accepts.
    ///
    /// An unrestricted scope stays unrestricted; a restriction may become
    /// empty, which still restricts.
    pub fn visible_to<F>(self, can_view: F) -> Self
    where
        F: Fn(&Project) -> bool,
    {
        match self {
            ProjectScope::Unrestricted => ProjectScope::Unrestricted,
            ProjectScope::RestrictedTo(projects) => {
                ProjectScope::RestrictedTo(projects.into_iter().filter(|p| can_view(p)).collect())
            }
        }
    }

    /// Project ids of a restriction, in order. `None` when unrestricted.
    pub fn project_ids(&self) -> Option<Vec<ProjectId>> {
        match self {
            ProjectScope::Unrestricted => None,
            ProjectScope::RestrictedTo(projects) => Some(projects.iter().map(|p| p.id).collect()),
        }
    }
}

/// Resolve the candidate project set for `mode`.
///
/// `Single` without an anchor resolves to an empty restriction, so the
/// search finds nothing. This mirrors long-standing behavior rather than
/// rejecting the configuration.
pub fn resolve_scope<S>(store: &S, anchor: Option<&Project>, mode: &ScopeMode) -> Result<ProjectScope>
where
    S: IssueStore + ?Sized,
{
    let scope = match mode {
        ScopeMode::Global => ProjectScope::RestrictedTo(store.list_projects()?),
        ScopeMode::Subtree => match anchor {
            Some(project) => {
                ProjectScope::RestrictedTo(store.self_and_active_descendants(project)?)
            }
            None => ProjectScope::Unrestricted,
        },
        ScopeMode::Single => ProjectScope::RestrictedTo(anchor.cloned().into_iter().collect()),
        ScopeMode::Unset { raw } => {
            warn!(
                "Unrecognized option for project filter: [{}], skipping",
                raw.as_deref().unwrap_or("")
            );
            ProjectScope::Unrestricted
        }
    };

    debug!("Resolved project scope {:?} for mode {:?}", scope.project_ids(), mode);
    Ok(scope)
}
