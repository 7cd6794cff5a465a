//! Caller identity and issue viewing permission.

use crate::config::UserConfig;
use crate::domain::{Project, ProjectId, ProjectStatus};
use std::collections::{BTreeSet, HashMap};

/// The user a search runs on behalf of.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    /// `None` for anonymous callers
    pub login: Option<String>,
    pub admin: bool,
    pub memberships: BTreeSet<ProjectId>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Whether this caller may view issues of `project`.
    ///
    /// Archived projects are hidden from everyone. Otherwise admins see
    /// everything, members see their projects, and everyone sees public
    /// projects.
    pub fn can_view_issues(&self, project: &Project) -> bool {
        if project.status == ProjectStatus::Archived {
            return false;
        }
        self.admin || project.is_public || self.memberships.contains(&project.id)
    }
}

impl From<&UserConfig> for Caller {
    fn from(user: &UserConfig) -> Self {
        Self {
            login: Some(user.login.clone()),
            admin: user.admin,
            memberships: user.projects.iter().copied().collect(),
        }
    }
}

/// Known users, looked up by login.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, Caller>,
}

impl UserDirectory {
    pub fn from_config(users: &[UserConfig]) -> Self {
        Self {
            users: users
                .iter()
                .map(|u| (u.login.clone(), Caller::from(u)))
                .collect(),
        }
    }

    /// Resolve a login. Missing, blank, or unknown logins are anonymous.
    pub fn caller(&self, login: Option<&str>) -> Caller {
        login
            .map(str::trim)
            .and_then(|login| self.users.get(login))
            .cloned()
            .unwrap_or_else(Caller::anonymous)
    }
}
