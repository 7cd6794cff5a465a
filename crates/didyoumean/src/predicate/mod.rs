//! Search predicate construction.
//!
//! A [`Predicate`] is an ordered list of clause/parameter pairs. Token
//! clauses come first and are joined by the [`TokenJoin`] strategy; filter
//! clauses (project scope, open statuses, excluded issue) follow and are
//! always conjunctive. The textual expression is only composed at the end,
//! so placeholder order and parameter order cannot drift apart.

pub mod evaluator;

use crate::domain::{IssueId, IssueStatus, Project, ProjectId, StatusId};
use crate::scope::{resolve_scope, ProjectScope, ScopeMode};
use crate::storage::IssueStore;
use crate::tokenizer::Token;
use anyhow::Result;
use tracing::debug;

/// How token clauses are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenJoin {
    /// Subject must contain every token
    #[default]
    All,
    /// Subject must contain at least one token
    Any,
}

impl TokenJoin {
    fn separator(self) -> &'static str {
        match self {
            TokenJoin::All => " AND ",
            TokenJoin::Any => " OR ",
        }
    }
}

/// A single condition with one `?` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    /// Case-insensitive `LIKE` on the issue subject
    SubjectContains,
    /// Issue belongs to one of the listed projects
    ProjectIn,
    /// Issue is in one of the listed statuses
    StatusIn,
    /// Issue is not the given one
    IssueIdNot,
}

impl Clause {
    pub fn sql(self) -> &'static str {
        match self {
            Clause::SubjectContains => "lower(subject) LIKE lower(?)",
            Clause::ProjectIn => "project_id IN (?)",
            Clause::StatusIn => "status_id IN (?)",
            Clause::IssueIdNot => "issues.id != ?",
        }
    }
}

/// Value bound to a clause placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Pattern(String),
    ProjectIds(Vec<ProjectId>),
    StatusIds(Vec<StatusId>),
    IssueId(IssueId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Condition {
    clause: Clause,
    param: Param,
}

/// Composed, parameterised match expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Predicate {
    join: TokenJoin,
    tokens: Vec<Condition>,
    filters: Vec<Condition>,
}

impl Predicate {
    pub fn new(join: TokenJoin) -> Self {
        Self {
            join,
            ..Default::default()
        }
    }

    pub fn push_token(&mut self, token: &Token) {
        self.tokens.push(Condition {
            clause: Clause::SubjectContains,
            param: Param::Pattern(token.contains_pattern()),
        });
    }

    /// Append a conjunctive filter clause.
    pub fn push_filter(&mut self, clause: Clause, param: Param) {
        self.filters.push(Condition { clause, param });
    }

    pub fn join(&self) -> TokenJoin {
        self.join
    }

    /// Number of token clauses (the leading part of [`Self::clauses`]).
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Clauses in placeholder order.
    pub fn clauses(&self) -> Vec<Clause> {
        self.conditions().map(|c| c.clause).collect()
    }

    /// Parameters in placeholder order: token patterns, then scope, then
    /// status, then exclusion.
    pub fn params(&self) -> Vec<&Param> {
        self.conditions().map(|c| &c.param).collect()
    }

    fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.tokens.iter().chain(self.filters.iter())
    }

    /// Render the expression with one `?` per parameter.
    ///
    /// An OR-joined token group is parenthesised so filter clauses apply to
    /// the whole group.
    pub fn expression(&self) -> String {
        let mut parts = Vec::new();

        if !self.tokens.is_empty() {
            let group = self
                .tokens
                .iter()
                .map(|c| c.clause.sql())
                .collect::<Vec<_>>()
                .join(self.join.separator());

            if self.join == TokenJoin::Any && self.tokens.len() > 1 {
                parts.push(format!("({})", group));
            } else {
                parts.push(group);
            }
        }

        parts.extend(self.filters.iter().map(|c| c.clause.sql().to_string()));

        if parts.is_empty() {
            "1 = 1".to_string()
        } else {
            parts.join(" AND ")
        }
    }
}

/// Everything that shapes one search, gathered from the request and the
/// configuration.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    pub tokens: Vec<Token>,
    pub join: TokenJoin,
    pub scope_mode: ScopeMode,
    pub anchor: Option<Project>,
    pub open_only: bool,
    pub exclude_issue: Option<IssueId>,
    pub limit: usize,
}

/// Builds predicates, looking up projects and statuses in the store.
pub struct PredicateBuilder<'a, S: IssueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: IssueStore + ?Sized> PredicateBuilder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Compose the predicate for `filter`.
    ///
    /// `can_view` narrows the resolved project scope to what the caller may
    /// see. A scope that ends up empty still adds its clause, matching
    /// nothing.
    pub fn build<F>(&self, filter: &SearchFilter, can_view: F) -> Result<Predicate>
    where
        F: Fn(&Project) -> bool,
    {
        let mut predicate = Predicate::new(filter.join);
        for token in &filter.tokens {
            predicate.push_token(token);
        }

        let scope = resolve_scope(self.store, filter.anchor.as_ref(), &filter.scope_mode)?
            .visible_to(can_view);
        if let ProjectScope::RestrictedTo(projects) = &scope {
            let ids: Vec<ProjectId> = projects.iter().map(|p| p.id).collect();
            debug!("Set project filter to {:?}", ids);
            predicate.push_filter(Clause::ProjectIn, Param::ProjectIds(ids));
        }

        if filter.open_only {
            let open = open_status_ids(&self.store.list_statuses()?);
            debug!("Valid status ids are {:?}", open);
            predicate.push_filter(Clause::StatusIn, Param::StatusIds(open));
        }

        if let Some(issue_id) = filter.exclude_issue {
            debug!("Excluding issue {}", issue_id);
            predicate.push_filter(Clause::IssueIdNot, Param::IssueId(issue_id));
        }

        Ok(predicate)
    }
}

fn open_status_ids(statuses: &[IssueStatus]) -> Vec<StatusId> {
    statuses
        .iter()
        .filter(|s| !s.is_closed)
        .map(|s| s.id)
        .collect()
}
