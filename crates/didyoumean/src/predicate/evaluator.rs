//! Evaluator for predicates against issue rows
//!
//! Parameters are bound to clauses by position, the same way a SQL driver
//! binds `?` placeholders, so a misordered parameter list is an error here
//! rather than a silent wrong answer.

use super::{Clause, Param, Predicate, TokenJoin};
use crate::domain::Issue;
use anyhow::{bail, Result};

/// Check whether the `issue` row satisfies `predicate`.
///
/// Every clause reads columns of the row itself, so no join is needed to
/// decide a match.
///
/// # Errors
///
/// Returns an error if the clause and parameter counts differ, or if a
/// parameter has the wrong kind for the clause it binds to.
pub fn matches(predicate: &Predicate, issue: &Issue) -> Result<bool> {
    let clauses = predicate.clauses();
    let params = predicate.params();

    if clauses.len() != params.len() {
        bail!(
            "Predicate has {} placeholders but {} parameters",
            clauses.len(),
            params.len()
        );
    }

    let mut results = Vec::with_capacity(clauses.len());
    for (position, (clause, param)) in clauses.iter().zip(params).enumerate() {
        results.push(eval_clause(*clause, param, issue, position)?);
    }

    let (token_results, filter_results) = results.split_at(predicate.token_count());

    let tokens_match = token_results.is_empty()
        || match predicate.join() {
            TokenJoin::All => token_results.iter().all(|r| *r),
            TokenJoin::Any => token_results.iter().any(|r| *r),
        };

    Ok(tokens_match && filter_results.iter().all(|r| *r))
}

fn eval_clause(clause: Clause, param: &Param, issue: &Issue, position: usize) -> Result<bool> {
    let matched = match (clause, param) {
        (Clause::SubjectContains, Param::Pattern(pattern)) => like(&issue.subject, pattern),
        (Clause::ProjectIn, Param::ProjectIds(ids)) => ids.contains(&issue.project_id),
        (Clause::StatusIn, Param::StatusIds(ids)) => ids.contains(&issue.status_id),
        (Clause::IssueIdNot, Param::IssueId(id)) => issue.id != *id,
        (clause, param) => bail!(
            "Parameter {} ({:?}) cannot bind to clause '{}'",
            position + 1,
            param,
            clause.sql()
        ),
    };

    Ok(matched)
}

/// Case-insensitive SQL `LIKE`: `%` matches any run of characters, `_`
/// matches exactly one.
pub fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    let (mut t, mut p) = (0, 0);
    // Position of the last '%' seen, and the text position it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if let Some((star, start)) = backtrack {
            p = star + 1;
            t = start + 1;
            backtrack = Some((star, start + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}
