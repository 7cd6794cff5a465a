//! "Did you mean" issue search library
//!
//! Suggests likely-matching issues while a user types: turns free text into
//! a handful of tokens, combines them with project scope, viewing
//! permission, open-status, and self-exclusion filters into one predicate,
//! and returns a capped, newest-first page with the total match count.

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod executor;
pub mod permissions;
pub mod predicate;
pub mod scope;
pub mod search;
pub mod storage;
pub mod tokenizer;

// Re-export commonly used types
pub use errors::SearchError;
pub use executor::IssueProjection;
pub use permissions::Caller;
pub use search::{SearchEngine, SearchRequest, SearchResult};
pub use storage::{InMemoryStorage, IssueStore};
