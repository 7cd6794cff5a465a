//! "Did you mean" REST API Server Library
//!
//! Exposes the issue search engine over HTTP so issue forms can suggest
//! existing issues while the user types.

pub mod routes;

// Re-export for convenience
pub use routes::create_routes;
