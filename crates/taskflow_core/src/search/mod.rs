//! Free-text task search.
//!
//! Search terms are treated as literal text, never as a pattern language.

pub mod literal;

pub use literal::{LiteralSearch, SearchError, MAX_SEARCH_CHARS};
