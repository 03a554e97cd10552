//! Query construction for the project search index.
//!
//! A [`ProjectSearchRequest`](project_search_shared::ProjectSearchRequest) is validated
//! and translated into an [`IndexQuery`]: a boolean query made of `must` clauses (which
//! restrict the result set and contribute to relevance) and `filter` clauses (which only
//! restrict), plus sort and pagination.
//!
//! Clauses are plain values produced by one function per filter and collected by an
//! owning [`QueryBuilder`], so each filter can be tested in isolation.

mod builder;
mod clause;
mod sort;

pub use builder::{build, validate, IndexQuery, QueryBuilder};
pub use clause::{fields, BoostedField, Clause, TermValue};
pub use sort::{SortField, SortSpec};
