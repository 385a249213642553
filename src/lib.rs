//! # sql-null-order
//!
//! Rewrites the `ORDER BY` clause of already-generated SQL so rows with NULL
//! values in chosen sort columns land at the start or the end of the result
//! ordering, using whichever rewriting strategy the target database platform
//! requires.
//!
//! ## Core Types
//!
//! - **[`SortHints`]**: ordered `field → NullOrdering` map describing the
//!   requested NULL placement per sort column
//! - **[`QueryHints`]**: per-query-execution hint store; carries the sort
//!   hints under the [`NULL_ORDERING_HINT`] key
//! - **[`Platform`]**: closed enumeration of the supported database dialects
//! - **[`Error`]**: error type for rewrite operations
//!
//! ## Architecture
//!
//! - **Text surgery, not parsing**: the statement's top-level `ORDER BY`
//!   clause is located with a quote/comment/paren-aware scanner, then
//!   rewritten with anchored per-field patterns. The statement is never
//!   re-parsed, which keeps the crate decoupled from whatever compiler
//!   produced the SQL.
//! - **Two strategies**: MySQL has no `NULLS FIRST`/`NULLS LAST` syntax, so
//!   NULLS LAST is emulated by negating the sort key and flipping the
//!   direction. Oracle and PostgreSQL support the syntax natively, so the
//!   keyword phrase is appended to the matching sort segments.
//! - **Chained application**: hints are applied in insertion order, each
//!   rewrite operating on the output of the previous one.

mod error;
mod hints;
mod platform;
mod rewrite;

// Re-export public types
pub use error::{Error, Result};
pub use hints::{NULL_ORDERING_HINT, NullOrdering, QueryHints, SortHints};
pub use platform::Platform;
pub use rewrite::{rewrite_null_ordering, rewrite_query};
