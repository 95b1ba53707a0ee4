//! Free-text contact search.
//!
//! # Invariants
//! - Matching is any-field: a contact matches when one stored value
//!   contains the query.
//! - Comparison is case-insensitive via Unicode lowercase folding.
//! - A blank query matches every contact.

pub mod matcher;
