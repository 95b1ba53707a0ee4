//! Group/contact domain model.
//!
//! # Responsibility
//! - Define the group and contact records shared by every use-case.
//! - Own normalization of caller-supplied names, schemas and values.
//!
//! # Invariants
//! - Groups and contacts are identified by stable UUIDs.
//! - A contact belongs to exactly one group for its lifetime.
//! - Contact values are an open `column -> text` mapping; there is no fixed
//!   contact shape.

pub mod contact;
pub mod group;
pub mod schema;
pub mod validation;
