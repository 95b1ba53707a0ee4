//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the operations callers invoke.
//! - Map repository failures onto service errors carrying an `ErrorKind`.
//!
//! Services hold no session state; every call is a standalone request.

pub mod contact_service;
pub mod export_service;
pub mod group_service;
pub mod import_service;
