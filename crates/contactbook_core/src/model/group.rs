//! Group domain model.
//!
//! # Invariants
//! - `id` is stable and never reused.
//! - `name` is non-blank after trim.
//! - `column_schema` holds unique, non-blank names; it may be empty until the
//!   first import or explicit schema definition.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a contact group.
pub type GroupId = Uuid;

/// Named container of contacts carrying its own column schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    /// Ordered column names; order is display order.
    pub column_schema: Vec<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl Group {
    /// Returns whether `column` is part of the current schema.
    pub fn has_column(&self, column: &str) -> bool {
        self.column_schema.iter().any(|existing| existing == column)
    }
}

/// Trims a group name, rejecting blank input.
pub fn normalize_group_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankGroupName);
    }
    Ok(trimmed.to_string())
}

/// Trims an optional description; blank collapses to `None`.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
