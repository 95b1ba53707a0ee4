//! Contact domain model.
//!
//! # Invariants
//! - `group_id` never changes after creation.
//! - `values` keys are non-blank column names. Keys that are no longer part
//!   of the owning group's schema are kept in storage but hidden from
//!   schema-driven projections.

use crate::model::group::GroupId;
use crate::model::validation::ValidationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a contact record.
pub type ContactId = Uuid;

/// Open `column -> text` mapping; iteration follows insertion order.
pub type ContactValues = IndexMap<String, String>;

/// Contact read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub group_id: GroupId,
    pub values: ContactValues,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds; bumped on every full value replace.
    pub updated_at: i64,
}

impl Contact {
    /// Projects stored values onto `schema`.
    ///
    /// Columns missing from this record map to `""`; stored keys outside the
    /// schema are dropped.
    pub fn visible_values(&self, schema: &[String]) -> ContactValues {
        schema
            .iter()
            .map(|column| {
                let value = self.values.get(column).cloned().unwrap_or_default();
                (column.clone(), value)
            })
            .collect()
    }

    /// Returns stored keys that the given schema no longer surfaces.
    pub fn stale_columns<'a>(&'a self, schema: &[String]) -> Vec<&'a str> {
        self.values
            .keys()
            .filter(|key| !schema.iter().any(|column| column == *key))
            .map(String::as_str)
            .collect()
    }
}

/// Validates values for a manual create: every field must be filled.
///
/// Key set is not compared to the group schema; callers may send extra or
/// missing columns.
pub fn validate_new_values(values: &ContactValues) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(ValidationError::EmptyValues);
    }
    validate_value_keys(values)?;
    for (column, value) in values {
        if value.trim().is_empty() {
            return Err(ValidationError::BlankValue {
                column: column.clone(),
            });
        }
    }
    Ok(())
}

/// Validates keys only; blank values are allowed (import and edit paths).
pub fn validate_value_keys(values: &ContactValues) -> Result<(), ValidationError> {
    if values.keys().any(|key| key.trim().is_empty()) {
        return Err(ValidationError::BlankValueKey);
    }
    Ok(())
}
