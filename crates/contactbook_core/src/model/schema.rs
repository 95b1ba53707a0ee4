//! Column schema normalization.
//!
//! A schema is an ordered list of column names; insertion order is display
//! order. Names are unique within one group and compared case-sensitively.

use crate::model::validation::ValidationError;
use std::collections::HashSet;

/// Trims every column name and checks the result is a usable schema.
///
/// # Errors
/// - `EmptySchema` when `columns` is empty.
/// - `BlankColumnName` when a name is blank after trim.
/// - `DuplicateColumn` when two names collide after trim.
pub fn normalize_schema<S: AsRef<str>>(columns: &[S]) -> Result<Vec<String>, ValidationError> {
    if columns.is_empty() {
        return Err(ValidationError::EmptySchema);
    }

    let mut seen = HashSet::with_capacity(columns.len());
    let mut normalized = Vec::with_capacity(columns.len());
    for (position, column) in columns.iter().enumerate() {
        let name = column.as_ref().trim();
        if name.is_empty() {
            return Err(ValidationError::BlankColumnName { position });
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateColumn(name.to_string()));
        }
        normalized.push(name.to_string());
    }

    Ok(normalized)
}
