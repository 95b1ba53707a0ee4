//! Validation failures raised by model normalization.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Group name is blank after trim.
    BlankGroupName,
    /// Schema redefinition with zero columns.
    EmptySchema,
    /// Column name at `position` (0-based) is blank after trim.
    BlankColumnName { position: usize },
    /// Column name occurs more than once after trim.
    DuplicateColumn(String),
    /// Contact created with no values at all.
    EmptyValues,
    /// Contact value mapping contains a blank key.
    BlankValueKey,
    /// Contact value for `column` is blank at creation time.
    BlankValue { column: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankGroupName => write!(f, "group name must not be blank"),
            Self::EmptySchema => write!(f, "schema must contain at least one column"),
            Self::BlankColumnName { position } => {
                write!(f, "column name at position {} must not be blank", position + 1)
            }
            Self::DuplicateColumn(name) => write!(f, "duplicate column name: `{name}`"),
            Self::EmptyValues => write!(f, "contact must have at least one field"),
            Self::BlankValueKey => write!(f, "contact field names must not be blank"),
            Self::BlankValue { column } => write!(f, "field `{column}` must not be blank"),
        }
    }
}

impl Error for ValidationError {}
