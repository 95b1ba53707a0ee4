//! Machine-readable error classification shared by every service.
//!
//! Each service error keeps its own variants and human message; `kind()`
//! collapses them onto the small set callers branch on.

use std::fmt::{Display, Formatter};

/// Stable error category surfaced at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or missing input: blank names, duplicate columns, blank fields.
    Validation,
    /// Unknown group or contact id.
    NotFound,
    /// Upload could not be parsed as tabular data.
    Format,
    /// Nothing to export. Soft condition, never fatal.
    Empty,
    /// Persistence failure or corrupt stored data.
    Storage,
}

impl ErrorKind {
    /// Returns the wire name used by transport layers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Format => "format",
            Self::Empty => "empty",
            Self::Storage => "storage",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorKind;

    #[test]
    fn wire_names_are_snake_case() {
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::Validation.to_string(), "validation");
    }
}
