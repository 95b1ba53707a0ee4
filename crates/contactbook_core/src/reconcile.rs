//! Schema reconciliation between a group's schema and an ingested header.
//!
//! # Invariants
//! - Import never removes a column: existing columns keep their order and
//!   new header columns are appended in header order.
//! - Matching is exact and case-sensitive; near-duplicate names are kept as
//!   separate columns.
//! - Explicit redefinition through the schema store is the only way to
//!   shrink a schema.

/// How the reconciled schema relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Group had no schema; the header became the schema.
    Created,
    /// Header introduced columns that were appended.
    Extended,
    /// Every header column already existed.
    Unchanged,
}

/// Result of merging one header into a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReconciliation {
    /// Authoritative schema to write back.
    pub schema: Vec<String>,
    /// Columns not present before, in header order.
    pub added_columns: Vec<String>,
    pub mode: ReconcileMode,
}

impl SchemaReconciliation {
    /// Returns whether the schema store needs a write.
    pub fn changed(&self) -> bool {
        self.mode != ReconcileMode::Unchanged
    }
}

/// Unions `header` onto the end of `current`.
pub fn reconcile_schema(current: &[String], header: &[String]) -> SchemaReconciliation {
    if current.is_empty() {
        return SchemaReconciliation {
            schema: header.to_vec(),
            added_columns: header.to_vec(),
            mode: if header.is_empty() {
                ReconcileMode::Unchanged
            } else {
                ReconcileMode::Created
            },
        };
    }

    let mut schema = current.to_vec();
    let mut added_columns = Vec::new();
    for column in header {
        if !schema.contains(column) {
            schema.push(column.clone());
            added_columns.push(column.clone());
        }
    }

    let mode = if added_columns.is_empty() {
        ReconcileMode::Unchanged
    } else {
        ReconcileMode::Extended
    };

    SchemaReconciliation {
        schema,
        added_columns,
        mode,
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile_schema, ReconcileMode};

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn empty_schema_takes_header_verbatim() {
        let result = reconcile_schema(&[], &cols(&["A", "B"]));
        assert_eq!(result.schema, cols(&["A", "B"]));
        assert_eq!(result.mode, ReconcileMode::Created);
        assert!(result.changed());
    }

    #[test]
    fn new_columns_are_appended_and_old_ones_kept() {
        let result = reconcile_schema(&cols(&["A", "B"]), &cols(&["B", "C"]));
        assert_eq!(result.schema, cols(&["A", "B", "C"]));
        assert_eq!(result.added_columns, cols(&["C"]));
        assert_eq!(result.mode, ReconcileMode::Extended);
    }

    #[test]
    fn subset_header_leaves_schema_unchanged() {
        let result = reconcile_schema(&cols(&["A", "B", "C"]), &cols(&["C", "A"]));
        assert_eq!(result.schema, cols(&["A", "B", "C"]));
        assert!(!result.changed());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let result = reconcile_schema(&cols(&["Email"]), &cols(&["email"]));
        assert_eq!(result.schema, cols(&["Email", "email"]));
    }
}
