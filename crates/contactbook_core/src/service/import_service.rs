//! Spreadsheet import use-case.
//!
//! # Responsibility
//! - Run ingest -> schema reconcile -> bulk insert for one group.
//! - Report partial completion explicitly instead of all-or-nothing.
//!
//! # Invariants
//! - The import is not transactional across steps: a schema write that
//!   succeeded stays even when the row insert fails afterwards.
//! - Row insert itself is all-or-nothing.
//! - Schemas only grow through import.

use crate::error::ErrorKind;
use crate::ingest::{ingest_file, IngestError, IngestedSheet};
use crate::model::group::GroupId;
use crate::model::validation::ValidationError;
use crate::reconcile::reconcile_schema;
use crate::repo::contact_repo::ContactRepository;
use crate::repo::group_repo::GroupRepository;
use crate::repo::RepoError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Import failure before any row was stored.
#[derive(Debug)]
pub enum ImportServiceError {
    GroupNotFound(GroupId),
    Format(IngestError),
    Validation(ValidationError),
    Repo(RepoError),
}

impl ImportServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GroupNotFound(_) => ErrorKind::NotFound,
            Self::Format(err) => err.kind(),
            Self::Validation(_) => ErrorKind::Validation,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for ImportServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::Format(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::GroupNotFound(_) => None,
            Self::Format(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<IngestError> for ImportServiceError {
    fn from(value: IngestError) -> Self {
        Self::Format(value)
    }
}

impl From<RepoError> for ImportServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::GroupNotFound(id) => Self::GroupNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Two-phase import result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub group_id: GroupId,
    /// Reconciled schema after this import.
    pub columns: Vec<String>,
    /// Columns this import appended to the schema.
    pub added_columns: Vec<String>,
    pub schema_updated: bool,
    pub rows_inserted: usize,
    /// Set when the schema was written but rows were not inserted.
    pub warning: Option<String>,
    /// Human-readable summary for the caller.
    pub message: String,
}

impl ImportReport {
    /// Returns whether the import stopped between schema write and insert.
    pub fn is_partial(&self) -> bool {
        self.warning.is_some()
    }
}

/// Import service over group (schema store) and contact repositories.
pub struct ImportService<G: GroupRepository, C: ContactRepository> {
    groups: G,
    contacts: C,
}

impl<G: GroupRepository, C: ContactRepository> ImportService<G, C> {
    pub fn new(groups: G, contacts: C) -> Self {
        Self { groups, contacts }
    }

    /// Imports an uploaded file into `group_id`.
    ///
    /// The format is detected from `file_name`'s extension.
    pub fn import_file(
        &self,
        group_id: GroupId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ImportReport, ImportServiceError> {
        let started_at = Instant::now();
        // Unknown group wins over a bad upload.
        self.groups.get_schema(group_id)?;

        let sheet = match ingest_file(file_name, bytes) {
            Ok(sheet) => sheet,
            Err(err) => {
                error!(
                    "event=contact_import module=import status=error group_id={} bytes={} error_code=ingest_failed error={}",
                    group_id,
                    bytes.len(),
                    err
                );
                return Err(err.into());
            }
        };

        let report = self.import_sheet(group_id, &sheet)?;
        info!(
            "event=contact_import module=import status={} group_id={} rows={} added_columns={} duration_ms={}",
            if report.is_partial() { "warn" } else { "ok" },
            group_id,
            report.rows_inserted,
            report.added_columns.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Reconciles and stores an already parsed sheet.
    pub fn import_sheet(
        &self,
        group_id: GroupId,
        sheet: &IngestedSheet,
    ) -> Result<ImportReport, ImportServiceError> {
        let current = self.groups.get_schema(group_id)?;
        let reconciliation = reconcile_schema(&current, &sheet.header);

        let (columns, schema_updated) = if reconciliation.changed() {
            let stored = self.groups.set_schema(group_id, &reconciliation.schema)?;
            (stored, true)
        } else {
            (reconciliation.schema, false)
        };

        match self.contacts.bulk_create(group_id, &sheet.rows) {
            Ok(rows_inserted) => Ok(ImportReport {
                group_id,
                columns,
                added_columns: reconciliation.added_columns,
                schema_updated,
                rows_inserted,
                warning: None,
                message: format!("Successfully imported {rows_inserted} contacts"),
            }),
            Err(err) if schema_updated => {
                warn!(
                    "event=contact_import module=import status=warn group_id={} error_code=partial_import rows_pending={} error={}",
                    group_id,
                    sheet.rows.len(),
                    err
                );
                let warning = format!("schema was updated but contacts were not inserted: {err}");
                Ok(ImportReport {
                    group_id,
                    columns,
                    added_columns: reconciliation.added_columns,
                    schema_updated,
                    rows_inserted: 0,
                    message: format!(
                        "Partial import: columns updated, 0 of {} contacts imported; retry the upload",
                        sheet.rows.len()
                    ),
                    warning: Some(warning),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}
