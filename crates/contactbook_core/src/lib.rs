//! Core domain logic for Contactbook.
//! Groups carry their own column schema; contacts are open column -> text
//! mappings validated and projected against that schema.

pub mod db;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod search;
pub mod service;

pub use error::ErrorKind;
pub use ingest::{ingest_bytes, ingest_file, IngestError, IngestedSheet, SpreadsheetFormat};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{Contact, ContactId, ContactValues};
pub use model::group::{Group, GroupId};
pub use model::validation::ValidationError;
pub use reconcile::{reconcile_schema, ReconcileMode, SchemaReconciliation};
pub use repo::contact_repo::{ContactRepository, SqliteContactRepository};
pub use repo::group_repo::{GroupRepository, SqliteGroupRepository};
pub use repo::{RepoError, RepoResult};
pub use service::contact_service::{ContactService, ContactServiceError};
pub use service::export_service::{
    export_file_name, ExportOutcome, ExportService, ExportServiceError, ExportTable,
};
pub use service::group_service::{GroupDeletion, GroupService, GroupServiceError};
pub use service::import_service::{ImportReport, ImportService, ImportServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
