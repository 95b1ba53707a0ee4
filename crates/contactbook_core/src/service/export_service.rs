//! Export use-case: flatten a group's contacts into a rectangular table.
//!
//! # Invariants
//! - Columns are exactly the group's current schema, in order.
//! - Every row carries every column; absent values become `""` and stale
//!   keys are dropped.
//! - A group with zero contacts yields `ExportOutcome::Empty`, not an error.

use crate::error::ErrorKind;
use crate::model::contact::ContactValues;
use crate::model::group::GroupId;
use crate::repo::contact_repo::ContactRepository;
use crate::repo::group_repo::GroupRepository;
use crate::repo::RepoError;
use csv::WriterBuilder;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

static UNSAFE_FILE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\p{Cc}]+"#).expect("valid file name regex"));

/// Service error for export.
#[derive(Debug)]
pub enum ExportServiceError {
    GroupNotFound(GroupId),
    Repo(RepoError),
}

impl ExportServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GroupNotFound(_) => ErrorKind::NotFound,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for ExportServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExportServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::GroupNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ExportServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::GroupNotFound(id) => Self::GroupNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Flat table keyed by the current schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub group_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<ContactValues>,
}

impl ExportTable {
    /// Writes a header row and then every row in column order.
    pub fn write_delimited<W: Write>(&self, writer: W, delimiter: u8) -> std::io::Result<()> {
        let mut out = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
        out.write_record(&self.columns)?;
        for row in &self.rows {
            out.write_record(
                self.columns
                    .iter()
                    .map(|column| row.get(column).map_or("", String::as_str)),
            )?;
        }
        out.flush()
    }

    /// Suggested output file name for this table.
    pub fn file_name(&self, extension: &str) -> String {
        export_file_name(&self.group_name, extension)
    }
}

/// Export result; `Empty` is the soft nothing-to-export signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Table(ExportTable),
    Empty { group_id: GroupId },
}

impl ExportOutcome {
    /// Kind to report for the soft empty case, if any.
    pub fn soft_error(&self) -> Option<ErrorKind> {
        match self {
            Self::Table(_) => None,
            Self::Empty { .. } => Some(ErrorKind::Empty),
        }
    }
}

/// Builds `<group-name>_contacts.<ext>` with unsafe characters replaced.
pub fn export_file_name(group_name: &str, extension: &str) -> String {
    let safe = UNSAFE_FILE_CHARS_RE.replace_all(group_name.trim(), "_");
    let stem = if safe.is_empty() { "group" } else { &*safe };
    format!("{stem}_contacts.{}", extension.trim_start_matches('.'))
}

/// Export service over group and contact repositories.
pub struct ExportService<G: GroupRepository, C: ContactRepository> {
    groups: G,
    contacts: C,
}

impl<G: GroupRepository, C: ContactRepository> ExportService<G, C> {
    pub fn new(groups: G, contacts: C) -> Self {
        Self { groups, contacts }
    }

    /// Flattens the group's contacts onto its current schema.
    pub fn export(&self, group_id: GroupId) -> Result<ExportOutcome, ExportServiceError> {
        let group = self
            .groups
            .get_group(group_id)?
            .ok_or(ExportServiceError::GroupNotFound(group_id))?;
        let contacts = self.contacts.list_contacts(group_id)?;

        if contacts.is_empty() {
            info!("event=contact_export module=export status=empty group_id={group_id}");
            return Ok(ExportOutcome::Empty { group_id });
        }

        let rows: Vec<ContactValues> = contacts
            .iter()
            .map(|contact| contact.visible_values(&group.column_schema))
            .collect();
        let hidden_fields: usize = contacts
            .iter()
            .map(|contact| contact.stale_columns(&group.column_schema).len())
            .sum();
        info!(
            "event=contact_export module=export status=ok group_id={} rows={} columns={} hidden_fields={}",
            group_id,
            rows.len(),
            group.column_schema.len(),
            hidden_fields
        );

        Ok(ExportOutcome::Table(ExportTable {
            group_name: group.name,
            columns: group.column_schema,
            rows,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{export_file_name, ExportTable};
    use crate::model::contact::ContactValues;

    #[test]
    fn file_name_uses_group_name_and_extension() {
        assert_eq!(export_file_name("Clients", "csv"), "Clients_contacts.csv");
        assert_eq!(export_file_name("a/b:c", ".csv"), "a_b_c_contacts.csv");
        assert_eq!(export_file_name("  ", "csv"), "group_contacts.csv");
    }

    #[test]
    fn delimited_output_follows_column_order() {
        let mut row = ContactValues::new();
        row.insert("B".to_string(), "two, with comma".to_string());
        row.insert("A".to_string(), "1".to_string());
        let table = ExportTable {
            group_name: "g".to_string(),
            columns: vec!["A".to_string(), "B".to_string()],
            rows: vec![row],
        };

        let mut buffer = Vec::new();
        table.write_delimited(&mut buffer, b',').unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "A,B\n1,\"two, with comma\"\n");
    }
}
