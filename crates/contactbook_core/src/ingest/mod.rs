//! Spreadsheet ingestion: uploaded bytes to header + keyed rows.
//!
//! # Responsibility
//! - Detect the tabular format from the declared file name.
//! - Parse delimited text or workbook bytes into raw cell rows.
//! - Apply one shaping policy to both formats.
//!
//! # Invariants
//! - The first non-empty row is the header; header names are unique and
//!   non-blank (`Column_<n>` labels fill gaps and collisions).
//! - Every data row is keyed by exactly the header columns.
//! - Rows whose cells are all blank are skipped.
//! - Header names are trimmed; data cell text is kept verbatim.

mod delimited;
mod workbook;

use crate::error::ErrorKind;
use crate::model::contact::ContactValues;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type IngestResult<T> = Result<T, IngestError>;

/// Declared upload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Delimited text such as CSV or TSV.
    Delimited { delimiter: u8 },
    /// Spreadsheet binary (xlsx/xls/ods); the first worksheet is read.
    Workbook,
}

impl SpreadsheetFormat {
    /// Detects the format from a file name's extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> IngestResult<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Delimited { delimiter: b',' }),
            "tsv" | "tab" => Ok(Self::Delimited { delimiter: b'\t' }),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            _ => Err(IngestError::UnsupportedFormat(file_name.to_string())),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Delimited { .. } => "delimited",
            Self::Workbook => "workbook",
        }
    }
}

/// Parsed upload: header plus rows keyed by header names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedSheet {
    pub header: Vec<String>,
    pub rows: Vec<ContactValues>,
}

/// Upload could not be turned into tabular data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// File name carries no supported extension.
    UnsupportedFormat(String),
    /// Bytes are not valid data for the declared format.
    Unparseable {
        format: &'static str,
        message: String,
    },
    /// No non-empty row exists, so there is no header.
    Empty,
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Format
    }
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(name) => {
                write!(f, "unsupported file type `{name}`; expected csv, tsv, xlsx, xls or ods")
            }
            Self::Unparseable { format, message } => {
                write!(f, "error reading {format} file: {message}")
            }
            Self::Empty => write!(f, "file contains no rows"),
        }
    }
}

impl Error for IngestError {}

/// Parses an upload, detecting the format from `file_name`.
pub fn ingest_file(file_name: &str, bytes: &[u8]) -> IngestResult<IngestedSheet> {
    let format = SpreadsheetFormat::from_file_name(file_name)?;
    ingest_bytes(format, bytes)
}

/// Parses an upload in an explicitly declared format.
pub fn ingest_bytes(format: SpreadsheetFormat, bytes: &[u8]) -> IngestResult<IngestedSheet> {
    let raw_rows = match format {
        SpreadsheetFormat::Delimited { delimiter } => delimited::read_rows(bytes, delimiter),
        SpreadsheetFormat::Workbook => workbook::read_rows(bytes),
    }
    .map_err(|message| IngestError::Unparseable {
        format: format.label(),
        message,
    })?;

    shape_rows(raw_rows)
}

/// Applies header/row policy to raw cell rows from any format.
fn shape_rows(raw_rows: Vec<Vec<String>>) -> IngestResult<IngestedSheet> {
    let mut non_empty = raw_rows.into_iter().filter(|row| !is_blank_row(row));
    let raw_header = non_empty.next().ok_or(IngestError::Empty)?;
    let header = label_header(&raw_header);

    let rows = non_empty
        .map(|cells| {
            let mut cells = cells.into_iter();
            header
                .iter()
                .map(|column| (column.clone(), cells.next().unwrap_or_default()))
                .collect::<ContactValues>()
        })
        .filter(|values| values.values().any(|value| !value.trim().is_empty()))
        .collect();

    Ok(IngestedSheet { header, rows })
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Trims header names and auto-labels blank or repeated ones.
fn label_header(raw: &[String]) -> Vec<String> {
    let trimmed: Vec<&str> = raw.iter().map(|cell| cell.trim()).collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(trimmed.len());
    let mut header = Vec::with_capacity(trimmed.len());

    for (index, name) in trimmed.iter().enumerate() {
        let label = if name.is_empty() || taken.contains(*name) {
            unique_label(index + 1, &taken, &trimmed[index + 1..])
        } else {
            name.to_string()
        };
        taken.insert(label.clone());
        header.push(label);
    }

    header
}

/// Picks `Column_<position>` or a suffixed variant not used anywhere in the
/// header so far or later.
fn unique_label(position: usize, taken: &HashSet<String>, upcoming: &[&str]) -> String {
    let base = format!("Column_{position}");
    let is_free =
        |candidate: &str| !taken.contains(candidate) && !upcoming.iter().any(|n| *n == candidate);

    if is_free(base.as_str()) {
        return base;
    }
    (2..)
        .map(|suffix| format!("{base}_{suffix}"))
        .find(|candidate| is_free(candidate.as_str()))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::{ingest_bytes, ingest_file, IngestError, SpreadsheetFormat};

    fn csv(text: &str) -> super::IngestedSheet {
        ingest_bytes(SpreadsheetFormat::Delimited { delimiter: b',' }, text.as_bytes()).unwrap()
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            SpreadsheetFormat::from_file_name("people.CSV").unwrap(),
            SpreadsheetFormat::Delimited { delimiter: b',' }
        );
        assert_eq!(
            SpreadsheetFormat::from_file_name("people.tsv").unwrap(),
            SpreadsheetFormat::Delimited { delimiter: b'\t' }
        );
        assert_eq!(
            SpreadsheetFormat::from_file_name("book.xlsx").unwrap(),
            SpreadsheetFormat::Workbook
        );
        assert!(matches!(
            SpreadsheetFormat::from_file_name("notes.pdf"),
            Err(IngestError::UnsupportedFormat(_))
        ));
        assert!(SpreadsheetFormat::from_file_name("no_extension").is_err());
    }

    #[test]
    fn first_non_empty_row_is_header() {
        let sheet = csv(",,\nName,Email\nAda,ada@example.com\n");
        assert_eq!(sheet.header, vec!["Name", "Email"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0]["Email"], "ada@example.com");
    }

    #[test]
    fn blank_and_duplicate_headers_are_auto_labeled() {
        let sheet = csv("Name,,Name, Phone \na,b,c,d\n");
        assert_eq!(sheet.header, vec!["Name", "Column_2", "Column_3", "Phone"]);
        assert_eq!(sheet.rows[0]["Column_3"], "c");
    }

    #[test]
    fn auto_labels_avoid_existing_names() {
        let sheet = csv(",Column_1\nx,y\n");
        assert_eq!(sheet.header, vec!["Column_1_2", "Column_1"]);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let sheet = csv("A,B,C\n1\n1,2,3,4,5\n");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0]["B"], "");
        assert_eq!(sheet.rows[0]["C"], "");
        assert_eq!(sheet.rows[1].len(), 3);
        assert_eq!(sheet.rows[1]["C"], "3");
    }

    #[test]
    fn fully_blank_rows_are_skipped() {
        let sheet = csv("A,B\n1,2\n , \n,\n3,4\n");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1]["A"], "3");
    }

    #[test]
    fn data_cells_keep_surrounding_whitespace() {
        let sheet = csv(" Name ,Note\n Ada ,x  \n");
        assert_eq!(sheet.header, vec!["Name", "Note"]);
        assert_eq!(sheet.rows[0]["Name"], " Ada ");
        assert_eq!(sheet.rows[0]["Note"], "x  ");
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let sheet = csv("A,B\n");
        assert_eq!(sheet.header, vec!["A", "B"]);
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn empty_file_is_rejected() {
        assert_eq!(
            ingest_file("empty.csv", b"").unwrap_err(),
            IngestError::Empty
        );
        assert_eq!(
            ingest_file("blank.csv", b"\n , \n").unwrap_err(),
            IngestError::Empty
        );
    }

    #[test]
    fn corrupt_workbook_is_unparseable() {
        let err = ingest_file("broken.xlsx", b"definitely not a zip archive").unwrap_err();
        assert!(matches!(
            err,
            IngestError::Unparseable {
                format: "workbook",
                ..
            }
        ));
    }
}
