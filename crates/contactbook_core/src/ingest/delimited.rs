//! Delimited-text reader (CSV/TSV) built on the `csv` crate.

use csv::ReaderBuilder;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads every record as raw cells; row lengths may vary.
pub(super) fn read_rows(bytes: &[u8], delimiter: u8) -> Result<Vec<Vec<String>>, String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|err| format!("row {}: {err}", index + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
