//! Workbook reader (xlsx/xls/ods) built on `calamine`.
//!
//! Only the first worksheet is read; additional sheets are ignored.
//! Date cells render as `YYYY-MM-DD HH:MM:SS` rather than serial numbers.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// Largest float magnitude rendered as an integer without precision loss.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(super) fn read_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, String> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor).map_err(|err| err.to_string())?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|err| err.to_string())?,
        None => return Ok(Vec::new()),
    };

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// Renders one cell as opaque text.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER => {
            format!("{}", *value as i64)
        }
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) if value.is_datetime() => {
                datetime.format(DATETIME_FORMAT).to_string()
            }
            _ => value.as_f64().to_string(),
        },
        Data::DateTimeIso(value) | Data::DurationIso(value) => value.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::cell_text;
    use calamine::Data;

    #[test]
    fn integral_floats_drop_fraction() {
        assert_eq!(cell_text(&Data::Float(5551234.0)), "5551234");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
    }

    #[test]
    fn scalar_cells_render_as_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::String("Ada".into())), "Ada");
    }

    #[test]
    fn iso_date_cells_are_kept_verbatim() {
        assert_eq!(
            cell_text(&Data::DateTimeIso("1990-12-10T08:30:00".into())),
            "1990-12-10T08:30:00"
        );
        assert_eq!(cell_text(&Data::DurationIso("PT1H".into())), "PT1H");
    }
}
