//! XLSX bytes → RawTable. First worksheet, first row is the header.

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;

use super::{RawTable, RawValue};
use crate::error::ReadError;

pub(crate) fn parse_xlsx(bytes: &[u8], source_name: &str) -> Result<RawTable, ReadError> {
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(Cursor::new(bytes)).map_err(|e| ReadError::io(source_name, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReadError::io(source_name, "workbook has no worksheets"))?
        .map_err(|e| ReadError::io(source_name, e))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ReadError::io(source_name, "worksheet has no header row"))?;
    let headers = header.iter().map(|c| c.to_string().trim().to_string()).collect();

    let mut table = RawTable::new(headers).map_err(|e| ReadError::io(source_name, e))?;
    for row in rows {
        let values: Vec<RawValue> = row.iter().map(cell_value).collect();
        if values.iter().all(RawValue::is_missing) {
            continue;
        }
        table.push_values(values);
    }
    Ok(table)
}

fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Missing,
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) if f.is_finite() => RawValue::Number(*f),
        Data::String(s) => RawValue::from_cell(s),
        Data::Bool(b) => RawValue::Text(b.to_string()),
        other => RawValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_io_failure() {
        match parse_xlsx(b"definitely not a zip archive", "upload.xlsx") {
            Err(ReadError::Io { source_name, cause }) => {
                assert_eq!(source_name, "upload.xlsx");
                assert!(!cause.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn cell_mapping() {
        assert_eq!(cell_value(&Data::Empty), RawValue::Missing);
        assert_eq!(cell_value(&Data::Int(30)), RawValue::Number(30.0));
        assert_eq!(cell_value(&Data::Float(28.5)), RawValue::Number(28.5));
        assert_eq!(cell_value(&Data::String("30".into())), RawValue::Number(30.0));
        assert_eq!(cell_value(&Data::String("Spinal".into())), RawValue::Text("Spinal".into()));
        assert_eq!(cell_value(&Data::Bool(true)), RawValue::Text("true".into()));
    }
}
