//! CSV bytes → RawTable. Ragged rows and invalid UTF-8 are structural errors.

use csv::{ReaderBuilder, Trim};

use super::{RawTable, RawValue};
use crate::error::ReadError;

pub(crate) fn parse_csv(bytes: &[u8], source_name: &str) -> Result<RawTable, ReadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReadError::io(source_name, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() {
        return Err(ReadError::io(source_name, "no header row"));
    }

    let mut table = RawTable::new(headers).map_err(|e| ReadError::io(source_name, e))?;
    for record in reader.records() {
        let record = record.map_err(|e| ReadError::io(source_name, e))?;
        table.push_values(record.iter().map(RawValue::from_cell).collect());
    }
    Ok(table)
}
