//! Source reader: uploaded csv/xlsx bytes, local files, or CSV-export links → [`RawTable`].
//! Values stay untyped (tagged text/number/missing) until the validator resolves them.

mod delimited;
mod link;
mod workbook;

pub use link::LinkWarning;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::SourceConfig;
use crate::error::ReadError;

/// A raw cell as read from a source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Missing,
}

impl RawValue {
    /// Classify a text cell: blank → missing, finite number → number, else text.
    pub fn from_cell(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            return RawValue::Missing;
        }
        match cell.parse::<f64>() {
            Ok(v) if v.is_finite() => RawValue::Number(v),
            _ => RawValue::Text(cell.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => write!(f, "\"{}\"", s),
            RawValue::Number(v) => write!(f, "{}", v),
            RawValue::Missing => f.write_str("<missing>"),
        }
    }
}

/// One row: ordered column → value pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRow {
    cells: Vec<(String, RawValue)>,
}

impl RawRow {
    pub fn new(cells: Vec<(String, RawValue)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: RawValue) {
        let column = column.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn columns(&self) -> Vec<&str> {
        self.cells.iter().map(|(c, _)| c.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }
}

/// Header plus rows. A header-only table is a valid, empty result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawTable {
    /// Blank header cells are named `Unnamed: <index>` (0-based). Fails on
    /// duplicate column names.
    pub fn new(headers: Vec<String>) -> Result<Self, String> {
        let headers: Vec<String> = headers
            .into_iter()
            .enumerate()
            .map(|(i, h)| {
                if h.trim().is_empty() {
                    format!("Unnamed: {}", i)
                } else {
                    h
                }
            })
            .collect();
        for (i, h) in headers.iter().enumerate() {
            if headers[..i].contains(h) {
                return Err(format!("duplicate column '{}'", h));
            }
        }
        Ok(Self {
            headers,
            rows: Vec::new(),
        })
    }

    /// Append a row of values in header order. Short rows are padded with missing values.
    pub fn push_values(&mut self, values: Vec<RawValue>) {
        let mut values = values.into_iter();
        let cells = self
            .headers
            .iter()
            .map(|h| (h.clone(), values.next().unwrap_or(RawValue::Missing)))
            .collect();
        self.rows.push(RawRow::new(cells));
    }

    pub fn push_row(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> &[RawRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    /// Format from a filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "xlsx" => Some(SourceFormat::Xlsx),
            _ => None,
        }
    }
}

/// Where a table comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Uploaded bytes; the filename decides the format
    Upload { filename: String, bytes: Vec<u8> },
    /// Local file
    Path(PathBuf),
    /// Remote link expected to resolve to a CSV export
    Link(String),
}

impl Source {
    /// Interpret a command-line argument: http(s) URLs are links, anything else a path.
    pub fn from_arg(arg: &str) -> Self {
        let lower = arg.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Link(arg.to_string())
        } else {
            Source::Path(PathBuf::from(arg))
        }
    }

    pub fn name(&self) -> String {
        match self {
            Source::Upload { filename, .. } => filename.clone(),
            Source::Path(p) => p.display().to_string(),
            Source::Link(url) => url.clone(),
        }
    }
}

/// Result of a read that did not fail outright.
#[derive(Debug, Clone)]
pub enum ReadOutcome {
    Table(RawTable),
    /// The link was not fetched; the caller should show the warning
    Warning(LinkWarning),
}

impl ReadOutcome {
    pub fn table(self) -> Option<RawTable> {
        match self {
            ReadOutcome::Table(t) => Some(t),
            ReadOutcome::Warning(_) => None,
        }
    }
}

pub struct SourceReader {
    config: SourceConfig,
}

impl SourceReader {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    pub fn read(&self, source: &Source) -> Result<ReadOutcome, ReadError> {
        let name = source.name();
        let outcome = match source {
            Source::Upload { filename, bytes } => {
                ReadOutcome::Table(parse_bytes(filename, bytes, &name)?)
            }
            Source::Path(path) => {
                let filename = path.display().to_string();
                // Reject the extension before touching the filesystem.
                if SourceFormat::from_filename(&filename).is_none() {
                    return Err(ReadError::UnsupportedFormat { filename });
                }
                let bytes = std::fs::read(path).map_err(|e| ReadError::io(&name, e))?;
                ReadOutcome::Table(parse_bytes(&filename, &bytes, &name)?)
            }
            Source::Link(url) => {
                if let Some(w) = link::check_link(url, &self.config.csv_export_marker) {
                    warn!(url = %url, "link is not a CSV export; not fetched");
                    return Ok(ReadOutcome::Warning(w));
                }
                let fetcher = link::LinkFetcher::new(&self.config)?;
                let body = fetcher.fetch(url)?;
                ReadOutcome::Table(delimited::parse_csv(&body, &name)?)
            }
        };
        if let ReadOutcome::Table(ref t) = outcome {
            info!(source = %name, columns = t.headers().len(), rows = t.len(), "source read");
        }
        Ok(outcome)
    }
}

fn parse_bytes(filename: &str, bytes: &[u8], name: &str) -> Result<RawTable, ReadError> {
    match SourceFormat::from_filename(filename) {
        Some(SourceFormat::Csv) => delimited::parse_csv(bytes, name),
        Some(SourceFormat::Xlsx) => workbook::parse_xlsx(bytes, name),
        None => Err(ReadError::UnsupportedFormat {
            filename: filename.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> SourceReader {
        SourceReader::new(SourceConfig::default())
    }

    #[test]
    fn cell_classification() {
        assert_eq!(RawValue::from_cell(" 30 "), RawValue::Number(30.0));
        assert_eq!(RawValue::from_cell("28.5"), RawValue::Number(28.5));
        assert_eq!(RawValue::from_cell(""), RawValue::Missing);
        assert_eq!(RawValue::from_cell("   "), RawValue::Missing);
        assert_eq!(RawValue::from_cell("<30min"), RawValue::Text("<30min".into()));
        assert_eq!(RawValue::from_cell("NaN"), RawValue::Text("NaN".into()));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_filename("a.csv"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_filename("A.XLSX"), Some(SourceFormat::Xlsx));
        assert_eq!(SourceFormat::from_filename("a.xls"), None);
        assert_eq!(SourceFormat::from_filename("noext"), None);
    }

    #[test]
    fn upload_csv() {
        let src = Source::Upload {
            filename: "patients.csv".into(),
            bytes: b"Age,BMI\n30,28.0\n".to_vec(),
        };
        let table = reader().read(&src).unwrap().table().unwrap();
        assert_eq!(table.headers(), &["Age".to_string(), "BMI".to_string()]);
        assert_eq!(table.rows()[0].get("BMI"), Some(&RawValue::Number(28.0)));
    }

    #[test]
    fn unsupported_upload_extension() {
        let src = Source::Upload {
            filename: "patients.txt".into(),
            bytes: b"Age\n30\n".to_vec(),
        };
        match reader().read(&src) {
            Err(ReadError::UnsupportedFormat { filename }) => assert_eq!(filename, "patients.txt"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unsupported_path_checked_before_io() {
        let src = Source::Path(PathBuf::from("/nonexistent/data.json"));
        assert!(matches!(
            reader().read(&src),
            Err(ReadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn missing_path_is_io_failure() {
        let src = Source::Path(PathBuf::from("/nonexistent/data.csv"));
        match reader().read(&src) {
            Err(ReadError::Io { source_name, cause }) => {
                assert_eq!(source_name, "/nonexistent/data.csv");
                assert!(!cause.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn from_arg_detects_links() {
        assert!(matches!(Source::from_arg("https://x/export?format=csv"), Source::Link(_)));
        assert!(matches!(Source::from_arg("data/x.csv"), Source::Path(_)));
    }

    #[test]
    fn duplicate_headers_rejected() {
        assert!(RawTable::new(vec!["Age".into(), "Age".into()]).is_err());
    }

    #[test]
    fn blank_headers_named_by_position() {
        let t = RawTable::new(vec!["Age".into(), "".into(), " ".into()]).unwrap();
        assert_eq!(
            t.headers(),
            &["Age".to_string(), "Unnamed: 1".to_string(), "Unnamed: 2".to_string()]
        );
    }

    #[test]
    fn short_rows_padded() {
        let mut t = RawTable::new(vec!["Age".into(), "BMI".into()]).unwrap();
        t.push_values(vec![RawValue::Number(30.0)]);
        assert_eq!(t.rows()[0].get("BMI"), Some(&RawValue::Missing));
        assert_eq!(t.head(5).len(), 1);
    }
}
