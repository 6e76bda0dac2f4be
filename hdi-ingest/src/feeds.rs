//! Source feed reading
//!
//! Each feed is a CSV file with a header row. Rows are kept as ordered
//! column/value pairs; values stay strings until the loader looks at them.
//! Short rows are accepted and simply lack their trailing columns.

use crate::fields::SourceKind;
use hdi_common::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One data row of a feed, in header order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by fixtures: append a column value
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.fields.push((column.to_string(), value.to_string()));
        self
    }

    /// Value of a column; the first occurrence wins on duplicate headers
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Read a feed file for the given source
pub fn read_feed(path: &Path, kind: SourceKind) -> Result<Vec<RawRow>> {
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open {} feed {}: {}", kind, path.display(), e),
        ))
    })?;

    let rows = read_rows(file, kind)?;
    info!(
        source = %kind,
        path = %path.display(),
        rows = rows.len(),
        "Read source feed"
    );
    Ok(rows)
}

/// Read feed rows from any reader, validating the header against `kind`
pub fn read_rows<R: Read>(reader: R, kind: SourceKind) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for field in kind.fields() {
        if !headers.iter().any(|h| h == field.column()) {
            return Err(Error::InvalidInput(format!(
                "{} feed is missing column '{}'",
                kind,
                field.column()
            )));
        }
    }

    let mut rows: Vec<RawRow> = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < headers.len() {
            debug!(
                source = %kind,
                line = record.position().map(|p| p.line()),
                "Short row, missing trailing columns"
            );
        }
        rows.push(headers.iter().zip(record.iter()).collect());
    }

    Ok(rows)
}
