//! Line-oriented CSV parsing
//!
//! Splits on bare commas only: quoted fields and embedded commas are not
//! recognised.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::error::IngestError;

/// One data line as header → value pairs, in column order
///
/// Keys are unique: a repeated header keeps its first position and takes the
/// later column's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, overwriting any earlier value for the same header
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(h, _)| *h == header) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((header, value)),
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<H: Into<String>, V: Into<String>> FromIterator<(H, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (h, v) in iter {
            row.insert(h, v);
        }
        row
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

/// Build a row from one data line against the header list
///
/// Missing trailing fields become empty strings; extra fields are dropped.
pub fn parse_line(headers: &[String], line: &str) -> RawRow {
    let values = split_fields(line);
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| (header.as_str(), values.get(i).copied().unwrap_or("")))
        .collect()
}

/// Parse CSV text read from `reader`, using the first line as the header
pub fn parse_reader<R: BufRead>(reader: R) -> std::io::Result<Vec<RawRow>> {
    let mut lines = reader.lines();

    let headers: Vec<String> = match lines.next() {
        Some(line) => split_fields(&line?).into_iter().map(String::from).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for line in lines {
        // `lines()` strips "\n" and "\r\n"
        rows.push(parse_line(&headers, &line?));
    }

    Ok(rows)
}

/// Parse the CSV file at `path` into rows, in file order
pub fn parse_csv_file(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let io_err = |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let rows = parse_reader(BufReader::new(file)).map_err(io_err)?;

    tracing::debug!("Parsed {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
