//! Header-mapped CSV tables for reference-data ingestion.
//!
//! Supports double-quoted fields (with `""` escapes) on a single line. Rows
//! shorter than the header simply lack the trailing columns.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::errors::{DeckError, DeckResult};

/// A CSV file held in memory as a header plus rows of fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read and parse a CSV file.
    pub fn read(path: &Path) -> DeckResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            DeckError::file_error("open", path.display().to_string(), format!("Failed to open CSV: {}", e))
        })?;
        let table = Self::parse(&text);
        if table.headers.is_empty() {
            return Err(DeckError::file_error("read", path.display().to_string(), "CSV file is empty"));
        }
        Ok(table)
    }

    /// Parse CSV text. The first non-empty line is the header.
    pub fn parse(text: &str) -> Self {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());

        let headers = match lines.next() {
            Some(header) => split_line(header.trim_start_matches('\u{feff}')),
            None => return CsvTable::default(),
        };
        let rows = lines.map(split_line).collect();

        CsvTable { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate the data rows as header-keyed records
    pub fn records(&self) -> impl Iterator<Item = CsvRecord<'_>> {
        self.rows.iter().map(move |fields| CsvRecord {
            headers: &self.headers,
            fields,
        })
    }
}

/// One data row, addressable by column name
#[derive(Debug, Clone, Copy)]
pub struct CsvRecord<'a> {
    headers: &'a [String],
    fields: &'a [String],
}

impl<'a> CsvRecord<'a> {
    /// Value under an exact header name.
    ///
    /// With duplicate headers the rightmost column wins.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().rposition(|h| h == column)?;
        self.fields.get(index).map(String::as_str)
    }

    /// Value of the first listed column present in the header.
    ///
    /// With `allow_blank` false, empty values are skipped in favour of the
    /// next candidate.
    pub fn first_present(&self, columns: &[&str], allow_blank: bool) -> Option<&'a str> {
        columns
            .iter()
            .filter_map(|column| self.get(column))
            .find(|value| allow_blank || !value.is_empty())
    }
}

/// Parse an optional f64 from a CSV field
///
/// Returns None for empty strings, `NULL`, dashes, or invalid numbers.
pub fn parse_optional_f64(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("NULL") {
        return None;
    }
    f64::from_str(trimmed).ok().filter(|v| v.is_finite())
}

fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
