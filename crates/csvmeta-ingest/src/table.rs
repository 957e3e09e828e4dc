//! Tabular summary of comma-separated text
//!
//! The first row is the header. Header cells are normalized the way common
//! dataframe readers do it, so the stored `column_names` match what a
//! downstream consumer loading the same file would see:
//!
//! - a blank cell at position `i` becomes `Unnamed: i`
//! - repeated names get `.1`, `.2`, ... suffixes (`a,a,a` -> `a,a.1,a.2`)

use std::collections::{HashMap, HashSet};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

/// Shape of a parsed CSV document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub column_names: Vec<String>,

    /// Data rows, header excluded
    pub row_count: u64,
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("no columns to parse from file")]
    NoColumns,

    #[error("expected {expected} fields in line {line}, saw {found}")]
    RowLength {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Parse `text` and count its columns and data rows.
///
/// Lines holding only whitespace are skipped, before and after the header.
/// Every data row must have exactly as many fields as the header.
pub fn summarize_csv(text: &str) -> Result<TableSummary, TableError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    // Row lengths are checked here so whitespace-only lines can be dropped first
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records().filter(|row| match row {
        Ok(row) => !is_blank(row),
        Err(_) => true,
    });

    let headers = match records.next() {
        Some(row) => row?,
        None => return Err(TableError::NoColumns),
    };

    let mut row_count = 0u64;
    for row in records {
        let row = row?;
        if row.len() != headers.len() {
            return Err(TableError::RowLength {
                line: row.position().map_or(0, |pos| pos.line()),
                expected: headers.len(),
                found: row.len(),
            });
        }
        row_count += 1;
    }

    Ok(TableSummary {
        column_names: normalize_header(headers.iter()),
        row_count,
    })
}

fn is_blank(row: &StringRecord) -> bool {
    row.len() == 1 && row[0].trim().is_empty()
}

fn normalize_header<'a>(cells: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::new();

    for (index, cell) in cells.enumerate() {
        let base = if cell.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            cell.to_string()
        };

        let mut name = base.clone();
        if taken.contains(&name) {
            let counter = suffixes.entry(base.clone()).or_insert(0);
            loop {
                *counter += 1;
                name = format!("{}.{}", base, counter);
                if !taken.contains(&name) {
                    break;
                }
            }
        }

        taken.insert(name.clone());
        names.push(name);
    }

    names
}
