#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Kind assigned to a source table by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Products,
    Compositions,
    Prices,
    Unclassified,
}

impl TableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Compositions => "compositions",
            Self::Prices => "prices",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "products" | "product" => Ok(Self::Products),
            "compositions" | "composition" | "ingredients" => Ok(Self::Compositions),
            "prices" | "price" => Ok(Self::Prices),
            "unclassified" => Ok(Self::Unclassified),
            _ => Err(ModelError::UnknownTableKind(value.to_string())),
        }
    }
}

/// An already-decoded tabular source.
///
/// `source` is the originating filename or URL and only feeds classifier
/// heuristics and log lines. Rows may be shorter than `headers`; missing
/// trailing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTable {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    pub fn new(source: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            source: source.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, rejecting rows wider than the header.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), ModelError> {
        if row.len() > self.headers.len() {
            return Err(ModelError::RowWidth {
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|cells| Record {
            headers: &self.headers,
            cells,
        })
    }
}

/// Borrowed view of one row with its column names.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> Record<'a> {
    pub fn new(headers: &'a [String], cells: &'a [String]) -> Self {
        Self { headers, cells }
    }

    /// Columns in source order as `(name, value)` pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&'a str, &'a str)> + use<'a> {
        let (headers, cells) = (self.headers, self.cells);
        headers.iter().enumerate().map(move |(idx, name)| {
            let value = cells.get(idx).map(String::as_str).unwrap_or("");
            (name.as_str(), value)
        })
    }

    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}
