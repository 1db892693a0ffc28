use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use drugcat_model::RecordTable;

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Picks the delimiter occurring most often on the first line.
///
/// Registry exports use `;` as often as `,`.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or(&[]);
    let count = |needle: u8| first_line.iter().filter(|b| **b == needle).count();
    let candidates = [(b',', count(b',')), (b';', count(b';')), (b'\t', count(b'\t'))];
    candidates
        .iter()
        .copied()
        .max_by_key(|(_, n)| *n)
        .filter(|(_, n)| *n > 0)
        .map(|(delimiter, _)| delimiter)
        .unwrap_or(b',')
}

/// Read a delimited text file into a [`RecordTable`] named after its filename.
pub fn read_csv_table(path: &Path) -> Result<RecordTable> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    read_csv_bytes(name, &bytes)
}

/// Decode delimited text. The first row is the header.
pub fn read_csv_bytes(source: &str, bytes: &[u8]) -> Result<RecordTable> {
    let csv_error = |message: String| IngestError::CsvParse {
        path: PathBuf::from(source),
        message,
    };
    let delimiter = if source.to_ascii_lowercase().ends_with(".tsv") {
        b'\t'
    } else {
        sniff_delimiter(bytes)
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(e.to_string()))?
        .iter()
        .map(normalize_header)
        .collect();
    let width = headers.len();
    let mut table = RecordTable::new(source, headers);

    let mut truncated = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(e.to_string()))?;
        let mut cells: Vec<String> = record.iter().map(normalize_cell).collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        if cells.len() > width {
            truncated += 1;
            cells.truncate(width);
        }
        table
            .push_row(cells)
            .map_err(|e| csv_error(e.to_string()))?;
    }
    if truncated > 0 {
        debug!(source, truncated, "rows wider than the header were truncated");
    }
    Ok(table)
}
