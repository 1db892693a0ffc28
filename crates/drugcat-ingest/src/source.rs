use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use drugcat_model::RecordTable;

use crate::csv_table::read_csv_table;
use crate::discovery::{SourceFormat, list_source_files};
use crate::error::{IngestError, Result};
use crate::json_table::read_json_table;

/// A source that could not be decoded.
#[derive(Debug)]
pub struct SourceFailure {
    pub path: PathBuf,
    pub error: IngestError,
}

/// Outcome of loading a source directory.
#[derive(Debug, Default)]
pub struct SourceLoad {
    pub tables: Vec<RecordTable>,
    pub failures: Vec<SourceFailure>,
}

/// Decode a single file according to its extension.
pub fn load_source_file(path: &Path) -> Result<RecordTable> {
    match SourceFormat::from_path(path) {
        Some(SourceFormat::Csv) => read_csv_table(path),
        Some(SourceFormat::Json) => read_json_table(path),
        None => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Decode every supported file in `dir`.
///
/// Per-file failures are collected rather than returned; only an unreadable
/// directory is an error.
pub fn load_source_dir(dir: &Path) -> Result<SourceLoad> {
    let mut load = SourceLoad::default();
    for path in list_source_files(dir)? {
        match load_source_file(&path) {
            Ok(table) => {
                debug!(
                    source = %table.source,
                    columns = table.headers.len(),
                    rows = table.len(),
                    "source decoded"
                );
                load.tables.push(table);
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "source skipped");
                load.failures.push(SourceFailure { path, error });
            }
        }
    }
    Ok(load)
}
