//! Tabular record sources for the reconciliation engine.
//!
//! Finds CSV and JSON extracts in a source directory and decodes each into a
//! [`RecordTable`](drugcat_model::RecordTable) tagged with its filename. Files
//! that fail to decode are reported alongside the tables that succeeded so the
//! caller can decide which failures matter.

pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod json_table;
pub mod source;

pub use csv_table::{read_csv_bytes, read_csv_table};
pub use discovery::{SourceFormat, list_source_files};
pub use error::{IngestError, Result};
pub use json_table::{read_json_bytes, read_json_table};
pub use source::{SourceFailure, SourceLoad, load_source_dir, load_source_file};
