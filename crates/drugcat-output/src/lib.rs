//! Output artifacts of a reconciliation run.
//!
//! Four CSV tables with a fixed column order plus `version.txt`. Artifacts are
//! staged next to their final paths and only moved into place once every one
//! of them has been written.

mod artifacts;
mod csv_artifact;
mod error;
mod version;

pub use artifacts::{Artifacts, write_artifacts};
pub use csv_artifact::{
    ATC_FILE, CsvArtifact, INGREDIENTS_FILE, PRICES_FILE, PRODUCTS_FILE, format_bool,
    format_price, write_csv,
};
pub use error::{OutputError, Result};
pub use version::{VERSION_FILE, version_stamp};
