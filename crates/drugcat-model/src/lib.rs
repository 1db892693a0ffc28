//! Data model for the drug catalog reconciliation workspace.
//!
//! Everything in here is a plain value: tables arrive as [`RecordTable`]s,
//! leave as catalog, ingredient, price and ATC rows, and nothing carries state
//! between runs.

pub mod atc;
pub mod catalog;
pub mod dictionary;
pub mod error;
pub mod price;
pub mod table;

pub use atc::AtcNode;
pub use catalog::{CatalogEntry, IngredientRecord};
pub use dictionary::{Dictionaries, FieldDomain, SynonymDictionary};
pub use error::{ModelError, Result};
pub use price::{PriceObservation, ReconciledPrice};
pub use table::{Record, RecordTable, TableKind};
