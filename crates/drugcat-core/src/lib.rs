//! Reconciliation engine for drug catalog extracts.
//!
//! Stages run strictly in order and each one hands an immutable snapshot to the
//! next:
//!
//! 1. [`classify`] labels every source table.
//! 2. [`catalog`] canonicalizes product and composition rows through
//!    [`normalize`] and assigns ids with [`ids`].
//! 3. [`prices`] matches price observations to catalog entries and keeps the
//!    most recent price per product.
//! 4. [`atc`] decomposes every entry's ATC code.
//!
//! [`pipeline::run_pipeline`] drives the stages end to end.

pub mod atc;
pub mod catalog;
pub mod classify;
pub mod error;
pub mod fields;
pub mod ids;
pub mod normalize;
pub mod pipeline;
pub mod prices;

pub use error::PipelineError;
pub use pipeline::{
    PipelineOptions, PipelineOutput, PipelineReport, SourceClassification, classify_tables,
    run_pipeline,
};
