//! Staged reconciliation run.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{info, info_span};

use drugcat_model::{
    AtcNode, CatalogEntry, Dictionaries, IngredientRecord, ReconciledPrice, RecordTable, TableKind,
};

use crate::atc::{AtcStats, build_atc_nodes};
use crate::catalog::{CatalogStats, IngredientStats, build_catalog, build_ingredients};
use crate::classify::{Classification, Evidence, KindOverrides, classify_with_overrides};
use crate::error::PipelineError;
use crate::ids::{DEFAULT_DIGEST_LEN, IdSynthesizer};
use crate::prices::{
    MissingDatePolicy, ObservationStats, PriceIndex, PriceStats, ReconcileOptions, flag_znvlp,
    read_price_observations, reconcile_prices,
};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub digest_len: usize,
    pub missing_date: MissingDatePolicy,
    /// Substituted for blank price dates under [`MissingDatePolicy::RunDate`].
    pub run_date: NaiveDate,
    pub kind_overrides: KindOverrides,
}

impl PipelineOptions {
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            digest_len: DEFAULT_DIGEST_LEN,
            missing_date: MissingDatePolicy::default(),
            run_date,
            kind_overrides: KindOverrides::default(),
        }
    }
}

/// Kind assigned to one input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceClassification {
    pub source: String,
    pub kind: TableKind,
    pub evidence: Evidence,
    pub rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub sources: Vec<SourceClassification>,
    pub catalog: CatalogStats,
    pub ingredients: IngredientStats,
    pub observations: ObservationStats,
    pub prices: PriceStats,
    pub znvlp_flagged: usize,
    pub atc: AtcStats,
}

impl PipelineReport {
    pub fn sources_of(&self, kind: TableKind) -> usize {
        self.sources.iter().filter(|s| s.kind == kind).count()
    }
}

/// Everything a run produces, ready to hand to a sink.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub products: Vec<CatalogEntry>,
    pub ingredients: Vec<IngredientRecord>,
    pub prices: Vec<ReconciledPrice>,
    pub atc: Vec<AtcNode>,
    pub report: PipelineReport,
}

/// Label every table without building anything.
pub fn classify_tables(
    tables: &[RecordTable],
    overrides: &KindOverrides,
) -> Vec<SourceClassification> {
    tables
        .iter()
        .map(|table| {
            let Classification { kind, evidence } = classify_with_overrides(table, overrides);
            if kind == TableKind::Unclassified {
                info!(source = %table.source, "table matched no kind; skipped");
            }
            SourceClassification {
                source: table.source.clone(),
                kind,
                evidence,
                rows: table.len(),
            }
        })
        .collect()
}

/// Run every stage over fully materialized input tables.
///
/// # Errors
///
/// Returns [`PipelineError::NoProducts`] when the catalog comes out empty and
/// [`PipelineError::InvalidOptions`] for an out-of-range digest length.
pub fn run_pipeline(
    tables: &[RecordTable],
    dictionaries: &Dictionaries,
    options: &PipelineOptions,
) -> Result<PipelineOutput, PipelineError> {
    let ids = IdSynthesizer::new(options.digest_len)?;
    let mut report = PipelineReport::default();

    let sources = info_span!("classify").in_scope(|| {
        let sources = classify_tables(tables, &options.kind_overrides);
        info!(tables = sources.len(), "classified source tables");
        sources
    });
    let of_kind = |kind: TableKind| -> Vec<&RecordTable> {
        tables
            .iter()
            .zip(&sources)
            .filter(|(_, class)| class.kind == kind)
            .map(|(table, _)| table)
            .collect()
    };
    let product_tables = of_kind(TableKind::Products);
    let composition_tables = of_kind(TableKind::Compositions);
    let price_tables = of_kind(TableKind::Prices);
    report.sources = sources;

    let (mut products, ingredients) = info_span!("catalog").in_scope(|| {
        let catalog = build_catalog(&product_tables, dictionaries, &ids);
        let catalog_ids: BTreeSet<&str> = catalog
            .entries
            .iter()
            .map(|e| e.product_id.as_str())
            .collect();
        let ingredients = build_ingredients(
            &composition_tables,
            &catalog.inline_ingredients,
            &catalog_ids,
            dictionaries,
            &ids,
        );
        info!(
            entries = catalog.stats.entries,
            synthesized = catalog.stats.synthesized_ids,
            duplicates = catalog.stats.duplicates,
            ingredients = ingredients.stats.records,
            orphans = ingredients.stats.orphans,
            "catalog built"
        );
        report.catalog = catalog.stats;
        report.ingredients = ingredients.stats;
        (catalog.entries, ingredients.records)
    });
    if products.is_empty() {
        return Err(PipelineError::NoProducts {
            products_sources: product_tables.len(),
        });
    }

    let prices = info_span!("reconcile").in_scope(|| {
        let read = read_price_observations(&price_tables, dictionaries);
        let index = PriceIndex::build(&products);
        let reconcile = ReconcileOptions {
            missing_date: options.missing_date,
            run_date: options.run_date,
        };
        let result = reconcile_prices(&index, &read.observations, &reconcile);
        report.znvlp_flagged = flag_znvlp(&mut products, &result.prices);
        info!(
            observations = result.stats.observations,
            exact_id = result.stats.exact_id,
            brand_form = result.stats.brand_form,
            brand = result.stats.brand,
            unmatched = result.stats.unmatched,
            prices = result.stats.reconciled,
            flagged = report.znvlp_flagged,
            "prices reconciled"
        );
        report.observations = read.stats;
        report.prices = result.stats;
        result.prices
    });

    let atc = info_span!("atc").in_scope(|| {
        let (nodes, stats) = build_atc_nodes(&products);
        info!(nodes = stats.nodes, invalid = stats.invalid, "atc decomposed");
        report.atc = stats;
        nodes
    });

    Ok(PipelineOutput {
        products,
        ingredients,
        prices,
        atc,
        report,
    })
}
