//! Canonical catalog and ingredient table construction.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use drugcat_model::{CatalogEntry, Dictionaries, IngredientRecord, Record, RecordTable};

use crate::fields::{LogicalField, field_value};
use crate::ids::IdSynthesizer;
use crate::normalize::{normalize_field, split_inn_list};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub rows_read: usize,
    pub entries: usize,
    pub synthesized_ids: usize,
    /// Rows whose id was already taken by an earlier row.
    pub duplicates: usize,
    /// Rows with neither an id nor a trade name, form or pack.
    pub blank_rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogBuild {
    /// Sorted by trade name, dosage form, pack, then id.
    pub entries: Vec<CatalogEntry>,
    /// Ingredients listed directly on product rows (registry KLP extracts).
    pub inline_ingredients: Vec<IngredientRecord>,
    pub stats: CatalogStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientStats {
    pub rows_read: usize,
    pub from_products: usize,
    pub records: usize,
    /// Rows without a product id or INN.
    pub dropped: usize,
    pub duplicates: usize,
    /// Records whose product id is not in the catalog. Kept in the output.
    pub orphans: usize,
}

#[derive(Debug, Clone, Default)]
pub struct IngredientBuild {
    /// Unique and sorted by the full tuple.
    pub records: Vec<IngredientRecord>,
    pub stats: IngredientStats,
}

/// Build the catalog from every products table. The first row to claim an id keeps it.
pub fn build_catalog(
    tables: &[&RecordTable],
    dictionaries: &Dictionaries,
    ids: &IdSynthesizer,
) -> CatalogBuild {
    let mut build = CatalogBuild::default();
    let mut seen = BTreeSet::new();

    for table in tables {
        for record in table.records() {
            build.stats.rows_read += 1;
            let Some(entry) = catalog_entry(&record, dictionaries, ids, &mut build.stats) else {
                continue;
            };
            if !seen.insert(entry.product_id.clone()) {
                build.stats.duplicates += 1;
                debug!(
                    source = %table.source,
                    product_id = %entry.product_id,
                    "duplicate product id skipped"
                );
                continue;
            }
            let inn_list = field_value(&record, LogicalField::Inn.synonyms());
            for inn in split_inn_list(inn_list, dictionaries) {
                build.inline_ingredients.push(IngredientRecord {
                    product_id: entry.product_id.clone(),
                    inn,
                    strength: String::new(),
                    unit: String::new(),
                });
            }
            build.entries.push(entry);
        }
    }

    build.entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    build.stats.entries = build.entries.len();
    build
}

fn catalog_entry(
    record: &Record<'_>,
    dictionaries: &Dictionaries,
    ids: &IdSynthesizer,
    stats: &mut CatalogStats,
) -> Option<CatalogEntry> {
    let field = |logical| normalize_field(record, logical, dictionaries);
    let trade_name = field(LogicalField::TradeName);
    let dosage_form = field(LogicalField::DosageForm);
    let pack = field(LogicalField::Pack);
    let explicit = field_value(record, LogicalField::ProductId.synonyms());

    if explicit.trim().is_empty() && trade_name.is_empty() && dosage_form.is_empty() && pack.is_empty()
    {
        stats.blank_rows += 1;
        return None;
    }

    let product_id = ids.resolve(explicit, &trade_name, &dosage_form, &pack);
    if product_id.is_synthesized() {
        stats.synthesized_ids += 1;
    }

    Some(CatalogEntry {
        product_id: product_id.into_string(),
        country: field(LogicalField::Country),
        atc_code: field(LogicalField::AtcCode),
        manufacturer: field(LogicalField::Manufacturer),
        holder: field(LogicalField::Holder),
        reg_number: field(LogicalField::RegNumber),
        reg_status: field(LogicalField::RegStatus),
        registry_url: field(LogicalField::RegistryUrl),
        instruction_url: field(LogicalField::InstructionUrl),
        trade_name,
        dosage_form,
        pack,
        is_znvlp: false,
    })
}

/// Build the ingredient table from composition tables plus ingredients found on product rows.
///
/// Composition rows without an explicit product id fall back to the id
/// synthesized from their trade name, form and pack, which links them to the
/// matching catalog entry.
pub fn build_ingredients(
    tables: &[&RecordTable],
    inline: &[IngredientRecord],
    catalog_ids: &BTreeSet<&str>,
    dictionaries: &Dictionaries,
    ids: &IdSynthesizer,
) -> IngredientBuild {
    let mut stats = IngredientStats {
        from_products: inline.len(),
        ..IngredientStats::default()
    };
    let mut unique: BTreeSet<IngredientRecord> = BTreeSet::new();

    for ingredient in inline {
        if !unique.insert(ingredient.clone()) {
            stats.duplicates += 1;
        }
    }

    for table in tables {
        for record in table.records() {
            stats.rows_read += 1;
            let Some(ingredient) = ingredient_record(&record, dictionaries, ids) else {
                stats.dropped += 1;
                continue;
            };
            if !unique.insert(ingredient) {
                stats.duplicates += 1;
            }
        }
    }

    let records: Vec<IngredientRecord> = unique.into_iter().collect();
    stats.orphans = records
        .iter()
        .filter(|r| !catalog_ids.contains(r.product_id.as_str()))
        .count();
    if stats.orphans > 0 {
        warn!(
            orphans = stats.orphans,
            "ingredient records reference products missing from the catalog"
        );
    }
    stats.records = records.len();
    IngredientBuild { records, stats }
}

fn ingredient_record(
    record: &Record<'_>,
    dictionaries: &Dictionaries,
    ids: &IdSynthesizer,
) -> Option<IngredientRecord> {
    let field = |logical| normalize_field(record, logical, dictionaries);
    let inn = field(LogicalField::Inn);
    if inn.is_empty() {
        return None;
    }

    let explicit = field_value(record, LogicalField::ProductId.synonyms()).trim();
    let product_id = if explicit.is_empty() {
        let trade_name = field(LogicalField::TradeName);
        let dosage_form = field(LogicalField::DosageForm);
        let pack = field(LogicalField::Pack);
        if trade_name.is_empty() && dosage_form.is_empty() && pack.is_empty() {
            return None;
        }
        ids.synthesize(&trade_name, &dosage_form, &pack)
    } else {
        explicit.to_string()
    };

    Some(IngredientRecord {
        product_id,
        inn,
        strength: field(LogicalField::Strength),
        unit: field(LogicalField::Unit),
    })
}
