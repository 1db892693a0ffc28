//! Table kind classification.
//!
//! Rules are evaluated in a fixed order and the first hit wins:
//! compositions, then prices, then products. A table exposing
//! `{id, inn, price}` is therefore a compositions table.

use std::collections::BTreeMap;

use drugcat_model::{RecordTable, TableKind};

use crate::fields::{LogicalField, column_key};

const COMPOSITION_KEYWORDS: &[&str] = &["composition", "ingredient", "состав"];
const PRICE_KEYWORDS: &[&str] = &["price", "znvlp", "жнвлп", "цен"];
const PRODUCT_KEYWORDS: &[&str] = &["product", "klp", "catalog", "препарат"];

const PRODUCT_FIELDS: [LogicalField; 4] = [
    LogicalField::TradeName,
    LogicalField::DosageForm,
    LogicalField::Pack,
    LogicalField::Country,
];

/// Minimum number of product-field columns for a column-based products match.
pub const MIN_PRODUCT_COLUMNS: usize = 2;

/// Which rule assigned a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    Columns,
    SourceName,
    Override,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: TableKind,
    pub evidence: Evidence,
}

struct ColumnSet {
    keys: Vec<String>,
}

impl ColumnSet {
    fn new(headers: &[String]) -> Self {
        Self {
            keys: headers.iter().map(|h| column_key(h)).collect(),
        }
    }

    fn has(&self, field: LogicalField) -> bool {
        let synonyms = field.synonyms();
        self.keys.iter().any(|key| synonyms.contains(&key.as_str()))
    }

    fn count_matching(&self, fields: &[LogicalField]) -> usize {
        self.keys
            .iter()
            .filter(|key| {
                fields
                    .iter()
                    .any(|field| field.synonyms().contains(&key.as_str()))
            })
            .count()
    }
}

/// A keyword matches the start of an alphanumeric token of the source name,
/// so `цен` hits `предельные_цены` but not `лицензии`.
fn name_has(source: &str, keywords: &[&str]) -> bool {
    let lowered = source.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .any(|token| keywords.iter().any(|keyword| token.starts_with(keyword)))
}

/// Classify a table from its columns and source name.
pub fn classify_table(table: &RecordTable) -> Classification {
    classify_columns(&table.headers, &table.source)
}

pub fn classify_columns(headers: &[String], source: &str) -> Classification {
    let columns = ColumnSet::new(headers);
    let has_id = columns.has(LogicalField::ProductId);

    let rules: [(TableKind, bool, &[&str]); 3] = [
        (
            TableKind::Compositions,
            columns.has(LogicalField::Inn) && has_id,
            COMPOSITION_KEYWORDS,
        ),
        (
            TableKind::Prices,
            columns.has(LogicalField::Price) && (has_id || columns.has(LogicalField::TradeName)),
            PRICE_KEYWORDS,
        ),
        (
            TableKind::Products,
            columns.count_matching(&PRODUCT_FIELDS) >= MIN_PRODUCT_COLUMNS,
            PRODUCT_KEYWORDS,
        ),
    ];

    for (kind, by_columns, keywords) in rules {
        if by_columns {
            return Classification {
                kind,
                evidence: Evidence::Columns,
            };
        }
        if name_has(source, keywords) {
            return Classification {
                kind,
                evidence: Evidence::SourceName,
            };
        }
    }

    Classification {
        kind: TableKind::Unclassified,
        evidence: Evidence::None,
    }
}

/// Forced kinds keyed by a case-insensitive source-name fragment.
///
/// Registry KLP extracts carry both an id and an INN column and would otherwise
/// classify as compositions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindOverrides {
    rules: BTreeMap<String, TableKind>,
}

impl KindOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fragment: &str, kind: TableKind) {
        let fragment = fragment.trim().to_lowercase();
        if !fragment.is_empty() {
            self.rules.insert(fragment, kind);
        }
    }

    #[must_use]
    pub fn with(mut self, fragment: &str, kind: TableKind) -> Self {
        self.insert(fragment, kind);
        self
    }

    /// Longest matching fragment wins.
    pub fn resolve(&self, source: &str) -> Option<TableKind> {
        let lowered = source.to_lowercase();
        self.rules
            .iter()
            .filter(|(fragment, _)| lowered.contains(fragment.as_str()))
            .max_by_key(|(fragment, _)| fragment.chars().count())
            .map(|(_, kind)| *kind)
    }
}

/// Classify with overrides taking precedence over the built-in rules.
pub fn classify_with_overrides(table: &RecordTable, overrides: &KindOverrides) -> Classification {
    if let Some(kind) = overrides.resolve(&table.source) {
        return Classification {
            kind,
            evidence: Evidence::Override,
        };
    }
    classify_table(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(headers: &[&str], source: &str) -> Classification {
        let headers: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
        classify_columns(&headers, source)
    }

    #[test]
    fn id_inn_price_is_compositions() {
        let result = classify(&["id", "inn", "price"], "");
        assert_eq!(result.kind, TableKind::Compositions);
        assert_eq!(result.evidence, Evidence::Columns);
    }

    #[test]
    fn price_needs_an_identifier() {
        assert_eq!(
            classify(&["trade_name", "price_rub", "date"], "").kind,
            TableKind::Prices
        );
        assert_eq!(
            classify(&["product_id", "price_rub"], "").kind,
            TableKind::Prices
        );
        assert_eq!(classify(&["price_rub", "date"], "").kind, TableKind::Unclassified);
    }

    #[test]
    fn products_need_two_product_columns() {
        assert_eq!(
            classify(&["id", "trade_name", "dosage_form"], "").kind,
            TableKind::Products
        );
        assert_eq!(classify(&["id", "trade_name"], "").kind, TableKind::Unclassified);
    }

    #[test]
    fn source_name_is_a_fallback() {
        let result = classify(&["x"], "esklp_compositions.json");
        assert_eq!(result.kind, TableKind::Compositions);
        assert_eq!(result.evidence, Evidence::SourceName);
        assert_eq!(classify(&["x"], "esklp_prices.json").kind, TableKind::Prices);
        assert_eq!(classify(&["x"], "esklp_products.json").kind, TableKind::Products);
    }

    #[test]
    fn keywords_match_whole_name_tokens() {
        let product_columns = ["trade_name", "dosage_form", "pack"];
        for source in ["лицензированные_препараты.csv", "лицензии_2024.csv"] {
            let result = classify(&product_columns, source);
            assert_eq!(result.kind, TableKind::Products, "{source}");
            assert_eq!(result.evidence, Evidence::Columns, "{source}");
        }
        assert_eq!(classify(&["x"], "лицензии_2024.csv").kind, TableKind::Unclassified);
        assert_eq!(classify(&["x"], "предельные_цены.csv").kind, TableKind::Prices);
        assert_eq!(classify(&["x"], "data/PriceList-2024.json").kind, TableKind::Prices);
    }

    #[test]
    fn composition_name_precedes_price_columns() {
        let result = classify(&["trade_name", "price"], "ingredients.csv");
        assert_eq!(result.kind, TableKind::Compositions);
        assert_eq!(result.evidence, Evidence::SourceName);
        assert_eq!(classify(&["trade_name", "price"], "").kind, TableKind::Prices);
    }

    #[test]
    fn klp_extract_can_be_forced_to_products() {
        let headers: Vec<String> = ["Код КЛП", "Торговое наименование", "Нормализованное МНН"]
            .iter()
            .map(|h| (*h).to_string())
            .collect();
        let table = RecordTable::new("esklp_klp_20240101.csv", headers);
        assert_eq!(classify_table(&table).kind, TableKind::Compositions);

        let overrides = KindOverrides::new().with("ESKLP_KLP_", TableKind::Products);
        let result = classify_with_overrides(&table, &overrides);
        assert_eq!(result.kind, TableKind::Products);
        assert_eq!(result.evidence, Evidence::Override);
    }

    #[test]
    fn longest_override_fragment_wins() {
        let overrides = KindOverrides::new()
            .with("esklp", TableKind::Products)
            .with("esklp_prices", TableKind::Prices);
        assert_eq!(overrides.resolve("esklp_prices.json"), Some(TableKind::Prices));
        assert_eq!(overrides.resolve("esklp_other.json"), Some(TableKind::Products));
        assert_eq!(overrides.resolve("other.json"), None);
    }
}
