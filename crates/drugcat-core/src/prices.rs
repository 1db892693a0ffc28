//! Price observation matching and temporal deduplication.
//!
//! Observations are matched against the catalog in tiers and the first
//! non-empty tier wins:
//!
//! 1. exact product id,
//! 2. the brand+form index, looked up by brand (observations carry no form),
//! 3. the brand-only index.
//!
//! Brand keys are case-folded on both sides. Matched tuples are grouped by
//! product id and only the most recent price survives.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use drugcat_model::{CatalogEntry, Dictionaries, PriceObservation, ReconciledPrice, RecordTable};

use crate::fields::{LogicalField, field_value};
use crate::normalize::normalize_value;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d", "%Y.%m.%d"];

/// Output format of `price_date`.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// What to do with observations whose date is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDatePolicy {
    #[default]
    Drop,
    /// Date the observation with the run date.
    RunDate,
}

/// Parse price text: whitespace removed, `,` as decimal separator.
///
/// Returns `None` for unparseable, non-finite and non-positive values.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// Parse the date formats seen in price sources. Datetimes keep only their date.
pub fn parse_price_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = trimmed
        .split_once(['T', ' '])
        .map_or(trimmed, |(date, _)| date);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationStats {
    pub rows_read: usize,
    pub observations: usize,
    pub unparseable_prices: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ObservationRead {
    pub observations: Vec<PriceObservation>,
    pub stats: ObservationStats,
}

/// Extract observations from price tables. Brands are canonicalized through
/// the brand dictionary so they meet the catalog's trade names.
pub fn read_price_observations(
    tables: &[&RecordTable],
    dictionaries: &Dictionaries,
) -> ObservationRead {
    let mut read = ObservationRead::default();
    for table in tables {
        for record in table.records() {
            read.stats.rows_read += 1;
            let raw_price = field_value(&record, LogicalField::Price.synonyms());
            let Some(price) = parse_price(raw_price) else {
                read.stats.unparseable_prices += 1;
                debug!(source = %table.source, price = raw_price, "unparseable price dropped");
                continue;
            };
            let date = field_value(&record, LogicalField::Date.synonyms()).trim();
            let mut observation = PriceObservation::new(price, date);
            let product_id = field_value(&record, LogicalField::ProductId.synonyms()).trim();
            if !product_id.is_empty() {
                observation = observation.with_product_id(product_id);
            }
            let brand = normalize_value(
                field_value(&record, LogicalField::TradeName.synonyms()),
                LogicalField::TradeName,
                dictionaries,
            );
            if !brand.is_empty() {
                observation = observation.with_trade_name(brand);
            }
            read.observations.push(observation);
        }
    }
    read.stats.observations = read.observations.len();
    read
}

/// Matching tier that produced an observation's product ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    ExactId,
    BrandForm,
    Brand,
}

fn brand_key(brand: &str) -> String {
    brand.trim().to_lowercase()
}

/// Lookup indices over one catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct PriceIndex {
    ids: BTreeSet<String>,
    by_brand_form: BTreeMap<(String, String), BTreeSet<String>>,
    by_brand: BTreeMap<String, BTreeSet<String>>,
}

impl PriceIndex {
    pub fn build(catalog: &[CatalogEntry]) -> Self {
        let mut index = Self::default();
        for entry in catalog {
            index.ids.insert(entry.product_id.clone());
            let brand = brand_key(&entry.trade_name);
            if brand.is_empty() {
                continue;
            }
            index
                .by_brand_form
                .entry((brand.clone(), entry.dosage_form.to_lowercase()))
                .or_default()
                .insert(entry.product_id.clone());
            index
                .by_brand
                .entry(brand)
                .or_default()
                .insert(entry.product_id.clone());
        }
        index
    }

    pub fn contains_id(&self, product_id: &str) -> bool {
        self.ids.contains(product_id)
    }

    /// Product ids for one observation, in ascending order, with the tier that matched.
    pub fn match_observation(
        &self,
        observation: &PriceObservation,
    ) -> Option<(MatchTier, Vec<String>)> {
        if let Some(product_id) = observation.product_id()
            && self.contains_id(product_id)
        {
            return Some((MatchTier::ExactId, vec![product_id.to_string()]));
        }

        let brand = brand_key(observation.brand()?);
        let from_forms = self.brand_form_ids(&brand);
        if !from_forms.is_empty() {
            return Some((MatchTier::BrandForm, from_forms.into_iter().collect()));
        }

        self.by_brand
            .get(&brand)
            .filter(|ids| !ids.is_empty())
            .map(|ids| (MatchTier::Brand, ids.iter().cloned().collect()))
    }

    /// Union over every form indexed under `brand`.
    fn brand_form_ids(&self, brand: &str) -> BTreeSet<String> {
        let start = (brand.to_string(), String::new());
        self.by_brand_form
            .range(start..)
            .take_while(|((indexed, _), _)| indexed == brand)
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub missing_date: MissingDatePolicy,
    pub run_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceStats {
    pub observations: usize,
    pub exact_id: usize,
    pub brand_form: usize,
    pub brand: usize,
    pub unmatched: usize,
    /// Matched (product id, price, date) tuples before dedup.
    pub tuples: usize,
    pub missing_dates: usize,
    pub invalid_dates: usize,
    /// Older tuples replaced by a more recent price for the same product.
    pub superseded: usize,
    pub reconciled: usize,
}

impl PriceStats {
    fn count_tier(&mut self, tier: MatchTier) {
        match tier {
            MatchTier::ExactId => self.exact_id += 1,
            MatchTier::BrandForm => self.brand_form += 1,
            MatchTier::Brand => self.brand += 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriceReconciliation {
    /// One row per product id, sorted by product id.
    pub prices: Vec<ReconciledPrice>,
    pub stats: PriceStats,
}

pub fn reconcile_prices(
    index: &PriceIndex,
    observations: &[PriceObservation],
    options: &ReconcileOptions,
) -> PriceReconciliation {
    let mut stats = PriceStats {
        observations: observations.len(),
        ..PriceStats::default()
    };
    let mut groups: BTreeMap<String, Vec<(NaiveDate, f64)>> = BTreeMap::new();

    for observation in observations {
        let Some((tier, product_ids)) = index.match_observation(observation) else {
            stats.unmatched += 1;
            continue;
        };
        stats.count_tier(tier);
        stats.tuples += product_ids.len();

        let date = if observation.date.trim().is_empty() {
            stats.missing_dates += product_ids.len();
            match options.missing_date {
                MissingDatePolicy::Drop => continue,
                MissingDatePolicy::RunDate => options.run_date,
            }
        } else {
            match parse_price_date(&observation.date) {
                Some(date) => date,
                None => {
                    stats.invalid_dates += product_ids.len();
                    debug!(date = %observation.date, "unparseable price date dropped");
                    continue;
                }
            }
        };

        for product_id in product_ids {
            groups
                .entry(product_id)
                .or_default()
                .push((date, observation.price));
        }
    }

    let mut prices = Vec::with_capacity(groups.len());
    for (product_id, mut dated) in groups {
        // Stable: among equal dates the later observation wins.
        dated.sort_by_key(|(date, _)| *date);
        stats.superseded += dated.len().saturating_sub(1);
        if let Some((date, price)) = dated.pop() {
            prices.push(ReconciledPrice {
                product_id,
                price,
                price_date: date.format(ISO_DATE).to_string(),
            });
        }
    }
    stats.reconciled = prices.len();

    if stats.unmatched > 0 {
        debug!(unmatched = stats.unmatched, "price observations matched no product");
    }
    if stats.invalid_dates > 0 {
        warn!(invalid = stats.invalid_dates, "price tuples with unparseable dates dropped");
    }
    PriceReconciliation { prices, stats }
}

/// Recompute `is_znvlp` from scratch: true exactly for ids in `prices`.
pub fn flag_znvlp(entries: &mut [CatalogEntry], prices: &[ReconciledPrice]) -> usize {
    let priced: BTreeSet<&str> = prices.iter().map(|p| p.product_id.as_str()).collect();
    let mut flagged = 0;
    for entry in entries {
        entry.is_znvlp = priced.contains(entry.product_id.as_str());
        if entry.is_znvlp {
            flagged += 1;
        }
    }
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(product_id: &str, trade_name: &str, dosage_form: &str) -> CatalogEntry {
        CatalogEntry {
            product_id: product_id.to_string(),
            trade_name: trade_name.to_string(),
            dosage_form: dosage_form.to_string(),
            ..CatalogEntry::default()
        }
    }

    fn options() -> ReconcileOptions {
        ReconcileOptions {
            missing_date: MissingDatePolicy::Drop,
            run_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        }
    }

    #[test]
    fn price_text_cleanup() {
        assert_eq!(parse_price("1 234,50"), Some(1234.5));
        assert_eq!(parse_price("\u{a0}99.9 "), Some(99.9));
        assert_eq!(parse_price("0"), None);
        assert_eq!(parse_price("-5"), None);
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_price("inf"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(parse_price_date("2024-06-01"), expected);
        assert_eq!(parse_price_date("2024-06-01T10:30:00+03:00"), expected);
        assert_eq!(parse_price_date("2024-06-01 10:30:00"), expected);
        assert_eq!(parse_price_date("01.06.2024"), expected);
        assert_eq!(parse_price_date("2024/06/01"), expected);
        assert_eq!(parse_price_date("June 1st"), None);
        assert_eq!(parse_price_date("2024-13-01"), None);
    }

    #[test]
    fn brand_form_tier_unions_every_form() {
        let catalog = [
            entry("P1", "Нурофен", "таблетки"),
            entry("P2", "Нурофен", "суспензия"),
            entry("P3", "Нурофен Плюс", "таблетки"),
        ];
        let index = PriceIndex::build(&catalog);
        let observation = PriceObservation::new(100.0, "2024-01-01").with_trade_name("НУРОФЕН");
        let (tier, ids) = index.match_observation(&observation).unwrap();
        assert_eq!(tier, MatchTier::BrandForm);
        assert_eq!(ids, vec!["P1", "P2"]);
    }

    #[test]
    fn unknown_id_falls_back_to_brand() {
        let index = PriceIndex::build(&[entry("P1", "Нурофен", "таблетки")]);
        let observation = PriceObservation::new(100.0, "2024-01-01")
            .with_product_id("P404")
            .with_trade_name("Нурофен");
        let (tier, ids) = index.match_observation(&observation).unwrap();
        assert_eq!(tier, MatchTier::BrandForm);
        assert_eq!(ids, vec!["P1"]);
    }

    #[test]
    fn equal_dates_keep_the_later_observation() {
        let index = PriceIndex::build(&[entry("P1", "A", "")]);
        let observations = [
            PriceObservation::new(10.0, "2024-01-01").with_product_id("P1"),
            PriceObservation::new(20.0, "01.01.2024").with_product_id("P1"),
        ];
        let result = reconcile_prices(&index, &observations, &options());
        assert_eq!(result.prices.len(), 1);
        assert_eq!(result.prices[0].price, 20.0);
        assert_eq!(result.stats.superseded, 1);
    }

    #[test]
    fn missing_date_policy() {
        let index = PriceIndex::build(&[entry("P1", "A", "")]);
        let observations = [PriceObservation::new(10.0, "").with_product_id("P1")];

        let dropped = reconcile_prices(&index, &observations, &options());
        assert!(dropped.prices.is_empty());
        assert_eq!(dropped.stats.missing_dates, 1);

        let run_date = ReconcileOptions {
            missing_date: MissingDatePolicy::RunDate,
            ..options()
        };
        let kept = reconcile_prices(&index, &observations, &run_date);
        assert_eq!(kept.prices[0].price_date, "2024-12-31");
    }

    #[test]
    fn flags_are_recomputed() {
        let mut catalog = vec![entry("P1", "A", ""), entry("P2", "B", "")];
        catalog[1].is_znvlp = true;
        let prices = [ReconciledPrice {
            product_id: "P1".to_string(),
            price: 1.0,
            price_date: "2024-01-01".to_string(),
        }];
        assert_eq!(flag_znvlp(&mut catalog, &prices), 1);
        assert!(catalog[0].is_znvlp);
        assert!(!catalog[1].is_znvlp);
    }
}
