//! End-to-end reconciliation over in-memory tables.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use drugcat_core::classify::KindOverrides;
use drugcat_core::prices::MissingDatePolicy;
use drugcat_core::{PipelineError, PipelineOptions, run_pipeline};
use drugcat_model::{Dictionaries, FieldDomain, RecordTable, SynonymDictionary, TableKind};

fn table(source: &str, headers: &[&str], rows: &[&[&str]]) -> RecordTable {
    let mut table = RecordTable::new(source, headers.iter().map(|h| (*h).to_string()).collect());
    for row in rows {
        table
            .push_row(row.iter().map(|c| (*c).to_string()).collect())
            .expect("row fits header");
    }
    table
}

fn options() -> PipelineOptions {
    PipelineOptions::new(NaiveDate::from_ymd_opt(2024, 12, 31).expect("date"))
}

fn products() -> RecordTable {
    table(
        "esklp_products.csv",
        &["product_id", "trade_name", "dosage_form", "pack", "atc_code"],
        &[
            &["P1", "Нурофен", "таблетки", "№10", "M01AE01"],
            &["P2", "Нурофен", "суспензия", "100 мл", "M01AE01"],
            &["P3", "Цитрамон", "таблетки", "№20", "N02BE51"],
            &["", "Парацетамол", "таблетки", "№10", "N02"],
        ],
    )
}

#[test]
fn exact_id_suppresses_brand_fan_out() {
    let prices = table(
        "znvlp.csv",
        &["product_id", "trade_name", "price", "date"],
        &[&["P1", "Нурофен", "150,00", "2024-03-01"]],
    );
    let output = run_pipeline(&[products(), prices], &Dictionaries::identity(), &options())
        .expect("pipeline");

    assert_eq!(output.prices.len(), 1);
    assert_eq!(output.prices[0].product_id, "P1");
    assert_eq!(output.report.prices.exact_id, 1);
    assert_eq!(output.report.prices.brand_form, 0);
}

#[test]
fn brand_fans_out_when_no_id_matches() {
    let prices = table(
        "znvlp.csv",
        &["trade_name", "price", "date"],
        &[&["НУРОФЕН", "150", "2024-03-01"]],
    );
    let output = run_pipeline(&[products(), prices], &Dictionaries::identity(), &options())
        .expect("pipeline");
    let priced: Vec<&str> = output.prices.iter().map(|p| p.product_id.as_str()).collect();
    assert_eq!(priced, vec!["P1", "P2"]);
}

#[test]
fn most_recent_price_wins() {
    let prices = table(
        "prices.csv",
        &["product_id", "price", "date"],
        &[
            &["P3", "90", "2024-06-01"],
            &["P3", "80", "2024-01-01"],
            &["P3", "70", "not a date"],
        ],
    );
    let output = run_pipeline(&[products(), prices], &Dictionaries::identity(), &options())
        .expect("pipeline");

    assert_eq!(output.prices.len(), 1);
    assert_eq!(output.prices[0].price, 90.0);
    assert_eq!(output.prices[0].price_date, "2024-06-01");
    assert_eq!(output.report.prices.invalid_dates, 1);
}

#[test]
fn unmatched_observation_is_silently_dropped() {
    let prices = table(
        "prices.csv",
        &["product_id", "trade_name", "price", "date"],
        &[&["P404", "Неизвестный", "10", "2024-01-01"]],
    );
    let output = run_pipeline(&[products(), prices], &Dictionaries::identity(), &options())
        .expect("pipeline");
    assert!(output.prices.is_empty());
    assert_eq!(output.report.prices.unmatched, 1);
    assert!(output.products.iter().all(|p| !p.is_znvlp));
}

#[test]
fn flags_follow_the_final_price_table() {
    let mut stale = products();
    stale.headers.push("is_znvlp".to_string());
    for row in &mut stale.rows {
        row.push("True".to_string());
    }
    let prices = table(
        "prices.csv",
        &["product_id", "price", "date"],
        &[&["P2", "300", "2024-02-02"]],
    );
    let output = run_pipeline(&[stale, prices], &Dictionaries::identity(), &options())
        .expect("pipeline");

    let flagged: Vec<&str> = output
        .products
        .iter()
        .filter(|p| p.is_znvlp)
        .map(|p| p.product_id.as_str())
        .collect();
    assert_eq!(flagged, vec!["P2"]);
    assert_eq!(output.report.znvlp_flagged, 1);
}

#[test]
fn ids_are_unique_and_non_empty() {
    let duplicated = table(
        "catalog_dupes.csv",
        &["trade_name", "dosage_form", "pack"],
        &[&["Парацетамол", "таблетки", "№10"], &["Парацетамол", "таблетки", "№10"]],
    );
    let output = run_pipeline(&[products(), duplicated], &Dictionaries::identity(), &options())
        .expect("pipeline");

    let ids: BTreeSet<&str> = output.products.iter().map(|p| p.product_id.as_str()).collect();
    assert_eq!(ids.len(), output.products.len());
    assert!(ids.iter().all(|id| !id.is_empty()));
    assert_eq!(output.products.len(), 4);
    assert_eq!(output.report.catalog.duplicates, 2);
}

#[test]
fn catalog_is_sorted_and_has_one_atc_node_per_entry() {
    let output = run_pipeline(&[products()], &Dictionaries::identity(), &options())
        .expect("pipeline");
    let names: Vec<(&str, &str)> = output
        .products
        .iter()
        .map(|p| (p.trade_name.as_str(), p.dosage_form.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Нурофен", "суспензия"),
            ("Нурофен", "таблетки"),
            ("Парацетамол", "таблетки"),
            ("Цитрамон", "таблетки"),
        ]
    );
    assert_eq!(output.atc.len(), output.products.len());
    let paracetamol = &output.atc[2];
    assert_eq!(paracetamol.levels(), ["N", "N02", "", "", ""]);
}

#[test]
fn compositions_are_canonicalized_through_dictionaries() {
    let mut dictionaries = Dictionaries::identity();
    dictionaries.set(
        SynonymDictionary::identity(FieldDomain::Ingredient).with_entry("ibuprofen", "ибупрофен"),
    );
    let compositions = table(
        "compositions.csv",
        &["id", "inn", "price"],
        &[&["P1", "Ibuprofen", "1"], &["P1", "IBUPROFEN", "1"]],
    );
    let output = run_pipeline(&[products(), compositions], &dictionaries, &options())
        .expect("pipeline");

    assert_eq!(output.report.sources[1].kind, TableKind::Compositions);
    assert!(output.prices.is_empty());
    assert_eq!(output.ingredients.len(), 1);
    assert_eq!(output.ingredients[0].inn, "ибупрофен");
}

#[test]
fn unclassified_tables_are_skipped() {
    let noise = table("notes.csv", &["comment"], &[&["hello"]]);
    let output = run_pipeline(&[products(), noise], &Dictionaries::identity(), &options())
        .expect("pipeline");
    assert_eq!(output.report.sources_of(TableKind::Unclassified), 1);
}

#[test]
fn missing_dates_can_use_the_run_date() {
    let prices = table("prices.csv", &["product_id", "price"], &[&["P1", "12.5"]]);
    let tables = [products(), prices];

    let dropped = run_pipeline(&tables, &Dictionaries::identity(), &options()).expect("pipeline");
    assert!(dropped.prices.is_empty());

    let mut run_date = options();
    run_date.missing_date = MissingDatePolicy::RunDate;
    let kept = run_pipeline(&tables, &Dictionaries::identity(), &run_date).expect("pipeline");
    assert_eq!(kept.prices[0].price_date, "2024-12-31");
}

#[test]
fn klp_override_feeds_the_catalog() {
    let klp = table(
        "esklp_klp_20240101.csv",
        &["Код КЛП", "Торговое наименование", "Нормализованное МНН"],
        &[&["K1", "Цитрамон П", "Парацетамол + Кофеин"]],
    );
    let mut overrides = options();
    overrides.kind_overrides = KindOverrides::new().with("esklp_klp_", TableKind::Products);

    let output =
        run_pipeline(&[klp], &Dictionaries::identity(), &overrides).expect("klp as products");
    assert_eq!(output.products.len(), 1);
    assert_eq!(output.ingredients.len(), 2);
}

#[test]
fn empty_catalog_is_fatal() {
    let prices = table("prices.csv", &["product_id", "price"], &[&["P1", "1"]]);
    let error = run_pipeline(&[prices], &Dictionaries::identity(), &options())
        .expect_err("no products");
    assert!(matches!(error, PipelineError::NoProducts { products_sources: 0 }));
    assert!(error.to_string().starts_with("no products"));
}

#[test]
fn reruns_are_identical() {
    let prices = table(
        "prices.csv",
        &["trade_name", "price", "date"],
        &[&["Цитрамон", "55", "01.02.2024"], &["Нурофен", "150", "2024-03-01"]],
    );
    let tables = [products(), prices];
    let first = run_pipeline(&tables, &Dictionaries::identity(), &options()).expect("first");
    let second = run_pipeline(&tables, &Dictionaries::identity(), &options()).expect("second");
    assert_eq!(first.products, second.products);
    assert_eq!(first.ingredients, second.ingredients);
    assert_eq!(first.prices, second.prices);
    assert_eq!(first.atc, second.atc);
}
