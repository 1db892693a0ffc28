//! Column layout of each CSV artifact.

use std::io::Write;

use drugcat_model::{AtcNode, CatalogEntry, IngredientRecord, ReconciledPrice};

pub const PRODUCTS_FILE: &str = "products.csv";
pub const INGREDIENTS_FILE: &str = "ingredients.csv";
pub const PRICES_FILE: &str = "prices.csv";
pub const ATC_FILE: &str = "atc.csv";

/// A row type with a fixed artifact layout. Column order is a compatibility contract.
pub trait CsvArtifact {
    const HEADER: &'static [&'static str];

    fn record(&self) -> Vec<String>;
}

/// Booleans as the frontend reads them.
pub fn format_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Shortest round-trip representation; integral prices keep a trailing `.0`.
pub fn format_price(price: f64) -> String {
    format!("{price:?}")
}

impl CsvArtifact for CatalogEntry {
    const HEADER: &'static [&'static str] = &[
        "product_id",
        "trade_name",
        "dosage_form",
        "pack",
        "country",
        "is_znvlp",
        "atc_code",
        "ru_registry_url",
        "instruction_url",
        "manufacturer",
        "holder",
        "reg_number",
        "reg_status",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.product_id.clone(),
            self.trade_name.clone(),
            self.dosage_form.clone(),
            self.pack.clone(),
            self.country.clone(),
            format_bool(self.is_znvlp).to_string(),
            self.atc_code.clone(),
            self.registry_url.clone(),
            self.instruction_url.clone(),
            self.manufacturer.clone(),
            self.holder.clone(),
            self.reg_number.clone(),
            self.reg_status.clone(),
        ]
    }
}

impl CsvArtifact for IngredientRecord {
    const HEADER: &'static [&'static str] = &["product_id", "inn", "strength", "unit"];

    fn record(&self) -> Vec<String> {
        vec![
            self.product_id.clone(),
            self.inn.clone(),
            self.strength.clone(),
            self.unit.clone(),
        ]
    }
}

impl CsvArtifact for ReconciledPrice {
    const HEADER: &'static [&'static str] = &["product_id", "znvlp_price_rub", "price_date"];

    fn record(&self) -> Vec<String> {
        vec![
            self.product_id.clone(),
            format_price(self.price),
            self.price_date.clone(),
        ]
    }
}

impl CsvArtifact for AtcNode {
    const HEADER: &'static [&'static str] = &[
        "product_id",
        "atc_code",
        "level1",
        "level2",
        "level3",
        "level4",
        "level5",
        "valid",
    ];

    fn record(&self) -> Vec<String> {
        let mut record = vec![self.product_id.clone(), self.atc_code.clone()];
        record.extend(self.levels().iter().map(|level| (*level).to_string()));
        record.push(format_bool(self.valid).to_string());
        record
    }
}

/// Write the header and every row. An empty slice still produces the header.
pub fn write_csv<T: CsvArtifact, W: Write>(writer: W, rows: &[T]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    writer.flush()?;
    Ok(())
}
