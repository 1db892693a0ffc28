use serde::{Deserialize, Serialize};

/// One product of the reconciled catalog.
///
/// `product_id` is unique within a run. `is_znvlp` is derived from the
/// reconciled price table of the same run and never carried over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub product_id: String,
    pub trade_name: String,
    pub dosage_form: String,
    pub pack: String,
    pub country: String,
    pub atc_code: String,
    pub manufacturer: String,
    pub holder: String,
    pub reg_number: String,
    pub reg_status: String,
    pub registry_url: String,
    pub instruction_url: String,
    pub is_znvlp: bool,
}

impl CatalogEntry {
    /// Sort key used for the products artifact.
    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (
            &self.trade_name,
            &self.dosage_form,
            &self.pack,
            &self.product_id,
        )
    }
}

/// Active ingredient of a product. The whole tuple is the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub product_id: String,
    pub inn: String,
    pub strength: String,
    pub unit: String,
}
