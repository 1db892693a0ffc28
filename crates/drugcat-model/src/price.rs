use serde::{Deserialize, Serialize};

/// A raw regulated-price observation as read from a price source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub product_id: Option<String>,
    pub trade_name: Option<String>,
    pub price: f64,
    /// Free-form date text; parsed during reconciliation.
    pub date: String,
}

impl PriceObservation {
    pub fn new(price: f64, date: impl Into<String>) -> Self {
        Self {
            product_id: None,
            trade_name: None,
            price,
            date: date.into(),
        }
    }

    #[must_use]
    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    #[must_use]
    pub fn with_trade_name(mut self, trade_name: impl Into<String>) -> Self {
        self.trade_name = Some(trade_name.into());
        self
    }

    /// The product id, when present and non-blank.
    pub fn product_id(&self) -> Option<&str> {
        self.product_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// The brand, when present and non-blank.
    pub fn brand(&self) -> Option<&str> {
        self.trade_name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Most recent regulated price for one product. `price_date` is ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledPrice {
    pub product_id: String,
    pub price: f64,
    pub price_date: String,
}
