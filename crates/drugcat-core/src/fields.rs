//! Logical fields and the raw column names that may carry them.
//!
//! Column names are compared after lower-casing and collapsing whitespace, so
//! every synonym below is written in that form. Russian names cover the ESKLP
//! registry exports.

use drugcat_model::{FieldDomain, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicalField {
    ProductId,
    TradeName,
    DosageForm,
    Pack,
    Country,
    AtcCode,
    Manufacturer,
    Holder,
    RegNumber,
    RegStatus,
    RegistryUrl,
    InstructionUrl,
    Inn,
    Strength,
    Unit,
    Price,
    Date,
}

impl LogicalField {
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::ProductId => &[
                "product_id",
                "productid",
                "product id",
                "id",
                "klp_code",
                "klp",
                "код клп",
                "идентификатор",
            ],
            Self::TradeName => &[
                "trade_name",
                "tradename",
                "trade name",
                "brand",
                "brand_name",
                "торговое наименование",
                "торговое название",
                "тн",
            ],
            Self::DosageForm => &[
                "dosage_form",
                "dosage form",
                "form",
                "нормализованная лекарственная форма",
                "лекарственная форма",
                "форма выпуска",
            ],
            Self::Pack => &[
                "pack",
                "package",
                "packaging",
                "упаковка",
                "нормализованная дозировка",
                "дозировка",
            ],
            Self::Country => &["country", "страна", "страна производства"],
            Self::AtcCode => &["atc_code", "atc", "atc code", "код атх", "атх"],
            Self::Manufacturer => &["manufacturer", "производитель"],
            Self::Holder => &[
                "holder",
                "marketing_authorization_holder",
                "владелец ру",
                "держатель ру",
            ],
            Self::RegNumber => &[
                "reg_number",
                "registration_number",
                "номер ру",
                "номер регистрационного удостоверения",
            ],
            Self::RegStatus => &["reg_status", "registration_status", "статус ру"],
            Self::RegistryUrl => &["registry_url", "ru_registry_url", "grls_url"],
            Self::InstructionUrl => &["instruction_url", "instruction", "инструкция"],
            Self::Inn => &[
                "inn",
                "mnn",
                "substance",
                "ingredient",
                "active_substance",
                "мнн",
                "нормализованное мнн",
                "действующее вещество",
            ],
            Self::Strength => &["strength", "dose", "amount"],
            Self::Unit => &["unit", "units", "ед. изм.", "единица измерения"],
            Self::Price => &[
                "price",
                "price_rub",
                "znvlp_price_rub",
                "price_limit",
                "цена",
                "предельная цена",
            ],
            Self::Date => &[
                "date",
                "price_date",
                "registration_date",
                "дата",
                "дата регистрации цены",
            ],
        }
    }

    /// Dictionary domain that canonicalizes this field, if any.
    pub fn domain(self) -> Option<FieldDomain> {
        match self {
            Self::TradeName => Some(FieldDomain::Brand),
            Self::DosageForm => Some(FieldDomain::DosageForm),
            Self::Country => Some(FieldDomain::Country),
            Self::Inn => Some(FieldDomain::Ingredient),
            _ => None,
        }
    }

    pub fn matches_column(self, column: &str) -> bool {
        let key = column_key(column);
        self.synonyms().contains(&key.as_str())
    }
}

/// Lower-cased, whitespace-collapsed column name.
pub fn column_key(column: &str) -> String {
    collapse_whitespace(column).to_lowercase()
}

/// Every run of whitespace becomes one space; ends are trimmed.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First value whose column is one of `synonyms`, scanning columns in source
/// order. Absent columns read as empty.
pub fn field_value<'a>(record: &Record<'a>, synonyms: &[&str]) -> &'a str {
    record
        .columns()
        .find(|(name, _)| synonyms.contains(&column_key(name).as_str()))
        .map(|(_, value)| value)
        .unwrap_or("")
}
