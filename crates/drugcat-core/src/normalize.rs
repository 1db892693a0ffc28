//! Field normalization.
//!
//! A value is read from the first matching column, whitespace-collapsed and
//! canonicalized through the field's dictionary. Dictionaries are passed in on
//! every call.

use drugcat_model::{Dictionaries, Record};

use crate::fields::{LogicalField, collapse_whitespace, field_value};

/// Canonical value of `field` in `record`; empty when the column is absent.
pub fn normalize_field(
    record: &Record<'_>,
    field: LogicalField,
    dictionaries: &Dictionaries,
) -> String {
    let raw = field_value(record, field.synonyms());
    normalize_value(raw, field, dictionaries)
}

/// Normalize an already-extracted raw value as `field`.
pub fn normalize_value(raw: &str, field: LogicalField, dictionaries: &Dictionaries) -> String {
    let collapsed = collapse_whitespace(raw);
    if collapsed.is_empty() {
        return collapsed;
    }
    let canonical = match field.domain() {
        Some(domain) => dictionaries.get(domain).canonicalize(&collapsed),
        None => collapsed,
    };
    finish(field, canonical)
}

/// Field-specific cleanup applied after canonicalization.
fn finish(field: LogicalField, value: String) -> String {
    match field {
        LogicalField::AtcCode => value.to_uppercase(),
        LogicalField::Inn | LogicalField::Unit => value.to_lowercase(),
        LogicalField::Strength => value.replace(',', "."),
        _ => value,
    }
}

/// Split a combined INN list (`"парацетамол + кофеин"`) into normalized parts.
pub fn split_inn_list(raw: &str, dictionaries: &Dictionaries) -> Vec<String> {
    raw.split(['+', ';', ','])
        .map(|part| normalize_value(part, LogicalField::Inn, dictionaries))
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use drugcat_model::{FieldDomain, SynonymDictionary};

    use super::*;

    fn record_parts(pairs: &[(&str, &str)]) -> (Vec<String>, Vec<String>) {
        pairs
            .iter()
            .map(|(h, v)| ((*h).to_string(), (*v).to_string()))
            .unzip()
    }

    fn dictionaries() -> Dictionaries {
        let mut dicts = Dictionaries::identity();
        dicts.set(
            SynonymDictionary::identity(FieldDomain::Brand)
                .with_entry("Нурофен Экспресс", "Нурофен"),
        );
        dicts.set(
            SynonymDictionary::identity(FieldDomain::DosageForm).with_entry("табл.", "таблетки"),
        );
        dicts.set(
            SynonymDictionary::identity(FieldDomain::Ingredient)
                .with_entry("ibuprofen", "ибупрофен"),
        );
        dicts
    }

    #[test]
    fn collapses_then_canonicalizes() {
        let (headers, cells) = record_parts(&[("trade_name", "  Нурофен   Экспресс ")]);
        let record = Record::new(&headers, &cells);
        assert_eq!(
            normalize_field(&record, LogicalField::TradeName, &dictionaries()),
            "Нурофен"
        );
    }

    #[test]
    fn brand_matching_keeps_case() {
        let (headers, cells) = record_parts(&[("trade_name", "НУРОФЕН ЭКСПРЕСС")]);
        let record = Record::new(&headers, &cells);
        assert_eq!(
            normalize_field(&record, LogicalField::TradeName, &dictionaries()),
            "НУРОФЕН ЭКСПРЕСС"
        );
    }

    #[test]
    fn form_matching_ignores_case() {
        let (headers, cells) = record_parts(&[("Лекарственная форма", "ТАБЛ.")]);
        let record = Record::new(&headers, &cells);
        assert_eq!(
            normalize_field(&record, LogicalField::DosageForm, &dictionaries()),
            "таблетки"
        );
    }

    #[test]
    fn field_cleanup_rules() {
        let dicts = Dictionaries::identity();
        assert_eq!(
            normalize_value(" n02be51 ", LogicalField::AtcCode, &dicts),
            "N02BE51"
        );
        assert_eq!(normalize_value("0,5", LogicalField::Strength, &dicts), "0.5");
        assert_eq!(normalize_value("МГ", LogicalField::Unit, &dicts), "мг");
        assert_eq!(normalize_value("   ", LogicalField::Pack, &dicts), "");
    }

    #[test]
    fn inn_is_canonicalized_then_lowercased() {
        assert_eq!(
            normalize_value("IBUPROFEN", LogicalField::Inn, &dictionaries()),
            "ибупрофен"
        );
    }

    #[test]
    fn splits_combined_inn_lists() {
        let parts = split_inn_list("Парацетамол + Кофеин; ibuprofen,", &dictionaries());
        assert_eq!(parts, vec!["парацетамол", "кофеин", "ибупрофен"]);
    }
}
