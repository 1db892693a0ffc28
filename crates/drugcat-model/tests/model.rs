//! Tests for drugcat-model types.

use drugcat_model::{
    Dictionaries, FieldDomain, IngredientRecord, PriceObservation, SynonymDictionary,
};

#[test]
fn brand_lookup_is_case_sensitive() {
    let dict = SynonymDictionary::identity(FieldDomain::Brand).with_entry("Нурофен", "Nurofen");
    assert_eq!(dict.canonicalize("Нурофен"), "Nurofen");
    assert_eq!(dict.canonicalize("нурофен"), "нурофен");
}

#[test]
fn other_domains_lookup_case_insensitive() {
    let dict =
        SynonymDictionary::identity(FieldDomain::DosageForm).with_entry("ТАБЛ.", "таблетки");
    assert_eq!(dict.canonicalize("табл."), "таблетки");
    assert_eq!(dict.canonicalize("  Табл. "), "таблетки");
    assert_eq!(dict.canonicalize("капсулы"), "капсулы");
}

#[test]
fn identity_dictionaries_pass_values_through() {
    let dicts = Dictionaries::identity();
    for domain in FieldDomain::ALL {
        let dict = dicts.get(domain);
        assert!(dict.is_empty());
        assert_eq!(dict.canonicalize("Anything"), "Anything");
    }
}

#[test]
fn set_replaces_domain_dictionary() {
    let mut dicts = Dictionaries::identity();
    dicts.set(SynonymDictionary::identity(FieldDomain::Country).with_entry("RU", "Россия"));
    assert_eq!(dicts.country.canonicalize("ru"), "Россия");
    assert!(dicts.brand.is_empty());
}

#[test]
fn blank_terms_are_ignored() {
    let mut dict = SynonymDictionary::identity(FieldDomain::Ingredient);
    dict.insert("  ", "x");
    dict.insert("ibuprofen", " ");
    assert!(dict.is_empty());
}

#[test]
fn observation_accessors_ignore_blanks() {
    let obs = PriceObservation::new(12.5, "2024-01-01")
        .with_product_id("  ")
        .with_trade_name(" Нурофен ");
    assert_eq!(obs.product_id(), None);
    assert_eq!(obs.brand(), Some("Нурофен"));
}

#[test]
fn ingredient_ordering_follows_tuple() {
    let mut records = vec![
        IngredientRecord {
            product_id: "2".to_string(),
            inn: "a".to_string(),
            ..Default::default()
        },
        IngredientRecord {
            product_id: "1".to_string(),
            inn: "b".to_string(),
            ..Default::default()
        },
        IngredientRecord {
            product_id: "1".to_string(),
            inn: "a".to_string(),
            ..Default::default()
        },
    ];
    records.sort();
    let keys: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.product_id.as_str(), r.inn.as_str()))
        .collect();
    assert_eq!(keys, vec![("1", "a"), ("1", "b"), ("2", "a")]);
}

#[test]
fn field_domain_round_trips_through_names() {
    for domain in FieldDomain::ALL {
        assert_eq!(domain.as_str().parse::<FieldDomain>().unwrap(), domain);
    }
    let json = serde_json::to_string(&FieldDomain::DosageForm).unwrap();
    assert_eq!(json, "\"dosage_form\"");
}
