//! Synonym dictionaries mapping raw terms to canonical terms.
//!
//! One dictionary exists per [`FieldDomain`]. Brand names are matched on the
//! exact (trimmed) spelling; every other domain matches case-insensitively.
//! An empty dictionary is the identity mapping, which is also what a missing
//! dictionary file loads as.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDomain {
    Brand,
    Ingredient,
    DosageForm,
    Country,
}

impl FieldDomain {
    pub const ALL: [FieldDomain; 4] = [
        FieldDomain::Brand,
        FieldDomain::Ingredient,
        FieldDomain::DosageForm,
        FieldDomain::Country,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Ingredient => "ingredient",
            Self::DosageForm => "dosage_form",
            Self::Country => "country",
        }
    }

    pub fn is_case_sensitive(self) -> bool {
        matches!(self, Self::Brand)
    }
}

impl fmt::Display for FieldDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldDomain {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "brand" | "brands" | "trade_name" => Ok(Self::Brand),
            "ingredient" | "ingredients" | "inn" => Ok(Self::Ingredient),
            "dosage_form" | "dosage_forms" | "form" => Ok(Self::DosageForm),
            "country" | "countries" => Ok(Self::Country),
            _ => Err(ModelError::UnknownFieldDomain(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymDictionary {
    pub domain: FieldDomain,
    /// Lookup key (trimmed, lower-cased unless the domain is case-sensitive) -> canonical term.
    entries: BTreeMap<String, String>,
}

impl SynonymDictionary {
    /// An empty dictionary; canonicalizes every value to itself.
    pub fn identity(domain: FieldDomain) -> Self {
        Self {
            domain,
            entries: BTreeMap::new(),
        }
    }

    /// Register a mapping. Blank raw terms or canonical terms are ignored;
    /// a later mapping for the same key replaces the earlier one.
    pub fn insert(&mut self, raw: &str, canonical: &str) {
        let key = self.key(raw);
        let canonical = canonical.trim();
        if key.is_empty() || canonical.is_empty() {
            return;
        }
        self.entries.insert(key, canonical.to_string());
    }

    #[must_use]
    pub fn with_entry(mut self, raw: &str, canonical: &str) -> Self {
        self.insert(raw, canonical);
        self
    }

    pub fn lookup(&self, value: &str) -> Option<&str> {
        self.entries.get(&self.key(value)).map(String::as_str)
    }

    /// Canonical term for `value`, or `value` unchanged when unmapped.
    pub fn canonicalize(&self, value: &str) -> String {
        self.lookup(value)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(&self, value: &str) -> String {
        let trimmed = value.trim();
        if self.domain.is_case_sensitive() {
            trimmed.to_string()
        } else {
            trimmed.to_lowercase()
        }
    }
}

/// The four dictionaries handed to every normalization call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionaries {
    pub brand: SynonymDictionary,
    pub ingredient: SynonymDictionary,
    pub dosage_form: SynonymDictionary,
    pub country: SynonymDictionary,
}

impl Dictionaries {
    pub fn identity() -> Self {
        Self {
            brand: SynonymDictionary::identity(FieldDomain::Brand),
            ingredient: SynonymDictionary::identity(FieldDomain::Ingredient),
            dosage_form: SynonymDictionary::identity(FieldDomain::DosageForm),
            country: SynonymDictionary::identity(FieldDomain::Country),
        }
    }

    pub fn get(&self, domain: FieldDomain) -> &SynonymDictionary {
        match domain {
            FieldDomain::Brand => &self.brand,
            FieldDomain::Ingredient => &self.ingredient,
            FieldDomain::DosageForm => &self.dosage_form,
            FieldDomain::Country => &self.country,
        }
    }

    /// Replace the dictionary for `dictionary.domain`.
    pub fn set(&mut self, dictionary: SynonymDictionary) {
        match dictionary.domain {
            FieldDomain::Brand => self.brand = dictionary,
            FieldDomain::Ingredient => self.ingredient = dictionary,
            FieldDomain::DosageForm => self.dosage_form = dictionary,
            FieldDomain::Country => self.country = dictionary,
        }
    }
}

impl Default for Dictionaries {
    fn default() -> Self {
        Self::identity()
    }
}
