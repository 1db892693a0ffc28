//! Dictionary loader.
//!
//! Each field domain reads one two-column CSV (`raw term, canonical term`) from
//! the dictionary directory, named after the domain (`brand.csv`,
//! `ingredient.csv`, `dosage_form.csv`, `country.csv`). A header row is
//! optional. A missing file loads as the identity dictionary.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use drugcat_model::{Dictionaries, FieldDomain, SynonymDictionary};

use crate::error::StandardsError;
use crate::hash::sha256_hex;

const RAW_HEADERS: &[&str] = &["raw", "raw_term", "term", "from", "synonym", "source"];
const CANONICAL_HEADERS: &[&str] = &["canonical", "canonical_term", "to", "target", "value"];

/// Where a loaded dictionary came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionarySource {
    pub domain: FieldDomain,
    /// `None` when no file existed and the identity mapping was used.
    pub path: Option<PathBuf>,
    pub sha256: Option<String>,
    pub entries: usize,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone)]
pub struct LoadedDictionary {
    pub dictionary: SynonymDictionary,
    pub source: DictionarySource,
}

/// All four dictionaries plus their provenance.
#[derive(Debug, Clone)]
pub struct DictionarySet {
    pub dictionaries: Dictionaries,
    pub sources: Vec<DictionarySource>,
}

pub fn dictionary_path(dir: &Path, domain: FieldDomain) -> PathBuf {
    dir.join(format!("{}.csv", domain.as_str()))
}

/// Load every domain's dictionary from `dir`.
pub fn load_dictionaries(dir: &Path) -> Result<DictionarySet, StandardsError> {
    let mut dictionaries = Dictionaries::identity();
    let mut sources = Vec::with_capacity(FieldDomain::ALL.len());
    for domain in FieldDomain::ALL {
        let loaded = load_dictionary(&dictionary_path(dir, domain), domain)?;
        dictionaries.set(loaded.dictionary);
        sources.push(loaded.source);
    }
    Ok(DictionarySet {
        dictionaries,
        sources,
    })
}

/// Load one dictionary file. Missing files yield the identity dictionary.
pub fn load_dictionary(
    path: &Path,
    domain: FieldDomain,
) -> Result<LoadedDictionary, StandardsError> {
    if !path.is_file() {
        debug!(domain = %domain, path = %path.display(), "dictionary missing, using identity");
        return Ok(LoadedDictionary {
            dictionary: SynonymDictionary::identity(domain),
            source: DictionarySource {
                domain,
                path: None,
                sha256: None,
                entries: 0,
                skipped_rows: 0,
            },
        });
    }

    let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
    let sha256 = sha256_hex(&bytes);
    let (dictionary, skipped_rows) = parse_dictionary(&bytes, domain).map_err(|message| {
        StandardsError::Csv {
            path: path.to_path_buf(),
            message,
        }
    })?;

    if skipped_rows > 0 {
        warn!(
            domain = %domain,
            path = %path.display(),
            skipped_rows,
            "dictionary rows without both terms were skipped"
        );
    }
    info!(
        domain = %domain,
        path = %path.display(),
        entries = dictionary.len(),
        "dictionary loaded"
    );

    let entries = dictionary.len();
    Ok(LoadedDictionary {
        dictionary,
        source: DictionarySource {
            domain,
            path: Some(path.to_path_buf()),
            sha256: Some(sha256),
            entries,
            skipped_rows,
        },
    })
}

/// Parse dictionary CSV bytes, returning the dictionary and the number of
/// rows skipped for lacking a raw or canonical term.
pub fn parse_dictionary(
    bytes: &[u8],
    domain: FieldDomain,
) -> Result<(SynonymDictionary, usize), String> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut dictionary = SynonymDictionary::identity(domain);
    let mut skipped = 0usize;
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| e.to_string())?;
        let raw = record.get(0).unwrap_or("").trim_matches('\u{feff}').trim();
        let canonical = record.get(1).unwrap_or("").trim();
        if idx == 0 && looks_like_header(raw, canonical) {
            continue;
        }
        if raw.is_empty() || canonical.is_empty() {
            skipped += 1;
            continue;
        }
        dictionary.insert(raw, canonical);
    }
    Ok((dictionary, skipped))
}

fn looks_like_header(raw: &str, canonical: &str) -> bool {
    let raw = raw.to_lowercase();
    let canonical = canonical.to_lowercase();
    RAW_HEADERS.contains(&raw.as_str()) && CANONICAL_HEADERS.contains(&canonical.as_str())
}
