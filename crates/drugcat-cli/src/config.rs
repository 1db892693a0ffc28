//! Run configuration.
//!
//! Every setting resolves as CLI flag, then environment variable (both through
//! clap), then the TOML config file, then the built-in default.
//!
//! ```toml
//! [paths]
//! source_dir = "data/source"
//! output_dir = "data"
//! dictionary_dir = "data/source/dictionaries"
//!
//! [identifiers]
//! digest_len = 16
//!
//! [prices]
//! missing_date = "drop"   # or "run_date"
//!
//! [classify.overrides]
//! "esklp_klp_" = "products"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use drugcat_core::classify::KindOverrides;
use drugcat_core::ids::{DEFAULT_DIGEST_LEN, MAX_DIGEST_LEN, MIN_DIGEST_LEN};
use drugcat_core::prices::MissingDatePolicy;
use drugcat_model::TableKind;

pub const SOURCE_DIR_ENV: &str = "DRUGCAT_SOURCE_DIR";
pub const OUTPUT_DIR_ENV: &str = "DRUGCAT_OUTPUT_DIR";
pub const DICTIONARY_DIR_ENV: &str = "DRUGCAT_DICTIONARY_DIR";
pub const DIGEST_LEN_ENV: &str = "DRUGCAT_DIGEST_LEN";

pub const DEFAULT_SOURCE_DIR: &str = "data/source";
pub const DEFAULT_OUTPUT_DIR: &str = "data";
/// Relative to the source directory.
pub const DEFAULT_DICTIONARY_SUBDIR: &str = "dictionaries";

/// Registry KLP extracts list an id next to the INN and would classify as
/// compositions.
const DEFAULT_OVERRIDES: &[(&str, TableKind)] = &[("esklp_klp", TableKind::Products)];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(
        "invalid identifiers.digest_len {0}: expected {min}..={max}",
        min = MIN_DIGEST_LEN,
        max = MAX_DIGEST_LEN
    )]
    DigestLen(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub paths: PathsSection,
    pub identifiers: IdentifiersSection,
    pub prices: PricesSection,
    pub classify: ClassifySection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub dictionary_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentifiersSection {
    pub digest_len: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricesSection {
    pub missing_date: Option<MissingDatePolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifySection {
    /// Source-name fragment to forced table kind.
    pub overrides: BTreeMap<String, TableKind>,
}

impl FileConfig {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }
}

/// Settings already merged from flags and environment by clap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliSettings {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub dictionary_dir: Option<PathBuf>,
    pub digest_len: Option<usize>,
    pub missing_date: Option<MissingDatePolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dictionary_dir: PathBuf,
    pub digest_len: usize,
    pub missing_date: MissingDatePolicy,
    pub kind_overrides: KindOverrides,
}

impl RunConfig {
    pub fn resolve(cli: &CliSettings, file: &FileConfig) -> Result<Self, ConfigError> {
        let source_dir = cli
            .source_dir
            .clone()
            .or_else(|| file.paths.source_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR));
        let output_dir = cli
            .output_dir
            .clone()
            .or_else(|| file.paths.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let dictionary_dir = cli
            .dictionary_dir
            .clone()
            .or_else(|| file.paths.dictionary_dir.clone())
            .unwrap_or_else(|| source_dir.join(DEFAULT_DICTIONARY_SUBDIR));

        let digest_len = cli
            .digest_len
            .or(file.identifiers.digest_len)
            .unwrap_or(DEFAULT_DIGEST_LEN);
        if !(MIN_DIGEST_LEN..=MAX_DIGEST_LEN).contains(&digest_len) {
            return Err(ConfigError::DigestLen(digest_len));
        }

        let missing_date = cli
            .missing_date
            .or(file.prices.missing_date)
            .unwrap_or_default();

        let mut kind_overrides = KindOverrides::new();
        for (fragment, kind) in DEFAULT_OVERRIDES {
            kind_overrides.insert(fragment, *kind);
        }
        for (fragment, kind) in &file.classify.overrides {
            kind_overrides.insert(fragment, *kind);
        }

        Ok(Self {
            source_dir,
            output_dir,
            dictionary_dir,
            digest_len,
            missing_date,
            kind_overrides,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> FileConfig {
        FileConfig::parse(Path::new("drugcat.toml"), text).unwrap()
    }

    #[test]
    fn defaults_without_any_input() {
        let config = RunConfig::resolve(&CliSettings::default(), &FileConfig::default()).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("data/source"));
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert_eq!(
            config.dictionary_dir,
            PathBuf::from("data/source/dictionaries")
        );
        assert_eq!(config.digest_len, DEFAULT_DIGEST_LEN);
        assert_eq!(config.missing_date, MissingDatePolicy::Drop);
        assert_eq!(
            config.kind_overrides.resolve("esklp_klp_2024.csv"),
            Some(TableKind::Products)
        );
    }

    #[test]
    fn cli_beats_file() {
        let file = parse(
            r#"
            [paths]
            source_dir = "from-file"
            output_dir = "out-file"

            [identifiers]
            digest_len = 24
            "#,
        );
        let cli = CliSettings {
            source_dir: Some(PathBuf::from("from-cli")),
            ..CliSettings::default()
        };
        let config = RunConfig::resolve(&cli, &file).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("from-cli"));
        assert_eq!(config.output_dir, PathBuf::from("out-file"));
        assert_eq!(config.dictionary_dir, PathBuf::from("from-cli/dictionaries"));
        assert_eq!(config.digest_len, 24);
    }

    #[test]
    fn file_sets_price_policy_and_overrides() {
        let file = parse(
            r#"
            [prices]
            missing_date = "run_date"

            [classify.overrides]
            "vendor_dump" = "prices"
            "#,
        );
        let config = RunConfig::resolve(&CliSettings::default(), &file).unwrap();
        assert_eq!(config.missing_date, MissingDatePolicy::RunDate);
        assert_eq!(
            config.kind_overrides.resolve("VENDOR_DUMP_01.json"),
            Some(TableKind::Prices)
        );
    }

    #[test]
    fn rejects_out_of_range_digest() {
        let cli = CliSettings {
            digest_len: Some(4),
            ..CliSettings::default()
        };
        let error = RunConfig::resolve(&cli, &FileConfig::default()).unwrap_err();
        assert!(matches!(error, ConfigError::DigestLen(4)));
    }

    #[test]
    fn unknown_keys_are_errors() {
        let result = FileConfig::parse(Path::new("drugcat.toml"), "[paths]\nsorce_dir = \"x\"\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
