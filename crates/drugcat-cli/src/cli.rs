//! CLI argument definitions for `drugcat`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use drugcat_cli::config::{
    CliSettings, DICTIONARY_DIR_ENV, DIGEST_LEN_ENV, OUTPUT_DIR_ENV, SOURCE_DIR_ENV,
};
use drugcat_core::prices::MissingDatePolicy;

#[derive(Parser)]
#[command(
    name = "drugcat",
    version,
    about = "Reconcile drug catalog extracts into one consistent catalog",
    long_about = "Reconcile product, composition and regulated-price extracts into one catalog.\n\n\
                  Writes products.csv, ingredients.csv, prices.csv, atc.csv and version.txt."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix pretty and compact log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile the source directory and write the catalog artifacts.
    Run(RunArgs),

    /// Print the kind assigned to each source file without building anything.
    Classify(SourceArgs),
}

#[derive(Args, Clone)]
pub struct SourceArgs {
    /// TOML config file; flags and environment variables take precedence.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the source extracts (default: data/source).
    #[arg(long = "source-dir", value_name = "DIR", env = SOURCE_DIR_ENV)]
    pub source_dir: Option<PathBuf>,

    /// Directory holding brand/ingredient/dosage_form/country.csv
    /// (default: <SOURCE_DIR>/dictionaries).
    #[arg(long = "dictionary-dir", value_name = "DIR", env = DICTIONARY_DIR_ENV)]
    pub dictionary_dir: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Directory the artifacts are written to (default: data).
    #[arg(long = "output-dir", value_name = "DIR", env = OUTPUT_DIR_ENV)]
    pub output_dir: Option<PathBuf>,

    /// Hex characters kept from the digest of synthesized product ids (8..=64).
    #[arg(long = "digest-len", value_name = "N", env = DIGEST_LEN_ENV)]
    pub digest_len: Option<usize>,

    /// How to treat price observations without a date.
    #[arg(long = "missing-date", value_enum)]
    pub missing_date: Option<MissingDateArg>,

    /// Reconcile and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl SourceArgs {
    pub fn settings(&self) -> CliSettings {
        CliSettings {
            source_dir: self.source_dir.clone(),
            dictionary_dir: self.dictionary_dir.clone(),
            ..CliSettings::default()
        }
    }
}

impl RunArgs {
    pub fn settings(&self) -> CliSettings {
        CliSettings {
            output_dir: self.output_dir.clone(),
            digest_len: self.digest_len,
            missing_date: self.missing_date.map(MissingDatePolicy::from),
            ..self.source.settings()
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MissingDateArg {
    /// Skip observations without a date.
    Drop,
    /// Date them with the run date.
    RunDate,
}

impl From<MissingDateArg> for MissingDatePolicy {
    fn from(value: MissingDateArg) -> Self {
        match value {
            MissingDateArg::Drop => Self::Drop,
            MissingDateArg::RunDate => Self::RunDate,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
