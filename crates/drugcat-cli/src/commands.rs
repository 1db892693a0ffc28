use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, info_span};

use drugcat_cli::config::{CliSettings, FileConfig, RunConfig};
use drugcat_core::{PipelineOptions, SourceClassification, classify_tables, run_pipeline};
use drugcat_ingest::{SourceLoad, load_source_dir};
use drugcat_output::{
    ATC_FILE, Artifacts, INGREDIENTS_FILE, PRICES_FILE, PRODUCTS_FILE, write_artifacts,
};
use drugcat_standards::load_dictionaries;

use crate::cli::{RunArgs, SourceArgs};
use crate::types::{ArtifactSummary, RunResult};

fn resolve_config(config_path: Option<&Path>, settings: &CliSettings) -> Result<RunConfig> {
    let file = match config_path {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    Ok(RunConfig::resolve(settings, &file)?)
}

fn load_sources(dir: &Path) -> Result<SourceLoad> {
    let load = load_source_dir(dir)
        .with_context(|| format!("load sources from {}", dir.display()))?;
    info!(
        tables = load.tables.len(),
        skipped = load.failures.len(),
        "sources loaded"
    );
    Ok(load)
}

pub fn run_catalog(args: &RunArgs) -> Result<RunResult> {
    let config = resolve_config(args.source.config.as_deref(), &args.settings())?;
    let dictionaries = load_dictionaries(&config.dictionary_dir).with_context(|| {
        format!("load dictionaries from {}", config.dictionary_dir.display())
    })?;
    let load = load_sources(&config.source_dir)?;

    let options = PipelineOptions {
        digest_len: config.digest_len,
        missing_date: config.missing_date,
        run_date: Utc::now().date_naive(),
        kind_overrides: config.kind_overrides.clone(),
    };
    // No context: the diagnostic must start with "no products".
    let output = run_pipeline(&load.tables, &dictionaries.dictionaries, &options)?;
    let completed_at = Utc::now();

    let artifacts = Artifacts {
        products: &output.products,
        ingredients: &output.ingredients,
        prices: &output.prices,
        atc: &output.atc,
    };
    let written = if args.dry_run {
        info!("dry run; no artifacts written");
        None
    } else {
        let _span = info_span!("write").entered();
        let paths = write_artifacts(&config.output_dir, &artifacts, completed_at)
            .with_context(|| format!("write artifacts to {}", config.output_dir.display()))?;
        Some(paths)
    };

    let rows = [
        (PRODUCTS_FILE, output.products.len()),
        (INGREDIENTS_FILE, output.ingredients.len()),
        (PRICES_FILE, output.prices.len()),
        (ATC_FILE, output.atc.len()),
    ];
    let artifacts = rows
        .into_iter()
        .map(|(name, rows)| ArtifactSummary {
            name,
            rows,
            path: written
                .as_ref()
                .and_then(|paths| paths.iter().find(|p| p.ends_with(name)).cloned()),
        })
        .collect();

    let skipped = load
        .failures
        .into_iter()
        .map(|failure| (failure.path, failure.error.to_string()))
        .collect();

    Ok(RunResult {
        source_dir: config.source_dir,
        output_dir: config.output_dir,
        dry_run: args.dry_run,
        report: output.report,
        dictionaries: dictionaries.sources,
        skipped,
        artifacts,
    })
}

pub fn run_classify(args: &SourceArgs) -> Result<Vec<SourceClassification>> {
    let config = resolve_config(args.config.as_deref(), &args.settings())?;
    let load = load_sources(&config.source_dir)?;
    Ok(classify_tables(&load.tables, &config.kind_overrides))
}
