use std::path::PathBuf;

use drugcat_core::PipelineReport;
use drugcat_standards::DictionarySource;

#[derive(Debug)]
pub struct RunResult {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub report: PipelineReport,
    pub dictionaries: Vec<DictionarySource>,
    /// Sources that could not be decoded, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    pub artifacts: Vec<ArtifactSummary>,
}

#[derive(Debug)]
pub struct ArtifactSummary {
    pub name: &'static str,
    pub rows: usize,
    /// `None` on dry runs.
    pub path: Option<PathBuf>,
}
