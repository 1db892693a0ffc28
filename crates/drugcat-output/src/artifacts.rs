use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use drugcat_model::{AtcNode, CatalogEntry, IngredientRecord, ReconciledPrice};

use crate::csv_artifact::{
    ATC_FILE, CsvArtifact, INGREDIENTS_FILE, PRICES_FILE, PRODUCTS_FILE, write_csv,
};
use crate::error::{OutputError, Result};
use crate::version::{VERSION_FILE, version_stamp};

/// Borrowed view of everything one run writes.
#[derive(Debug, Clone, Copy)]
pub struct Artifacts<'a> {
    pub products: &'a [CatalogEntry],
    pub ingredients: &'a [IngredientRecord],
    pub prices: &'a [ReconciledPrice],
    pub atc: &'a [AtcNode],
}

struct Staged {
    partial: PathBuf,
    target: PathBuf,
}

fn partial_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.partial"))
}

fn stage_csv<T: CsvArtifact>(dir: &Path, file_name: &str, rows: &[T]) -> Result<Staged> {
    let target = dir.join(file_name);
    let partial = partial_path(&target);
    let file = File::create(&partial).map_err(|source| OutputError::Io {
        path: partial.clone(),
        source,
    })?;
    write_csv(BufWriter::new(file), rows).map_err(|source| OutputError::Csv {
        path: partial.clone(),
        source,
    })?;
    debug!(path = %target.display(), rows = rows.len(), "staged artifact");
    Ok(Staged { partial, target })
}

fn stage_version(dir: &Path, completed_at: DateTime<Utc>) -> Result<Staged> {
    let target = dir.join(VERSION_FILE);
    let partial = partial_path(&target);
    let io_error = |source| OutputError::Io {
        path: partial.clone(),
        source,
    };
    let mut file = File::create(&partial).map_err(io_error)?;
    file.write_all(version_stamp(completed_at).as_bytes())
        .map_err(io_error)?;
    Ok(Staged { partial, target })
}

const ARTIFACT_FILES: [&str; 5] = [
    PRODUCTS_FILE,
    INGREDIENTS_FILE,
    PRICES_FILE,
    ATC_FILE,
    VERSION_FILE,
];

fn stage_all(
    dir: &Path,
    artifacts: &Artifacts<'_>,
    completed_at: DateTime<Utc>,
    staged: &mut Vec<Staged>,
) -> Result<()> {
    staged.push(stage_csv(dir, PRODUCTS_FILE, artifacts.products)?);
    staged.push(stage_csv(dir, INGREDIENTS_FILE, artifacts.ingredients)?);
    staged.push(stage_csv(dir, PRICES_FILE, artifacts.prices)?);
    staged.push(stage_csv(dir, ATC_FILE, artifacts.atc)?);
    staged.push(stage_version(dir, completed_at)?);
    Ok(())
}

/// Write every artifact into `output_dir` and return the final paths.
///
/// Nothing replaces an existing artifact until all of them have been staged;
/// a staging failure removes the partial files and leaves the directory as it
/// was.
pub fn write_artifacts(
    output_dir: &Path,
    artifacts: &Artifacts<'_>,
    completed_at: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).map_err(|source| OutputError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut staged = Vec::new();
    if let Err(error) = stage_all(output_dir, artifacts, completed_at, &mut staged) {
        for name in ARTIFACT_FILES {
            let _ = fs::remove_file(partial_path(&output_dir.join(name)));
        }
        return Err(error);
    }

    let mut written = Vec::with_capacity(staged.len());
    for file in staged {
        fs::rename(&file.partial, &file.target).map_err(|source| OutputError::Io {
            path: file.target.clone(),
            source,
        })?;
        written.push(file.target);
    }
    info!(dir = %output_dir.display(), files = written.len(), "artifacts written");
    Ok(written)
}
