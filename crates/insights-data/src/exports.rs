//! Bulk CSV export discovery and loading.
//!
//! Exports live flat in one directory. A canonical merged file (name ending
//! in [`MERGED_SUFFIX`]) wins; otherwise the most recently modified `*.csv`
//! is used.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use insights_core::error::{InsightsError, Result};
use insights_core::models::{NormalizedBatch, PostRecord};
use tracing::{debug, warn};

use crate::normalizer::{normalize_export_row, ExportColumns};

/// File-name suffix of the canonical merged export.
pub const MERGED_SUFFIX: &str = "MERGED_ALL.csv";

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `*.csv` files directly under `dir`, sorted by path.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Exports path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Pick the export to load from `dir`.
///
/// Returns [`InsightsError::NoExportFiles`] when the directory holds no CSV.
pub fn select_export_file(dir: &Path) -> Result<PathBuf> {
    let files = find_csv_files(dir);

    if let Some(merged) = files.iter().find(|p| is_merged_export(p)) {
        debug!("using merged export {}", merged.display());
        return Ok(merged.clone());
    }

    files
        .into_iter()
        .map(|p| {
            let mtime = std::fs::metadata(&p)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (mtime, p)
        })
        // Ties on mtime go to the later path so selection is deterministic.
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, p)| p)
        .ok_or_else(|| InsightsError::NoExportFiles(dir.to_path_buf()))
}

/// Read and normalize one export file.
///
/// Rows that the CSV reader rejects (e.g. wrong field count) and rows
/// without a post id are skipped and counted; they never abort the load.
pub fn load_bulk_export(path: &Path) -> Result<NormalizedBatch<PostRecord>> {
    let file = std::fs::File::open(path).map_err(|e| InsightsError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(std::io::BufReader::new(file));

    let headers = reader.headers()?.clone();
    let cols = ExportColumns::from_headers(&headers);

    let mut batch = NormalizedBatch::empty();
    for (line, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                debug!("skipping malformed export row {}: {}", line + 2, e);
                batch.skipped += 1;
                continue;
            }
        };
        match normalize_export_row(&row, &cols) {
            Some(record) => batch.records.push(record),
            None => batch.skipped += 1,
        }
    }

    debug!(
        "loaded {} posts from {} ({} skipped)",
        batch.records.len(),
        path.display(),
        batch.skipped
    );
    Ok(batch)
}

/// Select and load the export in `dir`.
pub fn load_latest_export(dir: &Path) -> Result<(PathBuf, NormalizedBatch<PostRecord>)> {
    let path = select_export_file(dir)?;
    let batch = load_bulk_export(&path)?;
    Ok((path, batch))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_merged_export(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(MERGED_SUFFIX))
        .unwrap_or(false)
}
