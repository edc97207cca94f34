//! Dataset assembly.
//!
//! Takes whatever each source produced (any of them may be missing), picks
//! the primary post dataset, runs reconciliation when both post sources are
//! present, and records what happened in a [`SourceStatus`] for the UI.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use insights_core::models::{NormalizedBatch, PageSnapshot, PostRecord, VideoRecord};
use tracing::{debug, info};

use crate::reconciler::{reconcile, ReconcileReport};

// ── Public types ──────────────────────────────────────────────────────────────

/// Raw per-source results handed to [`assemble`].
#[derive(Debug, Clone, Default)]
pub struct SourceInputs {
    /// Selected export file and its normalized rows.
    pub bulk: Option<(PathBuf, NormalizedBatch<PostRecord>)>,
    pub api_posts: Option<NormalizedBatch<PostRecord>>,
    pub page: Option<PageSnapshot>,
    pub videos: Option<NormalizedBatch<VideoRecord>>,
}

/// Which dataset the post tables are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimarySource {
    /// Bulk export, with API breakdowns overlaid when available.
    BulkExport,
    /// API sample only; no export was available.
    Api,
    /// Neither source produced posts.
    None,
}

/// Summary of source availability for one assembled dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub primary: PrimarySource,
    pub export_path: Option<PathBuf>,
    pub bulk_posts: usize,
    pub bulk_skipped: usize,
    pub api_posts: usize,
    pub api_skipped: usize,
    /// Present only when both post sources were merged.
    pub reconcile: Option<ReconcileReport>,
    /// User-visible notices about degraded sources.
    pub notices: Vec<String>,
}

/// Everything the dashboard renders, rebuilt wholesale on each refresh.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Primary post dataset (reconciled bulk export, or the API sample).
    pub posts: Vec<PostRecord>,
    /// The API post sample as fetched, for the page-overview KPIs.
    pub api_posts: Vec<PostRecord>,
    pub page: Option<PageSnapshot>,
    pub videos: Vec<VideoRecord>,
    pub posts_fetched_at: Option<DateTime<Utc>>,
    pub status: SourceStatus,
    pub generated_at: DateTime<Utc>,
}

impl Dataset {
    pub fn has_posts(&self) -> bool {
        !self.posts.is_empty()
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Build a [`Dataset`] from independently loaded sources.
///
/// * bulk + API: bulk records with API reaction breakdowns overlaid
/// * bulk only: bulk records as loaded
/// * API only: API records become the primary dataset
/// * neither: empty dataset with a "no data" notice
pub fn assemble(inputs: SourceInputs) -> Dataset {
    let mut notices = Vec::new();

    let (export_path, bulk) = match inputs.bulk {
        Some((path, batch)) if !batch.is_empty() => (Some(path), Some(batch)),
        Some((path, _)) => {
            notices.push(format!("Export {} contains no posts", path.display()));
            (Some(path), None)
        }
        None => (None, None),
    };
    let api = inputs.api_posts.filter(|b| !b.is_empty());

    let bulk_posts = bulk.as_ref().map_or(0, |b| b.records.len());
    let bulk_skipped = bulk.as_ref().map_or(0, |b| b.skipped);
    let api_count = api.as_ref().map_or(0, |b| b.records.len());
    let api_skipped = api.as_ref().map_or(0, |b| b.skipped);
    let posts_fetched_at = api.as_ref().and_then(|b| b.fetched_at);
    let api_posts: Vec<PostRecord> = api.map(|b| b.records).unwrap_or_default();

    if bulk_skipped > 0 {
        notices.push(format!("Skipped {} malformed export rows", bulk_skipped));
    }

    let (primary, posts, reconcile_report) = match bulk {
        Some(batch) if !api_posts.is_empty() => {
            let (merged, report) = reconcile(&batch.records, &api_posts);
            (PrimarySource::BulkExport, merged, Some(report))
        }
        Some(batch) => {
            notices.push("No API posts available; reaction breakdown hidden".to_string());
            (PrimarySource::BulkExport, batch.records, None)
        }
        None if !api_posts.is_empty() => {
            notices.push(format!(
                "No bulk export found; showing the {} most recent API posts",
                api_posts.len()
            ));
            (PrimarySource::Api, api_posts.clone(), None)
        }
        None => {
            notices.push("No data available: add a CSV export or configure API credentials".to_string());
            (PrimarySource::None, Vec::new(), None)
        }
    };

    let page = inputs.page.filter(|p| !p.is_empty());
    let videos = inputs.videos.map(|b| b.records).unwrap_or_default();

    info!(
        "assembled dataset: {} posts ({:?}), {} API posts, {} videos",
        posts.len(),
        primary,
        api_count,
        videos.len()
    );
    debug!("source notices: {:?}", notices);

    Dataset {
        posts,
        api_posts,
        page,
        videos,
        posts_fetched_at,
        status: SourceStatus {
            primary,
            export_path,
            bulk_posts,
            bulk_skipped,
            api_posts: api_count,
            api_skipped,
            reconcile: reconcile_report,
            notices,
        },
        generated_at: Utc::now(),
    }
}
