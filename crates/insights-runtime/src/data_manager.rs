//! TTL-cached loader for every dashboard source.
//!
//! [`DataManager::get_dataset`] loads the bulk export, the API post sample,
//! the page metadata and the video listing, each through its own cache entry
//! keyed by what was fetched (file path or endpoint). Filters are never part
//! of a key; they are applied afterwards in memory.
//!
//! A source that fails is logged, recorded in [`DataManager::last_errors`]
//! and treated as empty. Only successful loads are cached, so a failed source
//! is retried on the next interaction.

use std::path::PathBuf;
use std::time::Duration;

use insights_core::credentials::Credentials;
use insights_core::error::InsightsError;
use insights_core::models::{NormalizedBatch, PageSnapshot, PostRecord, VideoRecord};
use insights_core::settings::Settings;
use insights_data::exports::{load_bulk_export, select_export_file};
use insights_data::graph_api::{GraphClient, DEFAULT_LIMIT};
use insights_data::pipeline::{assemble, Dataset, SourceInputs};
use insights_data::snapshots::{SnapshotDir, PAGE_INFO_FILE, POSTS_FILE, VIDEOS_FILE};
use tracing::{debug, warn};

use crate::cache::TtlCache;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default TTL for file-backed sources.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Default TTL for live API responses.
pub const DEFAULT_API_TTL_SECS: u64 = 300;

// ── Config ────────────────────────────────────────────────────────────────────

/// Where each source lives and how long its results stay fresh.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub exports_dir: PathBuf,
    /// Directory holding the JSON snapshot files.
    pub data_dir: PathBuf,
    /// `None` disables live API fetches.
    pub credentials: Option<Credentials>,
    pub cache_ttl: Duration,
    pub api_ttl: Duration,
    /// `limit` sent with the post and video listings.
    pub fetch_limit: u32,
}

impl DataConfig {
    pub fn from_settings(settings: &Settings, credentials: Option<Credentials>) -> Self {
        Self {
            exports_dir: settings.exports_dir.clone(),
            data_dir: settings.data_dir.clone(),
            credentials,
            cache_ttl: Duration::from_secs(settings.cache_ttl),
            api_ttl: Duration::from_secs(settings.api_ttl),
            fetch_limit: DEFAULT_LIMIT,
        }
    }
}

// ── Cache keys ────────────────────────────────────────────────────────────────

/// Remote listing identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Page,
    Posts,
    Videos,
}

/// Identity of one fetch operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchKey {
    /// A bulk export file.
    Export(PathBuf),
    /// A snapshot JSON file.
    Snapshot(PathBuf),
    /// A live API call.
    Api { endpoint: Endpoint, limit: u32 },
}

/// One source that could not be loaded during the last refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub source: &'static str,
    pub message: String,
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Per-source cached loader.
///
/// # Example
/// ```no_run
/// use insights_runtime::data_manager::{DataConfig, DataManager};
/// use std::time::Duration;
///
/// # async fn demo() {
/// let mut mgr = DataManager::new(DataConfig {
///     exports_dir: "exports".into(),
///     data_dir: "data".into(),
///     credentials: None,
///     cache_ttl: Duration::from_secs(60),
///     api_ttl: Duration::from_secs(300),
///     fetch_limit: 100,
/// });
/// let dataset = mgr.get_dataset(false).await;
/// println!("{} posts", dataset.posts.len());
/// # }
/// ```
pub struct DataManager {
    config: DataConfig,
    snapshots: SnapshotDir,
    client: Option<GraphClient>,
    posts: TtlCache<FetchKey, NormalizedBatch<PostRecord>>,
    page: TtlCache<FetchKey, PageSnapshot>,
    videos: TtlCache<FetchKey, NormalizedBatch<VideoRecord>>,
    last_errors: Vec<SourceError>,
}

impl DataManager {
    pub fn new(config: DataConfig) -> Self {
        let mut last_errors = Vec::new();
        let client = match config.credentials.clone().map(GraphClient::new) {
            Some(Ok(client)) => Some(client),
            Some(Err(e)) => {
                warn!(error = %e, "could not build Graph API client");
                last_errors.push(SourceError {
                    source: "Graph API",
                    message: e.to_string(),
                });
                None
            }
            None => {
                debug!("no API credentials configured");
                None
            }
        };

        Self {
            snapshots: SnapshotDir::new(config.data_dir.clone()),
            posts: TtlCache::new(config.cache_ttl),
            page: TtlCache::new(config.cache_ttl),
            videos: TtlCache::new(config.cache_ttl),
            client,
            config,
            last_errors,
        }
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn has_api_client(&self) -> bool {
        self.client.is_some()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Load every source (cache first) and assemble the dataset.
    ///
    /// `force_refresh` drops all cached entries before loading.
    pub async fn get_dataset(&mut self, force_refresh: bool) -> Dataset {
        if force_refresh {
            self.invalidate_cache();
        }
        self.last_errors.clear();

        let bulk = self.load_bulk();
        let api_posts = self.load_api_posts().await;
        let page = self.load_page().await;
        let videos = self.load_videos().await;

        if self.client.is_none() && (api_posts.is_none() || page.is_none()) {
            debug!("API-sourced sections degrade: no credentials and no snapshots");
        }

        let mut dataset = assemble(SourceInputs {
            bulk,
            api_posts,
            page,
            videos,
        });
        dataset.status.notices.extend(
            self.last_errors
                .iter()
                .map(|e| format!("{} unavailable: {}", e.source, e.message)),
        );
        dataset
    }

    /// Discard every cached entry.
    pub fn invalidate_cache(&mut self) {
        self.posts.clear();
        self.page.clear();
        self.videos.clear();
        debug!("cache invalidated");
    }

    /// Sources that failed during the last [`get_dataset`](Self::get_dataset).
    pub fn last_errors(&self) -> &[SourceError] {
        &self.last_errors
    }

    // ── Per-source loaders ────────────────────────────────────────────────

    fn load_bulk(&mut self) -> Option<(PathBuf, NormalizedBatch<PostRecord>)> {
        let path = match select_export_file(&self.config.exports_dir) {
            Ok(path) => path,
            Err(InsightsError::NoExportFiles(dir)) => {
                debug!("no export files in {}", dir.display());
                return None;
            }
            Err(e) => {
                self.record_error("Bulk export", &e);
                return None;
            }
        };

        let key = FetchKey::Export(path.clone());
        if let Some(batch) = self.posts.get(&key) {
            debug!("bulk export served from cache");
            return Some((path, batch));
        }

        match load_bulk_export(&path) {
            Ok(batch) => {
                self.posts.insert(key, batch.clone());
                Some((path, batch))
            }
            Err(e) => {
                self.record_error("Bulk export", &e);
                None
            }
        }
    }

    async fn load_api_posts(&mut self) -> Option<NormalizedBatch<PostRecord>> {
        let snapshot_key = FetchKey::Snapshot(self.snapshots.root().join(POSTS_FILE));
        if let Some(batch) = self.posts.get(&snapshot_key) {
            return Some(batch);
        }
        if let Some(batch) = self.snapshots.posts() {
            self.posts.insert(snapshot_key, batch.clone());
            return Some(batch);
        }

        let client = self.client.clone()?;
        let key = FetchKey::Api {
            endpoint: Endpoint::Posts,
            limit: self.config.fetch_limit,
        };
        if let Some(batch) = self.posts.get(&key) {
            return Some(batch);
        }
        match client.fetch_posts(self.config.fetch_limit).await {
            Ok(batch) => {
                self.posts
                    .insert_with_ttl(key, batch.clone(), self.config.api_ttl);
                Some(batch)
            }
            Err(e) => {
                self.record_error("API posts", &e);
                None
            }
        }
    }

    async fn load_page(&mut self) -> Option<PageSnapshot> {
        let snapshot_key = FetchKey::Snapshot(self.snapshots.root().join(PAGE_INFO_FILE));
        if let Some(page) = self.page.get(&snapshot_key) {
            return Some(page);
        }
        if let Some(page) = self.snapshots.page_info() {
            self.page.insert(snapshot_key, page.clone());
            return Some(page);
        }

        let client = self.client.clone()?;
        let key = FetchKey::Api {
            endpoint: Endpoint::Page,
            limit: 0,
        };
        if let Some(page) = self.page.get(&key) {
            return Some(page);
        }
        match client.fetch_page_info().await {
            Ok(page) => {
                self.page.insert_with_ttl(key, page.clone(), self.config.api_ttl);
                Some(page)
            }
            Err(e) => {
                self.record_error("Page info", &e);
                None
            }
        }
    }

    async fn load_videos(&mut self) -> Option<NormalizedBatch<VideoRecord>> {
        let snapshot_key = FetchKey::Snapshot(self.snapshots.root().join(VIDEOS_FILE));
        if let Some(batch) = self.videos.get(&snapshot_key) {
            return Some(batch);
        }
        if let Some(batch) = self.snapshots.videos() {
            self.videos.insert(snapshot_key, batch.clone());
            return Some(batch);
        }

        let client = self.client.clone()?;
        let key = FetchKey::Api {
            endpoint: Endpoint::Videos,
            limit: self.config.fetch_limit,
        };
        if let Some(batch) = self.videos.get(&key) {
            return Some(batch);
        }
        match client.fetch_videos(self.config.fetch_limit).await {
            Ok(batch) => {
                self.videos
                    .insert_with_ttl(key, batch.clone(), self.config.api_ttl);
                Some(batch)
            }
            Err(e) => {
                self.record_error("Videos", &e);
                None
            }
        }
    }

    fn record_error(&mut self, source: &'static str, err: &InsightsError) {
        warn!(source, error = %err, "source unavailable; continuing without it");
        self.last_errors.push(SourceError {
            source,
            message: err.to_string(),
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
