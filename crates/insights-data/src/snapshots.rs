//! On-disk JSON mirrors of the three API responses.
//!
//! A snapshot directory may hold `page_info.json`, `posts.json` and
//! `videos.json`. Each is optional; a missing, unreadable or empty file reads
//! as `None` so callers fall through to a live fetch.

use std::path::{Path, PathBuf};

use insights_core::error::{InsightsError, Result};
use insights_core::models::{NormalizedBatch, PageSnapshot, PostRecord, VideoRecord};
use serde_json::Value;
use tracing::{debug, warn};

use crate::normalizer::{normalize_api_posts, normalize_page, normalize_videos};

pub const PAGE_INFO_FILE: &str = "page_info.json";
pub const POSTS_FILE: &str = "posts.json";
pub const VIDEOS_FILE: &str = "videos.json";

/// Snapshot files under one directory.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn page_info(&self) -> Option<PageSnapshot> {
        let value = self.read_optional(PAGE_INFO_FILE)?;
        normalize_page(&value)
    }

    pub fn posts(&self) -> Option<NormalizedBatch<PostRecord>> {
        let value = self.read_optional(POSTS_FILE)?;
        Some(normalize_api_posts(&value)).filter(|b| !b.is_empty())
    }

    pub fn videos(&self) -> Option<NormalizedBatch<VideoRecord>> {
        let value = self.read_optional(VIDEOS_FILE)?;
        Some(normalize_videos(&value)).filter(|b| !b.is_empty())
    }

    fn read_optional(&self, name: &str) -> Option<Value> {
        let path = self.root.join(name);
        if !path.exists() {
            return None;
        }
        match read_json(&path) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("ignoring snapshot {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| InsightsError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let value = serde_json::from_str(&content)?;
    debug!("read snapshot {}", path.display());
    Ok(value)
}
