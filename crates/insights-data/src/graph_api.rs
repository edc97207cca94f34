//! Read-only Graph API client for page metadata, posts and videos.
//!
//! Each call is a single best-effort request with a bounded timeout and no
//! retry. A response carrying an `error` object becomes
//! [`InsightsError::Api`]; degrading that into an empty dataset is the
//! caller's decision.

use std::time::Duration;

use chrono::Utc;
use insights_core::credentials::Credentials;
use insights_core::error::{InsightsError, Result};
use insights_core::models::{NormalizedBatch, PageSnapshot, PostRecord, ReactionKind, VideoRecord};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::normalizer::{normalize_api_posts, normalize_page, normalize_videos};

/// Timeout for the small page-metadata request.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for post and video listings.
pub const LIST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default number of posts/videos requested.
pub const DEFAULT_LIMIT: u32 = 100;

const PAGE_FIELDS: &str =
    "name,fan_count,followers_count,talking_about_count,overall_star_rating,rating_count";
const VIDEO_FIELDS: &str = "id,title,description,created_time,length,views,permalink_url";

/// Field list for the post listing: base fields, one aliased summary per
/// reaction kind, then overall reaction and comment summaries.
pub fn post_fields() -> String {
    let mut fields = vec!["id,message,created_time,shares,permalink_url,status_type".to_string()];
    for kind in ReactionKind::ALL {
        fields.push(format!(
            "reactions.type({}).summary(true).as({})",
            kind.key().to_uppercase(),
            kind.key()
        ));
    }
    fields.push("reactions.summary(true),comments.summary(true)".to_string());
    fields.join(",")
}

/// Thin client bound to one page's credentials.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    creds: Credentials,
}

impl GraphClient {
    pub fn new(creds: Credentials) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("page-insights/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, creds })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.creds
    }

    /// `GET /{page_id}` with the page metadata fields.
    pub async fn fetch_page_info(&self) -> Result<PageSnapshot> {
        let body = self
            .get_json(&self.creds.page_id, PAGE_FIELDS, None, PAGE_TIMEOUT)
            .await?;
        let mut page = normalize_page(&body)
            .ok_or_else(|| InsightsError::Api("page metadata response was empty".to_string()))?;
        page.fetched_at = Some(Utc::now());
        Ok(page)
    }

    /// `GET /{page_id}/posts` with reaction, comment and share summaries.
    pub async fn fetch_posts(&self, limit: u32) -> Result<NormalizedBatch<PostRecord>> {
        let path = format!("{}/posts", self.creds.page_id);
        let body = self
            .get_json(&path, &post_fields(), Some(limit), LIST_TIMEOUT)
            .await?;
        let mut batch = normalize_api_posts(&body);
        batch.fetched_at = Some(Utc::now());
        Ok(batch)
    }

    /// `GET /{page_id}/videos`.
    pub async fn fetch_videos(&self, limit: u32) -> Result<NormalizedBatch<VideoRecord>> {
        let path = format!("{}/videos", self.creds.page_id);
        let body = self
            .get_json(&path, VIDEO_FIELDS, Some(limit), LIST_TIMEOUT)
            .await?;
        let mut batch = normalize_videos(&body);
        batch.fetched_at = Some(Utc::now());
        Ok(batch)
    }

    async fn get_json(
        &self,
        path: &str,
        fields: &str,
        limit: Option<u32>,
        timeout: Duration,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.creds.base_url, path);
        debug!(url = %url, "Graph API request");

        let mut query: Vec<(&str, String)> = vec![
            ("fields", fields.to_string()),
            ("access_token", self.creds.page_token.clone()),
        ];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .query(&query)
            .timeout(timeout)
            .send()
            .await?;

        // The API reports failures as a JSON `error` object, usually with a
        // 4xx status, so the body is inspected before the status.
        let status = response.status();
        let body: Value = response.json().await?;
        if let Some(err) = body.get("error") {
            return Err(InsightsError::Api(api_error_message(err)));
        }
        if !status.is_success() {
            return Err(InsightsError::Api(format!("HTTP {}", status)));
        }
        Ok(body)
    }
}

fn api_error_message(err: &Value) -> String {
    err.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}
