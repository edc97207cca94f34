//! Schema normalizer: bulk-export rows and API JSON into canonical records.
//!
//! Every function here works on one record at a time and never fails past a
//! record boundary. A record that cannot be salvaged yields `None` and the
//! batch-level callers count it as skipped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use insights_core::data_processors::{
    absolutize_permalink, truncate_chars, CountParser, SummaryExtractor, TimestampProcessor,
};
use insights_core::models::{
    DataSource, NormalizedBatch, PageSnapshot, PostRecord, PostType, ReactionBreakdown,
    ReactionKind, VideoRecord,
};
use serde_json::Value;
use tracing::debug;

/// API messages are cut to this many characters at ingestion.
pub const API_MESSAGE_MAX_CHARS: usize = 200;

// ── Bulk export ───────────────────────────────────────────────────────────────

/// Column labels of the bulk export.
pub mod columns {
    pub const POST_ID: &str = "Post ID";
    pub const TITLE: &str = "Title";
    pub const PUBLISH_TIME: &str = "Publish time";
    pub const POST_TYPE: &str = "Post type";
    pub const PERMALINK: &str = "Permalink";
    pub const REACTIONS: &str = "Reactions";
    pub const COMMENTS: &str = "Comments";
    pub const SHARES: &str = "Shares";
    pub const VIEWS: &str = "Views";
    pub const REACH: &str = "Reach";
    pub const TOTAL_CLICKS: &str = "Total clicks";
}

/// Header-name → column-index lookup for one export file.
///
/// Columns that are absent from the header simply read as empty cells, so a
/// file without `Views` or `Reach` yields zeros rather than an error.
#[derive(Debug, Clone, Default)]
pub struct ExportColumns {
    index: HashMap<String, usize>,
}

impl ExportColumns {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().trim_start_matches('\u{feff}').to_string(), i))
            .collect();
        Self { index }
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn cell<'r>(&self, row: &'r StringRecord, name: &str) -> &'r str {
        self.index
            .get(name)
            .and_then(|&i| row.get(i))
            .unwrap_or("")
    }

    fn count(&self, row: &StringRecord, name: &str) -> u64 {
        CountParser::parse_str(self.cell(row, name))
    }
}

/// Normalize one bulk-export row.
///
/// Returns `None` only when the row has no post identifier. An unparseable
/// publish time is kept as `None`; the record is still returned.
pub fn normalize_export_row(row: &StringRecord, cols: &ExportColumns) -> Option<PostRecord> {
    let id = cols.cell(row, columns::POST_ID).trim();
    if id.is_empty() {
        return None;
    }

    Some(PostRecord {
        id: id.to_string(),
        message: cols.cell(row, columns::TITLE).to_string(),
        source_time: TimestampProcessor::parse_export(cols.cell(row, columns::PUBLISH_TIME)),
        source: DataSource::BulkExport,
        post_type: PostType::from_label(cols.cell(row, columns::POST_TYPE)),
        permalink: absolutize_permalink(cols.cell(row, columns::PERMALINK)),
        reactions: cols.count(row, columns::REACTIONS),
        comments: cols.count(row, columns::COMMENTS),
        shares: cols.count(row, columns::SHARES),
        views: cols.count(row, columns::VIEWS),
        reach: cols.count(row, columns::REACH),
        clicks: cols.count(row, columns::TOTAL_CLICKS),
        reaction_breakdown: None,
    })
}

// ── API posts ─────────────────────────────────────────────────────────────────

/// Normalize one API post object.
///
/// Accepts both the nested Graph shape and the flat shape of a posts
/// snapshot file. Returns `None` when the value is not an object or has no
/// usable `id`.
pub fn normalize_api_post(post: &Value) -> Option<PostRecord> {
    let obj = post.as_object()?;
    let id = match obj.get("id")? {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let message = obj
        .get("message")
        .and_then(Value::as_str)
        .map(|m| truncate_chars(m, API_MESSAGE_MAX_CHARS))
        .unwrap_or_default();

    // Snapshot files store the raw status type under `post_type`.
    let raw_type = obj
        .get("status_type")
        .or_else(|| obj.get("post_type"))
        .and_then(Value::as_str)
        .unwrap_or("");

    let permalink = obj
        .get("permalink_url")
        .or_else(|| obj.get("permalink"))
        .and_then(Value::as_str)
        .map(absolutize_permalink)
        .unwrap_or_default();

    Some(PostRecord {
        id,
        message,
        source_time: TimestampProcessor::parse_api_value(obj.get("created_time")),
        source: DataSource::Api,
        post_type: PostType::from_label(raw_type),
        permalink,
        reactions: SummaryExtractor::total_count(post, "reactions"),
        comments: SummaryExtractor::total_count(post, "comments"),
        shares: SummaryExtractor::share_count(post),
        views: 0,
        reach: 0,
        clicks: 0,
        reaction_breakdown: Some(extract_breakdown(post)),
    })
}

/// Per-kind reaction totals from the aliased `like`/`love`/… fields.
pub fn extract_breakdown(post: &Value) -> ReactionBreakdown {
    let mut breakdown = ReactionBreakdown::default();
    for kind in ReactionKind::ALL {
        breakdown.set(kind, SummaryExtractor::total_count(post, kind.key()));
    }
    breakdown
}

/// Normalize a post listing.
///
/// `payload` is either a live response (`{"data": [...]}`) or a snapshot
/// file (`{"fetched_at": ..., "posts": [...]}`).
pub fn normalize_api_posts(payload: &Value) -> NormalizedBatch<PostRecord> {
    let mut batch = normalize_list(payload, &["posts", "data"], normalize_api_post);
    batch.fetched_at = parse_fetched_at(payload.get("fetched_at"));
    debug!(
        "normalized {} API posts ({} skipped)",
        batch.records.len(),
        batch.skipped
    );
    batch
}

// ── Videos ────────────────────────────────────────────────────────────────────

/// Normalize one video object. Title falls back to the description, then to
/// `"Untitled"`.
pub fn normalize_video(video: &Value) -> Option<VideoRecord> {
    let obj = video.as_object()?;
    let id = match obj.get("id")? {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let non_empty = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let title = non_empty("title")
        .or_else(|| non_empty("description"))
        .unwrap_or_else(|| "Untitled".to_string());

    let duration_secs = obj
        .get("length")
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);

    Some(VideoRecord {
        id,
        title,
        views: obj.get("views").map(CountParser::from_value).unwrap_or(0),
        duration_secs,
        created_at: TimestampProcessor::parse_api_value(obj.get("created_time")),
        permalink: non_empty("permalink_url")
            .map(|p| absolutize_permalink(&p))
            .unwrap_or_default(),
    })
}

/// Normalize a video listing (`{"data": [...]}` or a videos snapshot file).
pub fn normalize_videos(payload: &Value) -> NormalizedBatch<VideoRecord> {
    let mut batch = normalize_list(payload, &["videos", "data"], normalize_video);
    batch.fetched_at = parse_fetched_at(payload.get("fetched_at"));
    batch
}

// ── Page ──────────────────────────────────────────────────────────────────────

/// Normalize page metadata. Returns `None` for non-objects and for payloads
/// carrying an `error` field.
pub fn normalize_page(payload: &Value) -> Option<PageSnapshot> {
    let obj = payload.as_object()?;
    if obj.contains_key("error") {
        return None;
    }
    let count = |key: &str| obj.get(key).map(CountParser::from_value).unwrap_or(0);

    let snapshot = PageSnapshot {
        name: obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        fan_count: count("fan_count"),
        followers_count: count("followers_count"),
        talking_about_count: count("talking_about_count"),
        overall_star_rating: obj
            .get("overall_star_rating")
            .and_then(Value::as_f64)
            .filter(|r| r.is_finite() && *r >= 0.0)
            .unwrap_or(0.0),
        rating_count: count("rating_count"),
        fetched_at: parse_fetched_at(obj.get("fetched_at")),
    };
    (!snapshot.is_empty()).then_some(snapshot)
}

// ── Idempotence ───────────────────────────────────────────────────────────────

/// Re-apply the normalizer's rules to an already-normalized record.
///
/// Every rule is idempotent: post types are already canonical, permalinks
/// already absolute, and offsets are applied only when the display time is
/// read. The result therefore equals the input.
pub fn renormalize(record: &PostRecord) -> PostRecord {
    let message = match record.source {
        DataSource::Api => truncate_chars(&record.message, API_MESSAGE_MAX_CHARS),
        DataSource::BulkExport => record.message.clone(),
    };
    PostRecord {
        message,
        post_type: PostType::from_label(record.post_type.as_str()),
        permalink: absolutize_permalink(&record.permalink),
        ..record.clone()
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn normalize_list<T>(
    payload: &Value,
    keys: &[&str],
    normalize: impl Fn(&Value) -> Option<T>,
) -> NormalizedBatch<T> {
    let Some(items) = keys
        .iter()
        .find_map(|k| payload.get(*k).and_then(Value::as_array))
    else {
        return NormalizedBatch::empty();
    };

    let mut batch = NormalizedBatch::empty();
    for item in items {
        match normalize(item) {
            Some(record) => batch.records.push(record),
            None => batch.skipped += 1,
        }
    }
    batch
}

/// `fetched_at` is written either as RFC 3339 or as a naive local ISO time;
/// naive values are taken as UTC.
fn parse_fetched_at(value: Option<&Value>) -> Option<DateTime<Utc>> {
    TimestampProcessor::parse_api_value(value).map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn export_headers() -> StringRecord {
        StringRecord::from(vec![
            "Post ID",
            "Title",
            "Publish time",
            "Post type",
            "Permalink",
            "Reactions",
            "Comments",
            "Shares",
            "Views",
            "Reach",
            "Total clicks",
        ])
    }

    fn nested_post() -> Value {
        json!({
            "id": "580104038511364_999",
            "message": "Weekend promo",
            "created_time": "2024-03-01T04:00:00+0000",
            "permalink_url": "/580104038511364/posts/999",
            "status_type": "added_photos",
            "shares": {"count": 3},
            "reactions": {"data": [], "summary": {"total_count": 20}},
            "comments": {"data": [], "summary": {"total_count": 4}},
            "like": {"data": [], "summary": {"total_count": 15}},
            "love": {"data": [], "summary": {"total_count": 5}}
        })
    }

    /// The flat shape a previous fetch writes to `posts.json`.
    fn snapshot_shape(record: &PostRecord) -> Value {
        let b = record.reaction_breakdown.unwrap_or_default();
        json!({
            "id": record.id,
            "message": record.message,
            "created_time": record
                .source_time
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S+0000").to_string()),
            "permalink_url": record.permalink,
            "post_type": "added_photos",
            "reactions": record.reactions,
            "comments": record.comments,
            "shares": record.shares,
            "like": b.like, "love": b.love, "haha": b.haha,
            "wow": b.wow, "sad": b.sad, "angry": b.angry,
            "engagement": 999_999
        })
    }

    // ── bulk export rows ──────────────────────────────────────────────────────

    #[test]
    fn test_export_row_full() {
        let cols = ExportColumns::from_headers(&export_headers());
        let row = StringRecord::from(vec![
            "999",
            "Hello",
            "03/15/2024 14:05",
            "Reels",
            "https://www.facebook.com/reel/999",
            "10",
            "2",
            "1",
            "500",
            "300",
            "7",
        ]);
        let record = normalize_export_row(&row, &cols).unwrap();
        assert_eq!(record.id, "999");
        assert_eq!(record.message, "Hello");
        assert_eq!(record.source_time, Some(at(2024, 3, 15, 14, 5)));
        assert_eq!(record.post_type, PostType::Reel);
        assert_eq!(record.views, 500);
        assert_eq!(record.reach, 300);
        assert_eq!(record.clicks, 7);
        assert_eq!(record.engagement(), 13);
        assert!(record.reaction_breakdown.is_none());
        // 14:05 + 16h
        assert_eq!(record.published_at(), Some(at(2024, 3, 16, 6, 5)));
    }

    #[test]
    fn test_export_row_missing_columns_yield_zero() {
        let headers = StringRecord::from(vec!["Post ID", "Publish time", "Reactions"]);
        let cols = ExportColumns::from_headers(&headers);
        assert!(!cols.has(columns::VIEWS));
        let row = StringRecord::from(vec!["1", "01/02/2024 08:00", "4"]);
        let record = normalize_export_row(&row, &cols).unwrap();
        assert_eq!(record.views, 0);
        assert_eq!(record.reach, 0);
        assert_eq!(record.clicks, 0);
        assert_eq!(record.post_type, PostType::Other);
    }

    #[test]
    fn test_export_row_bad_values_coerced() {
        let cols = ExportColumns::from_headers(&export_headers());
        let row = StringRecord::from(vec![
            "2", "", "not a date", "Carousel", "", "abc", "-3", "", "1.9", "", "",
        ]);
        let record = normalize_export_row(&row, &cols).unwrap();
        assert!(record.source_time.is_none());
        assert!(record.temporal().is_none());
        assert_eq!(record.reactions, 0);
        assert_eq!(record.comments, 0);
        assert_eq!(record.views, 1);
        assert_eq!(record.post_type, PostType::Other);
    }

    #[test]
    fn test_export_row_without_id_is_skipped() {
        let cols = ExportColumns::from_headers(&export_headers());
        let row = StringRecord::from(vec!["  ", "Hello", "03/15/2024 14:05"]);
        assert!(normalize_export_row(&row, &cols).is_none());
    }

    #[test]
    fn test_export_headers_strip_bom() {
        let headers = StringRecord::from(vec!["\u{feff}Post ID", "Reactions"]);
        let cols = ExportColumns::from_headers(&headers);
        assert!(cols.has(columns::POST_ID));
    }

    // ── API posts ─────────────────────────────────────────────────────────────

    #[test]
    fn test_api_post_nested_shape() {
        let record = normalize_api_post(&nested_post()).unwrap();
        assert_eq!(record.id, "580104038511364_999");
        assert_eq!(record.source, DataSource::Api);
        assert_eq!(record.post_type, PostType::Other);
        assert_eq!(
            record.permalink,
            "https://www.facebook.com/580104038511364/posts/999"
        );
        assert_eq!(record.reactions, 20);
        assert_eq!(record.comments, 4);
        assert_eq!(record.shares, 3);
        let b = record.reaction_breakdown.unwrap();
        assert_eq!(b.like, 15);
        assert_eq!(b.love, 5);
        assert_eq!(b.angry, 0);
        // 04:00 UTC + 8h
        assert_eq!(record.published_at(), Some(at(2024, 3, 1, 12, 0)));
    }

    #[test]
    fn test_api_post_missing_subobjects_default_to_zero() {
        let record = normalize_api_post(&json!({"id": "1_2"})).unwrap();
        assert_eq!(record.engagement(), 0);
        assert_eq!(record.reaction_breakdown, Some(ReactionBreakdown::default()));
        assert!(record.source_time.is_none());
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_api_post_message_truncated_to_200_chars() {
        let long = "é".repeat(250);
        let record = normalize_api_post(&json!({"id": "1", "message": long})).unwrap();
        assert_eq!(record.message.chars().count(), 200);
    }

    #[test]
    fn test_api_post_status_type_mapping() {
        let record = normalize_api_post(&json!({"id": "1", "status_type": "Live_Video"})).unwrap();
        assert_eq!(record.post_type, PostType::Live);
    }

    #[test]
    fn test_api_post_rejects_non_objects_and_missing_ids() {
        assert!(normalize_api_post(&json!("string")).is_none());
        assert!(normalize_api_post(&json!({"message": "no id"})).is_none());
        assert!(normalize_api_post(&json!({"id": ""})).is_none());
    }

    #[test]
    fn test_api_posts_batch_counts_skipped() {
        let payload = json!({"data": [nested_post(), {"message": "no id"}, 5]});
        let batch = normalize_api_posts(&payload);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped, 2);
        assert!(batch.fetched_at.is_none());
    }

    #[test]
    fn test_api_posts_snapshot_shape() {
        let payload = json!({
            "fetched_at": "2024-03-02T09:30:00.123456",
            "total_posts": 1,
            "posts": [{"id": "1_2", "reactions": 9, "comments": 1, "shares": 2, "like": 9}]
        });
        let batch = normalize_api_posts(&payload);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].engagement(), 12);
        assert_eq!(batch.records[0].reaction_breakdown.unwrap().like, 9);
        assert!(batch.fetched_at.is_some());
    }

    #[test]
    fn test_api_posts_without_list_is_empty() {
        let batch = normalize_api_posts(&json!({"error": {"message": "bad token"}}));
        assert!(batch.is_empty());
        assert_eq!(batch.skipped, 0);
    }

    #[test]
    fn test_engagement_never_read_from_source() {
        let snapshot = json!({"id": "1", "reactions": 1, "comments": 1, "shares": 1, "engagement": 500});
        let record = normalize_api_post(&snapshot).unwrap();
        assert_eq!(record.engagement(), 3);
    }

    // ── idempotence ───────────────────────────────────────────────────────────

    #[test]
    fn test_nested_and_snapshot_shapes_agree() {
        let first = normalize_api_post(&nested_post()).unwrap();
        let second = normalize_api_post(&snapshot_shape(&first)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.published_at(), second.published_at());
    }

    #[test]
    fn test_renormalize_is_identity() {
        let api = normalize_api_post(&nested_post()).unwrap();
        assert_eq!(renormalize(&api), api);
        assert_eq!(renormalize(&renormalize(&api)), api);

        let cols = ExportColumns::from_headers(&export_headers());
        let row = StringRecord::from(vec!["7", "t", "12/31/2023 10:00", "photos", "/p/7"]);
        let bulk = normalize_export_row(&row, &cols).unwrap();
        assert_eq!(renormalize(&bulk), bulk);
        assert_eq!(renormalize(&bulk).published_at(), bulk.published_at());
    }

    // ── videos ────────────────────────────────────────────────────────────────

    #[test]
    fn test_video_title_fallbacks() {
        let titled = normalize_video(&json!({"id": "v1", "title": "Launch", "description": "d"}));
        assert_eq!(titled.unwrap().title, "Launch");

        let described = normalize_video(&json!({"id": "v2", "title": "", "description": "Recap"}));
        assert_eq!(described.unwrap().title, "Recap");

        let bare = normalize_video(&json!({"id": "v3"}));
        assert_eq!(bare.unwrap().title, "Untitled");
    }

    #[test]
    fn test_video_fields() {
        let video = normalize_video(&json!({
            "id": "v1",
            "views": 1200,
            "length": 61.5,
            "created_time": "2024-02-01T00:00:00+0000",
            "permalink_url": "/reel/55"
        }))
        .unwrap();
        assert_eq!(video.views, 1200);
        assert!((video.duration_secs - 61.5).abs() < f64::EPSILON);
        assert_eq!(video.created_at, Some(at(2024, 2, 1, 0, 0)));
        assert_eq!(video.permalink, "https://www.facebook.com/reel/55");
    }

    #[test]
    fn test_videos_snapshot_shape() {
        let payload = json!({
            "fetched_at": "2024-03-02T09:30:00",
            "total_videos": 2,
            "total_views": 30,
            "videos": [{"id": "a", "views": 10}, {"id": "b", "views": "20"}]
        });
        let batch = normalize_videos(&payload);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[1].views, 20);
    }

    // ── page ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_page_snapshot() {
        let page = normalize_page(&json!({
            "name": "Example Page",
            "fan_count": 12000,
            "followers_count": 12500,
            "talking_about_count": 340,
            "overall_star_rating": 4.6,
            "rating_count": 88,
            "id": "580104038511364"
        }))
        .unwrap();
        assert_eq!(page.name, "Example Page");
        assert_eq!(page.fan_count, 12_000);
        assert_eq!(page.talking_about_count, 340);
        assert!((page.overall_star_rating - 4.6).abs() < 1e-9);
        assert!(page.fetched_at.is_none());
    }

    #[test]
    fn test_page_error_and_empty() {
        assert!(normalize_page(&json!({"error": {"code": 190}})).is_none());
        assert!(normalize_page(&json!({})).is_none());
        assert!(normalize_page(&json!([])).is_none());
    }
}
