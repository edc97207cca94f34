use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InsightsError;
use crate::temporal::{self, TemporalFields};

// ── PostType ──────────────────────────────────────────────────────────────────

/// Closed set of post categories. Raw source labels never leak past
/// [`PostType::from_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PostType {
    Photo,
    Video,
    Reel,
    Live,
    Text,
    Other,
}

impl PostType {
    /// Every post type in display order.
    pub const ALL: [PostType; 6] = [
        PostType::Photo,
        PostType::Video,
        PostType::Reel,
        PostType::Live,
        PostType::Text,
        PostType::Other,
    ];

    /// Map a raw source label onto the closed set.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Anything unrecognised, including an empty label, becomes
    /// [`PostType::Other`].
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "photos" | "photo" => PostType::Photo,
            "videos" | "video" => PostType::Video,
            "reels" | "reel" => PostType::Reel,
            "live" | "live_video" | "live stream" => PostType::Live,
            "text" | "status" => PostType::Text,
            _ => PostType::Other,
        }
    }

    /// Canonical display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Photo => "Photo",
            PostType::Video => "Video",
            PostType::Reel => "Reel",
            PostType::Live => "Live",
            PostType::Text => "Text",
            PostType::Other => "Other",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = InsightsError;

    /// Strict parse used for user-facing filters: only canonical names
    /// (any case) are accepted, unlike the lenient [`PostType::from_label`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InsightsError::InvalidFilter(s.to_string()))
    }
}

// ── DataSource ────────────────────────────────────────────────────────────────

/// Which upstream system a record came from.
///
/// The two systems report timestamps in different zones, so the source also
/// decides which fixed offset turns a reported time into display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Tabular bulk export (full history, reach/views, no reaction detail).
    BulkExport,
    /// Remote Graph API (recent window, reaction detail, no reach/views).
    Api,
}

impl DataSource {
    /// Hours added to a source-reported time to reach display time.
    pub fn offset_hours(&self) -> i64 {
        match self {
            DataSource::BulkExport => temporal::CSV_SOURCE_OFFSET_HOURS,
            DataSource::Api => temporal::API_SOURCE_OFFSET_HOURS,
        }
    }
}

// ── Reactions ─────────────────────────────────────────────────────────────────

/// One of the six per-type reactions reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    Like,
    Love,
    Haha,
    Wow,
    Sad,
    Angry,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 6] = [
        ReactionKind::Like,
        ReactionKind::Love,
        ReactionKind::Haha,
        ReactionKind::Wow,
        ReactionKind::Sad,
        ReactionKind::Angry,
    ];

    /// Field alias used in API requests and snapshot files.
    pub fn key(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Love => "love",
            ReactionKind::Haha => "haha",
            ReactionKind::Wow => "wow",
            ReactionKind::Sad => "sad",
            ReactionKind::Angry => "angry",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReactionKind::Like => "Like",
            ReactionKind::Love => "Love",
            ReactionKind::Haha => "Haha",
            ReactionKind::Wow => "Wow",
            ReactionKind::Sad => "Sad",
            ReactionKind::Angry => "Angry",
        }
    }
}

/// Per-type reaction counts for a single post (or a sum over many).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionBreakdown {
    #[serde(default)]
    pub like: u64,
    #[serde(default)]
    pub love: u64,
    #[serde(default)]
    pub haha: u64,
    #[serde(default)]
    pub wow: u64,
    #[serde(default)]
    pub sad: u64,
    #[serde(default)]
    pub angry: u64,
}

impl ReactionBreakdown {
    pub fn get(&self, kind: ReactionKind) -> u64 {
        match kind {
            ReactionKind::Like => self.like,
            ReactionKind::Love => self.love,
            ReactionKind::Haha => self.haha,
            ReactionKind::Wow => self.wow,
            ReactionKind::Sad => self.sad,
            ReactionKind::Angry => self.angry,
        }
    }

    pub fn set(&mut self, kind: ReactionKind, value: u64) {
        match kind {
            ReactionKind::Like => self.like = value,
            ReactionKind::Love => self.love = value,
            ReactionKind::Haha => self.haha = value,
            ReactionKind::Wow => self.wow = value,
            ReactionKind::Sad => self.sad = value,
            ReactionKind::Angry => self.angry = value,
        }
    }

    /// Sum of all six kinds.
    pub fn total(&self) -> u64 {
        ReactionKind::ALL.iter().map(|k| self.get(*k)).sum()
    }

    /// Accumulate `other` into `self`.
    pub fn add(&mut self, other: &ReactionBreakdown) {
        for kind in ReactionKind::ALL {
            self.set(kind, self.get(kind) + other.get(kind));
        }
    }
}

// ── PostRecord ────────────────────────────────────────────────────────────────

/// Canonical per-post record produced by the schema normalizer.
///
/// Engagement and all calendar fields are derived on demand and never
/// stored, so they cannot drift from their inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Post identifier (`pageId_postId` for API records).
    pub id: String,
    /// Full message text. Only the presentation layer truncates it.
    #[serde(default)]
    pub message: String,
    /// Publish time exactly as the source reported it, `None` when the
    /// source value could not be parsed.
    #[serde(default)]
    pub source_time: Option<NaiveDateTime>,
    /// Upstream system this record was normalized from.
    pub source: DataSource,
    pub post_type: PostType,
    /// Absolute URL of the post.
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub reactions: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub reach: u64,
    #[serde(default)]
    pub clicks: u64,
    /// Present only when reaction detail came from the API.
    #[serde(default)]
    pub reaction_breakdown: Option<ReactionBreakdown>,
}

impl PostRecord {
    /// Reactions + comments + shares.
    pub fn engagement(&self) -> u64 {
        self.reactions + self.comments + self.shares
    }

    /// Publish time in the display timezone.
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        self.source_time
            .map(|t| temporal::to_display_time(t, self.source))
    }

    /// Calendar and time-of-day buckets derived from [`Self::published_at`].
    pub fn temporal(&self) -> Option<TemporalFields> {
        self.published_at().map(TemporalFields::from_timestamp)
    }

    /// Calendar date in the display timezone.
    pub fn date(&self) -> Option<NaiveDate> {
        self.published_at().map(|t| t.date())
    }
}

// ── VideoRecord ───────────────────────────────────────────────────────────────

/// A page video, aggregated separately from posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub views: u64,
    /// Length in seconds.
    pub duration_secs: f64,
    pub created_at: Option<NaiveDateTime>,
    pub permalink: String,
}

// ── PageSnapshot ──────────────────────────────────────────────────────────────

/// Point-in-time page totals. Replaced wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub name: String,
    /// Page likes, shown as "followers".
    #[serde(default)]
    pub fan_count: u64,
    #[serde(default)]
    pub followers_count: u64,
    /// Weekly "talking about" count.
    #[serde(default)]
    pub talking_about_count: u64,
    #[serde(default)]
    pub overall_star_rating: f64,
    #[serde(default)]
    pub rating_count: u64,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PageSnapshot {
    /// `true` when nothing useful was loaded.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.fan_count == 0 && self.followers_count == 0
    }
}

// ── NormalizedBatch ───────────────────────────────────────────────────────────

/// Output of normalizing one source: the records that survived plus a count
/// of rows that were malformed beyond coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch<T> {
    pub records: Vec<T>,
    pub skipped: usize,
    /// When the underlying payload was fetched, if the source says so.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> NormalizedBatch<T> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            fetched_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Default for NormalizedBatch<T> {
    fn default() -> Self {
        Self::empty()
    }
}
