//! Dashboard composition: one filtered recomputation per interaction.
//!
//! [`DashboardView::compute`] takes the cached [`Dataset`], applies the
//! current [`Filters`] in memory and produces every table the UI renders.
//! It never touches the network or disk.

use chrono::{DateTime, NaiveDate, Utc};
use insights_core::filters::Filters;
use insights_core::formatting::truncate_display;
use insights_core::models::{PageSnapshot, PostRecord, PostType};
use insights_data::aggregator::{GroupStats, MetricAggregator, ReactionSummary, Totals, VideoSummary};
use insights_data::pipeline::{Dataset, PrimarySource};
use tracing::debug;

/// Display width for messages in the top-posts table.
pub const TOP_POST_MESSAGE_CHARS: usize = 80;
/// Display width for messages in the all-posts listing.
pub const ALL_POSTS_MESSAGE_CHARS: usize = 60;
/// Display width for video titles.
pub const VIDEO_TITLE_CHARS: usize = 50;

/// Sizes and clock for one recomputation.
#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    /// "Today" in the display timezone; anchors the period presets.
    pub today: NaiveDate,
    pub top_posts: usize,
    pub top_videos: usize,
}

/// One row of a post table, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    pub id: String,
    /// `YYYY-MM-DD HH:MM` display time, or `-` when undated.
    pub published: String,
    pub post_type: PostType,
    pub message: String,
    pub reactions: u64,
    pub comments: u64,
    pub shares: u64,
    pub engagement: u64,
    pub views: u64,
    pub reach: u64,
    pub permalink: String,
}

impl PostRow {
    fn from_record(record: &PostRecord, message_chars: usize) -> Self {
        Self {
            id: record.id.clone(),
            published: record
                .published_at()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            post_type: record.post_type,
            message: truncate_display(&record.message, message_chars),
            reactions: record.reactions,
            comments: record.comments,
            shares: record.shares,
            engagement: record.engagement(),
            views: record.views,
            reach: record.reach,
            permalink: record.permalink.clone(),
        }
    }
}

/// Page-level KPIs. Independent of the post filters.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOverview {
    pub page: Option<PageSnapshot>,
    /// Sums over the API post sample.
    pub api_window: Totals,
    pub videos: VideoSummary,
}

/// Everything one render of the dashboard needs.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub filters: Filters,
    pub range_label: String,
    pub filtered_posts: usize,
    pub total_posts: usize,
    pub primary: PrimarySource,
    pub totals: Totals,
    pub by_post_type: Vec<GroupStats>,
    pub by_date: Vec<GroupStats>,
    pub by_month: Vec<GroupStats>,
    pub by_day_of_week: Vec<GroupStats>,
    pub by_time_slot: Vec<GroupStats>,
    pub best_day: Option<GroupStats>,
    pub best_slot: Option<GroupStats>,
    pub top_posts: Vec<PostRow>,
    pub all_posts: Vec<PostRow>,
    /// Present only when a filtered record carries a breakdown.
    pub reactions: Option<ReactionSummary>,
    pub overview: PageOverview,
    pub notices: Vec<String>,
    pub posts_fetched_at: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardView {
    pub fn compute(dataset: &Dataset, filters: &Filters, opts: DashboardOptions) -> Self {
        let filtered = filters.apply(&dataset.posts, opts.today);
        debug!(
            "recomputing dashboard: {} of {} posts pass {:?}",
            filtered.len(),
            dataset.posts.len(),
            filters
        );

        let by_day_of_week = MetricAggregator::by_day_of_week(&filtered);
        let by_time_slot = MetricAggregator::by_time_slot(&filtered);
        let best_day = MetricAggregator::best_group(&by_day_of_week).cloned();
        let best_slot = MetricAggregator::best_group(&by_time_slot).cloned();

        let top_posts = MetricAggregator::top_posts(&filtered, opts.top_posts)
            .into_iter()
            .map(|r| PostRow::from_record(r, TOP_POST_MESSAGE_CHARS))
            .collect();
        let all_posts = MetricAggregator::newest_first(&filtered)
            .into_iter()
            .map(|r| PostRow::from_record(r, ALL_POSTS_MESSAGE_CHARS))
            .collect();

        let api_sample: Vec<&PostRecord> = dataset.api_posts.iter().collect();
        let mut videos = VideoSummary::from_videos(&dataset.videos, opts.top_videos);
        for video in &mut videos.top {
            video.title = truncate_display(&video.title, VIDEO_TITLE_CHARS);
        }

        Self {
            filters: filters.clone(),
            range_label: filters.describe_range(&dataset.posts, opts.today),
            filtered_posts: filtered.len(),
            total_posts: dataset.posts.len(),
            primary: dataset.status.primary,
            totals: MetricAggregator::totals(&filtered),
            by_post_type: MetricAggregator::by_post_type(&filtered),
            by_date: MetricAggregator::by_date(&filtered),
            by_month: MetricAggregator::by_month(&filtered),
            by_day_of_week,
            by_time_slot,
            best_day,
            best_slot,
            top_posts,
            all_posts,
            reactions: MetricAggregator::reaction_summary(&filtered),
            overview: PageOverview {
                page: dataset.page.clone(),
                api_window: MetricAggregator::totals(&api_sample),
                videos,
            },
            notices: dataset.status.notices.clone(),
            posts_fetched_at: dataset.posts_fetched_at,
            generated_at: dataset.generated_at,
        }
    }

    pub fn has_posts(&self) -> bool {
        self.filtered_posts > 0
    }
}
