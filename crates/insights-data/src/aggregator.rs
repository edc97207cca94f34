//! Engagement aggregation: scalar totals, grouped tables, rankings and
//! reaction totals.
//!
//! Fixed-order groupings (day of week, time slot) enumerate their canonical
//! key sequence first and look up sums per key, so empty groups appear with
//! zero metrics. Records without a publish time count towards [`Totals`] but
//! never towards a date-derived group.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Weekday};
use insights_core::models::{PostRecord, PostType, ReactionBreakdown, VideoRecord};
use insights_core::temporal::{month_key, weekday_name, TimeSlot, WEEKDAYS};

// ── Totals ────────────────────────────────────────────────────────────────────

/// Counter sums accumulated across posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub count: u64,
    pub reactions: u64,
    pub comments: u64,
    pub shares: u64,
    pub views: u64,
    pub reach: u64,
    pub clicks: u64,
    pub engagement: u64,
}

impl Totals {
    /// Add a single post's counters to the running totals.
    pub fn add(&mut self, record: &PostRecord) {
        self.count += 1;
        self.reactions += record.reactions;
        self.comments += record.comments;
        self.shares += record.shares;
        self.views += record.views;
        self.reach += record.reach;
        self.clicks += record.clicks;
        self.engagement += record.engagement();
    }

    pub fn mean_engagement(&self) -> f64 {
        mean(self.engagement, self.count)
    }

    pub fn mean_reactions(&self) -> f64 {
        mean(self.reactions, self.count)
    }

    pub fn mean_comments(&self) -> f64 {
        mean(self.comments, self.count)
    }
}

fn mean(sum: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

// ── GroupStats ────────────────────────────────────────────────────────────────

/// Totals for one group of a grouped table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStats {
    /// Display key, e.g. `"Reel"`, `"2024-03-15"`, `"Monday"`.
    pub key: String,
    pub totals: Totals,
}

impl GroupStats {
    fn new(key: impl Into<String>, totals: Totals) -> Self {
        Self {
            key: key.into(),
            totals,
        }
    }

    pub fn posts(&self) -> u64 {
        self.totals.count
    }

    pub fn mean_engagement(&self) -> f64 {
        self.totals.mean_engagement()
    }
}

// ── ReactionSummary ───────────────────────────────────────────────────────────

/// Per-kind reaction sums over the records that carry a breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionSummary {
    pub totals: ReactionBreakdown,
    /// Number of records that contributed.
    pub posts: u64,
    /// Date span of the contributing dated records; may be narrower than the
    /// filtered data.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

// ── VideoSummary ──────────────────────────────────────────────────────────────

/// Video totals plus the most-viewed videos.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoSummary {
    pub count: usize,
    pub total_views: u64,
    pub top: Vec<VideoRecord>,
}

impl VideoSummary {
    /// Summarize `videos`, keeping the `top_n` most viewed (stable on ties).
    pub fn from_videos(videos: &[VideoRecord], top_n: usize) -> Self {
        let mut top: Vec<VideoRecord> = videos.to_vec();
        top.sort_by_key(|v| Reverse(v.views));
        top.truncate(top_n);
        Self {
            count: videos.len(),
            total_views: videos.iter().map(|v| v.views).sum(),
            top,
        }
    }
}

// ── MetricAggregator ──────────────────────────────────────────────────────────

/// Stateless helper computing every aggregate the dashboard shows.
pub struct MetricAggregator;

impl MetricAggregator {
    /// Ungrouped totals. Undated records are included.
    pub fn totals(records: &[&PostRecord]) -> Totals {
        let mut totals = Totals::default();
        for record in records {
            totals.add(record);
        }
        totals
    }

    /// One row per post type present, in [`PostType::ALL`] order.
    pub fn by_post_type(records: &[&PostRecord]) -> Vec<GroupStats> {
        let mut sums: HashMap<PostType, Totals> = HashMap::new();
        for record in records {
            sums.entry(record.post_type).or_default().add(record);
        }
        PostType::ALL
            .iter()
            .filter_map(|t| sums.get(t).map(|totals| GroupStats::new(t.as_str(), *totals)))
            .collect()
    }

    /// One row per calendar date with posts, ascending.
    pub fn by_date(records: &[&PostRecord]) -> Vec<GroupStats> {
        let mut sums: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
        for record in records {
            if let Some(date) = record.date() {
                sums.entry(date).or_default().add(record);
            }
        }
        sums.into_iter()
            .map(|(date, totals)| GroupStats::new(date.format("%Y-%m-%d").to_string(), totals))
            .collect()
    }

    /// One row per `YYYY-MM` month with posts, ascending.
    pub fn by_month(records: &[&PostRecord]) -> Vec<GroupStats> {
        let mut sums: BTreeMap<String, Totals> = BTreeMap::new();
        for record in records {
            if let Some(date) = record.date() {
                sums.entry(month_key(date)).or_default().add(record);
            }
        }
        sums.into_iter()
            .map(|(month, totals)| GroupStats::new(month, totals))
            .collect()
    }

    /// Exactly seven rows, Monday through Sunday.
    pub fn by_day_of_week(records: &[&PostRecord]) -> Vec<GroupStats> {
        let mut sums: HashMap<Weekday, Totals> = HashMap::new();
        for record in records {
            if let Some(fields) = record.temporal() {
                sums.entry(fields.day_of_week).or_default().add(record);
            }
        }
        WEEKDAYS
            .iter()
            .map(|day| {
                let totals = sums.get(day).copied().unwrap_or_default();
                GroupStats::new(weekday_name(*day), totals)
            })
            .collect()
    }

    /// Exactly four rows, Morning through Night.
    pub fn by_time_slot(records: &[&PostRecord]) -> Vec<GroupStats> {
        let mut sums: HashMap<TimeSlot, Totals> = HashMap::new();
        for record in records {
            if let Some(fields) = record.temporal() {
                sums.entry(fields.time_slot).or_default().add(record);
            }
        }
        TimeSlot::ALL
            .iter()
            .map(|slot| {
                let totals = sums.get(slot).copied().unwrap_or_default();
                GroupStats::new(slot.label(), totals)
            })
            .collect()
    }

    /// Group with the highest mean engagement among groups with posts.
    /// Ties go to the earliest group in `groups`.
    pub fn best_group(groups: &[GroupStats]) -> Option<&GroupStats> {
        let mut best: Option<&GroupStats> = None;
        for group in groups.iter().filter(|g| g.posts() > 0) {
            match best {
                Some(b) if group.mean_engagement() <= b.mean_engagement() => {}
                _ => best = Some(group),
            }
        }
        best
    }

    /// The `n` highest-engagement records. The sort is stable, so equal
    /// engagement keeps input order.
    pub fn top_posts<'a>(records: &[&'a PostRecord], n: usize) -> Vec<&'a PostRecord> {
        let mut ranked: Vec<&PostRecord> = records.to_vec();
        ranked.sort_by_key(|r| Reverse(r.engagement()));
        ranked.truncate(n);
        ranked
    }

    /// Every record, newest first; undated records go last in input order.
    pub fn newest_first<'a>(records: &[&'a PostRecord]) -> Vec<&'a PostRecord> {
        let mut sorted: Vec<&PostRecord> = records.to_vec();
        sorted.sort_by_key(|r| Reverse(r.published_at()));
        sorted
    }

    /// Reaction sums over the subset with a breakdown, or `None` when no
    /// record has one.
    pub fn reaction_summary(records: &[&PostRecord]) -> Option<ReactionSummary> {
        let mut totals = ReactionBreakdown::default();
        let mut posts = 0u64;
        let mut range: Option<(NaiveDate, NaiveDate)> = None;

        for record in records {
            let Some(breakdown) = record.reaction_breakdown.as_ref() else {
                continue;
            };
            totals.add(breakdown);
            posts += 1;
            if let Some(d) = record.date() {
                range = Some(match range {
                    None => (d, d),
                    Some((min, max)) => (min.min(d), max.max(d)),
                });
            }
        }

        (posts > 0).then_some(ReactionSummary {
            totals,
            posts,
            date_range: range,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
