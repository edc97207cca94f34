//! User-controlled filters: time period, post type and time slot.
//!
//! Filters are applied in memory to the full cached dataset on every
//! interaction; they never take part in cache keys.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};

use crate::error::InsightsError;
use crate::models::{PostRecord, PostType};
use crate::temporal::TimeSlot;

// ── TimePeriod ────────────────────────────────────────────────────────────────

/// Time-period selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    AllTime,
    Today,
    Yesterday,
    /// The last `n` days up to and including today (`today - n ..= today`).
    LastDays(u32),
    /// Explicit inclusive range, used exactly as given.
    Custom { start: NaiveDate, end: NaiveDate },
}

impl TimePeriod {
    /// Presets offered by the period selector, in cycling order.
    pub const PRESETS: [TimePeriod; 8] = [
        TimePeriod::AllTime,
        TimePeriod::Today,
        TimePeriod::Yesterday,
        TimePeriod::LastDays(7),
        TimePeriod::LastDays(14),
        TimePeriod::LastDays(30),
        TimePeriod::LastDays(60),
        TimePeriod::LastDays(90),
    ];

    /// The preset following `self` in [`Self::PRESETS`]; custom ranges wrap
    /// back to the first preset.
    pub fn next_preset(&self) -> TimePeriod {
        let idx = Self::PRESETS.iter().position(|p| p == self);
        match idx {
            Some(i) => Self::PRESETS[(i + 1) % Self::PRESETS.len()],
            None => Self::PRESETS[0],
        }
    }

    /// Resolve to a concrete inclusive date range.
    ///
    /// `bounds` is the `(min, max)` date of the dataset. Preset ranges are
    /// clamped into it; custom ranges are not. [`TimePeriod::AllTime`]
    /// resolves to `None`, meaning "no date restriction".
    pub fn resolve(
        &self,
        today: NaiveDate,
        bounds: Option<(NaiveDate, NaiveDate)>,
    ) -> Option<(NaiveDate, NaiveDate)> {
        let (start, end) = match *self {
            TimePeriod::AllTime => return None,
            TimePeriod::Custom { start, end } => return Some((start, end)),
            TimePeriod::Today => (today, today),
            TimePeriod::Yesterday => {
                let y = days_before(today, 1);
                (y, y)
            }
            TimePeriod::LastDays(n) => (days_before(today, n), today),
        };
        match bounds {
            Some((min, max)) => Some((start.max(min), end.min(max))),
            None => Some((start, end)),
        }
    }

    pub fn label(&self) -> String {
        match self {
            TimePeriod::AllTime => "All Time".to_string(),
            TimePeriod::Today => "Today".to_string(),
            TimePeriod::Yesterday => "Yesterday".to_string(),
            TimePeriod::LastDays(n) => format!("Last {} Days", n),
            TimePeriod::Custom { start, end } => format!("{} to {}", start, end),
        }
    }
}

/// `today - n` days, saturating at the earliest representable date.
fn days_before(today: NaiveDate, n: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(n)))
        .unwrap_or(NaiveDate::MIN)
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for TimePeriod {
    type Err = InsightsError;

    /// Accepts `all`, `today`, `yesterday` and `<n>d` (e.g. `30d`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        match lowered.as_str() {
            "all" | "all-time" => Ok(TimePeriod::AllTime),
            "today" => Ok(TimePeriod::Today),
            "yesterday" => Ok(TimePeriod::Yesterday),
            other => other
                .strip_suffix('d')
                .and_then(|n| n.parse::<u32>().ok())
                .map(TimePeriod::LastDays)
                .ok_or_else(|| InsightsError::InvalidFilter(s.to_string())),
        }
    }
}

/// Inverse of [`TimePeriod::from_str`] for presets. Custom ranges have no
/// short form and yield `None`.
pub fn period_key(period: &TimePeriod) -> Option<String> {
    match period {
        TimePeriod::AllTime => Some("all".to_string()),
        TimePeriod::Today => Some("today".to_string()),
        TimePeriod::Yesterday => Some("yesterday".to_string()),
        TimePeriod::LastDays(n) => Some(format!("{}d", n)),
        TimePeriod::Custom { .. } => None,
    }
}

// ── Filters ───────────────────────────────────────────────────────────────────

/// The complete filter state of one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub period: TimePeriod,
    /// `None` means all post types.
    pub post_type: Option<PostType>,
    /// `None` means all time slots.
    pub time_slot: Option<TimeSlot>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            period: TimePeriod::AllTime,
            post_type: None,
            time_slot: None,
        }
    }
}

impl Filters {
    /// Apply the filters to `records`, preserving their order.
    ///
    /// Undated records survive only when there is neither a date restriction
    /// nor a time-slot filter; they then count towards ungrouped totals.
    pub fn apply<'a>(&self, records: &'a [PostRecord], today: NaiveDate) -> Vec<&'a PostRecord> {
        let range = self.period.resolve(today, date_bounds(records));

        records
            .iter()
            .filter(|r| self.post_type.map_or(true, |t| r.post_type == t))
            .filter(|r| {
                let needs_date = range.is_some() || self.time_slot.is_some();
                let Some(fields) = r.temporal() else {
                    return !needs_date;
                };
                let in_range = range
                    .map(|(start, end)| fields.date >= start && fields.date <= end)
                    .unwrap_or(true);
                let in_slot = self.time_slot.map_or(true, |s| fields.time_slot == s);
                in_range && in_slot
            })
            .collect()
    }

    /// The resolved date range shown next to the filter controls.
    pub fn describe_range(&self, records: &[PostRecord], today: NaiveDate) -> String {
        let bounds = date_bounds(records);
        match self.period.resolve(today, bounds).or(bounds) {
            Some((start, end)) => format!("{} to {}", start, end),
            None => "no dated posts".to_string(),
        }
    }

    /// Advance the post-type selector: All → Photo → … → Other → All.
    pub fn cycle_post_type(&mut self) {
        self.post_type = cycle(&PostType::ALL, self.post_type);
    }

    /// Advance the time-slot selector: All → Morning → … → Night → All.
    pub fn cycle_time_slot(&mut self) {
        self.time_slot = cycle(&TimeSlot::ALL, self.time_slot);
    }

    /// Advance the time-period selector through the presets.
    pub fn cycle_period(&mut self) {
        self.period = self.period.next_preset();
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: Option<T>) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(c) => {
            let idx = all.iter().position(|x| *x == c)?;
            all.get(idx + 1).copied()
        }
    }
}

/// `(min, max)` display date across dated records.
pub fn date_bounds(records: &[PostRecord]) -> Option<(NaiveDate, NaiveDate)> {
    records.iter().filter_map(PostRecord::date).fold(None, |acc, d| match acc {
        None => Some((d, d)),
        Some((min, max)) => Some((min.min(d), max.max(d))),
    })
}
