//! Temporal enrichment: source offsets, calendar buckets and time slots.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::InsightsError;
use crate::models::DataSource;

// ── Source offsets ────────────────────────────────────────────────────────────

/// Hours added to bulk-export publish times to reach display time.
pub const CSV_SOURCE_OFFSET_HOURS: i64 = 16;

/// Hours added to API `created_time` values (UTC) to reach display time.
///
/// Differs from [`CSV_SOURCE_OFFSET_HOURS`] because the two upstream systems
/// report in different zones. Both are kept as reported; nothing reconciles
/// them into a single offset.
pub const API_SOURCE_OFFSET_HOURS: i64 = 8;

/// Shift a source-reported time into display time using the source's fixed
/// offset.
pub fn to_display_time(source_time: NaiveDateTime, source: DataSource) -> NaiveDateTime {
    source_time + Duration::hours(source.offset_hours())
}

// ── Weekdays ──────────────────────────────────────────────────────────────────

/// Monday-first week order used by every day-of-week table.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── TimeSlot ──────────────────────────────────────────────────────────────────

/// Four fixed buckets of the 24-hour day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeSlot {
    /// `[6, 12)`
    Morning,
    /// `[12, 18)`
    Afternoon,
    /// `[18, 22)`
    Evening,
    /// `[22, 24) ∪ [0, 6)`
    Night,
}

impl TimeSlot {
    /// Morning → Afternoon → Evening → Night.
    pub const ALL: [TimeSlot; 4] = [
        TimeSlot::Morning,
        TimeSlot::Afternoon,
        TimeSlot::Evening,
        TimeSlot::Night,
    ];

    /// Half-open, lower-bound-inclusive step function over the hour.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeSlot::Morning,
            12..=17 => TimeSlot::Afternoon,
            18..=21 => TimeSlot::Evening,
            _ => TimeSlot::Night,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "Morning",
            TimeSlot::Afternoon => "Afternoon",
            TimeSlot::Evening => "Evening",
            TimeSlot::Night => "Night",
        }
    }

    /// Name plus the hour range, e.g. `"Evening (6PM-10PM)"`.
    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "Morning (6AM-12PM)",
            TimeSlot::Afternoon => "Afternoon (12PM-6PM)",
            TimeSlot::Evening => "Evening (6PM-10PM)",
            TimeSlot::Night => "Night (10PM-6AM)",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeSlot {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSlot::ALL
            .into_iter()
            .find(|slot| slot.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InsightsError::InvalidFilter(s.to_string()))
    }
}

// ── TemporalFields ────────────────────────────────────────────────────────────

/// Calendar and time-of-day buckets for one display-time timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalFields {
    pub date: NaiveDate,
    /// 0–23.
    pub hour: u32,
    pub day_of_week: Weekday,
    /// Year-month bucket key, e.g. `"2024-03"`.
    pub month: String,
    pub time_slot: TimeSlot,
}

impl TemporalFields {
    /// Derive every bucket from a timestamp that is already in display time.
    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        let hour = ts.hour();
        Self {
            date: ts.date(),
            hour,
            day_of_week: ts.weekday(),
            month: month_key(ts.date()),
            time_slot: TimeSlot::from_hour(hour),
        }
    }

    /// Full weekday name of [`Self::day_of_week`].
    pub fn day_name(&self) -> &'static str {
        weekday_name(self.day_of_week)
    }
}

/// `"%Y-%m"` bucket key for a date.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ── Display timezone ──────────────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Parse an IANA timezone name, falling back to UTC with a warning.
pub fn resolve_timezone(tz_name: &str) -> Tz {
    tz_name.parse::<Tz>().unwrap_or_else(|_| {
        warn!(
            "unrecognised timezone \"{}\", falling back to UTC",
            tz_name
        );
        Tz::UTC
    })
}

/// Validate that `tz_name` is a recognised IANA timezone identifier.
pub fn validate_timezone(tz_name: &str) -> bool {
    tz_name.parse::<Tz>().is_ok()
}

/// Today's calendar date in `tz`, used to anchor time-period presets.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}
