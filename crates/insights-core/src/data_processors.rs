use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// Origin used to absolutize relative permalinks returned by the API.
pub const PERMALINK_ORIGIN: &str = "https://www.facebook.com";

/// Publish-time layout used by the bulk export, e.g. `03/15/2024 14:05`.
pub const EXPORT_TIME_FORMAT: &str = "%m/%d/%Y %H:%M";

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses the timestamp layouts produced by the two upstream sources.
///
/// Results are naive: they carry the time exactly as the source reported it.
/// The source offset is applied later, at read time, by the temporal layer.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Parse a bulk-export publish time (`MM/DD/YYYY HH:MM`).
    pub fn parse_export(s: &str) -> Option<NaiveDateTime> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        match NaiveDateTime::parse_from_str(trimmed, EXPORT_TIME_FORMAT) {
            Ok(ts) => Some(ts),
            Err(e) => {
                debug!("unparseable export publish time {:?}: {}", trimmed, e);
                None
            }
        }
    }

    /// Parse an API `created_time` into a naive UTC time.
    ///
    /// Handles:
    /// * Graph style offsets without a colon (`2024-03-01T12:00:00+0000`)
    /// * RFC 3339 (`2024-03-01T12:00:00Z`, `...+08:00`)
    /// * offset-less ISO layouts, taken as UTC
    pub fn parse_api(s: &str) -> Option<NaiveDateTime> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%z") {
            return Some(dt.with_timezone(&Utc).naive_utc());
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(dt.with_timezone(&Utc).naive_utc());
        }

        const FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S",
        ];
        for fmt in FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Some(naive);
            }
        }

        debug!("unparseable API timestamp {:?}", trimmed);
        None
    }

    /// Parse a JSON value holding an API timestamp string.
    pub fn parse_api_value(value: Option<&Value>) -> Option<NaiveDateTime> {
        value.and_then(Value::as_str).and_then(Self::parse_api)
    }
}

// ── CountParser ───────────────────────────────────────────────────────────────

/// Coerces loosely typed counter values into non-negative integers.
///
/// Anything that cannot be read as a number becomes `0`; negative values are
/// clamped to `0`; fractional values are truncated.
pub struct CountParser;

impl CountParser {
    /// Coerce a CSV cell.
    pub fn parse_str(s: &str) -> u64 {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return 0;
        }
        if let Ok(n) = trimmed.parse::<u64>() {
            return n;
        }
        match trimmed.parse::<f64>() {
            Ok(f) => Self::from_f64(f),
            Err(_) => 0,
        }
    }

    /// Coerce a JSON value (number or numeric string).
    pub fn from_value(value: &Value) -> u64 {
        match value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    u
                } else {
                    n.as_f64().map(Self::from_f64).unwrap_or(0)
                }
            }
            Value::String(s) => Self::parse_str(s),
            _ => 0,
        }
    }

    fn from_f64(f: f64) -> u64 {
        if f.is_finite() && f > 0.0 {
            f.trunc() as u64
        } else {
            0
        }
    }
}

// ── SummaryExtractor ──────────────────────────────────────────────────────────

/// Reads counters from API post objects.
///
/// The live API nests totals in summary sub-objects
/// (`{"comments": {"summary": {"total_count": 4}}}`, `{"shares": {"count": 2}}`)
/// while snapshot files written by a previous fetch store them flat
/// (`{"comments": 4}`). Both shapes yield the same number; an absent key
/// yields `0`.
pub struct SummaryExtractor;

impl SummaryExtractor {
    /// Total from `obj[key].summary.total_count`, or a flat `obj[key]`.
    pub fn total_count(obj: &Value, key: &str) -> u64 {
        match obj.get(key) {
            Some(Value::Object(inner)) => inner
                .get("summary")
                .and_then(|s| s.get("total_count"))
                .map(CountParser::from_value)
                .unwrap_or(0),
            Some(flat) => CountParser::from_value(flat),
            None => 0,
        }
    }

    /// Share count from `obj.shares.count`, or a flat `obj.shares`.
    pub fn share_count(obj: &Value) -> u64 {
        match obj.get("shares") {
            Some(Value::Object(inner)) => inner
                .get("count")
                .map(CountParser::from_value)
                .unwrap_or(0),
            Some(flat) => CountParser::from_value(flat),
            None => 0,
        }
    }
}

// ── Text helpers ──────────────────────────────────────────────────────────────

/// Keep at most `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Rewrite a site-relative link (`/reel/123`) into an absolute URL.
///
/// Absolute and empty links are returned unchanged.
pub fn absolutize_permalink(link: &str) -> String {
    let trimmed = link.trim();
    if trimmed.starts_with('/') {
        format!("{}{}", PERMALINK_ORIGIN, trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    // ── TimestampProcessor ────────────────────────────────────────────────────

    #[test]
    fn test_parse_export_time() {
        assert_eq!(
            TimestampProcessor::parse_export("03/15/2024 14:05"),
            Some(at(2024, 3, 15, 14, 5))
        );
        assert_eq!(
            TimestampProcessor::parse_export(" 1/2/2024 9:07 "),
            Some(at(2024, 1, 2, 9, 7))
        );
    }

    #[test]
    fn test_parse_export_time_invalid() {
        assert!(TimestampProcessor::parse_export("").is_none());
        assert!(TimestampProcessor::parse_export("2024-03-15 14:05").is_none());
        assert!(TimestampProcessor::parse_export("13/45/2024 99:99").is_none());
    }

    #[test]
    fn test_parse_api_graph_offset() {
        assert_eq!(
            TimestampProcessor::parse_api("2024-03-01T12:00:00+0000"),
            Some(at(2024, 3, 1, 12, 0))
        );
        assert_eq!(
            TimestampProcessor::parse_api("2024-03-01T12:00:00+0800"),
            Some(at(2024, 3, 1, 4, 0))
        );
    }

    #[test]
    fn test_parse_api_rfc3339_and_naive() {
        assert_eq!(
            TimestampProcessor::parse_api("2024-03-01T12:00:00Z"),
            Some(at(2024, 3, 1, 12, 0))
        );
        assert_eq!(
            TimestampProcessor::parse_api("2024-03-01T12:00:00"),
            Some(at(2024, 3, 1, 12, 0))
        );
        assert!(TimestampProcessor::parse_api("yesterday").is_none());
    }

    #[test]
    fn test_parse_api_value_non_string() {
        assert!(TimestampProcessor::parse_api_value(Some(&json!(12))).is_none());
        assert!(TimestampProcessor::parse_api_value(None).is_none());
    }

    // ── CountParser ───────────────────────────────────────────────────────────

    #[test]
    fn test_count_parser_str() {
        assert_eq!(CountParser::parse_str("42"), 42);
        assert_eq!(CountParser::parse_str(" 7 "), 7);
        assert_eq!(CountParser::parse_str("12.9"), 12);
        assert_eq!(CountParser::parse_str(""), 0);
        assert_eq!(CountParser::parse_str("n/a"), 0);
        assert_eq!(CountParser::parse_str("-5"), 0);
        assert_eq!(CountParser::parse_str("NaN"), 0);
    }

    #[test]
    fn test_count_parser_value() {
        assert_eq!(CountParser::from_value(&json!(9)), 9);
        assert_eq!(CountParser::from_value(&json!(-3)), 0);
        assert_eq!(CountParser::from_value(&json!(2.5)), 2);
        assert_eq!(CountParser::from_value(&json!("15")), 15);
        assert_eq!(CountParser::from_value(&json!(null)), 0);
        assert_eq!(CountParser::from_value(&json!({"a": 1})), 0);
    }

    // ── SummaryExtractor ──────────────────────────────────────────────────────

    #[test]
    fn test_summary_nested_and_flat_agree() {
        let nested = json!({"love": {"data": [], "summary": {"total_count": 8}}});
        let flat = json!({"love": 8});
        assert_eq!(SummaryExtractor::total_count(&nested, "love"), 8);
        assert_eq!(SummaryExtractor::total_count(&flat, "love"), 8);
    }

    #[test]
    fn test_summary_missing_defaults_to_zero() {
        let post = json!({"comments": {"data": []}});
        assert_eq!(SummaryExtractor::total_count(&post, "comments"), 0);
        assert_eq!(SummaryExtractor::total_count(&post, "wow"), 0);
    }

    #[test]
    fn test_share_count_shapes() {
        assert_eq!(SummaryExtractor::share_count(&json!({"shares": {"count": 3}})), 3);
        assert_eq!(SummaryExtractor::share_count(&json!({"shares": 3})), 3);
        assert_eq!(SummaryExtractor::share_count(&json!({})), 0);
    }

    // ── text helpers ──────────────────────────────────────────────────────────

    #[test]
    fn test_truncate_chars_is_char_aware() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_absolutize_permalink() {
        assert_eq!(
            absolutize_permalink("/reel/123"),
            "https://www.facebook.com/reel/123"
        );
        assert_eq!(
            absolutize_permalink("https://www.facebook.com/1/posts/2"),
            "https://www.facebook.com/1/posts/2"
        );
        assert_eq!(absolutize_permalink(""), "");
    }

    #[test]
    fn test_absolutize_is_idempotent() {
        let once = absolutize_permalink("/videos/9");
        assert_eq!(absolutize_permalink(&once), once);
    }
}
