//! Source reconciler: overlays API reaction detail onto the bulk dataset.
//!
//! The bulk export is authoritative for every field except the per-kind
//! reaction breakdown, which only the API carries. API ids are composite
//! (`pageId_postId`) while exports may use either the composite or the bare
//! post id, so the API side is indexed under both and the bulk id is looked
//! up exactly as written.

use std::collections::HashMap;

use insights_core::models::{PostRecord, ReactionBreakdown};
use tracing::debug;

/// Separator between page id and post id in composite identifiers.
pub const ID_SEPARATOR: char = '_';

/// Counts describing one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Bulk records that received a breakdown.
    pub matched: usize,
    /// Bulk records left without one.
    pub unmatched_bulk: usize,
    /// API records with no bulk counterpart; they are not carried over.
    pub dropped_api: usize,
}

/// Trailing segment after the last separator, or the whole id.
pub fn short_id(id: &str) -> &str {
    id.rsplit(ID_SEPARATOR).next().unwrap_or(id)
}

/// Lookup from both id conventions to the API record's breakdown.
fn breakdown_index(api: &[PostRecord]) -> HashMap<&str, (usize, ReactionBreakdown)> {
    let mut index = HashMap::with_capacity(api.len() * 2);
    for (pos, record) in api.iter().enumerate() {
        let Some(breakdown) = record.reaction_breakdown else {
            continue;
        };
        let id = record.id.as_str();
        index.insert(id, (pos, breakdown));
        index.insert(short_id(id), (pos, breakdown));
    }
    index
}

/// Produce a new collection: every bulk record, in order, with the API
/// breakdown overlaid where an id matches. Only `reaction_breakdown` is
/// taken from the API side.
pub fn reconcile(bulk: &[PostRecord], api: &[PostRecord]) -> (Vec<PostRecord>, ReconcileReport) {
    let index = breakdown_index(api);
    let mut used = vec![false; api.len()];
    let mut report = ReconcileReport::default();

    let merged: Vec<PostRecord> = bulk
        .iter()
        .map(|record| {
            match index.get(record.id.as_str()) {
                Some(&(pos, breakdown)) => {
                    used[pos] = true;
                    report.matched += 1;
                    PostRecord {
                        reaction_breakdown: Some(breakdown),
                        ..record.clone()
                    }
                }
                None => {
                    report.unmatched_bulk += 1;
                    record.clone()
                }
            }
        })
        .collect();

    report.dropped_api = used.iter().filter(|u| !**u).count();
    debug!(
        "reconciled {} bulk posts: {} matched, {} API posts outside the export",
        bulk.len(),
        report.matched,
        report.dropped_api
    );
    (merged, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_core::models::{DataSource, PostType};

    fn record(id: &str, source: DataSource) -> PostRecord {
        PostRecord {
            id: id.to_string(),
            message: String::new(),
            source_time: None,
            source,
            post_type: PostType::Photo,
            permalink: String::new(),
            reactions: 30,
            comments: 2,
            shares: 1,
            views: 900,
            reach: 700,
            clicks: 5,
            reaction_breakdown: None,
        }
    }

    fn api(id: &str, like: u64) -> PostRecord {
        PostRecord {
            reactions: 1,
            views: 0,
            reach: 0,
            reaction_breakdown: Some(ReactionBreakdown {
                like,
                ..Default::default()
            }),
            ..record(id, DataSource::Api)
        }
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("580104038511364_999"), "999");
        assert_eq!(short_id("999"), "999");
        assert_eq!(short_id("a_b_c"), "c");
    }

    #[test]
    fn test_full_id_match() {
        let bulk = vec![record("580104038511364_999", DataSource::BulkExport)];
        let (merged, report) = reconcile(&bulk, &[api("580104038511364_999", 25)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].reaction_breakdown.unwrap().like, 25);
        assert_eq!(report.matched, 1);
    }

    #[test]
    fn test_trailing_segment_match() {
        let bulk = vec![record("999", DataSource::BulkExport)];
        let (merged, report) = reconcile(&bulk, &[api("580104038511364_999", 25)]);
        assert_eq!(merged[0].reaction_breakdown.unwrap().like, 25);
        assert_eq!(report.dropped_api, 0);
    }

    #[test]
    fn test_different_pages_same_trailing_id_stay_unmatched() {
        let bulk = vec![record("111_999", DataSource::BulkExport)];
        let (merged, report) = reconcile(&bulk, &[api("222_999", 7)]);
        assert!(merged[0].reaction_breakdown.is_none());
        assert_eq!(report.matched, 0);
        assert_eq!(report.unmatched_bulk, 1);
        assert_eq!(report.dropped_api, 1);
    }

    #[test]
    fn test_only_breakdown_is_overlaid() {
        let bulk = vec![record("999", DataSource::BulkExport)];
        let (merged, _) = reconcile(&bulk, &[api("580104038511364_999", 25)]);
        let m = &merged[0];
        assert_eq!(m.source, DataSource::BulkExport);
        assert_eq!(m.reactions, 30);
        assert_eq!(m.views, 900);
        assert_eq!(m.reach, 700);
        assert_eq!(m.engagement(), 33);
    }

    #[test]
    fn test_unmatched_api_records_dropped() {
        let bulk = vec![record("1", DataSource::BulkExport)];
        let (merged, report) = reconcile(&bulk, &[api("580104038511364_999", 25)]);
        assert_eq!(merged.len(), 1);
        assert!(merged.iter().all(|r| r.id != "580104038511364_999"));
        assert!(merged[0].reaction_breakdown.is_none());
        assert_eq!(report.unmatched_bulk, 1);
        assert_eq!(report.dropped_api, 1);
    }

    #[test]
    fn test_order_preserved_and_input_untouched() {
        let bulk = vec![
            record("3", DataSource::BulkExport),
            record("1", DataSource::BulkExport),
            record("2", DataSource::BulkExport),
        ];
        let (merged, report) = reconcile(&bulk, &[api("p_1", 4)]);
        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert!(bulk.iter().all(|r| r.reaction_breakdown.is_none()));
        assert_eq!(report.matched, 1);
    }

    #[test]
    fn test_empty_sides() {
        let (merged, report) = reconcile(&[], &[api("p_1", 4)]);
        assert!(merged.is_empty());
        assert_eq!(report.dropped_api, 1);

        let bulk = vec![record("1", DataSource::BulkExport)];
        let (merged, report) = reconcile(&bulk, &[]);
        assert_eq!(merged, bulk);
        assert_eq!(report.unmatched_bulk, 1);
    }
}
