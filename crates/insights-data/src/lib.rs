//! Data ingestion layer for Page Insights.
//!
//! Responsible for discovering and reading bulk CSV exports, reading cached
//! API snapshots, fetching from the Graph API, normalizing every source into
//! canonical records, reconciling the two post sources and computing the
//! aggregates shown by the dashboard.

pub mod aggregator;
pub mod exports;
pub mod graph_api;
pub mod normalizer;
pub mod pipeline;
pub mod reconciler;
pub mod snapshots;

pub use insights_core as core;
