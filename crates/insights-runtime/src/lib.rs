//! Runtime layer for Page Insights.
//!
//! Owns the TTL-cached source loader and turns the cached dataset plus the
//! current filters into a renderable [`dashboard::DashboardView`].

pub mod cache;
pub mod dashboard;
pub mod data_manager;

pub use insights_core as core;
pub use insights_data as data;
