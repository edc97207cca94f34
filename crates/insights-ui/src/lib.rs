//! Terminal UI layer for Page Insights.
//!
//! Provides themes, header, bar chart and KPI components, grouped and post
//! tables, the tabbed dashboard screen, and the main application event loop
//! built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod dashboard_view;
pub mod table_view;
pub mod themes;

pub use insights_core as core;
