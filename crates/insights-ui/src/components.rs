//! Reusable dashboard widgets.

pub mod bar_chart;
pub mod header;
pub mod kpi;
