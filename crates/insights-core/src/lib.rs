//! Core domain layer for Page Insights.
//!
//! Canonical post, video and page models, the closed post-type mapping,
//! temporal enrichment, value coercion for loosely typed source fields,
//! user filters, formatting helpers, CLI settings and credential resolution.

pub mod credentials;
pub mod data_processors;
pub mod error;
pub mod filters;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod temporal;
