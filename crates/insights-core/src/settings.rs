use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::error::{InsightsError, Result};
use crate::filters::{Filters, TimePeriod};
use crate::models::PostType;
use crate::temporal::TimeSlot;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Terminal dashboard for page post and video performance
#[derive(Parser, Debug, Clone)]
#[command(
    name = "page-insights",
    about = "Terminal dashboard for page post and video performance",
    version
)]
pub struct Settings {
    /// Directory holding bulk CSV exports
    #[arg(long, default_value = "exports")]
    pub exports_dir: PathBuf,

    /// Directory holding cached API snapshots (page_info.json, posts.json, videos.json)
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Credentials file (TOML, `[graph]` table)
    #[arg(long, default_value = "insights.toml")]
    pub config: PathBuf,

    /// Time period: all, today, yesterday, or <n>d (e.g. 30d)
    #[arg(long, default_value = "all")]
    pub period: String,

    /// Custom range start (YYYY-MM-DD); overrides --period together with --to
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Custom range end (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Post type filter
    #[arg(long, default_value = "all", value_parser = ["all", "photo", "video", "reel", "live", "text", "other"])]
    pub post_type: String,

    /// Time slot filter
    #[arg(long, default_value = "all", value_parser = ["all", "morning", "afternoon", "evening", "night"])]
    pub time_slot: String,

    /// Initial view
    #[arg(long, default_value = "overview", value_parser = ["overview", "posts", "timing", "videos"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "auto"])]
    pub theme: String,

    /// Timezone used for "today" in period presets (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Number of posts in the top-posts table
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub top_posts: u32,

    /// Number of videos in the top-videos table
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub top_videos: u32,

    /// Cache lifetime in seconds for exports and snapshot files
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub cache_ttl: u64,

    /// Cache lifetime in seconds for live API responses
    #[arg(long, default_value = "300", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub api_ttl: u64,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.page-insights/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.page-insights/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".page-insights").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                warn!("could not clear {}: {}", config_path.display(), e);
            }
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // clap keys args by field name (underscores), not flag spelling.
        if !is_arg_explicitly_set(&matches, "period") {
            if let Some(v) = last.period {
                settings.period = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "post_type") {
            if let Some(v) = last.post_type {
                settings.post_type = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "time_slot") {
            if let Some(v) = last.time_slot {
                settings.time_slot = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            warn!("could not save {}: {}", config_path.display(), e);
        }

        settings
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::temporal::get_system_timezone();
        } else if !crate::temporal::validate_timezone(&settings.timezone) {
            warn!(
                "unrecognised timezone \"{}\", using the system timezone",
                settings.timezone
            );
            settings.timezone = crate::temporal::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// Build the initial filter state from the parsed flags.
    ///
    /// `--from`/`--to` together form a custom range; otherwise `--period` is
    /// parsed as a preset.
    pub fn initial_filters(&self) -> Result<Filters> {
        let period = match (self.from, self.to) {
            (Some(start), Some(end)) if start <= end => TimePeriod::Custom { start, end },
            (Some(start), Some(end)) => {
                return Err(InsightsError::InvalidFilter(format!(
                    "--from {} is after --to {}",
                    start, end
                )))
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(InsightsError::InvalidFilter(
                    "--from and --to must be given together".to_string(),
                ))
            }
            (None, None) => self.period.parse()?,
        };

        let post_type = match self.post_type.as_str() {
            "all" => None,
            other => Some(other.parse::<PostType>()?),
        };
        let time_slot = match self.time_slot.as_str() {
            "all" => None,
            other => Some(other.parse::<TimeSlot>()?),
        };

        Ok(Filters {
            period,
            post_type,
            time_slot,
        })
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            period: Some(s.period.clone()),
            post_type: Some(s.post_type.clone()),
            time_slot: Some(s.time_slot.clone()),
            view: Some(s.view.clone()),
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
