use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Name of the per-user state directory under `$HOME`.
pub const APP_DIR: &str = ".page-insights";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Root of the per-user state directory.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Ensure `~/.page-insights/` and its `logs/` subdirectory exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

/// Default log file used when `--log-file` is not given.
pub fn default_log_file() -> PathBuf {
    app_dir().join("logs").join("page-insights.log")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name onto a `tracing` filter directive.
///
/// Unknown names pass through unchanged so that full `EnvFilter` syntax
/// (e.g. `insights_data=debug`) also works.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// The terminal is owned by the dashboard, so events are appended to
/// `log_file` (or [`default_log_file`]) instead of stderr. `RUST_LOG`, when
/// set, takes precedence over `log_level`.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level_directive(log_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let path = log_file.cloned().unwrap_or_else(default_log_file);
    let file = open_log_file(&path)?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    Ok(())
}

fn open_log_file(path: &Path) -> anyhow::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── test_ensure_directories ───────────────────────────────────────────────

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        // Override HOME so that dirs::home_dir() resolves to our temp dir.
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let result = ensure_directories();
        let log_file = default_log_file();

        // Restore HOME.
        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        result.expect("ensure_directories should succeed");

        let dir = tmp.path().join(APP_DIR);
        assert!(dir.is_dir(), ".page-insights dir must exist");
        assert!(dir.join("logs").is_dir(), "logs subdir must exist");
        assert_eq!(log_file, dir.join("logs").join("page-insights.log"));
    }

    // ── test_level_directive ──────────────────────────────────────────────────

    #[test]
    fn test_level_directive_maps_cli_names() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("CRITICAL"), "error");
    }

    #[test]
    fn test_level_directive_passes_through_filter_syntax() {
        assert_eq!(level_directive("insights_data=debug"), "insights_data=debug");
    }

    // ── test_open_log_file ────────────────────────────────────────────────────

    #[test]
    fn test_open_log_file_creates_parents_and_appends() {
        use std::io::Write;

        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("nested").join("app.log");

        let mut f = open_log_file(&path).expect("open");
        writeln!(f, "first").expect("write");
        drop(f);
        let mut f = open_log_file(&path).expect("reopen");
        writeln!(f, "second").expect("write");
        drop(f);

        let content = std::fs::read_to_string(&path).expect("read");
        assert_eq!(content, "first\nsecond\n");
    }
}
