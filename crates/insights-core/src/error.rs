use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the page insights crates.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A bulk export could not be parsed as CSV.
    #[error("Failed to parse CSV export: {0}")]
    CsvParse(#[from] csv::Error),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The HTTP request to the remote API failed before a body was read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with an `error` object.
    #[error("API error: {0}")]
    Api(String),

    /// A timestamp string did not match any recognised format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A post-type, time-slot or period label could not be resolved.
    #[error("Invalid filter value: {0}")]
    InvalidFilter(String),

    /// No bulk export file was found in the exports directory.
    #[error("No CSV exports found in {0}")]
    NoExportFiles(PathBuf),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the insights crates.
pub type Result<T> = std::result::Result<T, InsightsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = InsightsError::FileRead {
            path: PathBuf::from("/exports/page.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/exports/page.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_api() {
        let err = InsightsError::Api("Invalid OAuth access token".to_string());
        assert_eq!(err.to_string(), "API error: Invalid OAuth access token");
    }

    #[test]
    fn test_error_display_timestamp_parse() {
        let err = InsightsError::TimestampParse("13/45/2024 99:99".to_string());
        assert_eq!(err.to_string(), "Invalid timestamp format: 13/45/2024 99:99");
    }

    #[test]
    fn test_error_display_invalid_filter() {
        let err = InsightsError::InvalidFilter("brunch".to_string());
        assert_eq!(err.to_string(), "Invalid filter value: brunch");
    }

    #[test]
    fn test_error_display_no_export_files() {
        let err = InsightsError::NoExportFiles(PathBuf::from("/empty/exports"));
        assert_eq!(err.to_string(), "No CSV exports found in /empty/exports");
    }

    #[test]
    fn test_error_display_config() {
        let err = InsightsError::Config("page token is empty".to_string());
        assert_eq!(err.to_string(), "Configuration error: page token is empty");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: InsightsError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: InsightsError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
