//! Logging setup
//!
//! Console output through tracing-subscriber, optionally JSON, plus an
//! optional non-blocking log file. Everything is chosen from the environment:
//!
//! - `VR_VIEWER_LOG`: filter directives (falls back to `RUST_LOG`, then `info`)
//! - `VR_VIEWER_LOG_FORMAT=json`: JSON console records
//! - `VR_VIEWER_LOG_FILE=<path>`: also write plain records to a file

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

pub const LOG_FILTER_ENV: &str = "VR_VIEWER_LOG";
pub const LOG_FORMAT_ENV: &str = "VR_VIEWER_LOG_FORMAT";
pub const LOG_FILE_ENV: &str = "VR_VIEWER_LOG_FILE";

/// Where and how log records are written
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub json: bool,
    pub file: Option<PathBuf>,
    /// Filter used when neither `VR_VIEWER_LOG` nor `RUST_LOG` is set
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json: false,
            file: None,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Build from the given variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            json: lookup(LOG_FORMAT_ENV).is_some_and(|v| v.eq_ignore_ascii_case("json")),
            file: lookup(LOG_FILE_ENV).filter(|p| !p.is_empty()).map(PathBuf::from),
            ..Self::default()
        }
    }

    /// Build from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Install the global subscriber
///
/// Keep the returned guard alive until exit so buffered file records are
/// flushed. Records from the `log` facade (wgpu, winit) go through the same
/// subscriber.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(std::fs::File::create(path)?);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let json_layer = config.json.then(|| fmt::layer().json().with_thread_ids(true));
    let compact_layer = (!config.json).then(|| fmt::layer().with_target(true).compact());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(compact_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        target: "vr_viewer",
        version = env!("CARGO_PKG_VERSION"),
        json = config.json,
        file = ?config.file,
        "Logging initialized"
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_environment() {
        let config = LogConfig::from_lookup(|_| None);
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.default_level, "info");
    }

    #[test]
    fn test_environment_selects_json_and_file() {
        let config = LogConfig::from_lookup(|key| match key {
            LOG_FORMAT_ENV => Some("JSON".to_string()),
            LOG_FILE_ENV => Some("/tmp/vr_viewer.log".to_string()),
            _ => None,
        });
        assert!(config.json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/vr_viewer.log")));

        let config = LogConfig::from_lookup(|key| (key == LOG_FORMAT_ENV).then(|| "pretty".to_string()));
        assert!(!config.json);
    }

    #[test]
    fn test_empty_file_variable_is_ignored() {
        let config = LogConfig::from_lookup(|key| (key == LOG_FILE_ENV).then(String::new));
        assert_eq!(config.file, None);
    }
}
