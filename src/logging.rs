//! Logging System
//!
//! Structured logging built on the `tracing` crate, with configurable level,
//! format, and destination. Environment variables (`RAPPORT_LOG`,
//! `RAPPORT_LOG_FORMAT`, `RAPPORT_LOG_OUTPUT`, `RAPPORT_LOG_FILE`) override
//! the configuration file.

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file, file+stderr
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output includes file; None means use the platform
    /// state directory
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format, stdout/stderr only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Resolve the log file path with precedence: config file entry,
/// `RAPPORT_LOG_FILE` env, platform state directory default.
pub fn resolve_log_file_path(config_file: Option<PathBuf>) -> Result<PathBuf, TrackerError> {
    if let Ok(env_path) = std::env::var("RAPPORT_LOG_FILE") {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    if let Some(path) = config_file {
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }
    let project_dirs = directories::ProjectDirs::from("", "rapport", "rapport").ok_or_else(|| {
        TrackerError::ConfigError(
            "Could not determine platform state directory for log file".to_string(),
        )
    })?;
    let state_dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_dir())
        .to_path_buf();
    Ok(state_dir.join("rapport.log"))
}

/// Initialize the logging system.
///
/// Precedence, highest to lowest: environment variables, configuration,
/// defaults. Safe to call when a global subscriber is already installed; the
/// second call reports a `ConfigError`.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), TrackerError> {
    let disabled = config.map(|c| !c.enabled).unwrap_or(false);
    if disabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .try_init()
            .map_err(|e| TrackerError::ConfigError(format!("Failed to init logging: {}", e)))?;
        return Ok(());
    }

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;
    let use_color = config.map(|c| c.color).unwrap_or(true);

    let open_log_file = || -> Result<std::fs::File, TrackerError> {
        let path = resolve_log_file_path(config.and_then(|c| c.file.clone()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TrackerError::ConfigError(format!("Failed to create log directory: {}", e))
            })?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                TrackerError::ConfigError(format!("Failed to open log file {:?}: {}", path, e))
            })
    };

    let json = format == "json";
    let base = Registry::default().with(filter);
    let result = match output {
        Output::Stdout if json => base
            .with(json_layer().with_writer(std::io::stdout))
            .try_init(),
        Output::Stdout => base
            .with(text_layer(use_color).with_writer(std::io::stdout))
            .try_init(),
        Output::Stderr if json => base
            .with(json_layer().with_writer(std::io::stderr))
            .try_init(),
        Output::Stderr => base
            .with(text_layer(use_color).with_writer(std::io::stderr))
            .try_init(),
        Output::File if json => base
            .with(json_layer().with_writer(open_log_file()?))
            .try_init(),
        Output::File => base
            .with(text_layer(false).with_writer(open_log_file()?))
            .try_init(),
        Output::FileAndStderr if json => base
            .with(json_layer().with_writer(open_log_file()?.and(std::io::stderr)))
            .try_init(),
        Output::FileAndStderr => base
            .with(text_layer(false).with_writer(open_log_file()?.and(std::io::stderr)))
            .try_init(),
    };
    result.map_err(|e| TrackerError::ConfigError(format!("Failed to init logging: {}", e)))
}

fn json_layer<S>() -> fmt::Layer<S, fmt::format::JsonFields, fmt::format::Format<fmt::format::Json, ChronoUtc>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
}

fn text_layer<S>(color: bool) -> fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format<fmt::format::Full, ChronoUtc>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(color)
}

/// Build environment filter from config or the `RAPPORT_LOG` variable
fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, TrackerError> {
    if let Ok(filter) = EnvFilter::try_from_env("RAPPORT_LOG") {
        return Ok(filter);
    }

    let level = config.map(|c| c.level.as_str()).unwrap_or("info");
    let mut filter = EnvFilter::new(level);

    if let Some(config) = config {
        for (module, module_level) in &config.modules {
            let directive = format!("{}={}", module, module_level);
            filter = filter.add_directive(directive.parse().map_err(|e| {
                TrackerError::ConfigError(format!("Invalid log directive: {}", e))
            })?);
        }
    }

    Ok(filter)
}

fn determine_format(config: Option<&LoggingConfig>) -> Result<String, TrackerError> {
    if let Ok(format) = std::env::var("RAPPORT_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    if format != "json" && format != "text" {
        return Err(TrackerError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }
    Ok(format.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
    File,
    FileAndStderr,
}

fn determine_output(config: Option<&LoggingConfig>) -> Result<Output, TrackerError> {
    let from_env = std::env::var("RAPPORT_LOG_OUTPUT").ok();
    let output = from_env
        .as_deref()
        .or(config.map(|c| c.output.as_str()))
        .unwrap_or("stderr");
    match output {
        "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        "file" => Ok(Output::File),
        "file+stderr" => Ok(Output::FileAndStderr),
        other => Err(TrackerError::ConfigError(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr', 'file', or 'file+stderr')",
            other
        ))),
    }
}
