use crate::logging::{LogConfig, LogFormat, LogOutput};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "WSL_ADAPTER_CONFIG";
pub const CONFIG_FILE: &str = ".wsl-adapter.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Name or absolute path of the WSL API library
    #[serde(default = "default_wslapi")]
    pub wslapi: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormatName,

    #[serde(default)]
    pub output: LogOutputName,

    #[serde(default = "default_directory")]
    pub directory: String,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub span_events: bool,

    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatName {
    Pretty,
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutputName {
    Stdout,
    #[default]
    Stderr,
    File,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            wslapi: default_wslapi(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormatName::default(),
            output: LogOutputName::default(),
            directory: default_directory(),
            prefix: default_prefix(),
            span_events: false,
            filter: None,
        }
    }
}

fn default_wslapi() -> String { "wslapi.dll".to_string() }
fn default_level() -> String { "info".to_string() }
fn default_directory() -> String { "logs".to_string() }
fn default_prefix() -> String { "wsl-adapter".to_string() }

impl LoggingConfig {
    /// Parsed level; unknown names fall back to INFO
    pub fn level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }

    pub fn to_log_config(&self) -> LogConfig {
        let format = match self.format {
            LogFormatName::Pretty => LogFormat::Pretty,
            LogFormatName::Compact => LogFormat::Compact,
            LogFormatName::Json => LogFormat::Json,
        };
        let output = match self.output {
            LogOutputName::Stdout => LogOutput::Stdout,
            LogOutputName::Stderr => LogOutput::Stderr,
            LogOutputName::File => LogOutput::File {
                directory: self.directory.clone(),
                prefix: self.prefix.clone(),
            },
        };

        LogConfig {
            level: self.level(),
            format,
            output,
            span_events: self.span_events,
            filter: self.filter.clone(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Failed to read config {}: {}", path.display(), source)
            }
            Self::Parse(err) => write!(f, "Failed to parse config: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl AdapterConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Find configuration: `$WSL_ADAPTER_CONFIG`, then `.wsl-adapter.toml` in
    /// the current directory or any parent, then defaults
    ///
    /// Files that fail to load are skipped with a warning.
    pub fn discover() -> Self {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            match Self::load(Path::new(&path)) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(error = %e, "ignoring {}", CONFIG_ENV),
            }
        }

        match std::env::current_dir() {
            Ok(dir) => Self::discover_from(&dir),
            Err(_) => Self::default(),
        }
    }

    /// Walk from `start` up to the filesystem root looking for a config file
    pub fn discover_from(start: &Path) -> Self {
        let mut current = Some(start);

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "configuration loaded");
                        return config;
                    }
                    Err(e) => tracing::warn!(error = %e, "skipping config file"),
                }
            }

            current = dir.parent();
        }

        Self::default()
    }
}
