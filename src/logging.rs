//! Logging for the adapter
//!
//! The library only emits `tracing` events; it never installs a subscriber on
//! its own. Applications that want output call [`init_logging`] (or one of the
//! presets) once at startup.

use std::path::Path;
use tracing::Level;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{InitError, RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use tracing::{debug, trace};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with timestamps
    Pretty,
    /// Compact format for production
    Compact,
    /// JSON format for structured logging
    Json,
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// File with daily rotation
    File { directory: String, prefix: String },
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Whether to include span open/close events
    pub span_events: bool,
    /// Extra filter directives (e.g., "wsl_adapter=trace")
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Why the global subscriber could not be installed
#[derive(Debug)]
pub enum LogInitError {
    /// The rolling file appender could not be created (e.g. the log directory
    /// could not be made)
    Appender(InitError),
    /// Another subscriber is already the global default
    AlreadyInitialized,
}

impl std::fmt::Display for LogInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Appender(e) => write!(f, "Failed to create log file appender: {}", e),
            Self::AlreadyInitialized => write!(f, "A global subscriber is already installed"),
        }
    }
}

impl std::error::Error for LogInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Appender(e) => Some(e),
            Self::AlreadyInitialized => None,
        }
    }
}

/// Install the global subscriber
///
/// Returns the appender's `WorkerGuard`; keep it alive until shutdown so
/// buffered events are flushed.
pub fn init_logging(config: LogConfig) -> Result<WorkerGuard, LogInitError> {
    let filter = build_filter(&config);

    let (writer, guard) = match &config.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogOutput::File { directory, prefix } => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(prefix.as_str())
                .build(directory)
                .map_err(LogInitError::Appender)?;
            tracing_appender::non_blocking(appender)
        }
    };
    let writer = BoxMakeWriter::new(writer);

    let base = fmt::layer()
        .with_writer(writer)
        .with_span_events(span_events_config(config.span_events));

    let layer = match config.format {
        LogFormat::Pretty => base.pretty().with_filter(filter).boxed(),
        LogFormat::Compact => base.compact().with_filter(filter).boxed(),
        LogFormat::Json => base.json().with_filter(filter).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|_| LogInitError::AlreadyInitialized)?;

    Ok(guard)
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base_filter = EnvFilter::from_default_env().add_directive(config.level.into());

    match &config.filter {
        Some(filter_str) => filter_str.split(',').fold(base_filter, |filter, directive| {
            filter.add_directive(directive.parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid filter directive: {}", directive);
                config.level.into()
            }))
        }),
        None => base_filter,
    }
}

fn span_events_config(enabled: bool) -> FmtSpan {
    if enabled {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

/// Verbose stderr logging for development
pub fn init_dev_logging() -> Result<WorkerGuard, LogInitError> {
    init_logging(LogConfig {
        level: Level::DEBUG,
        format: LogFormat::Pretty,
        output: LogOutput::Stderr,
        span_events: true,
        filter: Some("wsl_adapter=trace".to_string()),
    })
}

/// JSON file logging for production
pub fn init_prod_logging(log_dir: impl AsRef<Path>) -> Result<WorkerGuard, LogInitError> {
    init_logging(LogConfig {
        level: Level::INFO,
        format: LogFormat::Json,
        output: LogOutput::File {
            directory: log_dir.as_ref().to_string_lossy().to_string(),
            prefix: "wsl-adapter".to_string(),
        },
        span_events: false,
        filter: Some("wsl_adapter=info".to_string()),
    })
}

/// Log a native call about to be made
#[inline]
pub fn log_native_call(function: &'static str) {
    trace!(target: "native", function, "native call");
}

/// Log a native call's status
#[inline]
pub fn log_native_return(function: &'static str, code: i32) {
    trace!(
        target: "native",
        function,
        code = %crate::error::HResult(code),
        success = code >= 0,
        "native return"
    );
}

/// Log a native failure handed back to the caller
#[inline]
pub fn log_native_error(function: &'static str, error: &dyn std::fmt::Display) {
    debug!(target: "native", function, error = %error, "native call failed");
}

/// Log an argument rejected before reaching the native side
#[inline]
pub fn log_encoding_error(function: &'static str, error: &dyn std::fmt::Display) {
    debug!(target: "marshal", function, error = %error, "argument rejected");
}

/// Log release of native-allocated memory
#[inline]
pub fn log_release(ptr: *const u8) {
    trace!(target: "marshal", ptr = ?ptr, "released native memory");
}

/// Log a type conversion
#[inline]
pub fn log_type_conversion(from: &str, to: &str) {
    trace!(target: "marshal", from, to, "type conversion");
}
