//! Subscriber installation.
//!
//! # Example
//!
//! ```rust,no_run
//! use hyperdrive_telemetry::{init_logging, LogConfig, LogOutput};
//!
//! let config = LogConfig::new("hyperdrive=debug,info").output(LogOutput::Pretty);
//! init_logging(&config)?;
//!
//! tracing::info!(http.method = "GET", http.path = "/users/42", "request received");
//! # Ok::<(), hyperdrive_telemetry::TelemetryError>(())
//! ```

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// How events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line, human-readable.
    Pretty,
}

/// What [`init_logging`] installs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// When `false`, [`init_logging`] does nothing.
    pub enabled: bool,
    /// An `EnvFilter` directive such as `info` or `hyperdrive_core=trace,warn`.
    pub filter: String,
    /// Output format.
    pub output: LogOutput,
    /// Emit an event when a span opens and closes.
    pub span_events: bool,
    /// Attach file and line to each event.
    pub source_location: bool,
    /// Attach the module path to each event.
    pub target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

impl LogConfig {
    /// JSON output filtered by `filter`, targets on, everything else off.
    #[must_use]
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            enabled: true,
            filter: filter.into(),
            output: LogOutput::Json,
            span_events: false,
            source_location: false,
            target: true,
        }
    }

    /// Pretty `debug` output with span events and source locations.
    #[must_use]
    pub fn development() -> Self {
        Self::new("debug")
            .output(LogOutput::Pretty)
            .span_events(true)
            .source_location(true)
    }

    /// Sets the output format.
    #[must_use]
    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Toggles span open/close events.
    #[must_use]
    pub fn span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Toggles file and line on each event.
    #[must_use]
    pub fn source_location(mut self, enabled: bool) -> Self {
        self.source_location = enabled;
        self
    }

    /// A config whose [`init_logging`] is a no-op.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer(config: &LogConfig) -> BoxedLayer {
    let spans = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(spans)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_target(config.target);

    match config.output {
        LogOutput::Json => layer.json().boxed(),
        LogOutput::Pretty => layer.pretty().boxed(),
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// [`TelemetryError::InvalidFilter`] for a malformed directive and
/// [`TelemetryError::AlreadyInstalled`] when a global subscriber exists.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.filter)?;
    tracing_subscriber::registry()
        .with(fmt_layer(config).with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInstalled(e.to_string()))
}

/// Parses an `EnvFilter` directive.
///
/// # Errors
///
/// [`TelemetryError::InvalidFilter`] if the directive is malformed.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        filter: directive.to_string(),
        reason: e.to_string(),
    })
}
