//! Section types. Every section defaults field by field, so a file only
//! names what it changes.

use std::fmt;
use std::str::FromStr;

use hyperdrive_telemetry::{LogConfig, LogOutput};
use serde::{Deserialize, Serialize};

/// The environment an application runs in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development.
    Development,
    /// Live traffic.
    #[default]
    Production,
    /// Automated tests.
    Testing,
}

impl Environment {
    /// The lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "testing" | "test" => Ok(Self::Testing),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Who the application is and where it runs.
///
/// ```
/// use hyperdrive_config::{AppConfig, Environment};
///
/// let app: AppConfig = toml::from_str("name = \"orders\"\nenvironment = \"testing\"").unwrap();
/// assert_eq!(app.name, "orders");
/// assert_eq!(app.environment, Environment::Testing);
/// assert!(!app.debug);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Reported in the boot event.
    pub name: String,
    /// Selects presets and is bound in the container as `environment`.
    pub environment: Environment,
    /// Free for application use.
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "hyperdrive".to_string(),
            environment: Environment::Production,
            debug: false,
        }
    }
}

/// Settings read by whatever server hosts the application. The framework
/// never opens sockets itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub http_addr: String,
    /// Upper bound for one request, in milliseconds. Must be non-zero.
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

/// `json` or `pretty`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One object per line.
    #[default]
    Json,
    /// For terminals.
    Pretty,
}

/// The `[logging]` section, turned into a subscriber by [`LoggingConfig::to_log_config`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `false` skips subscriber installation.
    pub enabled: bool,
    /// Level or `EnvFilter` directive list.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// File and line on every event.
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// The subscriber settings for this section.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let output = match self.format {
            LogFormat::Json => LogOutput::Json,
            LogFormat::Pretty => LogOutput::Pretty,
        };
        LogConfig {
            enabled: self.enabled,
            ..LogConfig::new(self.level.as_str())
        }
        .output(output)
        .source_location(self.include_location)
    }
}

/// Dispatch behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    /// Whether 500 responses carry the underlying error message.
    pub expose_error_details: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            expose_error_details: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!("Development".parse::<Environment>(), Ok(Environment::Development));
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("test".parse::<Environment>(), Ok(Environment::Testing));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_logging_to_log_config() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
            ..Default::default()
        };

        let log = logging.to_log_config();
        assert_eq!(log.filter, "debug");
        assert_eq!(log.output, LogOutput::Pretty);
        assert!(log.source_location);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let logging: LoggingConfig = serde_json::from_str(r#"{"level": "debug"}"#).unwrap();
        assert_eq!(logging.level, "debug");
        assert!(logging.enabled);
        assert_eq!(logging.format, LogFormat::Json);

        let err = serde_json::from_str::<RoutingConfig>(r#"{"expose_errors": false}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn test_section_defaults() {
        assert_eq!(ServerConfig::default().http_addr, "0.0.0.0:8080");
        assert_eq!(AppConfig::default().environment, Environment::Production);
        assert!(RoutingConfig::default().expose_error_details);
    }
}
