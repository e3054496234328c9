//! Main configuration types.
//!
//! This module provides the top-level [`HyperdriveConfig`] struct and its builder.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::{AppConfig, ConfigError, ConfigResult, Environment, LogFormat, LoggingConfig, RoutingConfig, ServerConfig};

/// Complete Hyperdrive application configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables. Once loaded, the value is handed to the
/// application by ownership and never re-read.
///
/// # Example
///
/// ```
/// use hyperdrive_config::HyperdriveConfig;
///
/// let config = HyperdriveConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HyperdriveConfig {
    /// Application identity.
    #[serde(default)]
    pub app: AppConfig,

    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dispatch behavior.
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl HyperdriveConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use hyperdrive_config::{HyperdriveConfig, ServerConfig};
    ///
    /// let config = HyperdriveConfig::builder()
    ///     .server(ServerConfig {
    ///         http_addr: "127.0.0.1:3000".to_string(),
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// ```
    #[must_use]
    pub fn builder() -> HyperdriveConfigBuilder {
        HyperdriveConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `server.http_addr` is not a socket address
    /// - `server.request_timeout_ms` is zero
    /// - `logging.level` is empty
    /// - `app.name` is empty
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid(
                "server.http_addr",
                format!("is not a socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid("logging.level", "must not be empty"));
        }

        if self.app.name.trim().is_empty() {
            return Err(ConfigError::invalid("app.name", "must not be empty"));
        }

        Ok(())
    }

    /// Development preset: debug mode, pretty `debug` logs with locations.
    ///
    /// # Example
    ///
    /// ```
    /// use hyperdrive_config::HyperdriveConfig;
    ///
    /// let config = HyperdriveConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert!(config.app.debug);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.app.environment = Environment::Development;
        config.app.debug = true;

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config
    }

    /// Production preset: JSON `info` logs, error details hidden from clients.
    ///
    /// # Example
    ///
    /// ```
    /// use hyperdrive_config::{HyperdriveConfig, LogFormat};
    ///
    /// let config = HyperdriveConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// assert!(!config.routing.expose_error_details);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.app.environment = Environment::Production;
        config.app.debug = false;

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;

        config.routing.expose_error_details = false;

        config
    }
}

/// Builder for [`HyperdriveConfig`].
#[derive(Debug, Default)]
pub struct HyperdriveConfigBuilder {
    app: Option<AppConfig>,
    server: Option<ServerConfig>,
    logging: Option<LoggingConfig>,
    routing: Option<RoutingConfig>,
}

impl HyperdriveConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application section.
    #[must_use]
    pub fn app(mut self, app: AppConfig) -> Self {
        self.app = Some(app);
        self
    }

    /// Set the server section.
    #[must_use]
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the routing section.
    #[must_use]
    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Build the configuration without validation.
    #[must_use]
    pub fn build(self) -> HyperdriveConfig {
        HyperdriveConfig {
            app: self.app.unwrap_or_default(),
            server: self.server.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            routing: self.routing.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    pub fn build_validated(self) -> ConfigResult<HyperdriveConfig> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
