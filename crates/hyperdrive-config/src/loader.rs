//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, `.env` files and environment variables.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{ConfigError, ConfigResult, Environment, HyperdriveConfig, LogFormat};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values or a preset
/// 2. Configuration files (TOML or JSON), merged key by key
/// 3. `.env` file entries
/// 4. Process environment variables
///
/// Layers 3 and 4 only apply when an environment prefix is set. Reading a
/// `.env` file never modifies the process environment.
///
/// # Example
///
/// ```no_run
/// use hyperdrive_config::ConfigLoader;
///
/// # fn main() -> Result<(), hyperdrive_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("config.toml")?
///     .with_dotenv(".env")?
///     .with_env_prefix("HYPERDRIVE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HyperdriveConfig,
    env_prefix: Option<String>,
    dotenv_vars: Vec<(String, String)>,
    extra_vars: Vec<(String, String)>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HyperdriveConfig::default(),
            env_prefix: None,
            dotenv_vars: Vec::new(),
            extra_vars: Vec::new(),
        }
    }

    /// Reset to default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HyperdriveConfig::default();
        self
    }

    /// Start from the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use hyperdrive_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HyperdriveConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HyperdriveConfig::production();
        self
    }

    /// Merge a configuration file.
    ///
    /// The format is chosen by extension (`.toml` or `.json`). Keys present
    /// in the file replace the current values; everything else is kept.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.with_string(&content, &format)
    }

    /// Merge a configuration file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Merge configuration from a string in `format` (`"toml"` or `"json"`).
    ///
    /// # Example
    ///
    /// ```
    /// use hyperdrive_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [server]
    ///     http_addr = "127.0.0.1:3000"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// // Untouched keys keep the preset's values.
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> ConfigResult<Self> {
        let layer: Value = match format.to_lowercase().as_str() {
            "toml" => serde_json::to_value(toml::from_str::<toml::Value>(content)?)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        let mut merged = serde_json::to_value(&self.config)?;
        merge_values(&mut merged, layer);
        self.config = serde_json::from_value(merged)?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `HYPERDRIVE__SERVER__HTTP_ADDR=0.0.0.0:9000`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Read `KEY=VALUE` pairs from a `.env` file into the loader.
    ///
    /// A missing file is ignored. Entries are applied at [`load`](Self::load)
    /// with lower precedence than real environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but cannot be parsed.
    pub fn with_dotenv<P: AsRef<Path>>(mut self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(self);
        }

        let dotenv_error = |source| ConfigError::Dotenv {
            path: path.to_path_buf(),
            source,
        };
        for item in dotenvy::from_path_iter(path).map_err(dotenv_error)? {
            self.dotenv_vars.push(item.map_err(dotenv_error)?);
        }
        Ok(self)
    }

    /// Add a variable as if it were set in the process environment.
    ///
    /// These take precedence over both `.env` entries and real variables.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_vars.push((key.into(), value.into()));
        self
    }

    /// Apply environment overrides, validate, and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or the final
    /// configuration is invalid.
    pub fn load(mut self) -> ConfigResult<HyperdriveConfig> {
        if let Some(prefix) = self.env_prefix.take() {
            let mut vars = BTreeMap::new();
            let layers = self
                .dotenv_vars
                .drain(..)
                .chain(env::vars())
                .chain(self.extra_vars.drain(..));
            for (key, value) in layers {
                if key.starts_with(&prefix) {
                    vars.insert(key, value);
                }
            }

            for (key, value) in &vars {
                self.apply_env_var(key, value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Finalize without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HyperdriveConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> ConfigResult<()> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();

        match parts.as_slice() {
            ["APP", "NAME"] => self.config.app.name = value.to_string(),
            ["APP", "ENVIRONMENT"] => {
                self.config.app.environment = value
                    .parse::<Environment>()
                    .map_err(|reason| ConfigError::env_var(key, reason))?;
            }
            ["APP", "DEBUG"] => self.config.app.debug = parse_bool_var(key, value)?,

            ["SERVER", "HTTP_ADDR"] => self.config.server.http_addr = value.to_string(),
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                self.config.server.request_timeout_ms = value
                    .parse()
                    .map_err(|_| ConfigError::env_var(key, "expected integer"))?;
            }

            ["LOGGING", "ENABLED"] => self.config.logging.enabled = parse_bool_var(key, value)?,
            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => return Err(ConfigError::env_var(key, "expected 'json' or 'pretty'")),
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool_var(key, value)?;
            }

            ["ROUTING", "EXPOSE_ERROR_DETAILS"] => {
                self.config.routing.expose_error_details = parse_bool_var(key, value)?;
            }

            _ => tracing::debug!(var = key, "ignoring unknown configuration override"),
        }

        Ok(())
    }
}

/// Recursively overlays `layer` onto `base`; objects merge, everything else replaces.
fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn parse_bool_var(key: &str, value: &str) -> ConfigResult<bool> {
    parse_bool(value).ok_or_else(|| ConfigError::env_var(key, "expected boolean"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.routing.expose_error_details);
    }

    #[test]
    fn test_string_json_merges_over_preset() {
        let json = r#"{"app": {"name": "orders"}}"#;
        let config = ConfigLoader::new()
            .with_production()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.app.name, "orders");
        assert_eq!(config.app.environment, Environment::Production);
        assert!(!config.routing.expose_error_details);
    }

    #[test]
    fn test_unsupported_format() {
        let result = ConfigLoader::new().with_string("a: 1", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_unknown_field_in_layer_is_rejected() {
        let result = ConfigLoader::new().with_string("[app]\ncolour = \"blue\"", "toml");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_with_file_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [app]
            name = "billing"
            environment = "testing"

            [logging]
            format = "pretty"
            "#
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.app.name, "billing");
        assert_eq!(config.app.environment, Environment::Testing);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/config.toml");
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/config.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_dotenv_applies_with_prefix() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "HDTEST__APP__NAME=from-dotenv").unwrap();
        writeln!(file, "HDTEST__APP__DEBUG=yes").unwrap();
        writeln!(file, "UNRELATED=1").unwrap();

        let config = ConfigLoader::new()
            .with_dotenv(file.path())
            .unwrap()
            .with_env_prefix("hdtest")
            .load()
            .unwrap();

        assert_eq!(config.app.name, "from-dotenv");
        assert!(config.app.debug);
    }

    #[test]
    fn test_dotenv_ignored_without_prefix() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "HDTEST2__APP__NAME=ignored").unwrap();

        let config = ConfigLoader::new().with_dotenv(file.path()).unwrap().load().unwrap();
        assert_eq!(config.app.name, "hyperdrive");
    }

    #[test]
    fn test_explicit_vars_override_dotenv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "HDTEST3__SERVER__HTTP_ADDR=127.0.0.1:1000").unwrap();

        let config = ConfigLoader::new()
            .with_dotenv(file.path())
            .unwrap()
            .with_var("HDTEST3__SERVER__HTTP_ADDR", "127.0.0.1:2000")
            .with_env_prefix("HDTEST3")
            .load()
            .unwrap();

        assert_eq!(config.server.http_addr, "127.0.0.1:2000");
    }

    #[test]
    fn test_invalid_override_fails_load() {
        let result = ConfigLoader::new()
            .with_var("HDTEST4__SERVER__REQUEST_TIMEOUT_MS", "soon")
            .with_env_prefix("HDTEST4")
            .load();
        assert!(matches!(result, Err(ConfigError::EnvVar { .. })));
    }

    #[test]
    fn test_apply_env_var_sections() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("T__APP__ENVIRONMENT", "development", "T").unwrap();
        loader.apply_env_var("T__LOGGING__FORMAT", "pretty", "T").unwrap();
        loader.apply_env_var("T__ROUTING__EXPOSE_ERROR_DETAILS", "off", "T").unwrap();
        loader.apply_env_var("T__SOMETHING__ELSE", "x", "T").unwrap();

        assert_eq!(loader.config.app.environment, Environment::Development);
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
        assert!(!loader.config.routing.expose_error_details);
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["true", "True", "1", "yes", "on"] {
            assert_eq!(parse_bool(truthy), Some(true));
        }
        for falsy in ["false", "0", "no", "OFF"] {
            assert_eq!(parse_bool(falsy), Some(false));
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_merge_values_keeps_siblings() {
        let mut base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        merge_values(&mut base, serde_json::json!({"a": {"y": 20}}));
        assert_eq!(base, serde_json::json!({"a": {"x": 1, "y": 20}, "b": 3}));
    }
}
