//! Errors raised while loading or validating configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Why a configuration could not be produced.
///
/// Every variant is a boot-time failure; nothing here is raised once the
/// application is serving requests.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required file does not exist.
    #[error("Config file {} does not exist", .path.display())]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// A file exists but could not be read.
    #[error("Cannot read config file {}", .path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Neither TOML nor JSON.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A TOML layer is malformed.
    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A JSON layer is malformed, or the merged document does not fit the schema.
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A `.env` file exists but could not be parsed.
    #[error("Cannot load {}: {source}", .path.display())]
    Dotenv {
        /// The file.
        path: PathBuf,
        /// The parse failure.
        #[source]
        source: dotenvy::Error,
    },

    /// A value parsed but breaks a rule of the schema.
    #[error("{field} {reason}")]
    Invalid {
        /// Dotted path of the field, e.g. `server.http_addr`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An override variable has a value of the wrong shape.
    #[error("{key}: {reason}")]
    EnvVar {
        /// The variable name.
        key: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_var(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvVar {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let missing = ConfigError::not_found("config/app.toml");
        assert_eq!(missing.to_string(), "Config file config/app.toml does not exist");

        let invalid = ConfigError::invalid("server.http_addr", "is not a socket address");
        assert_eq!(invalid.to_string(), "server.http_addr is not a socket address");

        let var = ConfigError::env_var("HYPERDRIVE__APP__DEBUG", "expected boolean");
        assert_eq!(var.to_string(), "HYPERDRIVE__APP__DEBUG: expected boolean");
    }
}
