//! Errors from subscriber installation.

use thiserror::Error;

/// Why [`init_logging`](crate::init_logging) failed.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// `filter` is not a valid `EnvFilter` directive.
    #[error("Invalid log filter {filter:?}: {reason}")]
    InvalidFilter {
        /// The directive as written.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// Some other subscriber was installed first.
    #[error("A global subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_quotes_directive() {
        let err = TelemetryError::InvalidFilter {
            filter: "info,=".to_string(),
            reason: "bad directive".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid log filter \"info,=\": bad directive");
    }
}
