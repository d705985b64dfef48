//! Error types shared across the linkage workspace.

use thiserror::Error;

/// Errors arising from the core data model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinkageError {
    /// Invalid configuration value.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// A quantity that must be finite was not.
    #[error("non-finite value in {what}")]
    NonFinite {
        /// Which quantity went non-finite.
        what: String,
    },

    /// A part ID was referenced that the mechanism does not own.
    #[error("unknown part ID: {0}")]
    UnknownPart(u64),
}

impl LinkageError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a non-finite value error.
    #[must_use]
    pub fn non_finite(what: impl Into<String>) -> Self {
        Self::NonFinite { what: what.into() }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LinkageError::invalid_config("radius must be positive");
        assert!(err.to_string().contains("radius"));

        let err = LinkageError::non_finite("gear1 anchor");
        assert!(err.to_string().contains("gear1 anchor"));

        let err = LinkageError::UnknownPart(7);
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_error_predicates() {
        assert!(LinkageError::invalid_config("x").is_config_error());
        assert!(!LinkageError::non_finite("x").is_config_error());
    }
}
