//! Unified error hierarchy for body battery scoring
//!
//! Separates caller mistakes (bad metrics) from startup failures (bad weights
//! or config files) so the presentation layer can react to each differently.

use thiserror::Error;

/// Top-level error type for all body battery operations
#[derive(Debug, Error)]
pub enum BatteryError {
    /// A metric is missing, non-finite, or of the wrong type
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A weight is missing or non-finite, or the config source is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The access gate refused the caller
    #[error("Authentication error: {0}")]
    Auth(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors for JSON/TOML payloads
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for body battery operations
pub type Result<T> = std::result::Result<T, BatteryError>;

impl BatteryError {
    /// Shorthand for a missing metric
    pub fn missing_field(field: &str) -> Self {
        BatteryError::InvalidInput(format!("missing required metric: {}", field))
    }

    /// Shorthand for a NaN or infinite value
    pub fn non_finite(field: &str, value: f64) -> Self {
        BatteryError::InvalidInput(format!("{} must be finite, got {}", field, value))
    }

    /// Whether the error stops the process before any score is shown
    pub fn is_fatal(&self) -> bool {
        matches!(self, BatteryError::Configuration(_))
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BatteryError::InvalidInput(_) => ErrorSeverity::Warning,
            BatteryError::Configuration(_) => ErrorSeverity::Critical,
            BatteryError::Auth(_) => ErrorSeverity::Error,
            BatteryError::Io(_) | BatteryError::Serialization(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            BatteryError::InvalidInput(reason) => {
                format!("Please check your metrics: {}", reason)
            }
            BatteryError::Configuration(reason) => {
                format!("Scoring is unavailable until the configuration is fixed: {}", reason)
            }
            BatteryError::Auth(_) => {
                "Access denied. Sign in before requesting a score.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for BatteryError {
    fn from(err: serde_json::Error) -> Self {
        BatteryError::Serialization(err.to_string())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}
