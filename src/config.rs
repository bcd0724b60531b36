//! Application configuration
//!
//! A single TOML file read once at start. Every section is optional; a
//! `[weights]` table that is present must name all six weights.
//!
//! ```toml
//! [weights]
//! steps_weight = 0.0005
//! moderate_weight = 0.10
//! vigorous_weight = 0.30
//! sleep_hours_weight = 3.0
//! sleep_quality_weight = 0.15
//! heart_rate_stress_weight = 0.9
//!
//! [defaults]
//! steps = 8000
//!
//! [access]
//! token_sha256 = "..."
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::access::{AccessGate, OpenGate, TokenGate};
use crate::error::{BatteryError, Result};
use crate::logging::LogConfig;
use crate::models::{InputDefaults, WeightConfig};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    #[serde(default)]
    pub metadata: ConfigMetadata,

    /// Scoring coefficients
    #[serde(default)]
    pub weights: WeightConfig,

    /// Values used when the user has not entered a metric
    #[serde(default)]
    pub defaults: InputDefaults,

    /// Access gate settings
    #[serde(default)]
    pub access: AccessSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Access gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessSettings {
    /// Name the authorized caller is known by
    pub subject: String,

    /// Hex SHA-256 of the accepted token; no gate when unset
    pub token_sha256: Option<String>,
}

impl Default for AccessSettings {
    fn default() -> Self {
        AccessSettings {
            subject: "user".to_string(),
            token_sha256: None,
        }
    }
}

impl AccessSettings {
    /// Build the gate described by these settings
    pub fn gate(&self) -> Box<dyn AccessGate> {
        match &self.token_sha256 {
            Some(digest) => Box::new(TokenGate::from_env(self.subject.clone(), digest.clone())),
            None => Box::new(OpenGate),
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BatteryError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::load_from_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| BatteryError::Configuration(format!("Invalid TOML configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Startup checks; any failure is fatal
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;

        if !self.defaults.sleep_hours.is_finite() {
            return Err(BatteryError::Configuration(format!(
                "defaults.sleep_hours must be finite, got {}",
                self.defaults.sleep_hours
            )));
        }

        if let Some(digest) = &self.access.token_sha256 {
            let digest = digest.trim();
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(BatteryError::Configuration(
                    "access.token_sha256 must be a 64-character hex digest".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_content = toml::to_string_pretty(self)
            .map_err(|e| BatteryError::Serialization(format!("Failed to serialize configuration: {}", e)))?;

        fs::write(&path, toml_content)?;
        Ok(())
    }

    /// Write a fresh default configuration to `path`.
    ///
    /// Refuses to replace an existing file unless `force` is set. Does not read
    /// the existing file, so a broken config can be replaced.
    pub fn write_default(path: &Path, force: bool) -> Result<Self> {
        if path.exists() && !force {
            return Err(BatteryError::Configuration(format!(
                "{} already exists; use --force to overwrite it",
                path.display()
            )));
        }

        let mut config = Self::default();
        config.save_to_file(path)?;
        tracing::info!(path = %path.display(), "Default configuration written");
        Ok(config)
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bodybattery")
            .join("config.toml")
    }

    /// Load `path`, or the built-in defaults when the file does not exist.
    ///
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
