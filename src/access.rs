//! Access gate in front of the calculator
//!
//! Authentication itself belongs to an external identity provider. This
//! module only models the precondition: a caller must hold a [`Principal`]
//! before a score is produced. [`ScoreCalculator`] never sees the gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::battery::ScoreCalculator;
use crate::error::{BatteryError, Result};
use crate::models::{MetricInput, ScoreBreakdown, WeightConfig};

/// Environment variable the CLI reads the presented token from
pub const TOKEN_ENV_VAR: &str = "BODYBATTERY_TOKEN";

/// An authorized caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Who was let through
    pub subject: String,

    /// When the gate was passed
    pub authorized_at: DateTime<Utc>,
}

impl Principal {
    /// Principal used when no gate is configured
    pub fn anonymous() -> Self {
        Principal {
            subject: "anonymous".to_string(),
            authorized_at: Utc::now(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.subject == "anonymous"
    }
}

/// Capability check performed before any score is computed
pub trait AccessGate: Send + Sync {
    /// Let the caller through or refuse with [`BatteryError::Auth`]
    fn authorize(&self) -> Result<Principal>;
}

/// Gate that admits everyone
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl AccessGate for OpenGate {
    fn authorize(&self) -> Result<Principal> {
        Ok(Principal::anonymous())
    }
}

/// Gate comparing a presented token against a configured SHA-256 digest
#[derive(Debug, Clone)]
pub struct TokenGate {
    subject: String,
    expected_sha256: String,
    presented: Option<String>,
}

impl TokenGate {
    /// `expected_sha256` is the lowercase hex digest of the accepted token
    pub fn new(
        subject: impl Into<String>,
        expected_sha256: impl Into<String>,
        presented: Option<String>,
    ) -> Self {
        TokenGate {
            subject: subject.into(),
            expected_sha256: expected_sha256.into().trim().to_lowercase(),
            presented,
        }
    }

    /// Read the presented token from [`TOKEN_ENV_VAR`]
    pub fn from_env(subject: impl Into<String>, expected_sha256: impl Into<String>) -> Self {
        let presented = std::env::var(TOKEN_ENV_VAR).ok();
        Self::new(subject, expected_sha256, presented)
    }
}

impl AccessGate for TokenGate {
    fn authorize(&self) -> Result<Principal> {
        let token = self
            .presented
            .as_deref()
            .ok_or_else(|| BatteryError::Auth("no token presented".to_string()))?;

        if sha256_hex(token) != self.expected_sha256 {
            tracing::warn!(subject = %self.subject, "Rejected token");
            return Err(BatteryError::Auth("token does not match".to_string()));
        }

        tracing::debug!(subject = %self.subject, "Access granted");
        Ok(Principal {
            subject: self.subject.clone(),
            authorized_at: Utc::now(),
        })
    }
}

/// Lowercase hex SHA-256 digest, as stored in `[access] token_sha256`
pub fn sha256_hex(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}

/// Pass the gate, then score
pub fn score_authorized(
    gate: &dyn AccessGate,
    input: &MetricInput,
    weights: &WeightConfig,
) -> Result<(Principal, ScoreBreakdown)> {
    let principal = gate.authorize()?;
    let breakdown = ScoreCalculator::compute(input, weights)?;
    Ok((principal, breakdown))
}
