use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BatteryError, Result};

/// Neutral starting point every score is built from
pub const BASE_SCORE: f64 = 50.0;

/// Sleep duration that neither adds nor removes energy
pub const REFERENCE_SLEEP_HOURS: f64 = 7.0;

/// Typical physiological range for resting heart rate (bpm)
pub const TYPICAL_HEART_RATE_RANGE: (u16, u16) = (30, 120);

/// One day of health metrics, as handed to the calculator
///
/// Every field must be present. Use [`PartialMetrics`] when the collector may
/// not have all values yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricInput {
    /// Hours slept last night (0-24)
    pub sleep_hours: f64,

    /// Subjective or device sleep quality (0-100)
    pub sleep_quality: u8,

    /// Steps taken yesterday
    pub steps: u32,

    /// Minutes of moderate activity yesterday
    pub moderate_minutes: u32,

    /// Minutes of vigorous activity yesterday
    pub vigorous_minutes: u32,

    /// Resting heart rate measured today (bpm)
    pub resting_heart_rate: u16,

    /// Personal baseline resting heart rate (bpm)
    pub baseline_resting_heart_rate: u16,
}

impl MetricInput {
    /// Notes for values outside the typical domains.
    ///
    /// These are informational only; out-of-range values are still scored.
    pub fn range_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.sleep_hours.is_finite() && !(0.0..=24.0).contains(&self.sleep_hours) {
            warnings.push(format!(
                "sleep_hours {} is outside the 0-24 range",
                self.sleep_hours
            ));
        }

        if self.sleep_quality > 100 {
            warnings.push(format!(
                "sleep_quality {} is above 100",
                self.sleep_quality
            ));
        }

        let (low, high) = TYPICAL_HEART_RATE_RANGE;
        for (name, bpm) in [
            ("resting_heart_rate", self.resting_heart_rate),
            ("baseline_resting_heart_rate", self.baseline_resting_heart_rate),
        ] {
            if bpm < low || bpm > high {
                warnings.push(format!(
                    "{} {} bpm is outside the typical {}-{} bpm range",
                    name, bpm, low, high
                ));
            }
        }

        warnings
    }
}

/// Metrics as gathered by an input collector, any of which may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialMetrics {
    #[serde(default, alias = "sleepHours")]
    pub sleep_hours: Option<f64>,
    #[serde(default, alias = "sleepQuality")]
    pub sleep_quality: Option<u8>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default, alias = "moderateMinutes")]
    pub moderate_minutes: Option<u32>,
    #[serde(default, alias = "vigorousMinutes")]
    pub vigorous_minutes: Option<u32>,
    #[serde(default, alias = "restingHeartRate")]
    pub resting_heart_rate: Option<u16>,
    #[serde(default, alias = "baselineRestingHeartRate")]
    pub baseline_resting_heart_rate: Option<u16>,
}

impl PartialMetrics {
    /// Parse a JSON document; type mismatches are reported as invalid input
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BatteryError::InvalidInput(format!("malformed metrics: {}", e)))
    }

    /// Fields set in `other` replace the ones in `self`
    pub fn overlay(self, other: PartialMetrics) -> Self {
        PartialMetrics {
            sleep_hours: other.sleep_hours.or(self.sleep_hours),
            sleep_quality: other.sleep_quality.or(self.sleep_quality),
            steps: other.steps.or(self.steps),
            moderate_minutes: other.moderate_minutes.or(self.moderate_minutes),
            vigorous_minutes: other.vigorous_minutes.or(self.vigorous_minutes),
            resting_heart_rate: other.resting_heart_rate.or(self.resting_heart_rate),
            baseline_resting_heart_rate: other
                .baseline_resting_heart_rate
                .or(self.baseline_resting_heart_rate),
        }
    }

    /// Require every metric; the first missing one is reported
    pub fn into_input(self) -> Result<MetricInput> {
        Ok(MetricInput {
            sleep_hours: self
                .sleep_hours
                .ok_or_else(|| BatteryError::missing_field("sleep_hours"))?,
            sleep_quality: self
                .sleep_quality
                .ok_or_else(|| BatteryError::missing_field("sleep_quality"))?,
            steps: self.steps.ok_or_else(|| BatteryError::missing_field("steps"))?,
            moderate_minutes: self
                .moderate_minutes
                .ok_or_else(|| BatteryError::missing_field("moderate_minutes"))?,
            vigorous_minutes: self
                .vigorous_minutes
                .ok_or_else(|| BatteryError::missing_field("vigorous_minutes"))?,
            resting_heart_rate: self
                .resting_heart_rate
                .ok_or_else(|| BatteryError::missing_field("resting_heart_rate"))?,
            baseline_resting_heart_rate: self
                .baseline_resting_heart_rate
                .ok_or_else(|| BatteryError::missing_field("baseline_resting_heart_rate"))?,
        })
    }

    /// Fill any gaps from the collector's defaults
    pub fn with_defaults(self, defaults: &InputDefaults) -> MetricInput {
        MetricInput {
            sleep_hours: self.sleep_hours.unwrap_or(defaults.sleep_hours),
            sleep_quality: self.sleep_quality.unwrap_or(defaults.sleep_quality),
            steps: self.steps.unwrap_or(defaults.steps),
            moderate_minutes: self.moderate_minutes.unwrap_or(defaults.moderate_minutes),
            vigorous_minutes: self.vigorous_minutes.unwrap_or(defaults.vigorous_minutes),
            resting_heart_rate: self.resting_heart_rate.unwrap_or(defaults.resting_heart_rate),
            baseline_resting_heart_rate: self
                .baseline_resting_heart_rate
                .unwrap_or(defaults.baseline_resting_heart_rate),
        }
    }
}

/// Values shown to the user before they have entered anything
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDefaults {
    pub sleep_hours: f64,
    pub sleep_quality: u8,
    pub steps: u32,
    pub moderate_minutes: u32,
    pub vigorous_minutes: u32,
    pub resting_heart_rate: u16,
    pub baseline_resting_heart_rate: u16,
}

impl Default for InputDefaults {
    fn default() -> Self {
        InputDefaults {
            sleep_hours: 7.0,
            sleep_quality: 70,
            steps: 8000,
            moderate_minutes: 30,
            vigorous_minutes: 10,
            resting_heart_rate: 60,
            baseline_resting_heart_rate: 58,
        }
    }
}

impl From<InputDefaults> for MetricInput {
    fn from(defaults: InputDefaults) -> Self {
        PartialMetrics::default().with_defaults(&defaults)
    }
}

/// Coefficients of the linear body battery model
///
/// Every field is required when deserialized; a missing weight is a
/// configuration error rather than a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Points removed per step (0.0005 = 0.5 points per 1000 steps)
    pub steps_weight: f64,

    /// Points removed per moderate minute (30 min ≈ 3 points)
    pub moderate_weight: f64,

    /// Points removed per vigorous minute (10 min ≈ 3 points)
    pub vigorous_weight: f64,

    /// Points per hour of sleep above or below 7 h
    pub sleep_hours_weight: f64,

    /// Points per sleep quality unit
    pub sleep_quality_weight: f64,

    /// Points removed per bpm of resting heart rate above baseline
    pub heart_rate_stress_weight: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        WeightConfig {
            steps_weight: 0.0005,
            moderate_weight: 0.10,
            vigorous_weight: 0.30,
            sleep_hours_weight: 3.0,
            sleep_quality_weight: 0.15,
            heart_rate_stress_weight: 0.9,
        }
    }
}

impl WeightConfig {
    /// Weights by name, in a stable order
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("steps_weight", self.steps_weight),
            ("moderate_weight", self.moderate_weight),
            ("vigorous_weight", self.vigorous_weight),
            ("sleep_hours_weight", self.sleep_hours_weight),
            ("sleep_quality_weight", self.sleep_quality_weight),
            ("heart_rate_stress_weight", self.heart_rate_stress_weight),
        ]
    }

    /// Names of weights that are NaN or infinite
    pub fn non_finite(&self) -> Vec<&'static str> {
        self.entries()
            .iter()
            .filter(|(_, value)| !value.is_finite())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Startup check: every weight must be finite
    pub fn validate(&self) -> Result<()> {
        let bad = self.non_finite();
        if bad.is_empty() {
            Ok(())
        } else {
            Err(BatteryError::Configuration(format!(
                "non-finite weights: {}",
                bad.join(", ")
            )))
        }
    }
}

/// Additive decomposition of a body battery score
///
/// All values are rounded to one decimal place. `raw_total` is never clamped
/// and may fall outside 0-100; `clamped_score` always lies within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sleep_gain: Decimal,
    pub activity_load: Decimal,
    pub heart_rate_stress: Decimal,
    pub raw_total: Decimal,
    pub clamped_score: Decimal,
}

impl ScoreBreakdown {
    /// The constant every score starts from
    pub fn base(&self) -> Decimal {
        crate::battery::saturating_one_decimal(BASE_SCORE)
    }

    /// Whether clamping changed the displayed score
    pub fn was_clamped(&self) -> bool {
        self.raw_total != self.clamped_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_match_documented_constants() {
        let weights = WeightConfig::default();
        assert_eq!(weights.steps_weight, 0.0005);
        assert_eq!(weights.moderate_weight, 0.10);
        assert_eq!(weights.vigorous_weight, 0.30);
        assert_eq!(weights.sleep_hours_weight, 3.0);
        assert_eq!(weights.sleep_quality_weight, 0.15);
        assert_eq!(weights.heart_rate_stress_weight, 0.9);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_weight_validation_lists_every_bad_weight() {
        let weights = WeightConfig {
            steps_weight: f64::NAN,
            heart_rate_stress_weight: f64::INFINITY,
            ..WeightConfig::default()
        };

        let err = weights.validate().unwrap_err();
        assert!(err.is_fatal());
        let message = err.to_string();
        assert!(message.contains("steps_weight"));
        assert!(message.contains("heart_rate_stress_weight"));
        assert!(!message.contains("vigorous_weight"));
    }

    #[test]
    fn test_partial_metrics_missing_field() {
        let partial = PartialMetrics {
            sleep_hours: Some(7.0),
            sleep_quality: Some(70),
            ..PartialMetrics::default()
        };

        let err = partial.into_input().unwrap_err();
        assert!(matches!(err, BatteryError::InvalidInput(_)));
        assert!(err.to_string().contains("steps"));
    }

    #[test]
    fn test_partial_metrics_with_defaults() {
        let partial = PartialMetrics {
            steps: Some(12000),
            ..PartialMetrics::default()
        };

        let input = partial.with_defaults(&InputDefaults::default());
        assert_eq!(input.steps, 12000);
        assert_eq!(input.sleep_hours, 7.0);
        assert_eq!(input.sleep_quality, 70);
        assert_eq!(input.moderate_minutes, 30);
        assert_eq!(input.vigorous_minutes, 10);
        assert_eq!(input.resting_heart_rate, 60);
        assert_eq!(input.baseline_resting_heart_rate, 58);
    }

    #[test]
    fn test_partial_metrics_overlay_prefers_newer_values() {
        let from_file = PartialMetrics {
            steps: Some(5000),
            sleep_hours: Some(6.5),
            ..PartialMetrics::default()
        };
        let from_flags = PartialMetrics {
            steps: Some(9000),
            ..PartialMetrics::default()
        };

        let merged = from_file.overlay(from_flags);
        assert_eq!(merged.steps, Some(9000));
        assert_eq!(merged.sleep_hours, Some(6.5));
        assert_eq!(merged.vigorous_minutes, None);
    }

    #[test]
    fn test_partial_metrics_json_accepts_camel_case() {
        let json = r#"{
            "sleepHours": 8.25,
            "sleepQuality": 80,
            "steps": 4000,
            "moderateMinutes": 20,
            "vigorousMinutes": 0,
            "restingHeartRate": 57,
            "baseline_resting_heart_rate": 58
        }"#;

        let input = PartialMetrics::from_json(json).unwrap().into_input().unwrap();
        assert_eq!(input.sleep_hours, 8.25);
        assert_eq!(input.sleep_quality, 80);
        assert_eq!(input.baseline_resting_heart_rate, 58);
    }

    #[test]
    fn test_partial_metrics_json_wrong_type() {
        let err = PartialMetrics::from_json(r#"{"steps": "lots"}"#).unwrap_err();
        assert!(matches!(err, BatteryError::InvalidInput(_)));
    }

    #[test]
    fn test_range_warnings() {
        let mut input = MetricInput::from(InputDefaults::default());
        assert!(input.range_warnings().is_empty());

        input.sleep_hours = 30.0;
        input.sleep_quality = 150;
        input.resting_heart_rate = 25;
        let warnings = input.range_warnings();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("sleep_hours"));
        assert!(warnings[2].contains("resting_heart_rate 25"));
    }
}
