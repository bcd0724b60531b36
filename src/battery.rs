//! Body battery scoring
//!
//! A fixed linear model: sleep adds energy, activity and an elevated resting
//! heart rate drain it, everything is offset from a neutral 50.
//!
//! ```text
//! sleep_gain        = w_sleep_hours × (hours − 7) + w_sleep_quality × quality
//! activity_load     = w_steps × steps + w_moderate × moderate + w_vigorous × vigorous
//! heart_rate_stress = max(0, rhr − baseline) × w_stress
//! raw_total         = 50 + sleep_gain − activity_load − heart_rate_stress
//! clamped_score     = clamp(round(raw_total, 1), 0, 100)
//! ```
//!
//! Intermediate arithmetic is `f64`. Every reported component is rounded to
//! one decimal place, half away from zero, and rounding happens before the
//! clamp.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{BatteryError, Result};
use crate::models::{MetricInput, ScoreBreakdown, WeightConfig, BASE_SCORE, REFERENCE_SLEEP_HOURS};

/// Lowest displayable score
pub const MIN_SCORE: Decimal = dec!(0.0);

/// Highest displayable score
pub const MAX_SCORE: Decimal = dec!(100.0);

/// Core body battery calculator
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Compute the score and its breakdown.
    ///
    /// Out-of-range values are scored as given; only NaN or infinite
    /// `sleep_hours` or weights are rejected.
    pub fn compute(input: &MetricInput, weights: &WeightConfig) -> Result<ScoreBreakdown> {
        if !input.sleep_hours.is_finite() {
            return Err(BatteryError::non_finite("sleep_hours", input.sleep_hours));
        }
        if let Some((name, value)) = weights.entries().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(BatteryError::non_finite(name, value));
        }

        for warning in input.range_warnings() {
            tracing::warn!(%warning, "Metric outside typical range");
        }

        let sleep_gain = weights.sleep_hours_weight * (input.sleep_hours - REFERENCE_SLEEP_HOURS)
            + weights.sleep_quality_weight * f64::from(input.sleep_quality);

        let activity_load = weights.steps_weight * f64::from(input.steps)
            + weights.moderate_weight * f64::from(input.moderate_minutes)
            + weights.vigorous_weight * f64::from(input.vigorous_minutes);

        // No bonus for a resting heart rate below baseline
        let elevation = (i32::from(input.resting_heart_rate)
            - i32::from(input.baseline_resting_heart_rate))
        .max(0);
        let heart_rate_stress = f64::from(elevation) * weights.heart_rate_stress_weight;

        let raw_total = BASE_SCORE + sleep_gain - activity_load - heart_rate_stress;

        // Opposing infinities: finite weights whose products left f64 range
        if raw_total.is_nan() {
            return Err(BatteryError::Configuration(
                "weights are too large: intermediate terms overflowed".to_string(),
            ));
        }

        let raw_rounded = round_one_decimal(raw_total, "raw_total")?;
        let mut clamped_score = raw_rounded.clamp(MIN_SCORE, MAX_SCORE);
        clamped_score.set_sign_positive(true);

        let breakdown = ScoreBreakdown {
            sleep_gain: round_one_decimal(sleep_gain, "sleep_gain")?,
            activity_load: round_one_decimal(activity_load, "activity_load")?,
            heart_rate_stress: round_one_decimal(heart_rate_stress, "heart_rate_stress")?,
            raw_total: raw_rounded,
            clamped_score,
        };

        tracing::debug!(
            sleep_gain = %breakdown.sleep_gain,
            activity_load = %breakdown.activity_load,
            heart_rate_stress = %breakdown.heart_rate_stress,
            raw_total = %breakdown.raw_total,
            score = %breakdown.clamped_score,
            "Body battery computed"
        );

        Ok(breakdown)
    }
}

/// Round to one decimal place, half away from zero, always at scale 1.
///
/// `0.25 -> 0.3`, `-0.25 -> -0.3`, `30 -> 30.0`. Magnitudes beyond what a
/// `Decimal` holds (including infinities) saturate at `Decimal::MAX` /
/// `Decimal::MIN`. Only NaN is rejected.
pub fn round_one_decimal(value: f64, field: &str) -> Result<Decimal> {
    if value.is_nan() {
        return Err(BatteryError::non_finite(field, value));
    }
    Ok(saturating_one_decimal(value))
}

/// Infallible form of [`round_one_decimal`]; NaN maps to zero
pub fn saturating_one_decimal(value: f64) -> Decimal {
    let decimal = match Decimal::from_f64(value) {
        Some(decimal) => decimal,
        None if value.is_nan() || value.abs() < 1.0 => Decimal::ZERO,
        None if value.is_sign_negative() => Decimal::MIN,
        None => Decimal::MAX,
    };

    let mut rounded = decimal.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(1);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}
