use bodybattery::{access, config, models, report, BatteryError, ScoreCalculator};
use rust_decimal_macros::dec;

/// Integration tests that exercise the collector -> gate -> calculator ->
/// presenter flow end to end

#[cfg(test)]
mod integration_tests {
    use super::*;
    use models::{InputDefaults, MetricInput, PartialMetrics, WeightConfig};

    /// Test the untouched form: all defaults, no gate
    #[test]
    fn test_default_form_workflow() {
        let app = config::AppConfig::load_from_str("").unwrap();
        let metrics = PartialMetrics::default().with_defaults(&app.defaults);
        let gate = app.access.gate();

        let (principal, breakdown) =
            access::score_authorized(gate.as_ref(), &metrics, &app.weights).unwrap();

        assert!(principal.is_anonymous());
        assert_eq!(breakdown.clamped_score, dec!(48.7));

        let report = report::ScoreReport::new(&breakdown);
        assert_eq!(report.headline(), "48.7 / 100");
        assert_eq!(report.contribution_lines()[2], "- HR stress: -1.8");
    }

    /// Test JSON collected metrics with strict validation
    #[test]
    fn test_strict_json_metrics_workflow() {
        let json = r#"{
            "sleepHours": 12.0,
            "sleepQuality": 100,
            "steps": 0,
            "moderateMinutes": 0,
            "vigorousMinutes": 0,
            "restingHeartRate": 55,
            "baselineRestingHeartRate": 60
        }"#;

        let metrics = PartialMetrics::from_json(json).unwrap().into_input().unwrap();
        let breakdown = ScoreCalculator::compute(&metrics, &WeightConfig::default()).unwrap();

        assert_eq!(breakdown.sleep_gain, dec!(30.0));
        assert_eq!(breakdown.clamped_score, dec!(80.0));
    }

    /// Test that a missing metric surfaces as a validation problem, not a score
    #[test]
    fn test_missing_metric_blocks_score() {
        let metrics = PartialMetrics::from_json(r#"{"steps": 4000}"#).unwrap();
        let err = metrics.into_input().unwrap_err();

        assert!(matches!(err, BatteryError::InvalidInput(_)));
        assert!(err.user_message().contains("sleep_hours"));
    }

    /// Test per-tenant weight overrides loaded from a config file
    #[test]
    fn test_custom_weights_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [weights]
            steps_weight = 0.001
            moderate_weight = 0.10
            vigorous_weight = 0.30
            sleep_hours_weight = 3.0
            sleep_quality_weight = 0.15
            heart_rate_stress_weight = 0.9
            "#,
        )
        .unwrap();

        let app = config::AppConfig::load_from_file(&path).unwrap();
        let metrics = MetricInput::from(InputDefaults::default());
        let breakdown = ScoreCalculator::compute(&metrics, &app.weights).unwrap();

        // 8000 steps now cost 8 points instead of 4
        assert_eq!(breakdown.activity_load, dec!(14.0));
        assert_eq!(breakdown.clamped_score, dec!(44.7));
    }

    /// Test that a broken config is fatal before scoring
    #[test]
    fn test_broken_config_is_fatal() {
        let err = config::AppConfig::load_from_str("[weights]\nsteps_weight = nan\n").unwrap_err();
        assert!(err.is_fatal());
    }

    /// Test the token gate in front of the calculator
    #[test]
    fn test_token_gate_workflow() {
        let digest = access::sha256_hex("open-sesame");
        let metrics = MetricInput::from(InputDefaults::default());
        let weights = WeightConfig::default();

        let granted =
            access::TokenGate::new("athlete", digest.clone(), Some("open-sesame".to_string()));
        let (principal, _) = access::score_authorized(&granted, &metrics, &weights).unwrap();
        assert_eq!(principal.subject, "athlete");

        let refused = access::TokenGate::new("athlete", digest, Some("wrong".to_string()));
        assert!(matches!(
            access::score_authorized(&refused, &metrics, &weights),
            Err(BatteryError::Auth(_))
        ));
    }

    /// Test that the calculator can be shared across threads
    #[test]
    fn test_concurrent_scoring() {
        let weights = WeightConfig::default();
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                std::thread::spawn(move || {
                    let metrics = MetricInput {
                        steps: i * 1000,
                        ..MetricInput::from(InputDefaults::default())
                    };
                    ScoreCalculator::compute(&metrics, &weights).unwrap()
                })
            })
            .collect();

        let scores: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for pair in scores.windows(2) {
            assert!(pair[1].clamped_score <= pair[0].clamped_score);
        }
    }
}
