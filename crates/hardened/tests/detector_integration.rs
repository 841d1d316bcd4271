//! End-to-end tests for the multilayer detector

use phasegraph_core::DecisionLabel;
use phasegraph_hardened::{DetectorStatus, MultilayerConfig, MultilayerDetector};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

fn noisy_sine(n: usize, period: f64, sd: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, sd).unwrap();
    (0..n)
        .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period).sin() + noise.sample(&mut rng))
        .collect()
}

/// Clean slow sinusoid, then a faster sinusoid with heavy noise
fn clean_then_noisy(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.6).unwrap();
    (0..n)
        .map(|i| {
            let t = i as f64;
            if i < n / 2 {
                (2.0 * std::f64::consts::PI * t / 47.3).sin()
            } else {
                (2.0 * std::f64::consts::PI * t / 11.9).sin() + noise.sample(&mut rng)
            }
        })
        .collect()
}

#[test]
fn test_short_input_is_inconclusive() {
    let _ = env_logger::try_init();

    let detector = MultilayerDetector::new(MultilayerConfig::default()).unwrap();
    let report = detector.evaluate(&noisy_sine(50, 20.0, 0.05, 1));

    assert_eq!(report.status, DetectorStatus::Insufficient);
    assert_eq!(report.decision.label, DecisionLabel::Inconclusive);
    assert_eq!(report.decision.confidence, 0.0);
    assert!(!report.decision.reasons.is_empty());
    assert!(report.layers.layer1.is_none());
    assert!(report.layers.layer2.is_none());
    assert!(report.layers.layer3.is_none());
    assert!(report.layers.layer4.is_none());
}

#[test]
fn test_nan_heavy_input_is_inconclusive() {
    let mut values = noisy_sine(600, 20.0, 0.05, 2);
    for v in values.iter_mut().step_by(5) {
        *v = f64::NAN;
    }
    let detector = MultilayerDetector::new(MultilayerConfig::default()).unwrap();
    let report = detector.evaluate(&values);
    assert_eq!(report.status, DetectorStatus::Insufficient);
    assert!(
        report
            .decision
            .reasons
            .iter()
            .any(|r| r.starts_with("finite ratio"))
    );
}

#[test]
fn test_clean_sinusoid_runs_all_layers() {
    let _ = env_logger::try_init();

    let detector = MultilayerDetector::new(MultilayerConfig::default()).unwrap();
    let report = detector.evaluate(&noisy_sine(600, 31.0, 0.05, 3));

    assert_eq!(report.status, DetectorStatus::Ok);
    assert_ne!(report.decision.label, DecisionLabel::Inconclusive);
    assert!((0.0..=1.0).contains(&report.decision.confidence));
    assert!((0.0..=1.0).contains(&report.decision.structural_probability));

    let layer2 = report.layers.layer2.unwrap();
    assert!(layer2.windows_evaluated > 0);
    assert!(layer2.reference_rank >= 1 && layer2.current_rank >= 1);
    let layer3 = report.layers.layer3.unwrap();
    assert_eq!(layer3.structural_scores.len(), layer2.windows_evaluated);
    assert_eq!(report.layers.layer4.unwrap().readings.len(), 3);
}

#[test]
fn test_single_spike_in_series_does_not_alert() {
    let _ = env_logger::try_init();

    let config = MultilayerConfig::default();
    let alert_z = config.alert.alert_z;
    let detector = MultilayerDetector::new(config).unwrap();

    let mut values = noisy_sine(600, 31.0, 0.05, 6);
    if let Some(last) = values.last_mut() {
        *last += 30.0;
    }
    let report = detector.evaluate(&values);

    assert_eq!(report.status, DetectorStatus::Ok);
    let layer3 = report.layers.layer3.unwrap();
    assert!(
        layer3.latest_score >= alert_z,
        "spike should register structurally: {}",
        layer3.latest_score
    );
    assert!(!report.decision.alert_triggered);
    assert_ne!(report.decision.label, DecisionLabel::Unstable);
    assert!(
        report
            .decision
            .reasons
            .contains(&"structural-drift not persistent".to_string())
    );
}

#[test]
fn test_clean_then_noisy_series_is_evaluated() {
    let _ = env_logger::try_init();

    let detector = MultilayerDetector::new(MultilayerConfig::default()).unwrap();
    for seed in [1, 5, 9] {
        let report = detector.evaluate(&clean_then_noisy(1200, seed));

        assert_eq!(report.status, DetectorStatus::Ok, "seed {seed}");
        assert_ne!(report.decision.label, DecisionLabel::Inconclusive);
        assert!(report.layers.layer4.is_some());
        if report.decision.alert_triggered {
            assert!(!report.decision.reasons.is_empty(), "seed {seed}");
        }
    }
}

#[test]
fn test_evaluation_is_deterministic() {
    let detector = MultilayerDetector::new(MultilayerConfig::default()).unwrap();
    let values = noisy_sine(500, 17.0, 0.3, 5);
    let a = serde_json::to_string(&detector.evaluate(&values)).unwrap();
    let b = serde_json::to_string(&detector.evaluate(&values)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = MultilayerConfig::default();
    config.windows.current_window = 200;
    assert!(MultilayerDetector::new(config).is_err());
}

#[test]
fn test_report_serializes_status_lowercase() {
    let detector = MultilayerDetector::new(MultilayerConfig::default()).unwrap();
    let report = detector.evaluate(&[1.0, 2.0, 3.0]);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "insufficient");
    assert!(json["layers"]["layer1"].is_null());
}
