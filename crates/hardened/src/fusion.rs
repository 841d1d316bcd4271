//! Layer 5: fusion
//!
//! A structural alert needs all three of:
//!
//! 1. persistence: at least `persist_min` of the last `persist_window`
//!    structural scores reach `alert_z`
//! 2. consensus: at least `consensus_min` auditors fired
//! 3. the latest structural score reaches `consensus_z`
//!
//! A single spike therefore never raises an alert on its own.

use phasegraph_core::DecisionLabel;
use phasegraph_numerics::stats::sigmoid;
use serde::{Deserialize, Serialize};

use crate::auditors::Layer4Report;
use crate::config::{AlertConfig, DecisionConfig};
use crate::drift::Layer3Report;

const STRUCTURE_WEIGHT: f64 = 0.55;
const SUPPORT_WEIGHT: f64 = 0.30;
const AUDITOR_COUNT: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultilayerDecision {
    pub label: DecisionLabel,
    pub confidence: f64,
    /// `sigmoid(latest_score - alert_z)`
    pub structural_probability: f64,
    pub alert_triggered: bool,
    pub reasons: Vec<String>,
}

impl MultilayerDecision {
    /// Decision for input that failed the observability gate
    pub fn inconclusive(reasons: Vec<String>) -> Self {
        Self {
            label: DecisionLabel::Inconclusive,
            confidence: 0.0,
            structural_probability: 0.0,
            alert_triggered: false,
            reasons,
        }
    }
}

/// Exceedances of `alert_z` among the trailing `persist_window` scores
pub fn persistence_hits(scores: &[f64], alert: &AlertConfig) -> usize {
    let start = scores.len().saturating_sub(alert.persist_window);
    scores[start..].iter().filter(|s| **s >= alert.alert_z).count()
}

pub fn fuse(
    structure: &Layer3Report,
    auditors: &Layer4Report,
    noise_to_signal: f64,
    alert: &AlertConfig,
    decision: &DecisionConfig,
) -> MultilayerDecision {
    let latest = structure.latest_score;
    let fired = auditors.triggered_count;

    let persistent = persistence_hits(&structure.structural_scores, alert) >= alert.persist_min;
    let consensus = fired >= decision.consensus_min;
    let latest_ok = latest >= alert.consensus_z;
    let alert_triggered = persistent && consensus && latest_ok;

    let p = sigmoid(latest - alert.alert_z);
    let support = (fired as f64 / AUDITOR_COUNT).min(1.0);
    let bonus = if alert_triggered { decision.alert_bonus } else { 0.0 };
    let confidence = (STRUCTURE_WEIGHT * p + SUPPORT_WEIGHT * support + bonus).clamp(0.0, 1.0);

    let noisy = noise_to_signal > decision.nsr_high;

    let mut reasons = Vec::new();
    if latest >= alert.alert_z {
        reasons.push(format!("structural-drift high (z={latest:.2})"));
        if !persistent {
            reasons.push("structural-drift not persistent".to_string());
        }
    }
    for reading in auditors.readings.iter().filter(|r| r.triggered) {
        reasons.push(format!("{}-auditor high", reading.kind.as_str()));
    }
    if noisy {
        reasons.push("noise-to-signal high".to_string());
    }
    if (persistent || latest_ok) && !consensus {
        reasons.push("consensus too low".to_string());
    }
    if alert_triggered {
        reasons.push("alert triggered".to_string());
    }

    let label = if noisy && p < 0.5 && fired == 0 {
        DecisionLabel::Noisy
    } else if alert_triggered && p >= decision.p_high {
        DecisionLabel::Unstable
    } else if p <= decision.p_low && fired == 0 {
        DecisionLabel::Stable
    } else {
        DecisionLabel::Transition
    };

    MultilayerDecision {
        label,
        confidence,
        structural_probability: p,
        alert_triggered,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auditors::{AuditorKind, AuditorReading};
    use approx::assert_relative_eq;

    fn structure(scores: Vec<f64>) -> Layer3Report {
        Layer3Report {
            latest_score: scores.last().copied().unwrap_or(0.0),
            window_ends: (0..scores.len()).collect(),
            structural_scores: scores,
        }
    }

    fn auditors(fired: [bool; 3]) -> Layer4Report {
        let kinds = [AuditorKind::Volatility, AuditorKind::Cusum, AuditorKind::Mixture];
        let readings: Vec<AuditorReading> = kinds
            .iter()
            .zip(fired)
            .map(|(&kind, triggered)| AuditorReading {
                kind,
                score: if triggered { 10.0 } else { 0.0 },
                threshold: 2.0,
                triggered,
            })
            .collect();
        Layer4Report {
            triggered_count: fired.iter().filter(|f| **f).count(),
            readings,
        }
    }

    #[test]
    fn test_single_spike_does_not_alert() {
        let mut scores = vec![0.0; 40];
        scores.push(9.0);
        let decision = fuse(
            &structure(scores),
            &auditors([true, true, true]),
            0.1,
            &AlertConfig::default(),
            &DecisionConfig::default(),
        );
        assert!(!decision.alert_triggered);
        assert_ne!(decision.label, DecisionLabel::Unstable);
        assert!(
            decision
                .reasons
                .contains(&"structural-drift not persistent".to_string())
        );
    }

    #[test]
    fn test_persistent_drift_with_consensus_alerts() {
        let mut scores = vec![0.0; 40];
        scores.extend([5.0, 6.0, 7.0, 8.0]);
        let decision = fuse(
            &structure(scores),
            &auditors([true, true, false]),
            0.1,
            &AlertConfig::default(),
            &DecisionConfig::default(),
        );
        assert!(decision.alert_triggered);
        assert_eq!(decision.label, DecisionLabel::Unstable);
        assert!(decision.reasons.contains(&"alert triggered".to_string()));
        assert!(decision.reasons.contains(&"cusum-auditor high".to_string()));
        // 0.55·sigmoid(5) + 0.30·(2/3) + 0.15
        let expected = 0.55 * sigmoid(5.0) + 0.2 + 0.15;
        assert_relative_eq!(decision.confidence, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_persistent_drift_without_consensus() {
        let mut scores = vec![0.0; 40];
        scores.extend([5.0, 6.0, 7.0, 8.0]);
        let decision = fuse(
            &structure(scores),
            &auditors([true, false, false]),
            0.1,
            &AlertConfig::default(),
            &DecisionConfig::default(),
        );
        assert!(!decision.alert_triggered);
        assert_eq!(decision.label, DecisionLabel::Transition);
        assert!(decision.reasons.contains(&"consensus too low".to_string()));
    }

    #[test]
    fn test_quiet_structure_is_stable() {
        let decision = fuse(
            &structure(vec![0.0; 40]),
            &auditors([false, false, false]),
            0.1,
            &AlertConfig::default(),
            &DecisionConfig::default(),
        );
        assert_eq!(decision.label, DecisionLabel::Stable);
        assert!(decision.reasons.is_empty());
        assert!(decision.confidence < 0.1);
    }

    #[test]
    fn test_noisy_without_support() {
        let decision = fuse(
            &structure(vec![0.0; 40]),
            &auditors([false, false, false]),
            3.0,
            &AlertConfig::default(),
            &DecisionConfig::default(),
        );
        assert_eq!(decision.label, DecisionLabel::Noisy);
        assert_eq!(decision.reasons, vec!["noise-to-signal high".to_string()]);

        // An auditor firing removes the NOISY verdict
        let decision = fuse(
            &structure(vec![0.0; 40]),
            &auditors([false, false, true]),
            3.0,
            &AlertConfig::default(),
            &DecisionConfig::default(),
        );
        assert_eq!(decision.label, DecisionLabel::Transition);
    }

    #[test]
    fn test_persistence_hits_window() {
        let alert = AlertConfig::default();
        let mut scores = vec![5.0; 5];
        scores.extend(vec![0.0; 10]);
        assert_eq!(persistence_hits(&scores, &alert), 0);
        assert_eq!(persistence_hits(&[3.0, 2.9, 3.1], &alert), 2);
    }
}
