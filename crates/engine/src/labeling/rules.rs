//! Ordered labeling decision table

use phasegraph_core::StateLabel;
use serde::{Deserialize, Serialize};

use super::thresholds::Thresholds;

/// Row-level signals fed to the decision table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSignals {
    pub escape: f64,
    pub stretch_mean: f64,
    pub stretch_frac: f64,
    pub confidence: f64,
}

/// Decision table rules; the first matching rule decides the label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRule {
    /// Graph quality below the noisy floor → NOISY
    NoisyGraph,
    /// High escape with expanding neighborhoods → UNSTABLE
    EscapingAndExpanding,
    /// Low escape with contracting neighborhoods → STABLE
    ContainedAndContracting,
    /// Low confidence → TRANSITION, or UNSTABLE when escape is also high
    LowConfidence,
    /// Nothing else matched → TRANSITION
    Fallback,
}

impl LabelRule {
    pub const ORDER: [LabelRule; 5] = [
        LabelRule::NoisyGraph,
        LabelRule::EscapingAndExpanding,
        LabelRule::ContainedAndContracting,
        LabelRule::LowConfidence,
        LabelRule::Fallback,
    ];

    /// Label this rule assigns, or `None` when it does not match
    pub fn apply(
        &self,
        row: &RowSignals,
        thresholds: &Thresholds,
        quality_score: f64,
    ) -> Option<StateLabel> {
        match self {
            LabelRule::NoisyGraph => {
                (quality_score < thresholds.noisy_floor).then_some(StateLabel::Noisy)
            }
            LabelRule::EscapingAndExpanding => {
                let escaping = row.escape >= thresholds.escape_high;
                let expanding = row.stretch_frac >= thresholds.stretch_frac_high
                    || row.stretch_mean >= thresholds.stretch_high;
                (escaping && expanding).then_some(StateLabel::Unstable)
            }
            LabelRule::ContainedAndContracting => {
                let contained = row.escape <= thresholds.escape_low;
                let contracting = row.stretch_mean <= thresholds.stretch_low;
                (contained && contracting).then_some(StateLabel::Stable)
            }
            LabelRule::LowConfidence => (row.confidence < thresholds.confidence_low).then(|| {
                if row.escape > thresholds.escape_high {
                    StateLabel::Unstable
                } else {
                    StateLabel::Transition
                }
            }),
            LabelRule::Fallback => Some(StateLabel::Transition),
        }
    }
}

/// Evaluate the table in order; returns the label and the rule that fired
pub fn classify(row: &RowSignals, thresholds: &Thresholds, quality_score: f64) -> (StateLabel, LabelRule) {
    LabelRule::ORDER
        .iter()
        .find_map(|rule| rule.apply(row, thresholds, quality_score).map(|l| (l, *rule)))
        .unwrap_or((StateLabel::Transition, LabelRule::Fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds {
            escape_low: 0.2,
            escape_high: 0.6,
            stretch_low: -0.1,
            stretch_high: 0.3,
            stretch_frac_high: 0.7,
            confidence_low: 0.3,
            confidence_high: 0.8,
            noisy_floor: 0.3,
        }
    }

    fn row(escape: f64, stretch_mean: f64, stretch_frac: f64) -> RowSignals {
        RowSignals {
            escape,
            stretch_mean,
            stretch_frac,
            confidence: 1.0 - escape,
        }
    }

    #[test]
    fn test_noisy_overrides_everything() {
        let (label, rule) = classify(&row(0.0, -1.0, 0.0), &thresholds(), 0.1);
        assert_eq!(label, StateLabel::Noisy);
        assert_eq!(rule, LabelRule::NoisyGraph);
    }

    #[test]
    fn test_escaping_and_expanding() {
        let t = thresholds();
        assert_eq!(classify(&row(0.65, 0.0, 0.8), &t, 0.9).0, StateLabel::Unstable);
        assert_eq!(classify(&row(0.65, 0.5, 0.1), &t, 0.9).0, StateLabel::Unstable);
    }

    #[test]
    fn test_contained_and_contracting() {
        let (label, rule) = classify(&row(0.1, -0.2, 0.2), &thresholds(), 0.9);
        assert_eq!(label, StateLabel::Stable);
        assert_eq!(rule, LabelRule::ContainedAndContracting);
    }

    #[test]
    fn test_low_confidence_never_stable() {
        let t = thresholds();
        let low_conf = RowSignals {
            escape: 0.1,
            stretch_mean: 0.0,
            stretch_frac: 0.1,
            confidence: 0.2,
        };
        let (label, rule) = classify(&low_conf, &t, 0.9);
        assert_eq!(label, StateLabel::Transition);
        assert_eq!(rule, LabelRule::LowConfidence);

        // High escape without expansion falls through to LowConfidence → UNSTABLE
        let escaping = RowSignals {
            escape: 0.7,
            stretch_mean: 0.0,
            stretch_frac: 0.1,
            confidence: 0.2,
        };
        assert_eq!(classify(&escaping, &t, 0.9), (StateLabel::Unstable, LabelRule::LowConfidence));
    }

    #[test]
    fn test_fallback() {
        let (label, rule) = classify(&row(0.4, 0.1, 0.5), &thresholds(), 0.9);
        assert_eq!(label, StateLabel::Transition);
        assert_eq!(rule, LabelRule::Fallback);
    }
}
