//! Categorical state labels
//!
//! [`StateLabel`] is produced per embedding row by the regime engine.
//! [`DecisionLabel`] is produced once per call by the hardened detector and
//! adds `Inconclusive` for inputs that fail the observability gate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-timestep structural state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateLabel {
    /// Trajectory stays inside its regime and contracts
    Stable,
    /// Neither clearly contained nor clearly escaping
    Transition,
    /// High escape probability with local expansion
    Unstable,
    /// Graph quality too low to trust any other label
    Noisy,
}

impl StateLabel {
    pub const ALL: [StateLabel; 4] = [
        StateLabel::Stable,
        StateLabel::Transition,
        StateLabel::Unstable,
        StateLabel::Noisy,
    ];

    /// Dense index, used as a symbol for sequence smoothing
    pub fn index(&self) -> usize {
        match self {
            StateLabel::Stable => 0,
            StateLabel::Transition => 1,
            StateLabel::Unstable => 2,
            StateLabel::Noisy => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StateLabel::Stable => "STABLE",
            StateLabel::Transition => "TRANSITION",
            StateLabel::Unstable => "UNSTABLE",
            StateLabel::Noisy => "NOISY",
        }
    }

    /// Whether a downstream forecast should be trusted under this label
    pub fn is_forecastable(&self) -> bool {
        matches!(self, StateLabel::Stable)
    }
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardened detector decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionLabel {
    Stable,
    Transition,
    Unstable,
    Noisy,
    /// Observability gate failed; nothing was computed
    Inconclusive,
}

impl DecisionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionLabel::Stable => "STABLE",
            DecisionLabel::Transition => "TRANSITION",
            DecisionLabel::Unstable => "UNSTABLE",
            DecisionLabel::Noisy => "NOISY",
            DecisionLabel::Inconclusive => "INCONCLUSIVE",
        }
    }
}

impl From<StateLabel> for DecisionLabel {
    fn from(label: StateLabel) -> Self {
        match label {
            StateLabel::Stable => DecisionLabel::Stable,
            StateLabel::Transition => DecisionLabel::Transition,
            StateLabel::Unstable => DecisionLabel::Unstable,
            StateLabel::Noisy => DecisionLabel::Noisy,
        }
    }
}

impl fmt::Display for DecisionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for label in StateLabel::ALL {
            assert_eq!(StateLabel::from_index(label.index()), Some(label));
        }
        assert_eq!(StateLabel::from_index(4), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&StateLabel::Unstable).unwrap();
        assert_eq!(json, "\"UNSTABLE\"");
        let json = serde_json::to_string(&DecisionLabel::Inconclusive).unwrap();
        assert_eq!(json, "\"INCONCLUSIVE\"");
    }

    #[test]
    fn test_only_stable_is_forecastable() {
        assert!(StateLabel::Stable.is_forecastable());
        assert!(!StateLabel::Transition.is_forecastable());
        assert!(!StateLabel::Noisy.is_forecastable());
    }
}
