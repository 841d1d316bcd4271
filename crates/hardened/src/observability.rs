//! Layer 0: observability gate

use phasegraph_numerics::stats::{diff, variance};
use serde::{Deserialize, Serialize};

use crate::config::GateConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer0Report {
    pub n_samples: usize,
    pub n_finite: usize,
    pub finite_ratio: f64,
    pub diff_variance: f64,
    pub passed: bool,
    /// Human-readable reasons the gate failed
    pub failures: Vec<String>,
}

/// Measure observability; returns the report and the finite values
///
/// Non-finite values are dropped from the returned series.
pub fn check(values: &[f64], config: &GateConfig) -> (Layer0Report, Vec<f64>) {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n_samples = values.len();
    let finite_ratio = if n_samples == 0 {
        0.0
    } else {
        finite.len() as f64 / n_samples as f64
    };
    let diff_variance = variance(&diff(&finite));

    let mut failures = Vec::new();
    if finite.len() < config.min_samples {
        failures.push(format!(
            "insufficient samples ({} < {})",
            finite.len(),
            config.min_samples
        ));
    }
    if finite_ratio < config.min_finite_ratio {
        failures.push(format!(
            "finite ratio too low ({:.3} < {:.3})",
            finite_ratio, config.min_finite_ratio
        ));
    }
    if diff_variance <= config.min_diff_variance {
        failures.push(format!(
            "first-difference variance too low ({diff_variance:.3e})"
        ));
    }

    let report = Layer0Report {
        n_samples,
        n_finite: finite.len(),
        finite_ratio,
        diff_variance,
        passed: failures.is_empty(),
        failures,
    };
    (report, finite)
}
