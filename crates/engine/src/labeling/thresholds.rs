//! Quantile threshold calibration

use phasegraph_core::{Error, Result, Timeframe};
use phasegraph_numerics::stats::quantile;
use serde::{Deserialize, Serialize};

/// Quantile levels and floors used to calibrate thresholds
///
/// Presets differ by sampling timeframe; any field may be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdPolicy {
    pub escape_low_q: f64,
    pub escape_high_q: f64,
    /// Applied to the rolling stretch mean
    pub stretch_low_q: f64,
    pub stretch_high_q: f64,
    /// Applied to the rolling fraction of positive stretch
    pub stretch_frac_high_q: f64,
    pub confidence_low_q: f64,
    pub confidence_high_q: f64,
    /// Graph quality below this forces NOISY
    pub noisy_floor: f64,
    /// Trailing window for rolling stretch statistics
    pub stretch_window: usize,
}

impl ThresholdPolicy {
    pub fn intraday() -> Self {
        Self {
            escape_low_q: 0.55,
            escape_high_q: 0.90,
            stretch_low_q: 0.40,
            stretch_high_q: 0.85,
            stretch_frac_high_q: 0.85,
            confidence_low_q: 0.10,
            confidence_high_q: 0.60,
            noisy_floor: 0.30,
            stretch_window: 30,
        }
    }

    pub fn daily() -> Self {
        Self {
            escape_low_q: 0.50,
            escape_high_q: 0.85,
            stretch_low_q: 0.40,
            stretch_high_q: 0.80,
            stretch_frac_high_q: 0.80,
            confidence_low_q: 0.15,
            confidence_high_q: 0.60,
            noisy_floor: 0.30,
            stretch_window: 20,
        }
    }

    pub fn weekly() -> Self {
        Self {
            escape_low_q: 0.45,
            escape_high_q: 0.80,
            stretch_low_q: 0.45,
            stretch_high_q: 0.75,
            stretch_frac_high_q: 0.75,
            confidence_low_q: 0.20,
            confidence_high_q: 0.55,
            noisy_floor: 0.25,
            stretch_window: 12,
        }
    }

    pub fn monthly() -> Self {
        Self {
            escape_low_q: 0.40,
            escape_high_q: 0.75,
            stretch_low_q: 0.45,
            stretch_high_q: 0.70,
            stretch_frac_high_q: 0.70,
            confidence_low_q: 0.20,
            confidence_high_q: 0.50,
            noisy_floor: 0.25,
            stretch_window: 8,
        }
    }

    pub fn for_timeframe(timeframe: Timeframe) -> Self {
        match timeframe {
            Timeframe::Intraday => Self::intraday(),
            Timeframe::Daily => Self::daily(),
            Timeframe::Weekly => Self::weekly(),
            Timeframe::Monthly => Self::monthly(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let levels = [
            ("escape_low_q", self.escape_low_q),
            ("escape_high_q", self.escape_high_q),
            ("stretch_low_q", self.stretch_low_q),
            ("stretch_high_q", self.stretch_high_q),
            ("stretch_frac_high_q", self.stretch_frac_high_q),
            ("confidence_low_q", self.confidence_low_q),
            ("confidence_high_q", self.confidence_high_q),
            ("noisy_floor", self.noisy_floor),
        ];
        if let Some((name, value)) = levels.iter().find(|(_, v)| !(0.0..=1.0).contains(v)) {
            return Err(Error::InvalidParameter(format!(
                "{name} must be in [0, 1], got {value}"
            )));
        }
        if self.escape_low_q > self.escape_high_q
            || self.stretch_low_q > self.stretch_high_q
            || self.confidence_low_q > self.confidence_high_q
        {
            return Err(Error::InvalidParameter(
                "low quantile levels must not exceed high levels".to_string(),
            ));
        }
        if self.stretch_window == 0 {
            return Err(Error::InvalidParameter(
                "stretch_window must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::daily()
    }
}

/// Cutoffs calibrated from one run's own distributions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub escape_low: f64,
    pub escape_high: f64,
    pub stretch_low: f64,
    pub stretch_high: f64,
    pub stretch_frac_high: f64,
    pub confidence_low: f64,
    pub confidence_high: f64,
    pub noisy_floor: f64,
}

impl Thresholds {
    pub fn calibrate(
        escape: &[f64],
        stretch_mean: &[f64],
        stretch_frac: &[f64],
        confidence: &[f64],
        policy: &ThresholdPolicy,
    ) -> Self {
        Self {
            escape_low: quantile(escape, policy.escape_low_q),
            escape_high: quantile(escape, policy.escape_high_q),
            stretch_low: quantile(stretch_mean, policy.stretch_low_q),
            stretch_high: quantile(stretch_mean, policy.stretch_high_q),
            stretch_frac_high: quantile(stretch_frac, policy.stretch_frac_high_q),
            confidence_low: quantile(confidence, policy.confidence_low_q),
            confidence_high: quantile(confidence, policy.confidence_high_q),
            noisy_floor: policy.noisy_floor,
        }
    }
}
