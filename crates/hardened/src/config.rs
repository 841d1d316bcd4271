//! Multilayer detector configuration

use phasegraph_core::{Error, Result};
use phasegraph_engine::EmbeddingConfig;
use serde::{Deserialize, Serialize};

/// Layer 0 observability gate and layer 1 embedding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Warmup: minimum finite samples before anything is computed
    pub min_samples: usize,
    pub min_finite_ratio: f64,
    /// Variance of first differences must exceed this
    pub min_diff_variance: f64,
    /// Fixed embedding dimension (re-estimated when absent)
    pub embedding_dim: Option<usize>,
    /// Fixed embedding lag (re-estimated when absent)
    pub embedding_lag: Option<usize>,
    pub embedding: EmbeddingConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_samples: 200,
            min_finite_ratio: 0.95,
            min_diff_variance: 1e-10,
            embedding_dim: None,
            embedding_lag: None,
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Layer 2/3 sliding windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub reference_window: usize,
    pub current_window: usize,
    /// Hankel row count; defaults to `m·τ` clamped to `[4, current_window / 2]`
    pub hankel_rows: Option<usize>,
    pub stride: usize,
    /// λ in `z(angle) + λ·z(gap)`
    pub gap_weight: f64,
    /// Drift values needed before z-scores are reported
    pub min_drift_history: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            reference_window: 120,
            current_window: 40,
            hankel_rows: None,
            stride: 1,
            gap_weight: 0.5,
            min_drift_history: 20,
        }
    }
}

impl WindowConfig {
    /// Hankel rows for an (m, τ) embedding
    pub fn resolve_hankel_rows(&self, dimension: usize, lag: usize) -> usize {
        let upper = (self.current_window / 2).max(2);
        self.hankel_rows
            .unwrap_or_else(|| (dimension * lag).clamp(4.min(upper), upper))
    }
}

/// Structural alert gating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub alert_z: f64,
    /// Latest score must clear this for an alert
    pub consensus_z: f64,
    pub persist_window: usize,
    /// Exceedances of `alert_z` required inside `persist_window`
    pub persist_min: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            alert_z: 3.0,
            consensus_z: 2.5,
            persist_window: 10,
            persist_min: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityAuditorConfig {
    pub window: usize,
    pub threshold: f64,
}

impl Default for VolatilityAuditorConfig {
    fn default() -> Self {
        Self {
            window: 30,
            threshold: 2.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CusumAuditorConfig {
    /// Allowance subtracted per step
    pub k: f64,
    /// Decision threshold
    pub h: f64,
    /// Trailing window for the rolling mean and scale
    pub window: usize,
}

impl Default for CusumAuditorConfig {
    fn default() -> Self {
        Self {
            k: 0.5,
            h: 5.0,
            window: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixtureAuditorConfig {
    pub window: usize,
    pub stride: usize,
    pub threshold: f64,
    /// EM iterations per window
    pub iterations: usize,
}

impl Default for MixtureAuditorConfig {
    fn default() -> Self {
        Self {
            window: 60,
            stride: 5,
            threshold: 2.0,
            iterations: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditorConfig {
    pub volatility: VolatilityAuditorConfig,
    pub cusum: CusumAuditorConfig,
    pub mixture: MixtureAuditorConfig,
}

/// Layer 5 decision policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Auditors that must fire together
    pub consensus_min: usize,
    /// Noise-to-signal cutoff; white noise sits near 3, smooth signals near 0
    pub nsr_high: f64,
    pub p_high: f64,
    pub p_low: f64,
    /// Confidence bonus when the hard alert fires
    pub alert_bonus: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            consensus_min: 2,
            nsr_high: 2.5,
            p_high: 0.7,
            p_low: 0.3,
            alert_bonus: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MultilayerConfig {
    pub gate: GateConfig,
    pub windows: WindowConfig,
    pub alert: AlertConfig,
    pub auditors: AuditorConfig,
    pub decision: DecisionConfig,
}

impl MultilayerConfig {
    pub fn validate(&self) -> Result<()> {
        let w = &self.windows;
        if w.reference_window < 8 || w.current_window < 8 {
            return Err(Error::InvalidParameter(format!(
                "windows too small: reference={} current={} (need >= 8)",
                w.reference_window, w.current_window
            )));
        }
        if w.current_window > w.reference_window {
            return Err(Error::InvalidParameter(
                "current_window must not exceed reference_window".to_string(),
            ));
        }
        if let Some(rows) = w.hankel_rows {
            if rows < 2 || rows >= w.current_window {
                return Err(Error::InvalidParameter(format!(
                    "hankel_rows must be in [2, current_window), got {rows}"
                )));
            }
        }
        if w.stride == 0 {
            return Err(Error::InvalidParameter("stride must be >= 1".to_string()));
        }

        let span = w.reference_window + w.current_window;
        if self.gate.min_samples < span {
            return Err(Error::InvalidParameter(format!(
                "warmup min_samples {} must cover reference + current windows ({span})",
                self.gate.min_samples
            )));
        }
        if !(0.0..=1.0).contains(&self.gate.min_finite_ratio) {
            return Err(Error::InvalidParameter(format!(
                "min_finite_ratio must be in [0, 1], got {}",
                self.gate.min_finite_ratio
            )));
        }
        if self.gate.embedding_dim.is_some_and(|m| m < 2)
            || self.gate.embedding_lag.is_some_and(|t| t < 1)
        {
            return Err(Error::InvalidParameter(
                "fixed embedding needs dim >= 2 and lag >= 1".to_string(),
            ));
        }

        let a = &self.alert;
        if a.persist_window == 0 || a.persist_min == 0 || a.persist_min > a.persist_window {
            return Err(Error::InvalidParameter(format!(
                "persistence needs 1 <= persist_min <= persist_window, got {}/{}",
                a.persist_min, a.persist_window
            )));
        }
        if a.consensus_z > a.alert_z {
            return Err(Error::InvalidParameter(
                "consensus_z must not exceed alert_z".to_string(),
            ));
        }

        let au = &self.auditors;
        if au.volatility.window < 2 || au.cusum.window < 2 || au.mixture.window < 4 {
            return Err(Error::InvalidParameter(
                "auditor windows too small".to_string(),
            ));
        }
        if au.mixture.stride == 0 {
            return Err(Error::InvalidParameter(
                "mixture stride must be >= 1".to_string(),
            ));
        }

        let d = &self.decision;
        if d.consensus_min > 3 {
            return Err(Error::InvalidParameter(format!(
                "consensus_min {} exceeds the 3 auditors",
                d.consensus_min
            )));
        }
        if !(0.0..=1.0).contains(&d.p_low) || !(0.0..=1.0).contains(&d.p_high) || d.p_low > d.p_high
        {
            return Err(Error::InvalidParameter(
                "probability cutoffs must satisfy 0 <= p_low <= p_high <= 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        MultilayerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_warmup_must_cover_windows() {
        let mut config = MultilayerConfig::default();
        config.gate.min_samples = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_persistence_bounds() {
        let mut config = MultilayerConfig::default();
        config.alert.persist_min = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hankel_rows_resolution() {
        let w = WindowConfig::default();
        assert_eq!(w.resolve_hankel_rows(3, 2), 6);
        assert_eq!(w.resolve_hankel_rows(2, 1), 4);
        assert_eq!(w.resolve_hankel_rows(8, 10), 20);
        let fixed = WindowConfig {
            hankel_rows: Some(7),
            ..Default::default()
        };
        assert_eq!(fixed.resolve_hankel_rows(8, 10), 7);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MultilayerConfig =
            serde_json::from_str(r#"{"alert": {"alert_z": 4.0}}"#).unwrap();
        assert_eq!(config.alert.alert_z, 4.0);
        assert_eq!(config.alert.persist_min, 3);
        assert_eq!(config.windows, WindowConfig::default());
    }
}
