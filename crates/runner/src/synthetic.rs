//! Synthetic regime-switch series for demos and tests
//!
//! Alternates between a clean slow oscillation and a fast noisy one.

use phasegraph_core::{Result, Series};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone, Copy)]
pub struct SyntheticConfig {
    /// Points per segment
    pub segment_len: usize,
    pub segments: usize,
    pub calm_period: f64,
    pub turbulent_period: f64,
    /// Noise standard deviation in turbulent segments
    pub turbulent_noise: f64,
    /// Noise standard deviation in calm segments
    pub calm_noise: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            segment_len: 400,
            segments: 3,
            calm_period: 47.3,
            turbulent_period: 11.9,
            turbulent_noise: 0.6,
            calm_noise: 0.02,
        }
    }
}

/// Segment `i` is calm when `i` is even
pub fn regime_switch_values(config: &SyntheticConfig, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let calm = Normal::new(0.0, config.calm_noise.max(0.0)).ok();
    let turbulent = Normal::new(0.0, config.turbulent_noise.max(0.0)).ok();

    (0..config.segment_len * config.segments)
        .map(|i| {
            let t = i as f64;
            let is_calm = (i / config.segment_len.max(1)) % 2 == 0;
            let (period, noise) = if is_calm {
                (config.calm_period, calm)
            } else {
                (config.turbulent_period, turbulent)
            };
            let jitter = noise.map_or(0.0, |n| n.sample(&mut rng));
            (2.0 * std::f64::consts::PI * t / period).sin() + jitter
        })
        .collect()
}

/// Daily-spaced series of [`regime_switch_values`]
pub fn regime_switch_series(config: &SyntheticConfig, seed: u64) -> Result<Series> {
    Series::daily(&regime_switch_values(config, seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_determinism() {
        let config = SyntheticConfig::default();
        let a = regime_switch_values(&config, 3);
        let b = regime_switch_values(&config, 3);
        assert_eq!(a.len(), 1200);
        assert_eq!(a, b);
        assert_ne!(a, regime_switch_values(&config, 4));
    }

    #[test]
    fn test_series_is_daily() {
        let series = regime_switch_series(&SyntheticConfig::default(), 1).unwrap();
        assert_eq!(series.len(), 1200);
        assert!(series.values().iter().all(|v| v.is_finite()));
    }
}
