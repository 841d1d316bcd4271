//! Layer 4: auditor ensemble
//!
//! Three independent auditors look at first differences of the series. Each
//! produces a score and compares it with its own threshold; the fusion layer
//! only counts how many fired.
//!
//! ```text
//! Δx ──┬── rolling std ──► robust z of latest ──────────► volatility
//!      ├── standardized deviations ──► two-sided CUSUM ─► cusum
//!      └── 2-component GMM per window ──► switch rate
//!                                        + posterior entropy ► mixture
//! ```

use phasegraph_numerics::rolling::{rolling_mean, rolling_std};
use phasegraph_numerics::stats::{diff, quantile, robust_z, variance};
use serde::{Deserialize, Serialize};

use crate::config::{
    AuditorConfig, CusumAuditorConfig, MixtureAuditorConfig, VolatilityAuditorConfig,
};

const VARIANCE_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditorKind {
    Volatility,
    Cusum,
    Mixture,
}

impl AuditorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Volatility => "volatility",
            Self::Cusum => "cusum",
            Self::Mixture => "mixture",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuditorReading {
    pub kind: AuditorKind,
    pub score: f64,
    pub threshold: f64,
    pub triggered: bool,
}

impl AuditorReading {
    fn new(kind: AuditorKind, score: f64, threshold: f64) -> Self {
        Self {
            kind,
            score,
            threshold,
            triggered: score > threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer4Report {
    pub readings: Vec<AuditorReading>,
    pub triggered_count: usize,
}

impl Layer4Report {
    pub fn reading(&self, kind: AuditorKind) -> Option<&AuditorReading> {
        self.readings.iter().find(|r| r.kind == kind)
    }
}

/// Run all auditors on the raw series (differencing happens here)
pub fn audit(values: &[f64], config: &AuditorConfig) -> Layer4Report {
    let diffs = diff(values);
    let readings = vec![
        volatility(&diffs, &config.volatility),
        cusum(&diffs, &config.cusum),
        mixture(&diffs, &config.mixture),
    ];
    let triggered_count = readings.iter().filter(|r| r.triggered).count();
    Layer4Report {
        readings,
        triggered_count,
    }
}

/// Robust z-score of the latest rolling volatility against its history
pub fn volatility(diffs: &[f64], config: &VolatilityAuditorConfig) -> AuditorReading {
    let vols = rolling_std(diffs, config.window);
    let settled = vols.get(config.window.saturating_sub(1)..).unwrap_or(&[]);
    let score = match settled.last() {
        Some(&latest) if settled.len() >= 2 => robust_z(latest, settled),
        _ => 0.0,
    };
    AuditorReading::new(AuditorKind::Volatility, score, config.threshold)
}

/// Two-sided CUSUM on deviations from the trailing mean, in trailing-std units
///
/// Statistics reset after each crossing of `h`; the score is the largest
/// `max(S⁺, S⁻)` seen within the last `window` steps.
pub fn cusum(diffs: &[f64], config: &CusumAuditorConfig) -> AuditorReading {
    let n = diffs.len();
    if n < 2 {
        return AuditorReading::new(AuditorKind::Cusum, 0.0, config.h);
    }
    let means = rolling_mean(diffs, config.window);
    let stds = rolling_std(diffs, config.window);

    let recent_start = n.saturating_sub(config.window);
    let mut upper = 0.0_f64;
    let mut lower = 0.0_f64;
    let mut peak = 0.0_f64;
    // Baseline at t is the trailing window ending at t - 1
    for t in 1..n {
        let scale = stds[t - 1];
        if scale <= VARIANCE_FLOOR {
            continue;
        }
        let z = (diffs[t] - means[t - 1]) / scale;
        upper = (upper + z - config.k).max(0.0);
        lower = (lower - z - config.k).max(0.0);
        let stat = upper.max(lower);
        if t >= recent_start {
            peak = peak.max(stat);
        }
        if stat > config.h {
            upper = 0.0;
            lower = 0.0;
        }
    }
    AuditorReading::new(AuditorKind::Cusum, peak, config.h)
}

/// Switch rate plus mean normalized posterior entropy of a 2-component GMM
///
/// Deterministic EM: means start at the 25% and 75% quantiles, both
/// variances at the window variance, equal weights.
pub fn mixture_instability(window: &[f64], iterations: usize) -> f64 {
    let n = window.len();
    if n < 4 {
        return 0.0;
    }
    let total_var = variance(window).max(VARIANCE_FLOOR);
    let mut mu = [quantile(window, 0.25), quantile(window, 0.75)];
    let mut var = [total_var, total_var];
    let mut weight = [0.5, 0.5];
    let mut resp = vec![0.5; n];

    for _ in 0..iterations.max(1) {
        // E-step: responsibility of component 1
        for (r, &x) in resp.iter_mut().zip(window) {
            let p0 = weight[0] * gaussian_pdf(x, mu[0], var[0]);
            let p1 = weight[1] * gaussian_pdf(x, mu[1], var[1]);
            let total = p0 + p1;
            *r = if total > 0.0 { p1 / total } else { 0.5 };
        }
        // M-step
        let n1: f64 = resp.iter().sum();
        let n0 = n as f64 - n1;
        if n0 <= f64::EPSILON || n1 <= f64::EPSILON {
            break;
        }
        mu[0] = resp.iter().zip(window).map(|(r, x)| (1.0 - r) * x).sum::<f64>() / n0;
        mu[1] = resp.iter().zip(window).map(|(r, x)| r * x).sum::<f64>() / n1;
        var[0] = (resp
            .iter()
            .zip(window)
            .map(|(r, x)| (1.0 - r) * (x - mu[0]).powi(2))
            .sum::<f64>()
            / n0)
            .max(VARIANCE_FLOOR);
        var[1] = (resp
            .iter()
            .zip(window)
            .map(|(r, x)| r * (x - mu[1]).powi(2))
            .sum::<f64>()
            / n1)
            .max(VARIANCE_FLOOR);
        weight = [n0 / n as f64, n1 / n as f64];
    }

    let hard: Vec<bool> = resp.iter().map(|r| *r > 0.5).collect();
    let switches = hard.windows(2).filter(|w| w[0] != w[1]).count();
    let switch_rate = switches as f64 / (n - 1) as f64;
    let entropy = resp.iter().map(|&p| binary_entropy(p)).sum::<f64>() / n as f64;
    switch_rate + entropy
}

/// Latest windowed mixture instability, robust z-scored against earlier windows
pub fn mixture(diffs: &[f64], config: &MixtureAuditorConfig) -> AuditorReading {
    let w = config.window;
    let stride = config.stride.max(1);
    let mut history = Vec::new();
    if w > 0 && diffs.len() >= w {
        let last_end = diffs.len() - 1;
        let first_end = w - 1 + (last_end - (w - 1)) % stride;
        for end in (first_end..=last_end).step_by(stride) {
            history.push(mixture_instability(&diffs[end + 1 - w..=end], config.iterations));
        }
    }
    let score = match history.last() {
        Some(&latest) if history.len() >= 2 => robust_z(latest, &history),
        _ => 0.0,
    };
    AuditorReading::new(AuditorKind::Mixture, score, config.threshold)
}

fn gaussian_pdf(x: f64, mu: f64, var: f64) -> f64 {
    let d = x - mu;
    (-0.5 * d * d / var).exp() / (2.0 * std::f64::consts::PI * var).sqrt()
}

/// Binary entropy in bits (0 at p = 0 or 1, 1 at p = 0.5)
fn binary_entropy(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    let term = |q: f64| if q > 0.0 { -q * q.log2() } else { 0.0 };
    term(p) + term(1.0 - p)
}
