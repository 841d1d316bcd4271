//! Multilayer detector: runs layers 0 to 5 over one series

use log::{debug, info, warn};
use phasegraph_core::Result;
use serde::{Deserialize, Serialize};

use crate::auditors::{Layer4Report, audit};
use crate::config::MultilayerConfig;
use crate::drift::{Layer3Report, drift_series, structural_scores};
use crate::fusion::{MultilayerDecision, fuse};
use crate::noise::{Layer1Report, estimate};
use crate::observability::{Layer0Report, check};
use crate::subspace::Layer2Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorStatus {
    Ok,
    /// Observability gate failed
    Insufficient,
}

/// Per-layer diagnostics; layers 1 to 4 are absent when the gate fails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerReports {
    pub layer0: Layer0Report,
    pub layer1: Option<Layer1Report>,
    pub layer2: Option<Layer2Report>,
    pub layer3: Option<Layer3Report>,
    pub layer4: Option<Layer4Report>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultilayerReport {
    pub status: DetectorStatus,
    pub decision: MultilayerDecision,
    pub layers: LayerReports,
}

pub struct MultilayerDetector {
    config: MultilayerConfig,
}

impl MultilayerDetector {
    pub fn new(config: MultilayerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MultilayerConfig {
        &self.config
    }

    pub fn evaluate(&self, values: &[f64]) -> MultilayerReport {
        let (layer0, finite) = check(values, &self.config.gate);
        if !layer0.passed {
            warn!("Observability gate failed: {}", layer0.failures.join("; "));
            return MultilayerReport {
                status: DetectorStatus::Insufficient,
                decision: MultilayerDecision::inconclusive(layer0.failures.clone()),
                layers: LayerReports {
                    layer0,
                    layer1: None,
                    layer2: None,
                    layer3: None,
                    layer4: None,
                },
            };
        }

        let layer1 = estimate(&finite, &self.config.gate);
        let hankel_rows = self
            .config
            .windows
            .resolve_hankel_rows(layer1.embedding_dim, layer1.embedding_lag);
        debug!(
            "Layer 1: m={} tau={} nsr={:.3}, hankel rows {}",
            layer1.embedding_dim, layer1.embedding_lag, layer1.noise_to_signal, hankel_rows
        );

        let drift = drift_series(&finite, &self.config.windows, hankel_rows);
        let layer3 = structural_scores(&drift, &self.config.windows);
        let layer2 = drift.subspace;
        debug!(
            "Layer 2/3: {} windows, ranks {}/{}, latest score {:.2}",
            layer2.windows_evaluated, layer2.reference_rank, layer2.current_rank, layer3.latest_score
        );

        let layer4 = audit(&finite, &self.config.auditors);
        debug!("Layer 4: {} auditors fired", layer4.triggered_count);

        let decision = fuse(
            &layer3,
            &layer4,
            layer1.noise_to_signal,
            &self.config.alert,
            &self.config.decision,
        );
        info!(
            "Multilayer decision: {} (confidence {:.2}, alert {})",
            decision.label.as_str(),
            decision.confidence,
            decision.alert_triggered
        );

        MultilayerReport {
            status: DetectorStatus::Ok,
            decision,
            layers: LayerReports {
                layer0,
                layer1: Some(layer1),
                layer2: Some(layer2),
                layer3: Some(layer3),
                layer4: Some(layer4),
            },
        }
    }
}
