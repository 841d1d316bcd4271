//! Regime analyzer - one engine run plus one multilayer evaluation per series

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::info;
use phasegraph_core::{DecisionLabel, Series, StateLabel};
use phasegraph_engine::{EngineReport, RegimeEngine};
use phasegraph_hardened::{MultilayerDetector, MultilayerReport};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::error::Result;

/// Combined output of both analyses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub series_len: usize,
    pub engine: EngineReport,
    pub multilayer: MultilayerReport,
}

/// Compact view of a report for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub run_id: Uuid,
    pub series_len: usize,
    pub latest_label: Option<StateLabel>,
    pub latest_confidence: Option<f64>,
    pub label_counts: BTreeMap<StateLabel, usize>,
    pub multilayer_label: DecisionLabel,
    pub multilayer_confidence: f64,
    pub alert_triggered: bool,
    pub reasons: Vec<String>,
}

impl AnalysisReport {
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            run_id: self.run_id,
            series_len: self.series_len,
            latest_label: self.engine.latest_label(),
            latest_confidence: self.engine.latest_confidence(),
            label_counts: self.engine.label_counts(),
            multilayer_label: self.multilayer.decision.label,
            multilayer_confidence: self.multilayer.decision.confidence,
            alert_triggered: self.multilayer.decision.alert_triggered,
            reasons: self.multilayer.decision.reasons.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub struct RegimeAnalyzer {
    engine: RegimeEngine,
    detector: MultilayerDetector,
}

impl RegimeAnalyzer {
    /// Validates both configurations up front
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.engine.validate()?;
        let detector = MultilayerDetector::new(config.multilayer)?;
        Ok(Self {
            engine: RegimeEngine::new(config.engine),
            detector,
        })
    }

    pub fn analyze(&self, series: &Series) -> Result<AnalysisReport> {
        let engine = self.engine.analyze(series)?;
        let multilayer = self.detector.evaluate(&series.values());

        let report = AnalysisReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            series_len: series.len(),
            engine,
            multilayer,
        };
        info!(
            "Run {}: {} points, latest engine label {:?}, multilayer {}",
            report.run_id,
            report.series_len,
            report.engine.latest_label(),
            report.multilayer.decision.label
        );
        Ok(report)
    }
}
