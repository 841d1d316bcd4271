//! Concurrent analysis of independent series
//!
//! Each series runs on tokio's blocking pool. Tasks own their data and share
//! only the read-only analyzer.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use phasegraph_core::Series;

use crate::analyzer::{AnalysisReport, RegimeAnalyzer};
use crate::config::AnalysisConfig;
use crate::error::{Result, RunnerError};

/// Analyze every named series; results are keyed by name
///
/// A failing series does not abort the others; its entry holds the error.
/// Invalid configuration fails the whole batch before any task starts.
pub async fn analyze_batch(
    config: AnalysisConfig,
    inputs: Vec<(String, Series)>,
) -> Result<BTreeMap<String, Result<AnalysisReport>>> {
    let analyzer = Arc::new(RegimeAnalyzer::new(config)?);

    let handles: Vec<_> = inputs
        .into_iter()
        .map(|(name, series)| {
            let analyzer = Arc::clone(&analyzer);
            debug!("Spawning analysis for '{}' ({} points)", name, series.len());
            let handle = tokio::task::spawn_blocking(move || analyzer.analyze(&series));
            (name, handle)
        })
        .collect();

    let mut results = BTreeMap::new();
    for (name, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(RunnerError::Task {
                name: name.clone(),
                reason: e.to_string(),
            }),
        };
        if let Err(e) = &outcome {
            warn!("Analysis of '{}' failed: {}", name, e);
        }
        results.insert(name, outcome);
    }
    Ok(results)
}
