//! PhaseGraph Runner
//!
//! Wires the regime engine and the multilayer detector together:
//!
//! - **Config**: one JSON document for both analyses
//! - **Analyzer**: runs both on a series and stamps the report
//! - **Batch**: analyzes independent series concurrently
//! - **Synthetic**: seeded regime-switch series for demos
//!
//! ## Architecture
//!
//! ```text
//!        AnalysisConfig (JSON)
//!                │
//!                ▼
//!  Series ──► RegimeAnalyzer ──┬──► RegimeEngine ────────► EngineReport
//!                              └──► MultilayerDetector ──► MultilayerReport
//!                                              │
//!                                              ▼
//!                                 AnalysisReport {run_id, generated_at, ...}
//! ```

pub mod analyzer;
pub mod batch;
pub mod config;
pub mod error;
pub mod synthetic;

// Re-export main types
pub use analyzer::{AnalysisReport, AnalysisSummary, RegimeAnalyzer};
pub use batch::analyze_batch;
pub use config::{AnalysisConfig, ConfigError};
pub use error::{Result, RunnerError};
pub use synthetic::{SyntheticConfig, regime_switch_series, regime_switch_values};
