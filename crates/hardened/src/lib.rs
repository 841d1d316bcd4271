//! PhaseGraph Multilayer Hardened Detector
//!
//! Produces one low-false-alarm decision for the latest state of a series.
//!
//! ```text
//! values ──► L0 observability gate ──(fail)──► INCONCLUSIVE
//!                  │
//!                  ▼
//!            L1 (m, τ), noise-to-signal
//!                  │
//!                  ▼
//!            L2 Hankel SVD per window ──► L3 structural score
//!                                               │
//!            L4 auditors (Δx) ──────────────────┤
//!                                               ▼
//!                                   L5 persistence + consensus fusion
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use phasegraph_hardened::{MultilayerConfig, MultilayerDetector};
//!
//! let detector = MultilayerDetector::new(MultilayerConfig::default())?;
//! let report = detector.evaluate(&values);
//! println!("{} {:.2}", report.decision.label, report.decision.confidence);
//! ```

pub mod auditors;
pub mod config;
pub mod detector;
pub mod drift;
pub mod fusion;
pub mod noise;
pub mod observability;
pub mod subspace;

pub use auditors::{AuditorKind, AuditorReading, Layer4Report};
pub use config::{
    AlertConfig, AuditorConfig, CusumAuditorConfig, DecisionConfig, GateConfig,
    MixtureAuditorConfig, MultilayerConfig, VolatilityAuditorConfig, WindowConfig,
};
pub use detector::{DetectorStatus, LayerReports, MultilayerDetector, MultilayerReport};
pub use drift::Layer3Report;
pub use fusion::MultilayerDecision;
pub use noise::Layer1Report;
pub use observability::Layer0Report;
pub use subspace::Layer2Report;
