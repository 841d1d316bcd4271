//! PhaseGraph Regime Engine
//!
//! Classifies every point of a scalar time series as STABLE, TRANSITION,
//! UNSTABLE or NOISY from the Markov structure of its reconstructed phase
//! space.
//!
//! ## Architecture
//!
//! ```text
//! Series ──► Embedding Estimator ──► Takens Embedder ──► Microstate Extractor
//!                 (m, τ)               rows × m              labels, centroids
//!                                                                  │
//!            ┌─────────────────────────────────────────────────────┘
//!            ▼
//!   Transition Graph Builder ──► Metastable Regime Extractor
//!   P (Laplace), k-NN graph,          microstate → regime
//!   GraphQuality                             │
//!            │                               ▼
//!            │                 Confidence / Escape / Stretch
//!            │                               │
//!            └──────────────► Threshold Calibrator & Labeler ──► StateLabel per row
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use phasegraph_engine::{EngineConfig, RegimeEngine};
//!
//! let engine = RegimeEngine::new(EngineConfig::default());
//! let report = engine.analyze(&series)?;
//! println!("latest: {:?}", report.latest_label());
//! ```

pub mod dynamics;
pub mod embedding;
pub mod labeling;
pub mod metastable;
pub mod microstates;
pub mod pipeline;
pub mod smoothing;
pub mod transition;

// Re-export main types
pub use dynamics::{StretchConfig, confidence_series, rolling_stretch, stretch_series};
pub use embedding::{
    DimensionCriterion, Embedding, EmbeddingBounds, EmbeddingConfig, EmbeddingEstimator,
    EmbeddingParams, LagCriterion, embed,
};
pub use labeling::{LabelOutcome, LabelRule, ThresholdPolicy, Thresholds, assign_labels};
pub use metastable::{MetastableMethod, RegimeAssignment, RegimeConfig, extract_regimes};
pub use microstates::{
    Clusterer, MicrostateAssignment, MicrostateConfig, MicrostateExtractor, RawClustering,
    reassign_noise,
};
pub use pipeline::{EngineConfig, EngineReport, RegimeEngine};
pub use smoothing::smooth_sequence;
pub use transition::{GraphConfig, GraphQuality, GraphQualityConfig, Micrograph, TransitionMatrix};
