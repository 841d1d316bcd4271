//! Phase-Space Embedding
//!
//! - [`estimator`]: automatic lag (mutual information / autocorrelation) and
//!   dimension (false nearest neighbors / Cao) selection
//! - [`takens`]: delay-coordinate embedding matrix

pub mod estimator;
pub mod takens;

pub use estimator::{
    DimensionCriterion, EmbeddingBounds, EmbeddingConfig, EmbeddingEstimator, EmbeddingParams,
    LagCriterion,
};
pub use takens::{Embedding, embed};
