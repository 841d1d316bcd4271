//! PhaseGraph Numerics
//!
//! Small, allocation-light numerical helpers shared by the regime engine and
//! the hardened detector:
//!
//! - [`stats`]: moments, quantiles, median/MAD, robust z-scores, entropy
//! - [`rolling`]: causal trailing-window and expanding-window statistics
//! - [`distance`]: Euclidean distances and brute-force neighbor search
//! - [`projection`]: 2-D PCA projection for display coordinates

pub mod distance;
pub mod projection;
pub mod rolling;
pub mod stats;

pub use distance::{euclidean, nearest_neighbor, squared_euclidean};
pub use stats::{mean, median, quantile, robust_z, std_dev, variance};
