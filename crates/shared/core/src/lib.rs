//! PhaseGraph Core Domain
//!
//! Pure domain types shared by the regime engine and the hardened detector.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod error;
pub mod label;
pub mod series;
pub mod timeframe;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use label::{DecisionLabel, StateLabel};
pub use series::{Observation, Series};
pub use timeframe::Timeframe;
