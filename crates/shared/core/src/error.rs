//! Error taxonomy for regime analysis
//!
//! Only "cannot compute" conditions are errors. Degenerate numerics are
//! handled locally and untrustworthy inputs surface as NOISY/INCONCLUSIVE
//! labels instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Series too short: need at least {required} points, got {actual}")]
    SeriesTooShort { required: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Observations not strictly time-ordered at index {index}")]
    NotTimeOrdered { index: usize },

    #[error("Non-finite value at index {index}")]
    NonFiniteValue { index: usize },

    #[error("Series is empty")]
    EmptySeries,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::SeriesTooShort {
            required: 10,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Series too short: need at least 10 points, got 3"
        );
        assert_eq!(
            Error::NotTimeOrdered { index: 4 }.to_string(),
            "Observations not strictly time-ordered at index 4"
        );
    }
}
