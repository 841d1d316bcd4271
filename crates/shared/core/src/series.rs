//! Time series value objects
//!
//! A [`Series`] is the only input of an analysis run. It is validated once at
//! construction (strict time ordering, finite values) and never mutated.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single timestamped observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Strictly time-ordered sequence of finite observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    /// Create a series, rejecting out-of-order timestamps and non-finite values
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        if observations.is_empty() {
            return Err(Error::EmptySeries);
        }

        for (index, obs) in observations.iter().enumerate() {
            if !obs.value.is_finite() {
                return Err(Error::NonFiniteValue { index });
            }
            if index > 0 && obs.timestamp <= observations[index - 1].timestamp {
                return Err(Error::NotTimeOrdered { index });
            }
        }

        Ok(Self { observations })
    }

    /// Build a regularly spaced series starting at `start`
    pub fn from_values(values: &[f64], start: DateTime<Utc>, step: Duration) -> Result<Self> {
        if step <= Duration::zero() {
            return Err(Error::InvalidParameter(format!(
                "series step must be positive, got {step}"
            )));
        }

        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Observation::new(start + step * i as i32, value))
            .collect();

        Self::new(observations)
    }

    /// Regular daily series anchored at the Unix epoch (tests and demos)
    pub fn daily(values: &[f64]) -> Result<Self> {
        Self::from_values(values, DateTime::<Utc>::UNIX_EPOCH, Duration::days(1))
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Copy of the raw values in time order
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_timestamp(&self) -> DateTime<Utc> {
        self.observations[0].timestamp
    }

    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.observations[self.observations.len() - 1].timestamp
    }

    /// Timestamp of the observation at `index`, if any
    pub fn timestamp_at(&self, index: usize) -> Option<DateTime<Utc>> {
        self.observations.get(index).map(|o| o.timestamp)
    }

    /// Same timestamps, values multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            observations: self
                .observations
                .iter()
                .map(|o| Observation::new(o.timestamp, o.value * factor))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_series() {
        let series = Series::daily(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(
            series.last_timestamp() - series.first_timestamp(),
            Duration::days(2)
        );
    }

    #[test]
    fn test_rejects_unordered_timestamps() {
        let t0 = DateTime::<Utc>::UNIX_EPOCH;
        let obs = vec![
            Observation::new(t0, 1.0),
            Observation::new(t0 + Duration::hours(1), 2.0),
            Observation::new(t0 + Duration::hours(1), 3.0),
        ];
        assert_eq!(Series::new(obs), Err(Error::NotTimeOrdered { index: 2 }));
    }

    #[test]
    fn test_rejects_non_finite() {
        let result = Series::daily(&[1.0, f64::NAN]);
        assert_eq!(result, Err(Error::NonFiniteValue { index: 1 }));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Series::daily(&[]), Err(Error::EmptySeries));
    }

    #[test]
    fn test_scaled_keeps_timestamps() {
        let series = Series::daily(&[1.0, -2.0]).unwrap();
        let scaled = series.scaled(3.0);
        assert_eq!(scaled.values(), vec![3.0, -6.0]);
        assert_eq!(scaled.first_timestamp(), series.first_timestamp());
    }
}
