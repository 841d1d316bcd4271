//! Sampling timeframe tag
//!
//! The timeframe selects threshold policy presets; it carries no other
//! semantics inside the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Intraday,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Timeframe::Intraday => "intraday",
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "intraday" | "1h" | "15m" => Ok(Timeframe::Intraday),
            "daily" | "1d" => Ok(Timeframe::Daily),
            "weekly" | "1w" => Ok(Timeframe::Weekly),
            "monthly" | "1mo" => Ok(Timeframe::Monthly),
            other => Err(Error::InvalidParameter(format!("unknown timeframe '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("1d".parse::<Timeframe>().unwrap(), Timeframe::Daily);
        assert_eq!("Weekly".parse::<Timeframe>().unwrap(), Timeframe::Weekly);
        assert!("fortnight".parse::<Timeframe>().is_err());
    }
}
