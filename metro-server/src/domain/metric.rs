//! Route cost metrics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown metric name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric {0:?}: expected \"stops\" or \"time\"")]
pub struct InvalidMetric(String);

/// The cost function used for shortest-path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Minimise the number of edges traversed.
    Stops,
    /// Minimise the summed travel time in minutes.
    Time,
}

impl Metric {
    /// The canonical lowercase name, as used in request parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Stops => "stops",
            Metric::Time => "time",
        }
    }
}

impl FromStr for Metric {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stops" => Ok(Metric::Stops),
            "time" => Ok(Metric::Time),
            other => Err(InvalidMetric(other.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
