//! Line identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid line identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid line identifier: {reason}")]
pub struct InvalidLine {
    reason: &'static str,
}

/// Identifier of a metro line (e.g. `KJL`, `SBK`).
///
/// Line codes come from the route data; this type guarantees the code is
/// non-empty, has no surrounding whitespace, and contains no whitespace at
/// all, so it can be used directly as a map key or in log output.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    /// Parse a line identifier from a string.
    ///
    /// Surrounding whitespace is trimmed; an empty or internally-spaced
    /// code is rejected.
    pub fn parse(s: &str) -> Result<Self, InvalidLine> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidLine {
                reason: "must not be empty",
            });
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(InvalidLine {
                reason: "must not contain whitespace",
            });
        }

        Ok(LineId(trimmed.to_string()))
    }

    /// Returns the line code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
