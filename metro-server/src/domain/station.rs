//! Station identity and geography.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a station within a loaded network.
///
/// Ids are dense small integers assigned by the data loader (stations are
/// numbered in sorted-name order, starting at 1), so the same input data
/// always produces the same ids.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLong {
    pub latitude: f64,
    pub longitude: f64,
}

/// A metro station.
///
/// Immutable once the network is built. Coordinates are optional because
/// not every data set ships them.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub coord: Option<LatLong>,
}

impl Station {
    /// Create a station without coordinates.
    pub fn new(id: StationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            coord: None,
        }
    }

    /// Attach a coordinate.
    pub fn with_coord(mut self, latitude: f64, longitude: f64) -> Self {
        self.coord = Some(LatLong {
            latitude,
            longitude,
        });
        self
    }

    /// The normalised form of this station's name, used for matching.
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

/// Normalise a station name for matching.
///
/// Drops parenthesised suffixes ("Kajang (MRT)" matches "Kajang"), unifies
/// the typographic apostrophe, collapses runs of whitespace, and lowercases.
/// Data files are inconsistent about all three.
pub fn name_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    let mut pending_space = false;

    for c in name.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c if c.is_whitespace() => {
                if !out.is_empty() {
                    pending_space = true;
                }
            }
            '\u{2019}' => {
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                out.push('\'');
            }
            c => {
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                out.extend(c.to_lowercase());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_key_lowercases_and_trims() {
        assert_eq!(name_key("  KLCC  "), "klcc");
        assert_eq!(name_key("Pasar Seni"), "pasar seni");
    }

    #[test]
    fn name_key_collapses_whitespace() {
        assert_eq!(name_key("Taman   Melati"), "taman melati");
        assert_eq!(name_key("Wangsa \t Maju"), "wangsa maju");
    }

    #[test]
    fn name_key_drops_parenthesised_suffix() {
        assert_eq!(name_key("Kajang (MRT)"), "kajang");
        assert_eq!(name_key("Sentul (Timur) Depot"), "sentul depot");
    }

    #[test]
    fn name_key_unifies_apostrophe() {
        assert_eq!(name_key("King\u{2019}s Park"), "king's park");
    }

    #[test]
    fn name_key_empty() {
        assert_eq!(name_key(""), "");
        assert_eq!(name_key("   "), "");
        assert_eq!(name_key("(only brackets)"), "");
    }

    #[test]
    fn station_key_matches_free_function() {
        let s = Station::new(StationId(3), "Bukit Bintang (MRT)");
        assert_eq!(s.name_key(), "bukit bintang");
    }

    #[test]
    fn station_with_coord() {
        let s = Station::new(StationId(1), "KLCC").with_coord(3.1579, 101.7123);
        let coord = s.coord.unwrap();
        assert_eq!(coord.latitude, 3.1579);
        assert_eq!(coord.longitude, 101.7123);
    }

    #[test]
    fn id_ordering_and_display() {
        assert!(StationId(1) < StationId(2));
        assert_eq!(StationId(7).to_string(), "7");
        assert_eq!(format!("{:?}", StationId(7)), "StationId(7)");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Normalisation is idempotent: applying it twice changes nothing.
        #[test]
        fn name_key_idempotent(s in ".{0,40}") {
            let once = name_key(&s);
            prop_assert_eq!(name_key(&once), once);
        }

        /// The result never contains uppercase letters or doubled spaces.
        #[test]
        fn name_key_canonical(s in ".{0,40}") {
            let key = name_key(&s);
            prop_assert!(!key.chars().any(|c| c.is_uppercase()));
            prop_assert!(!key.contains("  "));
            prop_assert!(!key.starts_with(' '));
            prop_assert!(!key.ends_with(' '));
        }
    }
}
