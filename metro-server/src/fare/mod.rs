//! Fare lookup.
//!
//! Fares are a direct table lookup on the ordered station pair, independent
//! of route planning: real fare schedules are not distance-proportional, so
//! a fare is never derived from a path cost. A missing entry is a hard
//! not-found, never an estimate.

use std::collections::{HashMap, HashSet};

use crate::domain::StationId;
use crate::network::NetworkGraph;

/// One fare schedule row: the price of travelling from `origin` to
/// `destination`, in the network's currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareEntry {
    pub origin: StationId,
    pub destination: StationId,
    pub amount: f64,
}

/// Construction-time validation failure. A table that fails to build must
/// not be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FareTableError {
    /// An entry references a station the network does not contain.
    #[error("fare entry references unknown station {0}")]
    UnknownStation(StationId),

    /// An entry has a negative or non-finite amount.
    #[error("fare {origin} -> {destination} has invalid amount {amount}")]
    InvalidAmount {
        origin: StationId,
        destination: StationId,
        amount: f64,
    },
}

/// Lookup failure, surfaced directly to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FareError {
    /// The station id is not part of the network at all.
    #[error("unknown station {0}")]
    UnknownStation(StationId),

    /// Both stations exist but the schedule has no entry for the pair.
    #[error("no fare entry for {origin} -> {destination}")]
    NotFound {
        origin: StationId,
        destination: StationId,
    },
}

/// Immutable fare table.
///
/// Built against a [`NetworkGraph`] so that a lookup involving a station the
/// network does not contain fails with [`FareError::UnknownStation`] rather
/// than blending into [`FareError::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct FareTable {
    fares: HashMap<(StationId, StationId), f64>,
    stations: HashSet<StationId>,
}

impl FareTable {
    /// Build a fare table, validating every entry against the network.
    ///
    /// When the data repeats a pair, the last entry wins, matching how the
    /// source schedule is de-duplicated on import.
    pub fn build(graph: &NetworkGraph, entries: &[FareEntry]) -> Result<Self, FareTableError> {
        let mut fares = HashMap::with_capacity(entries.len());

        for entry in entries {
            for station in [entry.origin, entry.destination] {
                if !graph.contains(station) {
                    return Err(FareTableError::UnknownStation(station));
                }
            }

            if !entry.amount.is_finite() || entry.amount < 0.0 {
                return Err(FareTableError::InvalidAmount {
                    origin: entry.origin,
                    destination: entry.destination,
                    amount: entry.amount,
                });
            }

            fares.insert((entry.origin, entry.destination), entry.amount);
        }

        Ok(Self {
            fares,
            stations: graph.stations().iter().map(|s| s.id).collect(),
        })
    }

    /// Look up the fare for an ordered station pair.
    pub fn lookup(&self, origin: StationId, destination: StationId) -> Result<f64, FareError> {
        for station in [origin, destination] {
            if !self.stations.contains(&station) {
                return Err(FareError::UnknownStation(station));
            }
        }

        self.fares
            .get(&(origin, destination))
            .copied()
            .ok_or(FareError::NotFound {
                origin,
                destination,
            })
    }

    /// Number of fare entries.
    pub fn len(&self) -> usize {
        self.fares.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.fares.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Station;

    fn graph(names: &[&str]) -> NetworkGraph {
        let stations = names
            .iter()
            .enumerate()
            .map(|(i, name)| Station::new(StationId(i as u32 + 1), *name))
            .collect();
        NetworkGraph::build(stations, Vec::new()).unwrap()
    }

    fn entry(origin: u32, destination: u32, amount: f64) -> FareEntry {
        FareEntry {
            origin: StationId(origin),
            destination: StationId(destination),
            amount,
        }
    }

    #[test]
    fn lookup_present_pair() {
        let g = graph(&["KLCC", "Kajang"]);
        let table = FareTable::build(&g, &[entry(1, 2, 2.5)]).unwrap();

        assert_eq!(table.lookup(StationId(1), StationId(2)), Ok(2.5));
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
    }

    #[test]
    fn lookup_is_directional() {
        let g = graph(&["KLCC", "Kajang"]);
        let table = FareTable::build(&g, &[entry(1, 2, 2.5)]).unwrap();

        assert_eq!(
            table.lookup(StationId(2), StationId(1)),
            Err(FareError::NotFound {
                origin: StationId(2),
                destination: StationId(1),
            })
        );
    }

    #[test]
    fn missing_pair_is_not_found() {
        let g = graph(&["KLCC", "Kajang", "Merdeka"]);
        let table = FareTable::build(&g, &[entry(1, 2, 2.5)]).unwrap();

        assert_eq!(
            table.lookup(StationId(1), StationId(3)),
            Err(FareError::NotFound {
                origin: StationId(1),
                destination: StationId(3),
            })
        );
    }

    #[test]
    fn unknown_station_is_distinct_from_not_found() {
        let g = graph(&["KLCC", "Kajang"]);
        let table = FareTable::build(&g, &[entry(1, 2, 2.5)]).unwrap();

        assert_eq!(
            table.lookup(StationId(1), StationId(9)),
            Err(FareError::UnknownStation(StationId(9)))
        );
        assert_eq!(
            table.lookup(StationId(9), StationId(1)),
            Err(FareError::UnknownStation(StationId(9)))
        );
    }

    #[test]
    fn build_rejects_unknown_station() {
        let g = graph(&["KLCC"]);
        let err = FareTable::build(&g, &[entry(1, 2, 2.5)]).unwrap_err();
        assert_eq!(err, FareTableError::UnknownStation(StationId(2)));
    }

    #[test]
    fn build_rejects_invalid_amount() {
        let g = graph(&["KLCC", "Kajang"]);
        for bad in [-0.1, f64::NAN, f64::INFINITY] {
            let err = FareTable::build(&g, &[entry(1, 2, bad)]).unwrap_err();
            assert!(matches!(err, FareTableError::InvalidAmount { .. }));
        }
    }

    #[test]
    fn zero_fare_is_valid() {
        let g = graph(&["KLCC", "Kajang"]);
        let table = FareTable::build(&g, &[entry(1, 2, 0.0)]).unwrap();
        assert_eq!(table.lookup(StationId(1), StationId(2)), Ok(0.0));
    }

    #[test]
    fn last_duplicate_wins() {
        let g = graph(&["KLCC", "Kajang"]);
        let table = FareTable::build(&g, &[entry(1, 2, 2.5), entry(1, 2, 3.0)]).unwrap();
        assert_eq!(table.lookup(StationId(1), StationId(2)), Ok(3.0));
    }

    #[test]
    fn lookup_is_idempotent() {
        let g = graph(&["KLCC", "Kajang"]);
        let table = FareTable::build(&g, &[entry(1, 2, 2.5)]).unwrap();

        let first = table.lookup(StationId(1), StationId(2));
        let second = table.lookup(StationId(1), StationId(2));
        assert_eq!(first, second);
    }
}
