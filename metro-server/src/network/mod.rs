//! The immutable station/connection graph.
//!
//! A [`NetworkGraph`] is built once at startup from loader output and never
//! mutated afterwards, so concurrent readers need no synchronisation.
//! Adjacency lists keep their insertion order, which makes every traversal
//! over the same input data deterministic.

use std::collections::HashMap;

use crate::domain::{LineId, Metric, Station, StationId, name_key};

/// A directed connection between two adjacent stations on a line.
///
/// The loader emits both directions for ordinary track, but the graph also
/// accepts a one-way connection as-is: a missing reverse edge is valid
/// asymmetric data, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub from: StationId,
    pub to: StationId,
    pub line: LineId,
    /// Travel time over this connection, in minutes. Non-negative and finite.
    pub time_min: f64,
}

impl Connection {
    /// The cost of traversing this connection under the given metric.
    ///
    /// Every connection counts as exactly one hop under [`Metric::Stops`].
    pub fn weight(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Stops => 1.0,
            Metric::Time => self.time_min,
        }
    }
}

/// Construction-time validation failure. A graph that fails to build must
/// not be used; there is no partially-built state to recover.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    /// A connection references a station id that is not in the station set.
    #[error("connection on line {line} references unknown station {station}")]
    UnknownStation { station: StationId, line: LineId },

    /// Two stations share the same id.
    #[error("duplicate station id {0}")]
    DuplicateStation(StationId),

    /// Two stations normalise to the same lookup name.
    #[error("duplicate station name {name:?} ({first} and {second})")]
    DuplicateStationName {
        name: String,
        first: StationId,
        second: StationId,
    },

    /// A connection has a negative or non-finite travel time.
    #[error("connection {from} -> {to} has invalid travel time {time_min}")]
    InvalidTravelTime {
        from: StationId,
        to: StationId,
        time_min: f64,
    },
}

/// Immutable in-memory metro network.
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    stations: HashMap<StationId, Station>,
    by_name: HashMap<String, StationId>,
    adjacency: HashMap<StationId, Vec<Connection>>,
    connection_count: usize,
}

impl NetworkGraph {
    /// Build a graph, validating every station and connection.
    ///
    /// The graph may be disconnected; reachability is the planner's concern.
    pub fn build(
        stations: Vec<Station>,
        connections: Vec<Connection>,
    ) -> Result<Self, NetworkError> {
        let mut station_map: HashMap<StationId, Station> = HashMap::with_capacity(stations.len());
        let mut by_name: HashMap<String, StationId> = HashMap::with_capacity(stations.len());

        for station in stations {
            let id = station.id;
            let key = station.name_key();
            if let Some(&existing) = by_name.get(&key) {
                return Err(NetworkError::DuplicateStationName {
                    name: key,
                    first: existing,
                    second: id,
                });
            }
            by_name.insert(key, id);

            if station_map.insert(id, station).is_some() {
                return Err(NetworkError::DuplicateStation(id));
            }
        }

        let mut adjacency: HashMap<StationId, Vec<Connection>> = HashMap::new();
        let connection_count = connections.len();

        for conn in connections {
            for endpoint in [conn.from, conn.to] {
                if !station_map.contains_key(&endpoint) {
                    return Err(NetworkError::UnknownStation {
                        station: endpoint,
                        line: conn.line,
                    });
                }
            }

            if !conn.time_min.is_finite() || conn.time_min < 0.0 {
                return Err(NetworkError::InvalidTravelTime {
                    from: conn.from,
                    to: conn.to,
                    time_min: conn.time_min,
                });
            }

            adjacency.entry(conn.from).or_default().push(conn);
        }

        Ok(Self {
            stations: station_map,
            by_name,
            adjacency,
            connection_count,
        })
    }

    /// Look up a station by id.
    pub fn get(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    /// Whether the graph contains the station.
    pub fn contains(&self, id: StationId) -> bool {
        self.stations.contains_key(&id)
    }

    /// Look up a station by display name (normalised before matching).
    pub fn station_by_name(&self, name: &str) -> Option<&Station> {
        let id = self.by_name.get(&name_key(name))?;
        self.stations.get(id)
    }

    /// All stations whose normalised name contains the (normalised) query,
    /// ordered by id.
    pub fn search_by_name(&self, query: &str) -> Vec<&Station> {
        let needle = name_key(query);
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<&Station> = self
            .stations
            .values()
            .filter(|s| s.name_key().contains(&needle))
            .collect();
        matches.sort_by_key(|s| s.id);
        matches
    }

    /// Outgoing connections of a station, in data order.
    ///
    /// A station with no outgoing connections (or an id the graph does not
    /// contain) yields an empty slice; callers that need to distinguish the
    /// two cases check [`NetworkGraph::contains`] first.
    pub fn neighbors(&self, id: StationId) -> &[Connection] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first connection from `from` to `to`, if one exists.
    pub fn connection(&self, from: StationId, to: StationId) -> Option<&Connection> {
        self.neighbors(from).iter().find(|c| c.to == to)
    }

    /// All stations, ordered by id.
    pub fn stations(&self) -> Vec<&Station> {
        let mut all: Vec<&Station> = self.stations.values().collect();
        all.sort_by_key(|s| s.id);
        all
    }

    /// Number of stations.
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Number of directed connections.
    pub fn connection_count(&self) -> usize {
        self.connection_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> LineId {
        LineId::parse("KJL").unwrap()
    }

    fn conn(from: u32, to: u32, time_min: f64) -> Connection {
        Connection {
            from: StationId(from),
            to: StationId(to),
            line: line(),
            time_min,
        }
    }

    fn stations(names: &[&str]) -> Vec<Station> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Station::new(StationId(i as u32 + 1), *name))
            .collect()
    }

    #[test]
    fn build_empty() {
        let graph = NetworkGraph::build(Vec::new(), Vec::new()).unwrap();
        assert_eq!(graph.station_count(), 0);
        assert_eq!(graph.connection_count(), 0);
        assert!(graph.neighbors(StationId(1)).is_empty());
    }

    #[test]
    fn build_and_lookup() {
        let graph = NetworkGraph::build(
            stations(&["Gombak", "Taman Melati"]),
            vec![conn(1, 2, 3.0), conn(2, 1, 3.0)],
        )
        .unwrap();

        assert_eq!(graph.station_count(), 2);
        assert_eq!(graph.connection_count(), 2);
        assert_eq!(graph.get(StationId(1)).unwrap().name, "Gombak");
        assert!(graph.get(StationId(9)).is_none());

        let out = graph.neighbors(StationId(1));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to, StationId(2));
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let err =
            NetworkGraph::build(stations(&["Gombak"]), vec![conn(1, 2, 3.0)]).unwrap_err();
        assert_eq!(
            err,
            NetworkError::UnknownStation {
                station: StationId(2),
                line: line(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_id() {
        let dup = vec![
            Station::new(StationId(1), "Gombak"),
            Station::new(StationId(1), "KLCC"),
        ];
        let err = NetworkGraph::build(dup, Vec::new()).unwrap_err();
        assert_eq!(err, NetworkError::DuplicateStation(StationId(1)));
    }

    #[test]
    fn rejects_duplicate_normalised_name() {
        let dup = vec![
            Station::new(StationId(1), "Kajang"),
            Station::new(StationId(2), "KAJANG (MRT)"),
        ];
        let err = NetworkGraph::build(dup, Vec::new()).unwrap_err();
        assert!(matches!(err, NetworkError::DuplicateStationName { .. }));
    }

    #[test]
    fn rejects_bad_travel_time() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = NetworkGraph::build(
                stations(&["Gombak", "Taman Melati"]),
                vec![conn(1, 2, bad)],
            )
            .unwrap_err();
            assert!(matches!(err, NetworkError::InvalidTravelTime { .. }));
        }
    }

    #[test]
    fn accepts_one_way_connection() {
        // No reverse edge: asymmetric data, not a construction error.
        let graph = NetworkGraph::build(
            stations(&["Gombak", "Taman Melati"]),
            vec![conn(1, 2, 3.0)],
        )
        .unwrap();
        assert_eq!(graph.neighbors(StationId(1)).len(), 1);
        assert!(graph.neighbors(StationId(2)).is_empty());
    }

    #[test]
    fn zero_travel_time_is_valid() {
        let graph = NetworkGraph::build(
            stations(&["Gombak", "Taman Melati"]),
            vec![conn(1, 2, 0.0)],
        )
        .unwrap();
        assert_eq!(graph.connection(StationId(1), StationId(2)).unwrap().time_min, 0.0);
    }

    #[test]
    fn weight_per_metric() {
        let c = conn(1, 2, 5.5);
        assert_eq!(c.weight(Metric::Stops), 1.0);
        assert_eq!(c.weight(Metric::Time), 5.5);
    }

    #[test]
    fn name_lookup_is_normalised() {
        let graph = NetworkGraph::build(stations(&["Bukit Bintang"]), Vec::new()).unwrap();
        assert!(graph.station_by_name("bukit bintang").is_some());
        assert!(graph.station_by_name("  BUKIT   BINTANG ").is_some());
        assert!(graph.station_by_name("Bukit Bintang (MRT)").is_some());
        assert!(graph.station_by_name("Merdeka").is_none());
    }

    #[test]
    fn search_by_name_substring() {
        let graph =
            NetworkGraph::build(stations(&["Taman Melati", "Taman Jaya", "KLCC"]), Vec::new())
                .unwrap();

        let hits = graph.search_by_name("taman");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, StationId(1));
        assert_eq!(hits[1].id, StationId(2));

        assert!(graph.search_by_name("").is_empty());
        assert!(graph.search_by_name("monorail").is_empty());
    }

    #[test]
    fn neighbors_preserve_data_order() {
        let mut conns = vec![conn(1, 2, 3.0), conn(1, 3, 1.0), conn(1, 4, 2.0)];
        conns.push(conn(2, 1, 3.0));
        let graph = NetworkGraph::build(stations(&["A", "B", "C", "D"]), conns).unwrap();

        let order: Vec<StationId> = graph.neighbors(StationId(1)).iter().map(|c| c.to).collect();
        assert_eq!(order, vec![StationId(2), StationId(3), StationId(4)]);
    }

    #[test]
    fn stations_sorted_by_id() {
        let graph = NetworkGraph::build(stations(&["C", "A", "B"]), Vec::new()).unwrap();
        let ids: Vec<StationId> = graph.stations().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![StationId(1), StationId(2), StationId(3)]);
    }
}
