//! Shortest-path search over the network graph.
//!
//! Two strategies behind one entry point: plain breadth-first search for
//! the hop-count metric (every connection costs 1, so BFS settles stations
//! in optimal order without a priority queue), and binary-heap Dijkstra for
//! the travel-time metric, where weights are heterogeneous but never
//! negative. Both stop as soon as the destination is settled.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use crate::domain::{Metric, StationId};
use crate::network::NetworkGraph;

use super::route::Route;

/// Planning failure, surfaced directly to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// The origin or destination id is not part of the network.
    #[error("unknown station {0}")]
    UnknownStation(StationId),

    /// Both stations exist but no connection sequence joins them.
    #[error("no route from {origin} to {destination}")]
    NoRoute {
        origin: StationId,
        destination: StationId,
    },
}

/// Predecessor map: station -> (previous station, minutes of the edge used).
type PrevMap = HashMap<StationId, (StationId, f64)>;

/// Plan a route from `origin` to `destination` under `metric`.
///
/// Pure function of its inputs: the same graph and arguments always produce
/// the same route, including when several optimal paths exist (traversal
/// follows the graph's stable connection order).
pub fn plan(
    graph: &NetworkGraph,
    origin: StationId,
    destination: StationId,
    metric: Metric,
) -> Result<Route, PlanError> {
    for station in [origin, destination] {
        if !graph.contains(station) {
            return Err(PlanError::UnknownStation(station));
        }
    }

    if origin == destination {
        return Ok(Route {
            stations: vec![origin],
            edge_times: Vec::new(),
            metric,
            total_time_min: 0.0,
            fare: None,
        });
    }

    let prev = match metric {
        Metric::Stops => shortest_by_stops(graph, origin, destination),
        Metric::Time => shortest_by_time(graph, origin, destination),
    }
    .ok_or(PlanError::NoRoute {
        origin,
        destination,
    })?;

    Ok(reconstruct(&prev, origin, destination, metric))
}

/// BFS for the hop-count metric. Returns the predecessor map when the
/// destination was reached, `None` otherwise.
fn shortest_by_stops(
    graph: &NetworkGraph,
    origin: StationId,
    destination: StationId,
) -> Option<PrevMap> {
    let mut prev: PrevMap = HashMap::new();
    let mut queue: VecDeque<StationId> = VecDeque::new();
    queue.push_back(origin);

    while let Some(station) = queue.pop_front() {
        if station == destination {
            return Some(prev);
        }

        for conn in graph.neighbors(station) {
            if conn.to != origin && !prev.contains_key(&conn.to) {
                prev.insert(conn.to, (station, conn.time_min));
                queue.push_back(conn.to);
            }
        }
    }

    None
}

/// Min-heap entry for Dijkstra. `BinaryHeap` is a max-heap, so the ordering
/// is inverted; `total_cmp` gives `f64` the total order `Ord` needs.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    cost: f64,
    station: StationId,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.station.cmp(&self.station))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra for the travel-time metric. Returns the predecessor map when
/// the destination was settled, `None` otherwise.
fn shortest_by_time(
    graph: &NetworkGraph,
    origin: StationId,
    destination: StationId,
) -> Option<PrevMap> {
    let mut prev: PrevMap = HashMap::new();
    let mut dist: HashMap<StationId, f64> = HashMap::new();
    let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::new();

    dist.insert(origin, 0.0);
    heap.push(HeapEntry {
        cost: 0.0,
        station: origin,
    });

    while let Some(HeapEntry { cost, station }) = heap.pop() {
        if station == destination {
            return Some(prev);
        }

        // Stale entry: a shorter path to this station was already settled.
        if dist.get(&station).is_some_and(|&d| cost > d) {
            continue;
        }

        for conn in graph.neighbors(station) {
            let next_cost = cost + conn.time_min;
            let improved = dist.get(&conn.to).is_none_or(|&d| next_cost < d);
            if improved && conn.to != origin {
                dist.insert(conn.to, next_cost);
                prev.insert(conn.to, (station, conn.time_min));
                heap.push(HeapEntry {
                    cost: next_cost,
                    station: conn.to,
                });
            }
        }
    }

    None
}

/// Walk the predecessor map back from the destination and build the route.
fn reconstruct(
    prev: &PrevMap,
    origin: StationId,
    destination: StationId,
    metric: Metric,
) -> Route {
    let mut stations = vec![destination];
    let mut edge_times = Vec::new();

    let mut current = destination;
    while current != origin {
        // Reachability was established before reconstruction, so every
        // station on the path has a predecessor.
        let &(before, time_min) = &prev[&current];
        stations.push(before);
        edge_times.push(time_min);
        current = before;
    }

    stations.reverse();
    edge_times.reverse();
    let total_time_min = edge_times.iter().sum();

    Route {
        stations,
        edge_times,
        metric,
        total_time_min,
        fare: None,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{LineId, Station};
    use crate::network::Connection;
    use proptest::prelude::*;

    /// Small random undirected networks: up to 6 stations, arbitrary edge
    /// subsets with times in [0.1, 20].
    fn arb_network() -> impl Strategy<Value = (NetworkGraph, u32)> {
        (2u32..=6).prop_flat_map(|n| {
            let edge = (1..=n, 1..=n, 0.1f64..20.0);
            proptest::collection::vec(edge, 0..12).prop_map(move |edges| {
                let stations = (1..=n)
                    .map(|i| Station::new(StationId(i), format!("S{i}")))
                    .collect();

                let line = LineId::parse("PRP").unwrap();
                let mut connections = Vec::new();
                for (a, b, time_min) in edges {
                    if a == b {
                        continue;
                    }
                    for (from, to) in [(a, b), (b, a)] {
                        connections.push(Connection {
                            from: StationId(from),
                            to: StationId(to),
                            line: line.clone(),
                            time_min,
                        });
                    }
                }

                (NetworkGraph::build(stations, connections).unwrap(), n)
            })
        })
    }

    /// Exhaustive minimum over simple paths: (hops, minutes), or None when
    /// disconnected.
    fn brute_force(
        graph: &NetworkGraph,
        from: StationId,
        to: StationId,
    ) -> Option<(usize, f64)> {
        fn walk(
            graph: &NetworkGraph,
            to: StationId,
            path: &mut Vec<StationId>,
            time_so_far: f64,
            best_hops: &mut Option<usize>,
            best_time: &mut Option<f64>,
        ) {
            let current = *path.last().unwrap();
            if current == to {
                let hops = path.len() - 1;
                *best_hops = Some(best_hops.map_or(hops, |b| b.min(hops)));
                *best_time = Some(best_time.map_or(time_so_far, |b: f64| b.min(time_so_far)));
                return;
            }
            for conn in graph.neighbors(current).to_vec() {
                if !path.contains(&conn.to) {
                    path.push(conn.to);
                    walk(graph, to, path, time_so_far + conn.time_min, best_hops, best_time);
                    path.pop();
                }
            }
        }

        let mut best_hops = None;
        let mut best_time = None;
        walk(graph, to, &mut vec![from], 0.0, &mut best_hops, &mut best_time);
        best_hops.zip(best_time)
    }

    proptest! {
        /// BFS hop counts match the exhaustive minimum, and Dijkstra times
        /// match the exhaustive minimum, on every reachable pair.
        #[test]
        fn optimal_against_brute_force((graph, n) in arb_network()) {
            for from in 1..=n {
                for to in 1..=n {
                    let (from, to) = (StationId(from), StationId(to));
                    let truth = if from == to {
                        Some((0, 0.0))
                    } else {
                        brute_force(&graph, from, to)
                    };

                    match truth {
                        Some((min_hops, min_time)) => {
                            let by_stops = plan(&graph, from, to, Metric::Stops).unwrap();
                            prop_assert_eq!(by_stops.total_stops(), min_hops);

                            let by_time = plan(&graph, from, to, Metric::Time).unwrap();
                            prop_assert!((by_time.total_time_min - min_time).abs() < 1e-9);
                        }
                        None => {
                            prop_assert_eq!(
                                plan(&graph, from, to, Metric::Stops),
                                Err(PlanError::NoRoute { origin: from, destination: to })
                            );
                            prop_assert_eq!(
                                plan(&graph, from, to, Metric::Time),
                                Err(PlanError::NoRoute { origin: from, destination: to })
                            );
                        }
                    }
                }
            }
        }

        /// Route invariants hold for every successful plan.
        #[test]
        fn route_shape_invariants((graph, n) in arb_network()) {
            for to in 1..=n {
                let Ok(route) = plan(&graph, StationId(1), StationId(to), Metric::Time) else {
                    continue;
                };
                prop_assert!(!route.stations.is_empty());
                prop_assert_eq!(route.edge_times.len(), route.stations.len() - 1);
                for pair in route.stations.windows(2) {
                    prop_assert!(graph.connection(pair[0], pair[1]).is_some());
                }
            }
        }
    }
}
