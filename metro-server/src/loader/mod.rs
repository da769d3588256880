//! CSV ingestion.
//!
//! Reads the network's data directory and produces plain station,
//! connection, and fare collections for [`NetworkGraph::build`] and
//! [`FareTable::build`]. The expected files:
//!
//! - `Fare.csv`: matrix; first column is the origin station name, the
//!   header row the destination names, each cell a fare. Blank, `-`, `NA`
//!   and `N/A` cells mean "no entry".
//! - `Route.csv`: one row per line, either a plain comma-separated
//!   station sequence or the bracketed form `KJL [ A > B > ... ]` where
//!   the prefix is the line code. Adjacent stations become connections in
//!   both directions.
//! - `Time.csv`: matrix of per-segment minutes, keyed like `Fare.csv`.
//!   Segments without a positive time fall back to a one-minute weight.
//! - `stations_coords.csv` (optional): `name,latitude,longitude`.
//!
//! Missing files are skipped; station names that cannot be resolved are
//! logged and skipped. Graph-level validation is not done here; that is
//! [`NetworkGraph::build`]'s job.
//!
//! [`NetworkGraph::build`]: crate::network::NetworkGraph::build
//! [`FareTable::build`]: crate::fare::FareTable::build

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::{LineId, Station, StationId, name_key};
use crate::fare::FareEntry;
use crate::network::Connection;

/// Default per-segment minutes when `Time.csv` has no positive entry.
const DEFAULT_EDGE_MIN: f64 = 1.0;

/// Error reading the data directory.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A data file exists but could not be read or parsed.
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// No station names could be collected from any data file.
    #[error("no stations found under {dir}")]
    NoStations { dir: PathBuf },
}

/// Everything the data directory yields, ready for graph and fare-table
/// construction.
#[derive(Debug, Clone)]
pub struct LoadedNetwork {
    pub stations: Vec<Station>,
    pub connections: Vec<Connection>,
    pub fares: Vec<FareEntry>,
}

/// Load a data directory.
pub fn load_dir(dir: &Path) -> Result<LoadedNetwork, LoadError> {
    let fare_matrix = read_matrix(&dir.join("Fare.csv"))?;
    let time_matrix = read_matrix(&dir.join("Time.csv"))?;
    let route_rows = read_rows(&dir.join("Route.csv"))?;

    // Station names come from the fare matrix (origins and destinations);
    // when there is no fare data, fall back to the route sequences and the
    // time matrix header. Sorted-name order makes id assignment stable.
    let mut names: BTreeSet<String> = BTreeSet::new();
    if let Some(matrix) = &fare_matrix {
        names.extend(matrix.header.iter().cloned());
        names.extend(matrix.rows.iter().map(|(origin, _)| origin.clone()));
    }
    if names.is_empty() {
        for row in &route_rows {
            let (_, sequence) = parse_route_row(row);
            names.extend(sequence);
        }
        if let Some(matrix) = &time_matrix {
            names.extend(matrix.header.iter().cloned());
        }
    }

    if names.is_empty() {
        return Err(LoadError::NoStations {
            dir: dir.to_path_buf(),
        });
    }

    let mut stations: Vec<Station> = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| Station::new(StationId(i as u32 + 1), name))
        .collect();

    let ids_by_key: HashMap<String, StationId> = stations
        .iter()
        .map(|s| (s.name_key(), s.id))
        .collect();

    apply_coords(&dir.join("stations_coords.csv"), &mut stations)?;

    let fares = fare_matrix
        .map(|matrix| collect_fares(&matrix, &ids_by_key))
        .unwrap_or_default();

    let times = time_matrix.map(collect_times).unwrap_or_default();
    let connections = collect_connections(&route_rows, &ids_by_key, &times);

    debug!(
        stations = stations.len(),
        connections = connections.len(),
        fares = fares.len(),
        "data directory loaded"
    );

    Ok(LoadedNetwork {
        stations,
        connections,
        fares,
    })
}

/// A station-by-station matrix file: destination names in the header row,
/// one row per origin.
struct Matrix {
    header: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
}

/// Read a matrix file; `Ok(None)` when it does not exist.
fn read_matrix(path: &Path) -> Result<Option<Matrix>, LoadError> {
    let Some(records) = raw_records(path)? else {
        return Ok(None);
    };

    let mut records = records.into_iter();
    let Some(first) = records.next() else {
        return Ok(Some(Matrix {
            header: Vec::new(),
            rows: Vec::new(),
        }));
    };

    // First header cell is the empty origin-column label.
    let header: Vec<String> = first
        .iter()
        .skip(1)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let mut rows = Vec::new();
    for record in records {
        let Some(origin) = record.first().map(|c| c.trim()) else {
            continue;
        };
        if origin.is_empty() {
            continue;
        }
        let cells = record.iter().skip(1).map(|c| c.trim().to_string()).collect();
        rows.push((origin.to_string(), cells));
    }

    Ok(Some(Matrix { header, rows }))
}

/// Read a file as raw string records; `Ok(None)` when it does not exist.
fn raw_records(path: &Path) -> Result<Option<Vec<Vec<String>>>, LoadError> {
    if !path.exists() {
        debug!(path = %path.display(), "data file not present, skipping");
        return Ok(None);
    }

    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(Some(records))
}

fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, LoadError> {
    Ok(raw_records(path)?.unwrap_or_default())
}

/// Split a `Route.csv` row into an optional line code and a station
/// sequence. The bracketed form `KJL [ A > B > C ]` carries its line code;
/// a plain comma-separated row does not.
fn parse_route_row(row: &[String]) -> (Option<String>, Vec<String>) {
    let joined = row.join(" ");
    if let (Some(open), Some(close)) = (joined.find('['), joined.rfind(']')) {
        if open < close {
            let inner = &joined[open + 1..close];
            if inner.contains('>') {
                let code = joined[..open].trim();
                let sequence = inner
                    .split('>')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                let code = (!code.is_empty()).then(|| code.to_string());
                return (code, sequence);
            }
        }
    }

    let sequence = row
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    (None, sequence)
}

/// Parse a fare or time cell. Blank and placeholder cells are `None`;
/// thousands separators are tolerated.
fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || matches!(cell, "-" | "NA" | "N/A") {
        return None;
    }
    cell.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn collect_fares(matrix: &Matrix, ids_by_key: &HashMap<String, StationId>) -> Vec<FareEntry> {
    let dest_ids: Vec<Option<StationId>> = matrix
        .header
        .iter()
        .map(|name| ids_by_key.get(&name_key(name)).copied())
        .collect();

    let mut fares = Vec::new();
    for (origin_name, cells) in &matrix.rows {
        let Some(&origin) = ids_by_key.get(&name_key(origin_name)) else {
            warn!(station = %origin_name, "fare row for unknown station, skipping");
            continue;
        };

        for (destination, cell) in dest_ids.iter().zip(cells) {
            let (Some(destination), Some(amount)) = (destination, parse_cell(cell)) else {
                continue;
            };
            fares.push(FareEntry {
                origin,
                destination: *destination,
                amount,
            });
        }
    }

    fares
}

/// Per-segment minutes keyed by normalised (origin, destination) names.
fn collect_times(matrix: Matrix) -> HashMap<(String, String), f64> {
    let dest_keys: Vec<String> = matrix.header.iter().map(|n| name_key(n)).collect();

    let mut times = HashMap::new();
    for (origin_name, cells) in &matrix.rows {
        let origin_key = name_key(origin_name);
        for (dest_key, cell) in dest_keys.iter().zip(cells) {
            if let Some(minutes) = parse_cell(cell) {
                times.insert((origin_key.clone(), dest_key.clone()), minutes);
            }
        }
    }

    times
}

fn collect_connections(
    route_rows: &[Vec<String>],
    ids_by_key: &HashMap<String, StationId>,
    times: &HashMap<(String, String), f64>,
) -> Vec<Connection> {
    let mut connections = Vec::new();
    let mut seen: HashSet<(StationId, StationId)> = HashSet::new();

    for (row_index, row) in route_rows.iter().enumerate() {
        let (code, sequence) = parse_route_row(row);
        if sequence.len() < 2 {
            continue;
        }

        // Rows without a usable code get a synthetic per-row one.
        let line = code
            .as_deref()
            .and_then(|c| LineId::parse(c).ok())
            .unwrap_or_else(|| {
                LineId::parse(&format!("L{}", row_index + 1)).expect("synthetic code is valid")
            });

        for pair in sequence.windows(2) {
            let a_key = name_key(&pair[0]);
            let b_key = name_key(&pair[1]);
            let (Some(&a), Some(&b)) = (ids_by_key.get(&a_key), ids_by_key.get(&b_key)) else {
                warn!(from = %pair[0], to = %pair[1], line = %line, "route segment references unknown station, skipping");
                continue;
            };

            for (from, to, from_key, to_key) in
                [(a, b, &a_key, &b_key), (b, a, &b_key, &a_key)]
            {
                if !seen.insert((from, to)) {
                    continue;
                }
                let time_min = match times.get(&(from_key.clone(), to_key.clone())) {
                    Some(&minutes) if minutes > 0.0 => minutes,
                    _ => DEFAULT_EDGE_MIN,
                };
                connections.push(Connection {
                    from,
                    to,
                    line: line.clone(),
                    time_min,
                });
            }
        }
    }

    connections
}

/// Attach coordinates from `stations_coords.csv`, matched by normalised
/// name. Missing file or unmatched rows are fine.
fn apply_coords(path: &Path, stations: &mut [Station]) -> Result<(), LoadError> {
    let Some(records) = raw_records(path)? else {
        return Ok(());
    };

    let mut records = records.into_iter();
    let Some(header) = records.next() else {
        return Ok(());
    };

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let (Some(name_col), Some(lat_col), Some(lon_col)) =
        (column("name"), column("latitude"), column("longitude"))
    else {
        warn!(path = %path.display(), "coordinate file missing name/latitude/longitude headers, skipping");
        return Ok(());
    };

    let mut coords: HashMap<String, (f64, f64)> = HashMap::new();
    for record in records {
        let (Some(name), Some(lat), Some(lon)) = (
            record.get(name_col),
            record.get(lat_col).and_then(|c| parse_cell(c)),
            record.get(lon_col).and_then(|c| parse_cell(c)),
        ) else {
            continue;
        };
        coords.insert(name_key(name), (lat, lon));
    }

    let mut updated = 0usize;
    for station in stations.iter_mut() {
        if let Some(&(lat, lon)) = coords.get(&station.name_key()) {
            *station = station.clone().with_coord(lat, lon);
            updated += 1;
        }
    }
    debug!(updated, "station coordinates applied");

    Ok(())
}
