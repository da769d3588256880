//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};

use crate::domain::{Metric, Station, StationId};
use crate::planner::{self, Route};
use crate::sim::TrainId;

use super::dto::*;
use super::state::AppState;
use super::ws::ws_handler;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(stations))
        .route("/search_station", get(search_station))
        .route("/fare", get(fare))
        .route("/fare_by_name", get(fare_by_name))
        .route("/route", get(route_by_id))
        .route("/route_by_name", get(route_by_name))
        .route("/simulate_train", post(simulate_train))
        .route("/trains", get(trains_list))
        .route("/trains/:id", delete(trains_cancel))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List every station, ordered by id.
async fn stations(State(state): State<AppState>) -> Json<StationsResponse> {
    let data: Vec<StationDto> = state
        .graph
        .stations()
        .into_iter()
        .map(StationDto::from_station)
        .collect();

    Json(StationsResponse {
        count: data.len(),
        data,
    })
}

/// Substring search over station names.
async fn search_station(
    State(state): State<AppState>,
    Query(query): Query<SearchStationQuery>,
) -> Result<Json<SearchStationResponse>, AppError> {
    if query.q.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: "missing q".to_string(),
        });
    }

    let results = state
        .graph
        .search_by_name(&query.q)
        .into_iter()
        .map(StationDto::from_station)
        .collect();

    Ok(Json(SearchStationResponse { results }))
}

/// Fare between two station ids.
async fn fare(
    State(state): State<AppState>,
    Query(query): Query<FareQuery>,
) -> Result<Json<FareResponse>, AppError> {
    let (from_id, to_id) = (StationId(query.from), StationId(query.to));
    let price = state.fares.lookup(from_id, to_id)?;

    Ok(Json(FareResponse {
        from_id,
        to_id,
        price,
    }))
}

/// Fare between two station names.
async fn fare_by_name(
    State(state): State<AppState>,
    Query(query): Query<ByNameQuery>,
) -> Result<Json<FareByNameResponse>, AppError> {
    let from = resolve_station(&state, &query.from)?;
    let to = resolve_station(&state, &query.to)?;
    let price = state.fares.lookup(from.id, to.id)?;

    Ok(Json(FareByNameResponse {
        from: from.name.clone(),
        to: to.name.clone(),
        from_id: from.id,
        to_id: to.id,
        price,
    }))
}

/// Shortest route between two station ids.
async fn route_by_id(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, AppError> {
    let metric = parse_metric(query.mode.as_deref(), Metric::Stops)?;
    let route = plan_with_fare(&state, StationId(query.from), StationId(query.to), metric)?;
    route_response(&state, route)
}

/// Shortest route between two station names.
async fn route_by_name(
    State(state): State<AppState>,
    Query(query): Query<ByNameQuery>,
) -> Result<Json<RouteResponse>, AppError> {
    let metric = parse_metric(query.mode.as_deref(), Metric::Stops)?;
    let from = resolve_station(&state, &query.from)?.id;
    let to = resolve_station(&state, &query.to)?.id;
    let route = plan_with_fare(&state, from, to, metric)?;
    route_response(&state, route)
}

/// Plan a route and start a simulated train along it.
async fn simulate_train(
    State(state): State<AppState>,
    Json(request): Json<SimulateTrainRequest>,
) -> Result<Json<SimulateTrainResponse>, AppError> {
    let metric = parse_metric(request.mode.as_deref(), Metric::Time)?;
    let speed = request.speed.unwrap_or(1.0);
    if !(speed.is_finite() && speed > 0.0) {
        return Err(AppError::BadRequest {
            message: "speed must be > 0".to_string(),
        });
    }

    let from = resolve_station(&state, &request.from)?.id;
    let to = resolve_station(&state, &request.to)?.id;
    let route = plan_with_fare(&state, from, to, metric)?;

    let path = station_names(&state, &route.stations);
    let total_time_min = route.total_time_min;
    let fare = route.fare;

    // Per-train speed compresses the route's own timings; the engine's
    // global compression applies on top.
    let mut paced = route;
    if speed != 1.0 {
        for minutes in &mut paced.edge_times {
            *minutes /= speed;
        }
        paced.total_time_min /= speed;
    }

    let train_id = state.engine.start(paced)?;

    Ok(Json(SimulateTrainResponse {
        ok: true,
        train_id,
        path,
        total_time_min,
        fare,
    }))
}

/// List active trains.
async fn trains_list(State(state): State<AppState>) -> Json<TrainsResponse> {
    Json(TrainsResponse {
        trains: state.engine.active(),
    })
}

/// Cancel a running train. Cancelling an unknown or finished train
/// reports `ok: false` rather than failing.
async fn trains_cancel(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Json<CancelResponse> {
    let train_id = TrainId(id);
    Json(CancelResponse {
        ok: state.engine.cancel(train_id),
        train_id,
    })
}

/// Resolve a station by display name.
fn resolve_station<'a>(state: &'a AppState, name: &str) -> Result<&'a Station, AppError> {
    state
        .graph
        .station_by_name(name)
        .ok_or_else(|| AppError::NotFound {
            message: format!("station name not found: {name}"),
        })
}

/// Parse an optional metric parameter.
fn parse_metric(mode: Option<&str>, default: Metric) -> Result<Metric, AppError> {
    match mode {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: crate::domain::InvalidMetric| {
            AppError::BadRequest {
                message: e.to_string(),
            }
        }),
    }
}

/// Plan a route and attach the pair's fare when the schedule has one.
/// A missing fare entry does not fail the route.
fn plan_with_fare(
    state: &AppState,
    from: StationId,
    to: StationId,
    metric: Metric,
) -> Result<Route, AppError> {
    let route = planner::plan(&state.graph, from, to, metric)?;
    match state.fares.lookup(from, to) {
        Ok(amount) => Ok(route.with_fare(amount)),
        Err(_) => Ok(route),
    }
}

fn station_names(state: &AppState, ids: &[StationId]) -> Vec<String> {
    ids.iter()
        .filter_map(|&id| state.graph.get(id))
        .map(|s| s.name.clone())
        .collect()
}

fn route_response(state: &AppState, route: Route) -> Result<Json<RouteResponse>, AppError> {
    let path_names = station_names(state, &route.stations);

    Ok(Json(RouteResponse {
        from_id: route.origin(),
        to_id: route.destination(),
        mode: route.metric,
        path_ids: route.stations.clone(),
        path_names,
        total_stops: route.total_stops(),
        total_time: route.total_time_min,
        fare: route.fare,
    }))
}
