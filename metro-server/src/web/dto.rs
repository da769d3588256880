//! Request and response types for the web API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Metric, Station, StationId};
use crate::fare::FareError;
use crate::planner::PlanError;
use crate::sim::{SimError, TrainId, TrainSnapshot};

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A station as exposed by the API.
#[derive(Debug, Serialize)]
pub struct StationDto {
    pub station_id: StationId,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StationDto {
    pub fn from_station(station: &Station) -> Self {
        Self {
            station_id: station.id,
            name: station.name.clone(),
            latitude: station.coord.map(|c| c.latitude),
            longitude: station.coord.map(|c| c.longitude),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub count: usize,
    pub data: Vec<StationDto>,
}

#[derive(Debug, Deserialize)]
pub struct SearchStationQuery {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchStationResponse {
    pub results: Vec<StationDto>,
}

#[derive(Debug, Deserialize)]
pub struct FareQuery {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Serialize)]
pub struct FareResponse {
    pub from_id: StationId,
    pub to_id: StationId,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct ByNameQuery {
    pub from: String,
    pub to: String,
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FareByNameResponse {
    pub from: String,
    pub to: String,
    pub from_id: StationId,
    pub to_id: StationId,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub from: u32,
    pub to: u32,
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub from_id: StationId,
    pub to_id: StationId,
    pub mode: Metric,
    pub path_ids: Vec<StationId>,
    pub path_names: Vec<String>,
    pub total_stops: usize,
    pub total_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fare: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SimulateTrainRequest {
    pub from: String,
    pub to: String,
    /// Metric name; defaults to `time`, which paces the train by the
    /// network's actual segment times.
    pub mode: Option<String>,
    /// Extra per-train time compression on top of the engine's own;
    /// defaults to 1.0.
    pub speed: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SimulateTrainResponse {
    pub ok: bool,
    pub train_id: TrainId,
    pub path: Vec<String>,
    pub total_time_min: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fare: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TrainsResponse {
    pub trains: Vec<TrainSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub ok: bool,
    pub train_id: TrainId,
}

/// Application error type.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        AppError::NotFound {
            message: e.to_string(),
        }
    }
}

impl From<FareError> for AppError {
    fn from(e: FareError) -> Self {
        AppError::NotFound {
            message: e.to_string(),
        }
    }
}

impl From<SimError> for AppError {
    fn from(e: SimError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_errors_map_to_not_found() {
        let err: AppError = PlanError::UnknownStation(StationId(9)).into();
        assert_eq!(
            err,
            AppError::NotFound {
                message: "unknown station 9".to_string()
            }
        );

        let err: AppError = PlanError::NoRoute {
            origin: StationId(1),
            destination: StationId(2),
        }
        .into();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn fare_errors_map_to_not_found() {
        let err: AppError = FareError::NotFound {
            origin: StationId(1),
            destination: StationId(2),
        }
        .into();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn sim_errors_map_to_bad_request() {
        let err: AppError = SimError::EmptyRoute.into();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[test]
    fn station_dto_carries_coordinates() {
        let station = Station::new(StationId(1), "KLCC").with_coord(3.1579, 101.7123);
        let dto = StationDto::from_station(&station);
        assert_eq!(dto.latitude, Some(3.1579));

        let bare = Station::new(StationId(2), "Kajang");
        let dto = StationDto::from_station(&bare);
        assert_eq!(dto.latitude, None);
        assert_eq!(dto.longitude, None);
    }
}
