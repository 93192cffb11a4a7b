use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::info;

use crate::location::{Coordinate, CoordinateEntry, LocationError, Resolver};
use crate::logistics::{
    DeliveryEstimate, DurationDetails, EstimateError, EstimateRequest, Estimator, RouteDuration,
};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

impl From<EstimateError> for ApiError {
    fn from(e: EstimateError) -> Self {
        let status = match e {
            EstimateError::NotFound(_) => StatusCode::NOT_FOUND,
            EstimateError::InvalidInput(_)
            | EstimateError::UnsupportedMode(_)
            | EstimateError::MissingInput
            | EstimateError::InvalidDate(_)
            | EstimateError::DateOutOfRange { .. } => StatusCode::BAD_REQUEST,
        };
        api_error(status, e.to_string())
    }
}

impl From<LocationError> for ApiError {
    fn from(e: LocationError) -> Self {
        api_error(StatusCode::NOT_FOUND, e.to_string())
    }
}

/// One access line per request, whatever the outcome.
fn access_log<T>(method: &str, route: &str, subject: &str, start: Instant, result: &Result<T, ApiError>) {
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    match result {
        Ok(_) => info!(method, route, subject, status = 200u16, elapsed_ms, "request"),
        Err(ApiError(status, msg)) => info!(
            method,
            route,
            subject,
            status = status.as_u16(),
            error = %msg,
            elapsed_ms,
            "request"
        ),
    }
}

// ─── GET /api/resolve, /api/exact ────────────────────────────────

#[derive(Deserialize)]
pub struct LookupQuery {
    pub query: Option<String>,
}

#[derive(Serialize)]
pub struct LookupResponse {
    pub query: String,
    pub name: String,
    pub coords: Coordinate,
}

#[derive(Clone, Copy)]
enum Lookup {
    Resolve,
    Exact,
}

impl Lookup {
    fn route(self) -> &'static str {
        match self {
            Self::Resolve => "/api/resolve",
            Self::Exact => "/api/exact",
        }
    }
}

fn lookup(state: &AppState, params: LookupQuery, kind: Lookup) -> Result<Json<LookupResponse>, ApiError> {
    let start = Instant::now();
    let query = params.query.unwrap_or_default();
    let result = find(state, &query, kind);
    access_log("GET", kind.route(), &query, start, &result);
    result
}

fn find(state: &AppState, query: &str, kind: Lookup) -> Result<Json<LookupResponse>, ApiError> {
    if query.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'query' parameter"));
    }

    let resolver = Resolver::new(&state.index);
    let found: Option<&CoordinateEntry> = match kind {
        Lookup::Resolve => resolver.resolve_entry(query),
        Lookup::Exact => resolver.exact_entry(query),
    };
    let entry = found.ok_or_else(|| LocationError::NotFound(query.to_string()))?;

    Ok(Json(LookupResponse {
        query: query.to_string(),
        name: entry.name.clone(),
        coords: entry.coords,
    }))
}

pub async fn resolve(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<LookupResponse>, ApiError> {
    lookup(&state, params, Lookup::Resolve)
}

pub async fn exact(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<LookupResponse>, ApiError> {
    lookup(&state, params, Lookup::Exact)
}

// ─── GET /api/locations ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct LocationsQuery {
    pub filter: Option<String>,
    pub limit: Option<usize>,
}

pub async fn locations(
    State(state): State<AppState>,
    Query(params): Query<LocationsQuery>,
) -> Json<Vec<String>> {
    let names = state.index.search_names(params.filter.as_deref(), params.limit);
    Json(names.into_iter().map(str::to_string).collect())
}

// ─── POST /api/estimate/* ────────────────────────────────────────

fn parse_request(payload: Result<Json<Value>, JsonRejection>) -> Result<EstimateRequest, ApiError> {
    let Json(value) = payload.map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))?;
    Ok(EstimateRequest::from_value(value)?)
}

/// Short form of a request for the access log.
fn describe(request: &EstimateRequest) -> String {
    let mode = request.transportation_mode.as_deref().unwrap_or("");
    match (request.provided_distance(), request.route()) {
        (Some(km), _) => format!("{} {} km", mode, km),
        (None, Some((origin, destination))) => format!("{} {} -> {}", mode, origin, destination),
        (None, None) => mode.to_string(),
    }
}

fn estimate<T>(
    route: &str,
    payload: Result<Json<Value>, JsonRejection>,
    compute: impl FnOnce(&EstimateRequest) -> Result<T, EstimateError>,
) -> Result<Json<T>, ApiError> {
    let start = Instant::now();
    let mut subject = String::new();
    let result = parse_request(payload).and_then(|request| {
        subject = describe(&request);
        compute(&request).map(Json).map_err(ApiError::from)
    });
    access_log("POST", route, &subject, start, &result);
    result
}

pub async fn estimate_duration(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RouteDuration>, ApiError> {
    estimate("/api/estimate/duration", payload, |request| {
        Estimator::new(&state.index).estimate_route_duration(request)
    })
}

pub async fn estimate_details(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DurationDetails>, ApiError> {
    estimate("/api/estimate/details", payload, |request| {
        Estimator::new(&state.index).calculate_duration_details(request)
    })
}

pub async fn estimate_delivery(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DeliveryEstimate>, ApiError> {
    estimate("/api/estimate/delivery", payload, |request| {
        Estimator::new(&state.index).estimate_shipment_delivery(request)
    })
}
