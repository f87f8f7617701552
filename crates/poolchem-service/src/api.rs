//! REST API endpoints for the poolchem-service.
//!
//! Every endpoint except `/api/health` and `/api/targets/default` is scoped
//! to the organization named by the `X-Org-Id` header (see [`OrgScope`]).
//! Pools and readings of other organizations behave as if they did not exist.
//!
//! # Concurrency and Lock Acquisition
//!
//! `state.store` is a Mutex held only for the duration of a database call.
//! The dosing endpoint goes through [`AppState`]'s `PoolDirectory`
//! implementation, which takes the lock once per lookup.
//!
//! ## Error Handling
//!
//! All endpoints return structured JSON errors via [`AppError`]: unknown
//! pools and readings return 404, invalid input returns 400 and storage
//! failures return 500.
//!
//! # Example
//!
//! ```ignore
//! use poolchem_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, warn};

use poolchem_core::{ReadingValidator, StatusReport, evaluate_status, recommend, resolve_targets};
use poolchem_store::{NewPool, ReadingQuery, StoredPool};
use poolchem_types::{
    ChemistrySnapshot, DosingRequest, DosingResponse, OrgId, Reading, TargetProfile,
};

use crate::state::AppState;

/// Header carrying the caller's organization.
pub const ORG_HEADER: &str = "x-org-id";

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/targets/default", get(default_targets))
        // Pools
        .route("/api/pools", post(create_pool).get(list_pools))
        .route("/api/pools/{id}", get(get_pool))
        .route("/api/pools/{id}/targets", put(update_targets))
        .route("/api/pools/{id}/readings", post(add_reading).get(get_readings))
        .route("/api/pools/{id}/readings/latest", get(get_latest_reading))
        .route("/api/pools/{id}/status", get(get_status))
        // Dosing
        .route("/api/dosing/recommendations", post(dosing_recommendations))
}

/// Organization scope of a request, taken from the `X-Org-Id` header.
///
/// A missing, empty or non-UTF-8 header is rejected with 400.
#[derive(Debug, Clone)]
pub struct OrgScope(pub OrgId);

impl<S> FromRequestParts<S> for OrgScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let org = parts
            .headers
            .get(ORG_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing X-Org-Id header".to_string()))?;

        Ok(OrgScope(OrgId::new(org)))
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Per-request timeout the server runs with.
    pub request_timeout_secs: u64,
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        request_timeout_secs: state.config.server.request_timeout_secs,
    })
}

/// The built-in target profile used when a pool has none.
async fn default_targets() -> Json<TargetProfile> {
    Json(TargetProfile::DEFAULT)
}

// === Pools ===

/// Create a pool.
///
/// # Errors
///
/// - [`AppError::BadRequest`] if the name is empty, the volume is not a
///   positive number or the target profile does not parse.
async fn create_pool(
    State(state): State<Arc<AppState>>,
    OrgScope(org): OrgScope,
    payload: Result<Json<NewPool>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredPool>), AppError> {
    let Json(pool) = payload?;

    if pool.name.trim().is_empty() {
        return Err(AppError::BadRequest("Pool name cannot be empty".to_string()));
    }
    if let Some(volume) = pool.volume_l
        && !(volume.is_finite() && volume > 0.0)
    {
        return Err(AppError::BadRequest(format!(
            "Invalid pool volume: {} (must be a positive number of liters)",
            volume
        )));
    }
    if let Some(targets) = &pool.targets {
        check_targets(targets)?;
    }

    let store = state.store.lock().await;
    let created = store.create_pool(&org, &pool)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List the caller's pools.
async fn list_pools(
    State(state): State<Arc<AppState>>,
    OrgScope(org): OrgScope,
) -> Result<Json<Vec<StoredPool>>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.list_pools(&org)?))
}

/// Get a pool.
async fn get_pool(
    State(state): State<Arc<AppState>>,
    OrgScope(org): OrgScope,
    Path(id): Path<String>,
) -> Result<Json<StoredPool>, AppError> {
    let store = state.store.lock().await;
    let pool = store
        .get_pool(&org, &id)?
        .ok_or_else(|| AppError::NotFound(format!("Pool not found: {}", id)))?;
    Ok(Json(pool))
}

/// Replace a pool's target profile. A JSON `null` body clears it.
///
/// # Errors
///
/// - [`AppError::BadRequest`] if the profile does not parse.
/// - [`AppError::NotFound`] if the pool does not exist.
async fn update_targets(
    State(state): State<Arc<AppState>>,
    OrgScope(org): OrgScope,
    Path(id): Path<String>,
    payload: Result<Json<Option<Value>>, JsonRejection>,
) -> Result<Json<StoredPool>, AppError> {
    let Json(targets) = payload?;
    if let Some(targets) = &targets {
        check_targets(targets)?;
    }

    let store = state.store.lock().await;
    let pool = store.update_pool_targets(&org, &id, targets.as_ref())?;
    Ok(Json(pool))
}

fn check_targets(targets: &Value) -> Result<(), AppError> {
    TargetProfile::parse(targets)
        .map(|_| ())
        .map_err(|e| AppError::BadRequest(format!("Invalid target profile: {}", e)))
}

// === Readings ===

/// Request to store a reading.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReadingRequest {
    /// When the water was tested. Defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub captured_at: Option<OffsetDateTime>,
    #[serde(flatten)]
    pub chemistry: ChemistrySnapshot,
}

/// A stored reading plus any soft validation findings.
#[derive(Debug, Serialize)]
pub struct ReadingResponse {
    #[serde(flatten)]
    pub reading: Reading,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Store a reading for a pool.
///
/// # Errors
///
/// - [`AppError::BadRequest`] if the reading is physically implausible.
/// - [`AppError::NotFound`] if the pool does not exist.
async fn add_reading(
    State(state): State<Arc<AppState>>,
    OrgScope(org): OrgScope,
    Path(id): Path<String>,
    payload: Result<Json<NewReadingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReadingResponse>), AppError> {
    let Json(request) = payload?;
    let warnings = validate_chemistry(&request.chemistry)?;

    let store = state.store.lock().await;
    let reading = store.insert_reading(&org, &id, request.captured_at, &request.chemistry)?;
    Ok((StatusCode::CREATED, Json(ReadingResponse { reading, warnings })))
}

/// Reject implausible chemistry, returning soft findings as strings.
fn validate_chemistry(chemistry: &ChemistrySnapshot) -> Result<Vec<String>, AppError> {
    let warnings = ReadingValidator::default().validate(chemistry).into_result()?;
    if !warnings.is_empty() {
        debug!("Reading accepted with {} warning(s)", warnings.len());
    }
    Ok(warnings.iter().map(ToString::to_string).collect())
}

/// Query parameters for readings.
#[derive(Debug, Deserialize, Default)]
pub struct ReadingsQuery {
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ReadingsQuery {
    /// Validate the query parameters.
    /// Returns an error if `since > until`.
    pub fn validate(&self) -> Result<(), AppError> {
        if let (Some(since), Some(until)) = (self.since, self.until)
            && since > until
        {
            return Err(AppError::BadRequest(format!(
                "Invalid time range: 'since' ({}) must be less than or equal to 'until' ({})",
                since, until
            )));
        }
        Ok(())
    }
}

/// Paginated response wrapper with metadata.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// The data items.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Pagination metadata.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    /// Number of items returned.
    pub count: usize,
    /// Offset from the beginning.
    pub offset: u32,
    /// Maximum items requested (if specified).
    pub limit: Option<u32>,
    /// Whether there are more items available.
    pub has_more: bool,
}

/// Get readings for a pool, newest first.
///
/// # Query Parameters
///
/// - `since`: Unix timestamp to filter readings from (inclusive)
/// - `until`: Unix timestamp to filter readings until (inclusive)
/// - `limit`: Maximum number of readings to return
/// - `offset`: Number of readings to skip (for pagination)
///
/// # Errors
///
/// - Returns [`AppError::BadRequest`] if `since > until`
/// - Returns [`AppError::NotFound`] if the pool does not exist
async fn get_readings(
    State(state): State<Arc<AppState>>,
    OrgScope(org): OrgScope,
    Path(id): Path<String>,
    Query(params): Query<ReadingsQuery>,
) -> Result<Json<PaginatedResponse<Reading>>, AppError> {
    params.validate()?;

    let mut query = ReadingQuery::new().pool(&id);

    if let Some(since) = params.since
        && let Ok(dt) = OffsetDateTime::from_unix_timestamp(since)
    {
        query = query.since(dt);
    }
    if let Some(until) = params.until
        && let Ok(dt) = OffsetDateTime::from_unix_timestamp(until)
    {
        query = query.until(dt);
    }

    // Request one extra item to determine if there are more
    if let Some(limit) = params.limit {
        query = query.limit(limit.saturating_add(1));
    }
    if let Some(offset) = params.offset {
        query = query.offset(offset);
    }

    let store = state.store.lock().await;
    if store.get_pool(&org, &id)?.is_none() {
        return Err(AppError::NotFound(format!("Pool not found: {}", id)));
    }
    let mut readings = store.query_readings(&org, &query)?;

    let has_more = params.limit.is_some_and(|l| readings.len() > l as usize);
    if has_more {
        readings.pop();
    }

    Ok(Json(PaginatedResponse {
        pagination: PaginationMeta {
            count: readings.len(),
            offset: params.offset.unwrap_or(0),
            limit: params.limit,
            has_more,
        },
        data: readings,
    }))
}

/// Get the most recent reading of a pool.
async fn get_latest_reading(
    State(state): State<Arc<AppState>>,
    OrgScope(org): OrgScope,
    Path(id): Path<String>,
) -> Result<Json<Reading>, AppError> {
    let store = state.store.lock().await;
    if store.get_pool(&org, &id)?.is_none() {
        return Err(AppError::NotFound(format!("Pool not found: {}", id)));
    }
    let reading = store
        .get_latest_reading(&org, &id)?
        .ok_or_else(|| AppError::NotFound(format!("No readings for pool: {}", id)))?;
    Ok(Json(reading))
}

// === Status ===

/// Parameter status of a pool's latest reading.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatusResponse {
    pub pool_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_id: Option<String>,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub captured_at: Option<OffsetDateTime>,
    pub targets: TargetProfile,
    #[serde(flatten)]
    pub report: StatusReport,
}

/// Evaluate the latest reading of a pool against its resolved targets.
///
/// A pool without readings reports every parameter as unmeasured.
async fn get_status(
    State(state): State<Arc<AppState>>,
    OrgScope(org): OrgScope,
    Path(id): Path<String>,
) -> Result<Json<PoolStatusResponse>, AppError> {
    let (pool, reading) = {
        let store = state.store.lock().await;
        let pool = store
            .get_pool(&org, &id)?
            .ok_or_else(|| AppError::NotFound(format!("Pool not found: {}", id)))?;
        let reading = store.get_latest_reading(&org, &id)?;
        (pool, reading)
    };

    let targets = resolve_targets(&pool.to_pool());
    let chemistry = reading.as_ref().map(|r| r.chemistry).unwrap_or_default();
    let report = evaluate_status(&chemistry, &targets);

    Ok(Json(PoolStatusResponse {
        pool_id: pool.id,
        reading_id: reading.as_ref().map(|r| r.id.clone()),
        captured_at: reading.map(|r| r.captured_at),
        targets,
        report,
    }))
}

// === Dosing ===

/// Compute dosing recommendations.
///
/// # Errors
///
/// - [`AppError::BadRequest`] for a malformed body, an empty `poolId` or
///   implausible explicit values.
/// - [`AppError::NotFound`] if the pool does not exist.
async fn dosing_recommendations(
    State(state): State<Arc<AppState>>,
    OrgScope(org): OrgScope,
    payload: Result<Json<DosingRequest>, JsonRejection>,
) -> Result<Json<DosingResponse>, AppError> {
    let Json(request) = payload?;

    if request.pool_id.trim().is_empty() {
        return Err(AppError::BadRequest("poolId cannot be empty".to_string()));
    }
    validate_chemistry(&request.overrides)?;

    let response = recommend(state.as_ref(), &org, &request).await?;
    Ok(Json(response))
}

// === Errors ===

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Store(poolchem_store::Error),
    Internal(String),
}

impl From<poolchem_store::Error> for AppError {
    fn from(e: poolchem_store::Error) -> Self {
        match e {
            poolchem_store::Error::PoolNotFound(id) => {
                AppError::NotFound(format!("Pool not found: {}", id))
            }
            other => AppError::Store(other),
        }
    }
}

impl From<poolchem_core::Error> for AppError {
    fn from(e: poolchem_core::Error) -> Self {
        match e {
            poolchem_core::Error::PoolNotFound(id) => {
                AppError::NotFound(format!("Pool not found: {}", id))
            }
            e @ poolchem_core::Error::InvalidReading(_) => AppError::BadRequest(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            warn!("Request failed: {}", message);
        }

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
