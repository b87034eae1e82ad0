use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::forecast::{FinancialMonth, ForecastFilter, ForecastMonth};
use crate::{AllocationLedger, Dataset, StaffingEngine};

/// Shared mutable state: the dataset plus the allocation ledger it scopes.
#[derive(Debug, Default)]
pub struct Workspace {
    pub dataset: Dataset,
    pub ledger: AllocationLedger,
}

#[derive(Clone)]
pub struct AppState {
    workspace: Arc<RwLock<Workspace>>,
}

impl AppState {
    pub fn new(dataset: Dataset, ledger: AllocationLedger) -> Self {
        Self {
            workspace: Arc::new(RwLock::new(Workspace { dataset, ledger })),
        }
    }

    pub fn with_shared(workspace: Arc<RwLock<Workspace>>) -> Self {
        Self { workspace }
    }

    fn workspace(&self) -> Arc<RwLock<Workspace>> {
        self.workspace.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DayWritePayload {
    date: NaiveDate,
    percentage: f64,
}

#[derive(Debug, Deserialize)]
struct RangeWritePayload {
    start: NaiveDate,
    end: NaiveDate,
    percentage: f64,
}

#[derive(Debug, Deserialize)]
struct DayQuery {
    date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct ForecastQuery {
    start_month: NaiveDate,
    months: u32,
    #[serde(default)]
    horizontal: Option<String>,
    #[serde(default)]
    client_id: Option<i32>,
    #[serde(default)]
    project_id: Option<i32>,
    #[serde(default)]
    wbs: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FinancialsQuery {
    #[serde(default)]
    horizontal: Option<String>,
    #[serde(default)]
    client_id: Option<i32>,
    #[serde(default)]
    project_id: Option<i32>,
    #[serde(default)]
    wbs: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/allocations/:assignment_id",
            get(get_allocations).put(write_day).delete(clear_assignment),
        )
        .route("/allocations/:assignment_id/range", put(write_range))
        .route("/resources/:resource_id/daily", get(daily_total))
        .route("/resources/:resource_id/utilization", get(utilization))
        .route("/forecast", get(forecast))
        .route("/financials/:year", get(financials))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    dataset: Dataset,
    ledger: AllocationLedger,
) -> std::io::Result<()> {
    let state = AppState::new(dataset, ledger);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_allocations(
    State(state): State<AppState>,
    Path(assignment_id): Path<i32>,
) -> Json<BTreeMap<String, f64>> {
    let workspace = state.workspace();
    let entries = {
        let guard = workspace.read();
        guard.ledger.get(assignment_id)
    };
    let body = entries
        .into_iter()
        .map(|(date, percentage)| (date.format("%Y-%m-%d").to_string(), percentage))
        .collect();
    Json(body)
}

async fn write_day(
    State(state): State<AppState>,
    Path(assignment_id): Path<i32>,
    Json(payload): Json<DayWritePayload>,
) -> Result<StatusCode, ApiError> {
    let workspace = state.workspace();
    let mut guard = workspace.write();
    guard
        .ledger
        .set_day(assignment_id, payload.date, payload.percentage)
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn write_range(
    State(state): State<AppState>,
    Path(assignment_id): Path<i32>,
    Json(payload): Json<RangeWritePayload>,
) -> Result<StatusCode, ApiError> {
    let workspace = state.workspace();
    let mut guard = workspace.write();
    guard
        .ledger
        .set_range(assignment_id, payload.start, payload.end, payload.percentage)
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let workspace = state.workspace();
    let removed = {
        let mut guard = workspace.write();
        guard.ledger.remove_assignment(assignment_id)
    };
    if removed == 0 {
        return Err(ApiError::not_found(format!(
            "assignment {assignment_id} has no allocations"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn daily_total(
    State(state): State<AppState>,
    Path(resource_id): Path<i32>,
    Query(query): Query<DayQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let workspace = state.workspace();
    let guard = workspace.read();
    if guard.dataset.resource(resource_id).is_none() {
        return Err(ApiError::not_found(format!(
            "resource {resource_id} not found"
        )));
    }
    let engine = StaffingEngine::new(&guard.dataset, &guard.ledger);
    let total = engine.daily_total_for_resource(resource_id, query.date);
    let over_allocated = engine.is_over_allocated(resource_id, query.date);
    Ok(Json(json!({
        "resource_id": resource_id,
        "date": query.date,
        "total_percentage": total,
        "over_allocated": over_allocated,
    })))
}

async fn utilization(
    State(state): State<AppState>,
    Path(resource_id): Path<i32>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let workspace = state.workspace();
    let guard = workspace.read();
    if guard.dataset.resource(resource_id).is_none() {
        return Err(ApiError::not_found(format!(
            "resource {resource_id} not found"
        )));
    }
    let engine = StaffingEngine::new(&guard.dataset, &guard.ledger);
    let average = engine.average_allocation(resource_id, query.start, query.end);
    Ok(Json(json!({
        "resource_id": resource_id,
        "start": query.start,
        "end": query.end,
        "average_allocation": average,
    })))
}

async fn forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<Vec<ForecastMonth>>, ApiError> {
    if query.months == 0 || query.months > 60 {
        return Err(ApiError::invalid("months must be between 1 and 60"));
    }
    let filter = ForecastFilter {
        horizontal: query.horizontal,
        client_id: query.client_id,
        project_id: query.project_id,
        wbs: query.wbs,
    };
    let workspace = state.workspace();
    let guard = workspace.read();
    let engine = StaffingEngine::new(&guard.dataset, &guard.ledger);
    Ok(Json(engine.forecast(query.start_month, query.months, &filter)))
}

async fn financials(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<FinancialsQuery>,
) -> Result<Json<Vec<FinancialMonth>>, ApiError> {
    let filter = ForecastFilter {
        horizontal: query.horizontal,
        client_id: query.client_id,
        project_id: query.project_id,
        wbs: query.wbs,
    };
    let workspace = state.workspace();
    let guard = workspace.read();
    let engine = StaffingEngine::new(&guard.dataset, &guard.ledger);
    Ok(Json(engine.monthly_financials(year, &filter)))
}
