pub mod config;
pub mod cost;
pub mod database;
pub mod directions;
pub mod error;
pub mod history_handlers;
pub mod models;
pub mod narrative;
pub mod planner;
pub mod polyline;
pub mod routing;
pub mod weather;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::database::HistoryStore;
use crate::error::PlanError;
use crate::models::{ApiError, PlanTripRequest, PlanTripResponse};
use crate::planner::{TripPlanner, TripQuery};

pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TripPlanner>,
    /// `None` when the store was unreachable at startup.
    pub history: Option<Arc<dyn HistoryStore>>,
    pub history_limit: i64,
}

impl AppState {
    pub fn new(planner: TripPlanner, history: Option<Arc<dyn HistoryStore>>) -> Self {
        Self {
            planner: Arc::new(planner),
            history,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/plan_viagem", post(plan_trip_handler))
        .route("/historico", get(history_handlers::list_history))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn plan_trip_handler(
    State(state): State<AppState>,
    payload: Result<Json<PlanTripRequest>, JsonRejection>,
) -> Result<Json<PlanTripResponse>, (StatusCode, Json<ApiError>)> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!("rejected plan body: {rejection}");
        plan_error(PlanError::MissingLocations)
    })?;
    let query = TripQuery::try_from(&req).map_err(plan_error)?;

    let plan = state
        .planner
        .plan_and_record(query, state.history.as_deref())
        .await
        .map_err(plan_error)?;

    Ok(Json(plan.into()))
}

fn plan_error(err: PlanError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        PlanError::MissingLocations | PlanError::RouteUnavailable => StatusCode::BAD_REQUEST,
        PlanError::History(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ApiError {
            error: err.to_string(),
        }),
    )
}
