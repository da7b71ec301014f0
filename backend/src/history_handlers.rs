// Handlers for the trip history endpoint

use axum::{extract::State, http::StatusCode, Json};

use crate::database::DatabaseError;
use crate::models::{ApiError, HistoryEntry};
use crate::AppState;

/// GET /historico - Previous trips, newest first
pub async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, (StatusCode, Json<ApiError>)> {
    let Some(store) = state.history.as_ref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError {
                error: "Histórico indisponível: banco de dados não conectado".to_string(),
            }),
        ));
    };

    store
        .list(state.history_limit)
        .await
        .map(|records| Json(records.iter().map(|r| r.to_entry()).collect()))
        .map_err(db_error_to_api_error)
}

fn db_error_to_api_error(err: DatabaseError) -> (StatusCode, Json<ApiError>) {
    let (status, error) = match err {
        DatabaseError::InvalidData(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        DatabaseError::ConfigError(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        DatabaseError::ConnectionError(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Erro ao consultar o histórico: {}", e),
        ),
    };

    tracing::error!("history listing failed: {error}");
    (status, Json(ApiError { error }))
}
