use crate::http::handlers::invoices::internal;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UnresolvedQuery {
    pub max_retries: Option<i32>,
}

pub async fn list_unresolved(
    State(state): State<AppState>,
    Query(query): Query<UnresolvedQuery>,
) -> impl IntoResponse {
    let max_retries = query.max_retries.unwrap_or(state.max_settlement_retries);
    match state.failed_settlements_repo.fetch_unresolved(max_retries).await {
        Ok(rows) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "max_retries": max_retries,
                "total": rows.len(),
                "failed_settlements": rows
            })),
        )
            .into_response(),
        Err(e) => internal(e),
    }
}

pub async fn get_failed_settlement(
    State(state): State<AppState>,
    Path(settlement_id): Path<i64>,
) -> impl IntoResponse {
    match state.failed_settlements_repo.fetch(settlement_id).await {
        Ok(Some(row)) => (axum::http::StatusCode::OK, Json(row)).into_response(),
        Ok(None) => (
            axum::http::StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "failed settlement not found"})),
        )
            .into_response(),
        Err(e) => internal(e),
    }
}
