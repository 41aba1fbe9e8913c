use crate::http::handlers::invoices::internal;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn run_billing(State(state): State<AppState>) -> impl IntoResponse {
    match state.billing_job.run_once().await {
        Ok(summary) => (axum::http::StatusCode::OK, Json(summary)).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn run_reconciliation(State(state): State<AppState>) -> impl IntoResponse {
    match state.reconciliation_job.run_once().await {
        Ok(summary) => (axum::http::StatusCode::OK, Json(summary)).into_response(),
        Err(e) => internal(e),
    }
}
