use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

pub async fn list_invoices(State(state): State<AppState>) -> impl IntoResponse {
    match state.invoices_repo.fetch_all().await {
        Ok(invoices) => (axum::http::StatusCode::OK, Json(invoices)).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn get_invoice(State(state): State<AppState>, Path(invoice_id): Path<i64>) -> impl IntoResponse {
    match state.invoices_repo.fetch(invoice_id).await {
        Ok(Some(invoice)) => (axum::http::StatusCode::OK, Json(invoice)).into_response(),
        Ok(None) => (
            axum::http::StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("invoice '{invoice_id}' was not found")})),
        )
            .into_response(),
        Err(e) => internal(e),
    }
}

pub async fn list_invoice_failed_settlements(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
) -> impl IntoResponse {
    match state.failed_settlements_repo.list_for_invoice(invoice_id).await {
        Ok(rows) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "invoice_id": invoice_id,
                "total": rows.len(),
                "failed_settlements": rows
            })),
        )
            .into_response(),
        Err(e) => internal(e),
    }
}

pub(crate) fn internal(e: anyhow::Error) -> axum::response::Response {
    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": e.to_string()})),
    )
        .into_response()
}
