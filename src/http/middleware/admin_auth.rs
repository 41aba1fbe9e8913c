use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub const INTERNAL_API_KEY_HEADER: &str = "X-Internal-Api-Key";

/// An unset key locks the job routes instead of opening them.
pub fn api_key_matches(expected: &str, provided: Option<&str>) -> bool {
    !expected.is_empty() && provided == Some(expected)
}

/// Guards the job trigger routes.
pub async fn require_internal_api_key(
    State(expected): State<String>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(INTERNAL_API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    if !api_key_matches(&expected, provided) {
        tracing::warn!(
            path = %request.uri().path(),
            key_present = provided.is_some(),
            "job trigger rejected"
        );
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "missing or invalid internal api key"})),
        )
            .into_response();
    }

    next.run(request).await
}
