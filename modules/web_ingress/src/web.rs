use axum::{extract::OriginalUri, http::HeaderMap, response::Json};
use hubkit::problem::{not_found as problem_not_found, ProblemResponse};
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Fallback for unmatched routes.
pub async fn not_found(OriginalUri(uri): OriginalUri, headers: HeaderMap) -> ProblemResponse {
    let request_id = headers
        .get(hubkit::REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    problem_not_found("The requested page does not exist")
        .with_code("NOT_FOUND")
        .with_instance(uri.path())
        .with_request_id(request_id)
}
