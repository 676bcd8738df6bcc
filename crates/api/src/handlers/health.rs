use axum::Json;

/// GET /health
///
/// Liveness probe; returns 200 with a static body.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
