// src/handlers/health.rs

use axum::Json;
use serde_json::{json, Value};

// GET / e GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Servidor no ar"))
)]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
