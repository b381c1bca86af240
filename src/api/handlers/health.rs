/*
 * Responsibility
 * - GET /actuator/health (疎通用、gateway 自身が応答する)
 * - actuator prefix のルールで public 扱い、下流には転送しない
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "UP"})))
}
