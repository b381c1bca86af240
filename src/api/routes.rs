/*
 * Responsibility
 * - gateway の URL 構造: ローカルの actuator endpoint + catch-all 転送
 * - gatekeeper layer は app.rs が全体 (fallback 含む) に掛ける
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::handlers::{forward::forward, health::health};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/actuator/health", get(health))
        .fallback(forward)
}
