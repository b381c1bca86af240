/*
 * Responsibility
 * - fallback handler: gateway 自身が応答しないものは全て下流へ
 * - gatekeeper の後に走るので、許可済み・alias 付与済みの前提
 */
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

pub async fn forward(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, AppError> {
    Ok(state.upstream.forward(request).await?)
}
