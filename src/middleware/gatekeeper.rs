//! Gatekeeper middleware: runs the fixed stage pipeline, then hands the
//! (possibly alias-stamped) request to the rest of the router.
//!
//! A rejected request never reaches `next`; a dropped future (client gone)
//! never reaches it either, so partially processed requests are not forwarded.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::gatekeeper::Gatekeeper;

/// Apply the gatekeeper to every route and the fallback of `router`.
///
/// ```ignore
/// let router = api::routes();
/// let router = middleware::gatekeeper::apply(router, state.gatekeeper.clone());
/// ```
pub fn apply<S>(router: Router<S>, gatekeeper: Gatekeeper) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gatekeeper, gatekeeper_middleware))
}

async fn gatekeeper_middleware(
    State(gatekeeper): State<Gatekeeper>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let req = gatekeeper.run(req).await?;

    Ok(next.run(req).await)
}
