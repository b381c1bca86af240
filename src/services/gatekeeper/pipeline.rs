//! Fixed-order gatekeeper pipeline.
//!
//! Every request runs these stages in sequence before it is forwarded:
//!
//! 1. **VerifyIdentity** - bearer token -> optional verified identity (only await point)
//! 2. **Authorize** - canonical path guard, then the route-rule decision; may reject
//! 3. **PropagateIdentity** - `X-User-Alias` on the admitted request
//!
//! The order is a constant, and the constraints it must satisfy are checked at
//! compile time below.

use axum::body::Body;
use axum::http::Request;

use crate::error::AppError;
use crate::services::access::{Decision, path};
use crate::services::identity::{self, VerifiedIdentity};

use super::Gatekeeper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    VerifyIdentity,
    Authorize,
    PropagateIdentity,
}

pub const PIPELINE: [Stage; 3] = [
    Stage::VerifyIdentity,
    Stage::Authorize,
    Stage::PropagateIdentity,
];

const fn position(stage: Stage) -> usize {
    let mut i = 0;
    while i < PIPELINE.len() {
        if PIPELINE[i] as u8 == stage as u8 {
            return i;
        }
        i += 1;
    }
    PIPELINE.len()
}

const _: () = {
    assert!(
        position(Stage::VerifyIdentity) < position(Stage::Authorize),
        "identity must be resolved before the access decision"
    );
    assert!(
        position(Stage::Authorize) < position(Stage::PropagateIdentity),
        "identity must never be propagated on a request that may still be rejected"
    );
    assert!(position(Stage::PropagateIdentity) < PIPELINE.len());
};

impl Stage {
    pub const fn name(self) -> &'static str {
        match self {
            Self::VerifyIdentity => "verify_identity",
            Self::Authorize => "authorize",
            Self::PropagateIdentity => "propagate_identity",
        }
    }
}

/// One request travelling through the pipeline.
#[derive(Debug)]
pub struct Exchange {
    pub request: Request<Body>,
    pub identity: Option<VerifiedIdentity>,
}

impl Gatekeeper {
    /// Run every stage in `PIPELINE` order. `Ok` carries the request ready to
    /// forward; `Err` means the request is dropped and answered with the error.
    pub async fn run(&self, request: Request<Body>) -> Result<Request<Body>, AppError> {
        let mut exchange = Exchange {
            request,
            identity: None,
        };

        for stage in PIPELINE {
            exchange = self.apply(stage, exchange).await?;
        }

        Ok(exchange.request)
    }

    async fn apply(&self, stage: Stage, mut exchange: Exchange) -> Result<Exchange, AppError> {
        match stage {
            Stage::VerifyIdentity => {
                exchange.identity = self.resolve_identity(exchange.request.headers()).await;
            }
            Stage::Authorize => {
                let request = &exchange.request;
                let uri_path = request.uri().path();

                if !path::is_canonical(uri_path) {
                    tracing::warn!(path = %uri_path, "non-canonical request path refused");
                    return Err(AppError::bad_request(
                        "NON_CANONICAL_PATH",
                        "request path is not in canonical form",
                    ));
                }

                let decision =
                    self.rules
                        .decide(uri_path, request.method(), exchange.identity.as_ref());
                if let Decision::Reject(rejection) = decision {
                    tracing::debug!(
                        method = %request.method(),
                        path = %uri_path,
                        reason = %rejection,
                        "request rejected"
                    );
                    return Err(rejection.into());
                }
            }
            Stage::PropagateIdentity => {
                exchange.request = identity::propagate(exchange.identity.as_ref(), exchange.request);
            }
        }

        Ok(exchange)
    }
}
