/*
 * Responsibility
 * - リクエストごとの gatekeeping: identity -> アクセス判定 -> identity 伝播
 * - プロセス共通・読み取り専用のルール表とトークン検証器を保持
 */
use std::sync::Arc;

use axum::http::HeaderMap;

use crate::services::access::RuleTable;
use crate::services::identity::{IdentityVerifier, VerifiedIdentity, bearer_token};

pub mod pipeline;

pub use pipeline::PIPELINE;

#[derive(Clone, Debug)]
pub struct Gatekeeper {
    rules: Arc<RuleTable>,
    verifier: Arc<dyn IdentityVerifier>,
}

impl Gatekeeper {
    pub fn new(rules: Arc<RuleTable>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { rules, verifier }
    }

    /// Any verification failure yields `None`: a bad token and no token look
    /// the same to the access decision.
    pub async fn resolve_identity(&self, headers: &HeaderMap) -> Option<VerifiedIdentity> {
        let token = bearer_token(headers)?;

        match self.verifier.verify(token).await {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::warn!(error = %err, "access token verification failed");
                None
            }
        }
    }
}
