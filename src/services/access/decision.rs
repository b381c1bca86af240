use axum::http::Method;
use thiserror::Error;

use crate::services::identity::VerifiedIdentity;

use super::rules::{Requirement, RuleTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("authentication required")]
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Reject(Rejection),
}

impl RuleTable {
    /// Decide whether a request may pass.
    ///
    /// Pure and total: OPTIONS (CORS preflight) is always admitted, otherwise
    /// the first matching rule decides, falling through to the catch-all.
    pub fn decide(
        &self,
        path: &str,
        method: &Method,
        identity: Option<&VerifiedIdentity>,
    ) -> Decision {
        if *method == Method::OPTIONS {
            return Decision::Admit;
        }

        match self.first_match(path, method).requirement() {
            Requirement::Public => Decision::Admit,
            Requirement::Authenticated if identity.is_some() => Decision::Admit,
            Requirement::Authenticated => Decision::Reject(Rejection::Unauthenticated),
        }
    }
}
