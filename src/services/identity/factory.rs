//! Factory: build the token verifier from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::identity::verifier::{IdentityVerifier, JwtVerifier, VerifierBuildError};

pub fn build_verifier(config: &Config) -> Result<Arc<dyn IdentityVerifier>, VerifierBuildError> {
    let verifier = JwtVerifier::new(
        &config.access_jwt_public_key_pem,
        config.access_jwt_algorithm,
        config.auth_issuer.as_deref(),
        config.auth_audience.as_deref(),
        config.access_token_leeway_seconds,
    )?;

    tracing::debug!(?verifier, "access token verifier ready");

    Ok(Arc::new(verifier))
}
