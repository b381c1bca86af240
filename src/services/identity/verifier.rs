use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use super::types::{IdentityError, VerifiedIdentity};

// Errors returned by access-token verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

#[derive(Debug, Error)]
pub enum VerifierBuildError {
    #[error("algorithm {0:?} needs a shared secret; only public-key algorithms are supported")]
    UnsupportedAlgorithm(Algorithm),
    #[error("invalid public key pem for {algorithm:?}: {source}")]
    InvalidKey {
        algorithm: Algorithm,
        source: jsonwebtoken::errors::Error,
    },
}

/// Turns a bearer token into a verified identity.
///
/// Callers must treat every `Err` as "no identity"; the gatekeeper never
/// distinguishes a bad token from a missing one.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + fmt::Debug {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError>;
}

/// Token from `Authorization: Bearer <token>`; `None` for any other shape.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Signed-JWT verifier backed by a single public key.
///
/// Checks signature, `exp`/`nbf` (with leeway), and `iss`/`aud` when configured.
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtVerifier {
    pub fn new(
        public_key_pem: &str,
        algorithm: Algorithm,
        issuer: Option<&str>,
        audience: Option<&str>,
        leeway_seconds: u64,
    ) -> Result<Self, VerifierBuildError> {
        let pem = public_key_pem.as_bytes();
        let decoding_key = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
            _ => return Err(VerifierBuildError::UnsupportedAlgorithm(algorithm)),
        }
        .map_err(|source| VerifierBuildError::InvalidKey { algorithm, source })?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = leeway_seconds;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            // Keycloak stamps `aud` on most tokens; without an expected value
            // the check has to be switched off instead of failing every token.
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn verify_sync(&self, token: &str) -> Result<VerifiedIdentity, VerifyError> {
        let data = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &self.decoding_key,
            &self.validation,
        )?;

        Ok(VerifiedIdentity::from_json(data.claims)?)
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError> {
        self.verify_sync(token)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use serde_json::json;

    use super::*;
    use crate::services::identity::testing::{OTHER_PUBLIC_KEY_PEM, PUBLIC_KEY_PEM, exp_in, sign};

    fn verifier(issuer: Option<&str>, audience: Option<&str>) -> JwtVerifier {
        JwtVerifier::new(PUBLIC_KEY_PEM, Algorithm::EdDSA, issuer, audience, 0).unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let token = sign(&json!({
            "sub": "uid-123",
            "preferred_username": "alice",
            "exp": exp_in(300),
        }));

        let identity = verifier(None, None).verify(&token).await.unwrap();

        assert_eq!(identity.subject(), "uid-123");
        assert_eq!(identity.claim("preferred_username"), Some("alice"));
    }

    #[test]
    fn rejects_expired_token() {
        let token = sign(&json!({"sub": "uid-123", "exp": exp_in(-600)}));
        assert!(matches!(
            verifier(None, None).verify_sync(&token),
            Err(VerifyError::Jwt(_))
        ));
    }

    #[test]
    fn leeway_tolerates_small_clock_skew() {
        let token = sign(&json!({"sub": "uid-123", "exp": exp_in(-5)}));
        let lenient =
            JwtVerifier::new(PUBLIC_KEY_PEM, Algorithm::EdDSA, None, None, 60).unwrap();
        assert!(lenient.verify_sync(&token).is_ok());
    }

    #[test]
    fn rejects_token_not_yet_valid() {
        let token = sign(&json!({
            "sub": "uid-123",
            "exp": exp_in(3600),
            "nbf": exp_in(1800),
        }));
        assert!(matches!(
            verifier(None, None).verify_sync(&token),
            Err(VerifyError::Jwt(_))
        ));

        let skewed = sign(&json!({"sub": "uid-123", "exp": exp_in(3600), "nbf": exp_in(5)}));
        let lenient =
            JwtVerifier::new(PUBLIC_KEY_PEM, Algorithm::EdDSA, None, None, 60).unwrap();
        assert!(lenient.verify_sync(&skewed).is_ok());
    }

    #[test]
    fn rejects_token_signed_by_another_key() {
        let token = sign(&json!({"sub": "uid-123", "exp": exp_in(300)}));
        let other =
            JwtVerifier::new(OTHER_PUBLIC_KEY_PEM, Algorithm::EdDSA, None, None, 0).unwrap();
        assert!(matches!(other.verify_sync(&token), Err(VerifyError::Jwt(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(verifier(None, None).verify_sync("not-a-jwt").is_err());
        assert!(verifier(None, None).verify_sync("").is_err());
    }

    #[test]
    fn missing_or_empty_subject_is_rejected() {
        let missing = sign(&json!({"exp": exp_in(300)}));
        assert!(verifier(None, None).verify_sync(&missing).is_err());

        let empty = sign(&json!({"sub": "", "exp": exp_in(300)}));
        assert!(matches!(
            verifier(None, None).verify_sync(&empty),
            Err(VerifyError::Identity(IdentityError::MissingSubject))
        ));
    }

    #[test]
    fn issuer_and_audience_are_enforced_when_configured() {
        let token = sign(&json!({
            "sub": "uid-123",
            "exp": exp_in(300),
            "iss": "http://keycloak/realms/demo",
            "aud": "account",
        }));

        assert!(verifier(None, None).verify_sync(&token).is_ok());
        assert!(
            verifier(Some("http://keycloak/realms/demo"), Some("account"))
                .verify_sync(&token)
                .is_ok()
        );
        assert!(
            verifier(Some("http://evil/realms/demo"), None)
                .verify_sync(&token)
                .is_err()
        );
        assert!(verifier(None, Some("gateway")).verify_sync(&token).is_err());
    }

    #[test]
    fn shared_secret_algorithms_are_refused() {
        let err = JwtVerifier::new(PUBLIC_KEY_PEM, Algorithm::HS256, None, None, 0).unwrap_err();
        assert!(matches!(
            err,
            VerifierBuildError::UnsupportedAlgorithm(Algorithm::HS256)
        ));
    }

    #[test]
    fn key_must_match_algorithm_family() {
        let err = JwtVerifier::new(PUBLIC_KEY_PEM, Algorithm::RS256, None, None, 0).unwrap_err();
        assert!(matches!(err, VerifierBuildError::InvalidKey { .. }));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer  abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(bearer_token(&headers), None);
    }
}
