//! Copy the caller's display identity into `X-User-Alias` on the forwarded request.
//!
//! Runs only on admitted requests, after the access decision. It never rejects.

use axum::http::{HeaderName, HeaderValue, Request};

use super::types::{PREFERRED_USERNAME_CLAIM, VerifiedIdentity};

pub const USER_ALIAS_HEADER: HeaderName = HeaderName::from_static("x-user-alias");

/// `preferred_username` when present and non-empty, else `sub`.
pub fn display_name(identity: &VerifiedIdentity) -> &str {
    identity
        .claim(PREFERRED_USERNAME_CLAIM)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| identity.subject())
}

/// Set (overwrite, never append) `X-User-Alias`. Without an identity the
/// request is handed back untouched.
pub fn propagate<B>(identity: Option<&VerifiedIdentity>, mut request: Request<B>) -> Request<B> {
    let Some(identity) = identity else {
        return request;
    };

    let alias = display_name(identity);
    match HeaderValue::from_bytes(alias.as_bytes()) {
        Ok(value) => {
            request.headers_mut().insert(USER_ALIAS_HEADER, value);
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                subject = %identity.subject(),
                "display name is not a valid header value; alias not propagated"
            );
        }
    }

    request
}
