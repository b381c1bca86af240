/*
 * Responsibility
 * - gatekeeper から見える「検証済みの呼び出し元」の型 (claim 名 -> 文字列値)
 * - IdentityVerifier がリクエストごとに生成する (永続化しない)
 *
 * Notes
 * - 生成できた時点で `sub` は必ず存在し、空でない
 */
use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

pub const SUBJECT_CLAIM: &str = "sub";
pub const PREFERRED_USERNAME_CLAIM: &str = "preferred_username";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("missing or empty 'sub' claim")]
    MissingSubject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    subject: String,
    claims: BTreeMap<String, String>,
}

impl VerifiedIdentity {
    pub fn from_claims<I, K, V>(claims: I) -> Result<Self, IdentityError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let claims: BTreeMap<String, String> = claims
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let subject = claims
            .get(SUBJECT_CLAIM)
            .filter(|sub| !sub.is_empty())
            .cloned()
            .ok_or(IdentityError::MissingSubject)?;

        Ok(Self { subject, claims })
    }

    /// Build from a decoded JWT payload. Strings are taken as-is, other JSON
    /// values keep their JSON text, `null` claims are dropped.
    pub fn from_json(payload: serde_json::Map<String, Value>) -> Result<Self, IdentityError> {
        Self::from_claims(payload.into_iter().filter_map(|(name, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((name, value))
        }))
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn subject_is_required() {
        assert_eq!(
            VerifiedIdentity::from_claims([("preferred_username", "alice")]),
            Err(IdentityError::MissingSubject)
        );
        assert_eq!(
            VerifiedIdentity::from_claims([("sub", "")]),
            Err(IdentityError::MissingSubject)
        );
    }

    #[test]
    fn json_payload_is_flattened_to_strings() {
        let payload = json!({
            "sub": "uid-123",
            "preferred_username": "alice",
            "exp": 1700000000,
            "email_verified": true,
            "realm_access": {"roles": ["user"]},
            "nonce": null,
        });
        let serde_json::Value::Object(map) = payload else {
            unreachable!()
        };

        let identity = VerifiedIdentity::from_json(map).unwrap();

        assert_eq!(identity.subject(), "uid-123");
        assert_eq!(identity.claim("preferred_username"), Some("alice"));
        assert_eq!(identity.claim("exp"), Some("1700000000"));
        assert_eq!(identity.claim("email_verified"), Some("true"));
        assert_eq!(identity.claim("realm_access"), Some(r#"{"roles":["user"]}"#));
        assert_eq!(identity.claim("nonce"), None);
    }

    #[test]
    fn non_string_subject_is_stringified() {
        let serde_json::Value::Object(map) = json!({"sub": 42}) else {
            unreachable!()
        };
        assert_eq!(VerifiedIdentity::from_json(map).unwrap().subject(), "42");
    }
}
