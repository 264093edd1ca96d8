//! Identity verification against an external token service
//!
//! The verifier is a pure gate: it takes the bearer credential from the
//! `Authorization` header, asks the external issuer to verify it, and yields
//! the caller identity for downstream handlers. It has no side effects beyond
//! the external call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while resolving the caller identity. All map to 401.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no token provided")]
    MissingCredentials,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("invalid token: {0}")]
    Rejected(String),

    #[error("token verification unavailable: {0}")]
    Unavailable(String),
}

/// The verified caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Resolves a bearer credential into an [`Identity`]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Extract the bearer token from an `Authorization` header value.
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?;
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Verifier backed by an external HTTP token-verification endpoint
///
/// Posts the credential as JSON and expects `{"subjectId": ..., "email": ...}`
/// back. Any non-success status is a rejection; transport failures surface as
/// `Unavailable`.
#[derive(Clone)]
pub struct HttpTokenVerifier {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

impl HttpTokenVerifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&VerifyRequest { token })
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Rejected(format!(
                "verification service returned {}",
                response.status()
            )));
        }

        response
            .json::<Identity>()
            .await
            .map_err(|e| AuthError::Rejected(e.to_string()))
    }
}

/// Fixed token-to-identity map, for tests and local development
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::Rejected("unknown token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bearer_accepts_bearer_scheme() {
        assert_eq!(parse_bearer("Bearer abc123").unwrap(), "abc123");
    }

    #[test]
    fn parse_bearer_rejects_other_schemes() {
        assert!(matches!(
            parse_bearer("Basic dXNlcjpwYXNz"),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(
            parse_bearer("bearer abc"),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[test]
    fn parse_bearer_rejects_empty_token() {
        assert!(matches!(
            parse_bearer("Bearer "),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[tokio::test]
    async fn static_verifier_resolves_known_token() {
        let verifier = StaticTokenVerifier::new().with_token(
            "alice-token",
            Identity {
                subject_id: "alice".to_string(),
                email: Some("alice@example.com".to_string()),
            },
        );

        let identity = verifier.verify("alice-token").await.unwrap();
        assert_eq!(identity.subject_id, "alice");
        assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn static_verifier_rejects_unknown_token() {
        let verifier = StaticTokenVerifier::new();
        assert!(matches!(
            verifier.verify("nope").await,
            Err(AuthError::Rejected(_))
        ));
    }

    #[test]
    fn identity_wire_format_is_camel_case() {
        let identity: Identity = serde_json::from_value(serde_json::json!({
            "subjectId": "uid-1",
            "email": "u@example.com"
        }))
        .unwrap();
        assert_eq!(identity.subject_id, "uid-1");
    }
}
