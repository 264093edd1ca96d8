//! Request extractors: verified identity and validated JSON bodies

use crate::core::auth::{Identity, parse_bearer};
use crate::core::error::ApiError;
use crate::server::AppState;
use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Identity is an extractor: routes that take it are gated behind the token
/// verifier, routes that do not are public.
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(crate::core::auth::AuthError::MissingCredentials)?
            .to_str()
            .map_err(|_| crate::core::auth::AuthError::MalformedHeader)?;

        let token = parse_bearer(header)?;
        let identity = state.verifier.verify(token).await?;

        tracing::debug!(subject = %identity.subject_id, "verified caller identity");
        Ok(identity)
    }
}

/// JSON body extractor that deserializes and then runs field validation
///
/// Both a body that fails to deserialize (missing required field, wrong
/// shape) and one that fails validation surface as a 400 validation error.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::validation(errors.to_string()))?;

        Ok(ValidatedJson(value))
    }
}
