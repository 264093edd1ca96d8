//! Tests for the error taxonomy and its HTTP mapping
//!
//! Verifies that every error category maps to the documented status code and
//! that responses carry the `{code, message}` shape without leaking
//! internals.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use consulta::core::auth::AuthError;
use consulta::core::error::ApiError;
use consulta::core::resource::{CONSULTATION, SURVEY};
use consulta::core::store::StoreError;
use uuid::Uuid;

mod status_codes {
    use super::*;

    #[test]
    fn validation_is_400() {
        assert_eq!(
            ApiError::validation("missing title").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_credentials_is_401() {
        assert_eq!(
            ApiError::Auth(AuthError::MissingCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn rejected_token_is_401() {
        assert_eq!(
            ApiError::Auth(AuthError::Rejected("expired".to_string())).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn not_found_is_404() {
        assert_eq!(
            ApiError::NotFound("consultation not found".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn persistence_is_500() {
        assert_eq!(
            ApiError::Persistence("write failed".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_is_500() {
        assert_eq!(
            ApiError::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

mod store_error_mapping {
    use super::*;

    #[test]
    fn lookup_turns_not_found_into_404() {
        let err = ApiError::lookup(StoreError::not_found(&SURVEY, &Uuid::new_v4()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn lookup_keeps_backend_failures_at_500() {
        let err = ApiError::lookup(StoreError::backend(&SURVEY, "get", "timeout"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn persistence_turns_not_found_into_500() {
        // The protected routes keep the historical mapping: a missing
        // record surfaces as a persistence failure.
        let err = ApiError::persistence(StoreError::not_found(&CONSULTATION, &Uuid::new_v4()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
    }

    #[test]
    fn store_messages_name_the_operation() {
        let err = ApiError::persistence(StoreError::backend(&CONSULTATION, "update", "oops"));
        assert!(err.to_string().starts_with("failed to update consultation"));
    }
}

mod response_shape {
    use super::*;

    #[test]
    fn error_body_has_code_and_message() {
        let body = ApiError::validation("title must not be empty").to_response();
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert_eq!(body.message, "title must not be empty");
    }

    #[test]
    fn internal_error_has_fixed_generic_message() {
        let body = ApiError::Internal.to_response();
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert_eq!(body.message, "Something went wrong!");
    }

    #[tokio::test]
    async fn into_response_sets_status_and_json_content_type() {
        let response = ApiError::NotFound("survey not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("application/json"));
    }
}
