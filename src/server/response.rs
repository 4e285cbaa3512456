//! Error to HTTP response mapping.

use crate::Error;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Wraps a crate [`Error`] so handlers can return it with `?`.
#[derive(Debug)]
pub struct ApiError(pub Error);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::MediaRejected(_) => StatusCode::BAD_REQUEST,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller. Internal detail stays in the logs.
    fn client_message(&self) -> String {
        match &self.0 {
            Error::Validation(msg) | Error::MediaRejected(msg) => msg.clone(),
            Error::RateLimited { .. } => "Rate limit exceeded. Please try again later.".to_string(),
            Error::GenerationFailed { feature, .. } => feature.failure_message().to_string(),
            other => {
                tracing::error!("Unhandled error: {}", other);
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.client_message() }));
        let mut response = (status, body).into_response();

        if let Error::RateLimited { retry_after } = self.0 {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lessons::Feature;

    #[test]
    fn test_status_codes() {
        let cases = [
            (Error::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::MediaRejected("x".into()), StatusCode::BAD_REQUEST),
            (
                Error::RateLimited { retry_after: 5 },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (Error::Timeout, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError(error).status_code(), expected);
        }
    }

    #[test]
    fn test_generation_failure_hides_cause() {
        let error = ApiError(Error::GenerationFailed {
            feature: Feature::Grammar,
            source: Box::new(Error::Upstream {
                status: 403,
                body: "API key not valid".to_string(),
            }),
        });
        assert_eq!(error.client_message(), "Failed to generate grammar lesson");
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError(Error::RateLimited { retry_after: 7 }).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "7");
    }
}
