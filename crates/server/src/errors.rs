use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use service::auth::errors::AuthError;
use service::ServiceError;

/// JSON error body `{error, message?, input?}`.
///
/// `input` echoes a rejected submission so the client can re-render its
/// form. A 404 carries no body at all.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
    pub input: Option<serde_json::Value>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message, input: None }
    }

    pub fn not_found() -> Self { Self::new(StatusCode::NOT_FOUND, "Not Found", None) }

    /// Fatal write race on an existing record.
    pub fn conflict() -> Self {
        error!("concurrency conflict escalated to client");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Concurrency Conflict", Some("record was modified concurrently".into()))
    }

    /// Attach the rejected submission; only kept for validation errors.
    pub fn with_input<T: Serialize>(mut self, input: &T) -> Self {
        if self.status == StatusCode::BAD_REQUEST {
            self.input = serde_json::to_value(input).ok();
        }
        self
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NOT_FOUND {
            return self.status.into_response();
        }
        let mut body = serde_json::json!({ "error": self.error });
        if let Some(m) = self.message { body["message"] = m.into(); }
        if let Some(i) = self.input { body["input"] = i; }
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_validation() {
            return JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.user_message()));
        }
        match e {
            ServiceError::NotFound(_) => JsonApiError::not_found(),
            ServiceError::Forbidden => {
                warn!("admin capability required");
                JsonApiError::new(StatusCode::FORBIDDEN, "Forbidden", Some(e.to_string()))
            }
            ServiceError::Conflict(m) => {
                error!(message = %m, "conflict");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Concurrency Conflict", Some(m))
            }
            other => {
                error!(err = %other, "request failed");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error", Some(other.to_string()))
            }
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let status = match e {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::Unauthorized | AuthError::TokenError(_) => StatusCode::UNAUTHORIZED,
            AuthError::HashError(_) | AuthError::Repository(_) => {
                error!(code = e.code(), err = %e, "auth failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let label = match status {
            StatusCode::BAD_REQUEST => "Validation Error",
            StatusCode::CONFLICT => "Conflict",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            _ => "Internal Error",
        };
        JsonApiError::new(status, label, Some(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("seeding failed: {0}")]
    Seed(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("car"), StatusCode::NOT_FOUND),
            (ServiceError::Forbidden, StatusCode::FORBIDDEN),
            (ServiceError::Conflict("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Db("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn input_is_only_echoed_for_validation() {
        let v = serde_json::json!({"make": ""});
        let bad = JsonApiError::from(ServiceError::Validation("make is required".into())).with_input(&v);
        assert_eq!(bad.input, Some(v.clone()));
        let forbidden = JsonApiError::from(ServiceError::Forbidden).with_input(&v);
        assert!(forbidden.input.is_none());
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        assert_eq!(JsonApiError::from(AuthError::Conflict).status, StatusCode::CONFLICT);
        assert_eq!(JsonApiError::from(AuthError::Unauthorized).status, StatusCode::UNAUTHORIZED);
        assert_eq!(JsonApiError::from(AuthError::Validation("x".into())).status, StatusCode::BAD_REQUEST);
    }
}
