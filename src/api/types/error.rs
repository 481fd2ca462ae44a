//! JSON error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Error categories reported in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    UpstreamError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// Error response body: `{ "error": { "message", "type", "code" } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: None,
                },
            },
        }
    }

    /// Add error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    /// The upstream translator failed or answered with something unusable
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, ApiErrorType::UpstreamError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();

        match err {
            DomainError::UpstreamUnavailable { .. } => {
                Self::bad_gateway(message).with_code("upstream_unavailable")
            }
            DomainError::ReconciliationMismatch { .. } => {
                Self::bad_gateway(message).with_code("reconciliation_mismatch")
            }
            DomainError::Cache { .. } => Self::internal(message).with_code("cache_error"),
            DomainError::Configuration { .. } | DomainError::Internal { .. } => {
                Self::internal(message).with_code("internal_error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::new(
            StatusCode::BAD_REQUEST,
            ApiErrorType::InvalidRequestError,
            "segments must be an array",
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.response.error.error_type,
            ApiErrorType::InvalidRequestError
        );
        assert_eq!(err.response.error.message, "segments must be an array");
        assert_eq!(err.response.error.code, None);
    }

    #[test]
    fn test_upstream_errors_map_to_bad_gateway() {
        let api_err: ApiError = DomainError::upstream("deepseek", "connection refused").into();
        assert_eq!(api_err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api_err.response.error.error_type, ApiErrorType::UpstreamError);
        assert_eq!(
            api_err.response.error.code.as_deref(),
            Some("upstream_unavailable")
        );

        let api_err: ApiError = DomainError::reconciliation_mismatch(3, 2, 4).into();
        assert_eq!(api_err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            api_err.response.error.code.as_deref(),
            Some("reconciliation_mismatch")
        );
    }

    #[test]
    fn test_other_errors_map_to_internal() {
        for err in [
            DomainError::cache("disk full"),
            DomainError::internal("slot 2 was never filled"),
            DomainError::configuration("missing api key"),
        ] {
            let api_err: ApiError = err.into();
            assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(api_err.response.error.error_type, ApiErrorType::ServerError);
        }
    }

    #[test]
    fn test_error_serialization() {
        let err: ApiError = DomainError::upstream("deepseek", "timed out").into();
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "upstream_error");
        assert_eq!(json["error"]["code"], "upstream_unavailable");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("timed out")
        );
    }
}
