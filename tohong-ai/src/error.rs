//! Error types for tohong-ai
//!
//! `ServiceError` is what the compatibility service returns; every variant
//! carries a stable `kind()` code so the presentation layer can pick a
//! user-facing message without inspecting the text. `ApiError` maps those
//! kinds onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tohong_common::DecodeError;

use crate::services::compatibility_service::RequestStage;
use crate::services::text_provider::ProviderError;

/// Failure of one compatibility or auspicious-date request
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Couple profile could not be parsed before any provider call
    #[error("Invalid couple profile: {0}")]
    InvalidProfile(String),

    /// The text provider call failed or was cancelled
    #[error(transparent)]
    ProviderCallFailed(#[from] ProviderError),

    /// Provider text held no recoverable JSON
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// JSON parsed but failed shape, range, or closed-set validation
    #[error("Invalid provider response: {0}")]
    InvalidProviderResponse(String),
}

impl ServiceError {
    /// Stable machine-readable code
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidProfile(_) => "INVALID_PROFILE",
            ServiceError::ProviderCallFailed(ProviderError::Cancelled) => "PROVIDER_CANCELLED",
            ServiceError::ProviderCallFailed(_) => "PROVIDER_CALL_FAILED",
            ServiceError::Decode(_) => "DECODE_ERROR",
            ServiceError::InvalidProviderResponse(_) => "INVALID_PROVIDER_RESPONSE",
        }
    }

    /// Request stage at which this kind of error arises
    pub fn stage(&self) -> RequestStage {
        match self {
            ServiceError::InvalidProfile(_) => RequestStage::BuildingRequest,
            ServiceError::ProviderCallFailed(_) => RequestStage::AwaitingProvider,
            ServiceError::Decode(_) => RequestStage::Decoding,
            ServiceError::InvalidProviderResponse(_) => RequestStage::Validating,
        }
    }

    /// True when the caller cancelled the outstanding provider call
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ServiceError::ProviderCallFailed(ProviderError::Cancelled))
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Service failure, status chosen by error kind
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Service(ref err) => {
                let status = match err {
                    ServiceError::InvalidProfile(_) => StatusCode::BAD_REQUEST,
                    ServiceError::ProviderCallFailed(ProviderError::Cancelled) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    ServiceError::ProviderCallFailed(ProviderError::RateLimited) => {
                        StatusCode::TOO_MANY_REQUESTS
                    }
                    ServiceError::ProviderCallFailed(_)
                    | ServiceError::Decode(_)
                    | ServiceError::InvalidProviderResponse(_) => StatusCode::BAD_GATEWAY,
                };
                (status, err.kind(), err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
