//! Mapping of HTTP failures onto domain and upload errors

use pulse_core::{DomainError, UploadError};
use reqwest::StatusCode;
use serde::Deserialize;

/// Error body shapes the backend uses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Best-effort human readable message from an error response body
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

/// Classify a non-success status; `not_found` supplies the resource-specific error
pub(crate) fn status_error(
    status: StatusCode,
    message: String,
    not_found: impl FnOnce() -> DomainError,
) -> DomainError {
    match status {
        StatusCode::UNAUTHORIZED => DomainError::Unauthenticated,
        StatusCode::FORBIDDEN => DomainError::Forbidden(message),
        StatusCode::NOT_FOUND => not_found(),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => DomainError::Timeout,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            DomainError::ValidationError(message)
        }
        s if s.is_client_error() => DomainError::Rejected(message),
        _ => DomainError::Unavailable(message),
    }
}

/// Classify a transport-level failure
pub(crate) fn transport_error(e: &reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::Timeout
    } else if e.is_decode() {
        DomainError::Decode(e.to_string())
    } else if e.is_builder() {
        DomainError::InternalError(e.to_string())
    } else {
        DomainError::Unavailable(e.to_string())
    }
}

pub(crate) fn upload_transport_error(e: &reqwest::Error) -> UploadError {
    if e.is_timeout() {
        UploadError::Timeout
    } else {
        UploadError::Network(e.to_string())
    }
}
