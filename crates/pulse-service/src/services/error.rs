//! Service layer errors
//!
//! Every failure a view can see: rejected or undeliverable mutations, channel problems,
//! upload failures and local validation. `error_code()` is what failure notices carry.

use pulse_common::AppError;
use pulse_core::{DomainError, UploadError};
use pulse_realtime::ChannelError;
use std::fmt;

/// Error returned by the services and the upload manager
#[derive(Debug)]
pub enum ServiceError {
    /// Failure reported by the HTTP collaborator
    Domain(DomainError),

    /// Application error (config, token, etc.)
    App(AppError),

    /// Realtime channel failure with no fallback left
    Channel(ChannelError),

    /// Upload failure
    Upload(UploadError),

    /// No session is active
    NotSignedIn,

    /// State the operation depends on has not been loaded
    NotFound { resource: &'static str, id: String },

    /// Validation error
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::Channel(e) => write!(f, "{e}"),
            Self::Upload(e) => write!(f, "{e}"),
            Self::NotSignedIn => write!(f, "Not signed in"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            Self::Channel(e) => Some(e),
            Self::Upload(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code for notices and logs
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Channel(ChannelError::NotConnected | ChannelError::Closed) => "OFFLINE",
            Self::Channel(ChannelError::AckTimeout(_)) => "TIMEOUT",
            Self::Channel(ChannelError::Rejected(_)) => "REJECTED",
            Self::Channel(ChannelError::Protocol(_)) => "PROTOCOL_ERROR",
            Self::Upload(UploadError::Cancelled) => "UPLOAD_CANCELLED",
            Self::Upload(_) => "UPLOAD_FAILED",
            Self::NotSignedIn => "NOT_SIGNED_IN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_transient(),
            Self::Channel(e) => e.is_transient(),
            Self::Upload(e) => matches!(e, UploadError::Network(_) | UploadError::Timeout),
            _ => false,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ChannelError> for ServiceError {
    fn from(err: ChannelError) -> Self {
        Self::Channel(err)
    }
}

impl From<UploadError> for ServiceError {
    fn from(err: UploadError) -> Self {
        Self::Upload(err)
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
