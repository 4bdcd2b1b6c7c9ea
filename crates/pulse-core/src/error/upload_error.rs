//! Upload failures, classified for user-facing messages

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Network error during upload: {0}")]
    Network(String),

    #[error("File too large: {size} bytes exceeds {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("Upload not authorized")]
    Unauthorized,

    #[error("Upload timed out")]
    Timeout,

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Upload failed with status {status}: {message}")]
    Server { status: u16, message: String },
}

impl UploadError {
    /// Cancellation is user-initiated and never surfaces a failure notice
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Short message suitable for a toast
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) => "Network error. Check your connection and try again.",
            Self::TooLarge { .. } => "File is too large.",
            Self::Unauthorized => "Your session has expired. Please sign in again.",
            Self::Timeout => "Upload timed out. Please try again.",
            Self::Cancelled => "Upload cancelled.",
            Self::Server { .. } => "Upload failed. Please try again.",
        }
    }

    /// Classify an HTTP status returned by the upload endpoint
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            408 | 504 => Self::Timeout,
            413 => Self::TooLarge { size: 0, limit: 0 },
            _ => Self::Server {
                status,
                message: message.into(),
            },
        }
    }
}
