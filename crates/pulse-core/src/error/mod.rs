//! Domain error types

mod domain_error;
mod upload_error;

pub use domain_error::DomainError;
pub use upload_error::UploadError;
