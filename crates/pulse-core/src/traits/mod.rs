//! Collaborator traits (ports) implemented by the infrastructure layer

mod api;
mod upload;

pub use api::{ApiResult, RealtimeApi};
pub use upload::{MediaUploader, ProgressFn, UploadRequest, UploadedMedia};
