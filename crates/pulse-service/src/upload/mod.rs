//! Media uploads with progress and cancellation

mod manager;
mod registry;

pub use manager::{UploadHandle, UploadManager};
pub(crate) use registry::UploadRegistry;
