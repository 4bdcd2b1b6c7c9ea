//! Media upload adapter

mod uploader;

pub use uploader::HttpUploader;
