//! # pulse-http
//!
//! HTTP collaborator adapter: implements [`pulse_core::RealtimeApi`] and
//! [`pulse_core::MediaUploader`] against the backend REST API with `reqwest`.

pub mod client;
mod error;
pub mod upload;

pub use client::HttpApiClient;
pub use upload::HttpUploader;
