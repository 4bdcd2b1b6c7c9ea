//! Authenticated JSON client for the backend REST API

mod api_client;
mod responses;

pub use api_client::HttpApiClient;
