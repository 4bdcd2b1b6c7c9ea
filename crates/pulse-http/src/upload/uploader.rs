//! Multipart media upload with transfer progress

use async_trait::async_trait;
use futures_util::stream;
use pulse_common::UploadConfig;
use pulse_core::{MediaUploader, ProgressFn, UploadError, UploadRequest, UploadedMedia};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use crate::client::HttpApiClient;
use crate::error::{error_message, upload_transport_error};

/// Size of the body chunks progress is reported at
const CHUNK_SIZE: usize = 64 * 1024;

/// Uploads through the backend's upload proxy, authorised with the API client's token
pub struct HttpUploader {
    http: Client,
    api: Arc<HttpApiClient>,
    path: String,
    max_size: u64,
    timeout: Duration,
}

impl HttpUploader {
    pub fn new(http: Client, api: Arc<HttpApiClient>, config: &UploadConfig) -> Self {
        Self {
            http,
            api,
            path: config.path.clone(),
            max_size: config.max_file_size_bytes(),
            timeout: config.timeout(),
        }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }
}

#[async_trait]
impl MediaUploader for HttpUploader {
    async fn upload(
        &self,
        request: UploadRequest,
        progress: ProgressFn,
    ) -> Result<UploadedMedia, UploadError> {
        let total = request.size();
        if total > self.max_size {
            return Err(UploadError::TooLarge {
                size: total,
                limit: self.max_size,
            });
        }

        tracing::debug!(
            temp_id = %request.temp_id,
            file_name = %request.file_name,
            size = total,
            "Uploading media"
        );

        let part = Part::stream_with_length(progress_body(request.bytes, progress), total)
            .file_name(request.file_name)
            .mime_str(&request.mime_type)
            .map_err(|e| UploadError::Network(format!("invalid mime type: {e}")))?;
        let form = Form::new().part("file", part);

        let mut builder = self
            .http
            .post(self.api.url(&self.path))
            .timeout(self.timeout)
            .multipart(form);
        if let Some(token) = self.api.token() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| upload_transport_error(&e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::PAYLOAD_TOO_LARGE => UploadError::TooLarge {
                    size: total,
                    limit: self.max_size,
                },
                _ => UploadError::from_status(status.as_u16(), error_message(status, &body)),
            });
        }

        response
            .json::<UploadedMedia>()
            .await
            .map_err(|e| UploadError::Server {
                status: status.as_u16(),
                message: format!("malformed upload response: {e}"),
            })
    }
}

/// Stream `bytes` in chunks, reporting cumulative bytes as each chunk is handed to the
/// connection
fn progress_body(bytes: Vec<u8>, progress: ProgressFn) -> Body {
    let total = bytes.len() as u64;
    let chunks: Vec<Vec<u8>> = bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();

    let mut sent = 0u64;
    let stream = stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        progress(sent, total);
        Ok::<_, std::io::Error>(chunk)
    }));
    Body::wrap_stream(stream)
}
