//! Upload manager
//!
//! Progress is reported as a percentage on a watch channel. Transfer progress is capped
//! at 99 so the bar only reaches 100 once the server has confirmed the stored file.

use pulse_core::{ProgressFn, TempAttachmentId, UploadError, UploadRequest, UploadedMedia};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tracing::instrument;

use crate::services::{Notice, NoticeKind, ServiceContext, ServiceError, ServiceResult};

const TRANSFER_CEILING: u8 = 99;
const COMPLETE: u8 = 100;

/// A running upload
#[derive(Debug)]
pub struct UploadHandle {
    temp_id: TempAttachmentId,
    progress: watch::Receiver<u8>,
    result: oneshot::Receiver<Result<UploadedMedia, UploadError>>,
}

impl UploadHandle {
    /// Temporary id shown on the placeholder attachment
    pub fn temp_id(&self) -> &TempAttachmentId {
        &self.temp_id
    }

    /// Latest progress percentage
    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    /// Receiver for progress changes
    pub fn progress_updates(&self) -> watch::Receiver<u8> {
        self.progress.clone()
    }

    /// Wait for the server's confirmation
    pub async fn finish(self) -> ServiceResult<UploadedMedia> {
        match self.result.await {
            Ok(result) => result.map_err(ServiceError::Upload),
            Err(_) => Err(ServiceError::internal("Upload task ended without a result")),
        }
    }
}

/// Upload manager
pub struct UploadManager<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UploadManager<'a> {
    /// Create a new UploadManager
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Start uploading a file in the background
    ///
    /// Oversized files are rejected here, before any bytes are sent.
    #[instrument(skip(self, request), fields(temp_id = %request.temp_id, size = request.size()))]
    pub fn start(&self, request: UploadRequest) -> ServiceResult<UploadHandle> {
        let limit = self.ctx.upload_config().max_file_size_bytes();
        if request.size() > limit {
            let error = UploadError::TooLarge {
                size: request.size(),
                limit,
            };
            self.publish_failure(&error);
            return Err(ServiceError::Upload(error));
        }

        let temp_id = request.temp_id.clone();
        let cancel = self
            .ctx
            .uploads()
            .register(temp_id.clone())
            .ok_or_else(|| ServiceError::validation(format!("Upload {temp_id} already running")))?;

        let (progress_tx, progress_rx) = watch::channel(0u8);
        let progress_tx = Arc::new(progress_tx);
        let (result_tx, result_rx) = oneshot::channel();

        let ctx = self.ctx.clone();
        let task_id = temp_id.clone();
        tokio::spawn(async move {
            let reporter = progress_tx.clone();
            let progress: ProgressFn = Arc::new(move |sent, total| {
                let percent = transfer_percent(sent, total);
                reporter.send_if_modified(|current| {
                    if percent > *current {
                        *current = percent;
                        true
                    } else {
                        false
                    }
                });
            });

            let uploader = ctx.uploader().clone();
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(UploadError::Cancelled),
                result = uploader.upload(request, progress) => result,
            };

            ctx.uploads().finish(&task_id);
            match &result {
                Ok(media) => {
                    progress_tx.send_replace(COMPLETE);
                    tracing::info!(temp_id = %task_id, url = %media.url, "Upload confirmed");
                }
                Err(e) if e.is_cancellation() => {
                    tracing::debug!(temp_id = %task_id, "Upload cancelled");
                }
                Err(e) => {
                    tracing::warn!(temp_id = %task_id, error = %e, "Upload failed");
                    UploadManager::new(&ctx).publish_failure(e);
                }
            }

            // The handle may already be gone
            let _ = result_tx.send(result);
        });

        Ok(UploadHandle {
            temp_id,
            progress: progress_rx,
            result: result_rx,
        })
    }

    /// Abort an upload; false if it already finished or never existed
    pub fn cancel(&self, temp_id: &TempAttachmentId) -> bool {
        self.ctx.uploads().cancel(temp_id)
    }

    pub fn in_flight(&self) -> usize {
        self.ctx.uploads().len()
    }

    fn publish_failure(&self, error: &UploadError) {
        self.ctx.notices().publish(Notice::new(
            NoticeKind::UploadFailed,
            ServiceError::Upload(error.clone()).error_code(),
            error.user_message(),
        ));
    }
}

/// Transfer percentage, never above the pre-confirmation ceiling
fn transfer_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = sent.min(total).saturating_mul(100) / total;
    u8::try_from(percent)
        .unwrap_or(TRANSFER_CEILING)
        .min(TRANSFER_CEILING)
}
