//! Upload manager integration tests
//!
//! Run with: cargo test -p integration-tests --test upload_tests

use std::time::Duration;

use integration_tests::{fixtures::*, TestClient};
use pulse_core::{UploadError, UploadRequest};
use pulse_service::{NoticeKind, ServiceError, UploadManager};

fn image(bytes: usize) -> UploadRequest {
    UploadRequest::new("photo.png", "image/png", vec![0u8; bytes])
}

#[tokio::test(start_paused = true)]
async fn test_progress_reaches_complete_only_on_confirmation() {
    let client = TestClient::new();
    let uploads = UploadManager::new(&client.ctx);

    let handle = uploads.start(image(4096)).unwrap();
    assert_eq!(handle.progress(), 0);

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(handle.progress(), 75);
    assert_eq!(uploads.in_flight(), 1);

    let mut updates = handle.progress_updates();
    let media = handle.finish().await.unwrap();
    assert_eq!(media.url, "https://cdn.test/photo.png");
    assert_eq!(*updates.borrow_and_update(), 100);
    assert_eq!(uploads.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_progress_never_shows_complete_before_confirmation() {
    let client = TestClient::new();
    let uploads = UploadManager::new(&client.ctx);
    let handle = uploads.start(image(1000)).unwrap();
    let mut updates = handle.progress_updates();

    let mut seen = Vec::new();
    while updates.changed().await.is_ok() {
        seen.push(*updates.borrow_and_update());
        if seen.last() == Some(&100) {
            break;
        }
    }

    let (last, transfer) = seen.split_last().unwrap();
    assert_eq!(*last, 100);
    assert!(transfer.starts_with(&[25, 50, 75]));
    assert!(transfer.iter().all(|percent| *percent <= 99));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_is_silent() {
    let client = TestClient::new();
    let uploads = UploadManager::new(&client.ctx);
    let mut notices = client.ctx.notices().subscribe();

    let handle = uploads.start(image(1000)).unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(uploads.cancel(handle.temp_id()));

    let result = handle.finish().await;
    assert!(matches!(
        result,
        Err(ServiceError::Upload(UploadError::Cancelled))
    ));
    assert!(notices.try_recv().is_err());
    assert_eq!(uploads.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failure_publishes_notice() {
    let client = TestClient::new();
    client.uploader.fail_with(UploadError::Server {
        status: 500,
        message: "disk full".into(),
    });
    let uploads = UploadManager::new(&client.ctx);
    let mut notices = client.ctx.notices().subscribe();

    let handle = uploads.start(image(1000)).unwrap();
    let result = handle.finish().await;

    assert!(matches!(
        result,
        Err(ServiceError::Upload(UploadError::Server { status: 500, .. }))
    ));
    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.kind, NoticeKind::UploadFailed);
    assert_eq!(notice.message, "Upload failed. Please try again.");
}

#[tokio::test(start_paused = true)]
async fn test_oversized_file_rejected_before_transfer() {
    let mut config = test_config();
    config.upload.max_file_size_mb = 1;
    let client = TestClient::with_config(config);
    let uploads = UploadManager::new(&client.ctx);
    let mut notices = client.ctx.notices().subscribe();

    let result = uploads.start(image(2 * 1024 * 1024));

    assert!(matches!(
        result,
        Err(ServiceError::Upload(UploadError::TooLarge { .. }))
    ));
    assert_eq!(client.uploader.calls(), 0);
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::UploadFailed);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_temp_id_rejected() {
    let client = TestClient::new();
    let uploads = UploadManager::new(&client.ctx);
    let request = image(1000);

    let _handle = uploads.start(request.clone()).unwrap();
    let duplicate = uploads.start(request);

    assert!(matches!(duplicate, Err(ServiceError::Validation(_))));
    assert_eq!(uploads.in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_uploads() {
    let client = TestClient::new();
    let uploads = UploadManager::new(&client.ctx);

    let first = uploads.start(image(1000)).unwrap();
    let second = uploads.start(image(1000)).unwrap();
    client.ctx.shutdown();

    assert!(first.finish().await.is_err());
    assert!(second.finish().await.is_err());
    assert_eq!(uploads.in_flight(), 0);
}
