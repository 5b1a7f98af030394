// SPDX-License-Identifier: GPL-3.0-only

//! Validation and settlement behavior of the upload gateway

use std::sync::Arc;
use stockshot::errors::{ServiceError, UploadError};
use stockshot::gateway::{UploadGateway, UploadImage};
use stockshot::service::{InMemoryPhotoService, PhotoService};
use uuid::Uuid;

fn gateway() -> (UploadGateway, Arc<InMemoryPhotoService>) {
    let service = Arc::new(InMemoryPhotoService::new("https://bucket.test/photos"));
    let gateway = UploadGateway::new(Arc::clone(&service) as Arc<dyn PhotoService>);
    (gateway, service)
}

#[tokio::test]
async fn test_oversize_upload_never_reaches_the_service() {
    let (gateway, service) = gateway();
    let image = UploadImage::new(vec![0u8; 12 * 1024 * 1024], "image/jpeg");

    let result = gateway.upload(image, None, "widget", false).await;

    assert!(matches!(
        result,
        Err(UploadError::TooLarge { size, .. }) if size == 12 * 1024 * 1024
    ));
    assert_eq!(service.round_trip_count(), 0, "rejected before any round trip");
}

#[tokio::test]
async fn test_unaccepted_type_never_reaches_the_service() {
    let (gateway, service) = gateway();
    let image = UploadImage::new(vec![0u8; 512], "application/pdf");

    let result = gateway.upload(image, None, "widget", false).await;

    assert!(matches!(result, Err(UploadError::InvalidFormat(_))));
    assert_eq!(service.round_trip_count(), 0);
}

#[tokio::test]
async fn test_batch_settles_only_the_valid_files() {
    let (gateway, service) = gateway();

    let report = gateway
        .upload_batch(
            vec![
                UploadImage::new(vec![1; 2048], "image/jpeg"),
                UploadImage::new(vec![2; 2048], "application/zip"),
                UploadImage::new(vec![3; 2048], "image/webp"),
            ],
            None,
            "widget",
            true,
        )
        .await;

    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failure_count(), 1);
    assert!(!report.is_complete_success());
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.to_string(), "2 uploaded, 1 failed");
    assert_eq!(service.photo_count(), 2, "the failure never aborted its siblings");

    let primaries = report.succeeded.iter().filter(|d| d.is_primary).count();
    assert_eq!(primaries, 1, "first file of a fresh collection is the primary");
    assert!(report.succeeded[0].is_primary);
}

#[tokio::test]
async fn test_batch_files_get_distinct_names() {
    let (gateway, _service) = gateway();
    let images = (0..4)
        .map(|i| UploadImage::new(vec![i as u8; 1024], "image/jpeg"))
        .collect();

    let report = gateway.upload_batch(images, None, "widget", false).await;

    assert!(report.is_complete_success());
    let mut paths: Vec<_> = report
        .succeeded
        .iter()
        .filter_map(|d| d.storage_path().map(String::from))
        .collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 4, "names never collide inside a batch");
    assert!(paths.iter().all(|p| p.starts_with("widget_") && p.ends_with(".jpg")));
}

#[tokio::test]
async fn test_canonical_mutations_are_single_round_trips() {
    let (gateway, service) = gateway();
    let owner = Uuid::new_v4();
    let stored = gateway
        .upload(
            UploadImage::new(vec![7; 512], "image/png"),
            Some(owner),
            "widget",
            true,
        )
        .await
        .unwrap();
    let baseline = service.round_trip_count();

    gateway.set_primary(stored.id, owner).await.unwrap();
    assert_eq!(service.round_trip_count(), baseline + 1);

    gateway.delete(stored.id).await.unwrap();
    assert_eq!(service.round_trip_count(), baseline + 2);
    assert_eq!(service.photo_count(), 0);
}

#[tokio::test]
async fn test_service_rejection_maps_to_upload_error() {
    let service = Arc::new(
        InMemoryPhotoService::new("https://bucket.test")
            .with_upload_failure(ServiceError::Rejected("quota exceeded".into())),
    );
    let gateway = UploadGateway::new(Arc::clone(&service) as Arc<dyn PhotoService>);

    let result = gateway
        .upload(UploadImage::new(vec![0; 64], "image/jpeg"), None, "widget", false)
        .await;

    assert!(matches!(result, Err(UploadError::Rejected(_))));
    assert_eq!(service.round_trip_count(), 1, "one attempt, no retry");
}
