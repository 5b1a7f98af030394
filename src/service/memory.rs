// SPDX-License-Identifier: GPL-3.0-only

//! In-memory photo service
//!
//! Reference implementation of [`PhotoService`] backed by a plain vector.
//! Hosts use it to run the pipeline without a remote service; the
//! integration tests drive everything through it. A round-trip counter and
//! a scriptable upload failure make the remote behavior observable from
//! tests.

use super::types::*;
use super::PhotoService;
use crate::errors::ServiceError;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Vector-backed [`PhotoService`]
pub struct InMemoryPhotoService {
    base_url: String,
    photos: Mutex<Vec<PhotoDescriptor>>,
    round_trips: AtomicU32,
    fail_uploads: Mutex<Option<ServiceError>>,
}

impl InMemoryPhotoService {
    /// Create a service resolving stored paths against the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            photos: Mutex::new(Vec::new()),
            round_trips: AtomicU32::new(0),
            fail_uploads: Mutex::new(None),
        }
    }

    /// Fail every subsequent upload with the given error
    pub fn with_upload_failure(self, error: ServiceError) -> Self {
        *self.fail_uploads.lock().unwrap() = Some(error);
        self
    }

    /// Change the scripted upload failure at runtime; `None` restores
    /// normal behavior
    pub fn set_upload_failure(&self, error: Option<ServiceError>) {
        *self.fail_uploads.lock().unwrap() = error;
    }

    /// Number of round trips the service has served
    ///
    /// Every trait call counts as one, including failed ones.
    pub fn round_trip_count(&self) -> u32 {
        self.round_trips.load(Ordering::Relaxed)
    }

    /// Number of photos currently stored, across all owners
    pub fn photo_count(&self) -> usize {
        self.photos.lock().unwrap().len()
    }

    /// Replace the stored photos wholesale
    ///
    /// Bootstrap/test helper: accepts any primary-flag distribution,
    /// including ones the service's own operations would never produce.
    pub fn seed(&self, photos: Vec<PhotoDescriptor>) {
        *self.photos.lock().unwrap() = photos;
    }

    fn bump(&self) {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
    }

    /// Canonical listing order: primary first, then oldest first
    fn sort_listing(photos: &mut [PhotoDescriptor]) {
        photos.sort_by(|a, b| {
            b.is_primary
                .cmp(&a.is_primary)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
    }
}

#[async_trait]
impl PhotoService for InMemoryPhotoService {
    async fn list_photos(&self, owner: RecordId) -> Result<Vec<PhotoDescriptor>, ServiceError> {
        self.bump();
        let photos = self.photos.lock().unwrap();
        let mut listing: Vec<PhotoDescriptor> = photos
            .iter()
            .filter(|photo| photo.owner_id == Some(owner))
            .cloned()
            .collect();
        Self::sort_listing(&mut listing);
        debug!(owner = %owner, count = listing.len(), "Listed photos");
        Ok(listing)
    }

    async fn upload_photo(&self, request: UploadRequest) -> Result<PhotoDescriptor, ServiceError> {
        self.bump();
        if let Some(error) = self.fail_uploads.lock().unwrap().clone() {
            return Err(error);
        }

        let mut photos = self.photos.lock().unwrap();
        if request.make_primary {
            for photo in photos.iter_mut().filter(|p| p.owner_id == request.owner_id) {
                photo.is_primary = false;
            }
        }

        let descriptor = PhotoDescriptor {
            id: Uuid::new_v4(),
            owner_id: request.owner_id,
            storage: StorageRef::Stored {
                path: request.file_name,
            },
            mime_type: request.mime_type,
            is_primary: request.make_primary,
            created_at: Utc::now(),
        };
        photos.push(descriptor.clone());

        info!(id = %descriptor.id, size = request.data.len(), "Stored photo");
        Ok(descriptor)
    }

    async fn set_primary_photo(&self, photo: PhotoId, owner: RecordId) -> Result<(), ServiceError> {
        self.bump();
        let mut photos = self.photos.lock().unwrap();

        if !photos
            .iter()
            .any(|p| p.id == photo && p.owner_id == Some(owner))
        {
            return Err(ServiceError::NotFound(format!(
                "photo {} under record {}",
                photo, owner
            )));
        }

        // Clear-then-set under one lock mirrors the remote transaction
        for entry in photos.iter_mut().filter(|p| p.owner_id == Some(owner)) {
            entry.is_primary = entry.id == photo;
        }

        info!(photo = %photo, owner = %owner, "Primary photo updated");
        Ok(())
    }

    async fn delete_photo(&self, photo: PhotoId) -> Result<(), ServiceError> {
        self.bump();
        let mut photos = self.photos.lock().unwrap();
        let before = photos.len();
        photos.retain(|p| p.id != photo);

        if photos.len() == before {
            return Err(ServiceError::NotFound(format!("photo {}", photo)));
        }
        info!(photo = %photo, "Photo deleted");
        Ok(())
    }

    fn public_base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(owner: Option<RecordId>, name: &str, primary: bool) -> UploadRequest {
        UploadRequest {
            data: vec![0xFF, 0xD8, 0xFF],
            file_name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            owner_id: owner,
            make_primary: primary,
        }
    }

    #[tokio::test]
    async fn test_upload_and_list() {
        let service = InMemoryPhotoService::new("https://bucket.test/photos");
        let owner = Uuid::new_v4();

        service
            .upload_photo(request(Some(owner), "a.jpg", true))
            .await
            .unwrap();
        service
            .upload_photo(request(Some(owner), "b.jpg", false))
            .await
            .unwrap();
        service
            .upload_photo(request(None, "pending.jpg", false))
            .await
            .unwrap();

        let listing = service.list_photos(owner).await.unwrap();
        assert_eq!(listing.len(), 2, "unattached photos are not listed");
        assert!(listing[0].is_primary, "primary sorts first");
        assert_eq!(listing[0].storage_path(), Some("a.jpg"));
    }

    #[tokio::test]
    async fn test_upload_with_make_primary_clears_previous() {
        let service = InMemoryPhotoService::new("https://bucket.test");
        let owner = Uuid::new_v4();

        let first = service
            .upload_photo(request(Some(owner), "a.jpg", true))
            .await
            .unwrap();
        service
            .upload_photo(request(Some(owner), "b.jpg", true))
            .await
            .unwrap();

        let listing = service.list_photos(owner).await.unwrap();
        let primaries: Vec<_> = listing.iter().filter(|p| p.is_primary).collect();
        assert_eq!(primaries.len(), 1);
        assert_ne!(primaries[0].id, first.id);
    }

    #[tokio::test]
    async fn test_set_primary_unknown_photo() {
        let service = InMemoryPhotoService::new("https://bucket.test");
        let result = service
            .set_primary_photo(Uuid::new_v4(), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_photo() {
        let service = InMemoryPhotoService::new("https://bucket.test");
        let result = service.delete_photo(Uuid::new_v4()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_round_trips_are_counted() {
        let service = InMemoryPhotoService::new("https://bucket.test");
        let owner = Uuid::new_v4();

        assert_eq!(service.round_trip_count(), 0);
        service.list_photos(owner).await.unwrap();
        let stored = service
            .upload_photo(request(Some(owner), "a.jpg", false))
            .await
            .unwrap();
        service.delete_photo(stored.id).await.unwrap();
        assert_eq!(service.round_trip_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_upload_failure() {
        let service = InMemoryPhotoService::new("https://bucket.test")
            .with_upload_failure(ServiceError::Transport("connection reset".into()));

        let result = service.upload_photo(request(None, "a.jpg", false)).await;
        assert!(matches!(result, Err(ServiceError::Transport(_))));

        service.set_upload_failure(None);
        assert!(service
            .upload_photo(request(None, "a.jpg", false))
            .await
            .is_ok());
    }
}
