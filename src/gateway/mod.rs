// SPDX-License-Identifier: GPL-3.0-only

//! Upload gateway
//!
//! The gateway is the only path from an image buffer to the photo service.
//! It validates locally (accepted MIME type, size ceiling) before any
//! round trip, synthesizes a collision-free file name from the caller's
//! naming key, and forwards the buffer to [`PhotoService::upload_photo`].
//!
//! Policy boundaries:
//! - Validation failures never reach the service.
//! - Transport failures are reported, never retried here.
//! - Uploads without an owning record are still sent immediately; holding
//!   the resulting descriptor as pending is the caller's job.
//! - Batches settle completely: every file's outcome is reported and a
//!   failure never cancels its siblings.

pub mod batch;

pub use batch::{BatchFailure, BatchReport};

use crate::constants::upload;
use crate::editor::EditedImage;
use crate::errors::{ServiceError, UploadError};
use crate::service::{PhotoDescriptor, PhotoId, PhotoService, RecordId, UploadRequest};
use futures::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// An encoded image buffer with its MIME type, ready for validation
#[derive(Debug, Clone)]
pub struct UploadImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl UploadImage {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<EditedImage> for UploadImage {
    fn from(image: EditedImage) -> Self {
        let mime_type = image.mime_type().to_string();
        Self {
            data: image.data,
            mime_type,
        }
    }
}

/// Validating front door to the photo service
pub struct UploadGateway {
    service: Arc<dyn PhotoService>,
    /// Tiebreaker for names synthesized within the same millisecond
    name_seq: AtomicU64,
}

impl UploadGateway {
    pub fn new(service: Arc<dyn PhotoService>) -> Self {
        Self {
            service,
            name_seq: AtomicU64::new(0),
        }
    }

    /// Local validation: accepted MIME type and size ceiling
    ///
    /// Runs before every upload; callers can also use it as a pre-flight
    /// check without consuming the buffer.
    pub fn validate(mime_type: &str, size: usize) -> Result<(), UploadError> {
        if !upload::is_accepted_mime(mime_type) {
            return Err(UploadError::InvalidFormat(mime_type.to_string()));
        }
        if size > upload::MAX_PAYLOAD_BYTES {
            return Err(UploadError::TooLarge {
                size,
                limit: upload::MAX_PAYLOAD_BYTES,
            });
        }
        Ok(())
    }

    /// Upload one image
    ///
    /// Fails fast with `InvalidFormat` or `TooLarge` before any round trip.
    /// `is_first` asks the service to store the photo as the record's
    /// primary image; callers derive it from their gallery state.
    ///
    /// # Returns
    /// * `Ok(PhotoDescriptor)` - The persisted photo
    /// * `Err(UploadError)` - Validation or transport failure; never
    ///   retried here
    pub async fn upload(
        &self,
        image: UploadImage,
        owner_id: Option<RecordId>,
        naming_key: &str,
        is_first: bool,
    ) -> Result<PhotoDescriptor, UploadError> {
        Self::validate(&image.mime_type, image.data.len())?;

        let file_name = self.synthesize_name(naming_key, &image.mime_type);
        info!(
            file = %file_name,
            size = image.data.len(),
            owner = ?owner_id,
            is_first,
            "Uploading photo"
        );

        let descriptor = self
            .service
            .upload_photo(UploadRequest {
                data: image.data,
                file_name,
                mime_type: image.mime_type,
                owner_id,
                make_primary: is_first,
            })
            .await?;

        Ok(descriptor)
    }

    /// Upload a batch concurrently with all-settled semantics
    ///
    /// Every file is attempted; per-file failures are enumerated in the
    /// report and do not abort siblings. With `none_stored_yet`, the first
    /// file of the batch is uploaded as the primary image.
    pub async fn upload_batch(
        &self,
        images: Vec<UploadImage>,
        owner_id: Option<RecordId>,
        naming_key: &str,
        none_stored_yet: bool,
    ) -> BatchReport {
        let total = images.len();
        let uploads = images.into_iter().enumerate().map(|(index, image)| {
            let is_first = none_stored_yet && index == 0;
            async move { (index, self.upload(image, owner_id, naming_key, is_first).await) }
        });

        let mut report = BatchReport::default();
        for (index, result) in join_all(uploads).await {
            match result {
                Ok(descriptor) => report.succeeded.push(descriptor),
                Err(error) => {
                    warn!(index, %error, "Batch upload item failed");
                    report.failed.push(BatchFailure { index, error });
                }
            }
        }

        info!(total, report = %report, "Batch upload settled");
        report
    }

    /// Make the photo the record's only primary image; one round trip
    pub async fn set_primary(&self, photo: PhotoId, owner: RecordId) -> Result<(), ServiceError> {
        info!(photo = %photo, owner = %owner, "Setting primary photo");
        self.service.set_primary_photo(photo, owner).await
    }

    /// Delete a stored photo; one round trip
    pub async fn delete(&self, photo: PhotoId) -> Result<(), ServiceError> {
        info!(photo = %photo, "Deleting photo");
        self.service.delete_photo(photo).await
    }

    /// `{naming_key}_{timestamp}_{seq}.{ext}`
    ///
    /// The timestamp carries milliseconds; the sequence keeps concurrent
    /// batch items within the same millisecond apart.
    fn synthesize_name(&self, naming_key: &str, mime_type: &str) -> String {
        let extension = upload::extension_for_mime(mime_type).unwrap_or("jpg");
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let seq = self.name_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}_{:03}.{}", naming_key, timestamp, seq, extension)
    }
}

impl std::fmt::Debug for UploadGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadGateway")
            .field("names_issued", &self.name_seq.load(Ordering::Relaxed))
            .finish()
    }
}
