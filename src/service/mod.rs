// SPDX-License-Identifier: GPL-3.0-only

//! Photo service collaborator contract
//!
//! The hosted database/storage side of the pipeline, consumed only through
//! this trait: list, upload, set-primary, delete, and URL resolution. The
//! crate ships [`InMemoryPhotoService`] as the reference implementation;
//! hosts bind the trait to their real transport.
//!
//! The one-primary invariant lives here: after `set_primary_photo` (or an
//! upload with `make_primary`) exactly one descriptor under the owning
//! record has `is_primary = true`, regardless of the prior distribution.

pub mod memory;
pub mod types;

pub use memory::InMemoryPhotoService;
pub use types::{PhotoDescriptor, PhotoId, RecordId, StorageRef, UploadRequest};

use crate::errors::ServiceError;
use async_trait::async_trait;
use base64::Engine as _;

/// Remote photo storage and cataloging operations
///
/// Every method is a single round trip against the service. Failures are
/// reported, never retried here; retry policy belongs to the caller.
#[async_trait]
pub trait PhotoService: Send + Sync {
    /// List the photos attached to an owning record, in the service's
    /// canonical order
    async fn list_photos(&self, owner: RecordId) -> Result<Vec<PhotoDescriptor>, ServiceError>;

    /// Store a photo and return its descriptor
    ///
    /// With `make_primary` set, any previous primary under the same owner is
    /// cleared in the same transaction.
    async fn upload_photo(&self, request: UploadRequest) -> Result<PhotoDescriptor, ServiceError>;

    /// Make the given photo the record's only primary image
    async fn set_primary_photo(&self, photo: PhotoId, owner: RecordId) -> Result<(), ServiceError>;

    /// Delete a stored photo
    async fn delete_photo(&self, photo: PhotoId) -> Result<(), ServiceError>;

    /// Base URL of the service's public bucket
    fn public_base_url(&self) -> &str;

    /// Displayable URI for a descriptor
    ///
    /// Inline payloads become a base64 data URI; stored paths resolve
    /// against [`PhotoService::public_base_url`].
    fn resolve_photo_url(&self, descriptor: &PhotoDescriptor) -> String {
        match &descriptor.storage {
            StorageRef::Inline { payload } => format!(
                "data:{};base64,{}",
                descriptor.mime_type,
                base64::engine::general_purpose::STANDARD.encode(payload)
            ),
            StorageRef::Stored { path } => {
                format!("{}/{}", self.public_base_url().trim_end_matches('/'), path)
            }
        }
    }
}
