// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the photo service contract

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned identity of a stored photo
pub type PhotoId = Uuid;

/// Identity of the inventory record a photo belongs to
pub type RecordId = Uuid;

/// Where the photo bytes live on the service side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageRef {
    /// Object stored under a path in the service's public bucket
    Stored { path: String },
    /// Payload embedded in the record itself
    Inline { payload: Vec<u8> },
}

/// Server-side record identifying a stored photo
///
/// Created by the upload response, mutated by the primary toggle, destroyed
/// by delete. At most one descriptor per owning record carries
/// `is_primary = true`; the service enforces that transactionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoDescriptor {
    pub id: PhotoId,
    /// Owning record; `None` while the record does not exist yet
    pub owner_id: Option<RecordId>,
    pub storage: StorageRef,
    pub mime_type: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl PhotoDescriptor {
    /// Storage path, when the photo is bucket-stored
    pub fn storage_path(&self) -> Option<&str> {
        match &self.storage {
            StorageRef::Stored { path } => Some(path),
            StorageRef::Inline { .. } => None,
        }
    }
}

/// Upload payload and metadata handed to the service
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    /// Owning record; `None` uploads the photo unattached
    pub owner_id: Option<RecordId>,
    /// Mark the stored photo as the record's primary image
    pub make_primary: bool,
}
