// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the photo pipeline

use std::fmt;

/// Result type alias using PipelineError
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Top-level pipeline error type
#[derive(Debug, Clone)]
pub enum PipelineError {
    /// Capture source errors
    Capture(CaptureError),
    /// Crop/resize/compress errors
    Edit(EditError),
    /// Upload gateway errors
    Upload(UploadError),
    /// Photo service errors
    Service(ServiceError),
    /// Generic error with message
    Other(String),
}

/// Capture source errors
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// Permission denied or the stream request was rejected
    Unavailable,
    /// No camera matches the requested facing
    NoDeviceFound,
    /// Camera is held by another consumer
    Busy,
    /// Stream is not playable yet
    NotReady,
    /// Backend failure with detail
    Failed(String),
}

/// Crop/resize/compress errors
#[derive(Debug, Clone)]
pub enum EditError {
    /// Confirm was requested with a zero-area crop selection
    NoRegionSelected,
    /// Crop, resample, or encode failed
    RenderFailed(String),
}

/// Upload gateway errors
#[derive(Debug, Clone)]
pub enum UploadError {
    /// MIME type is not in the accepted image list
    InvalidFormat(String),
    /// Payload exceeds the size ceiling
    TooLarge { size: usize, limit: usize },
    /// Transmission failed; the caller decides whether to retry
    Transport(String),
    /// The service refused the request
    Rejected(String),
}

/// Photo service errors reported by the collaborator
#[derive(Debug, Clone)]
pub enum ServiceError {
    /// Request never completed
    Transport(String),
    /// Referenced photo or record does not exist
    NotFound(String),
    /// The service rejected the request
    Rejected(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Capture(e) => write!(f, "Capture error: {}", e),
            PipelineError::Edit(e) => write!(f, "Edit error: {}", e),
            PipelineError::Upload(e) => write!(f, "Upload error: {}", e),
            PipelineError::Service(e) => write!(f, "Service error: {}", e),
            PipelineError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Unavailable => write!(f, "Camera unavailable"),
            CaptureError::NoDeviceFound => write!(f, "No camera devices found"),
            CaptureError::Busy => write!(f, "Camera is busy"),
            CaptureError::NotReady => write!(f, "Stream is not ready"),
            CaptureError::Failed(msg) => write!(f, "Capture failed: {}", msg),
        }
    }
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::NoRegionSelected => write!(f, "No crop region selected"),
            EditError::RenderFailed(msg) => write!(f, "Render failed: {}", msg),
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::InvalidFormat(mime) => write!(f, "Unsupported image format: {}", mime),
            UploadError::TooLarge { size, limit } => {
                write!(f, "Image is too large: {} bytes (limit {})", size, limit)
            }
            UploadError::Transport(msg) => write!(f, "Upload transport failed: {}", msg),
            UploadError::Rejected(msg) => write!(f, "Upload rejected: {}", msg),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Transport(msg) => write!(f, "Transport failed: {}", msg),
            ServiceError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServiceError::Rejected(msg) => write!(f, "Rejected: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for EditError {}
impl std::error::Error for UploadError {}
impl std::error::Error for ServiceError {}

// Conversions from sub-errors to PipelineError
impl From<CaptureError> for PipelineError {
    fn from(err: CaptureError) -> Self {
        PipelineError::Capture(err)
    }
}

impl From<EditError> for PipelineError {
    fn from(err: EditError) -> Self {
        PipelineError::Edit(err)
    }
}

impl From<UploadError> for PipelineError {
    fn from(err: UploadError) -> Self {
        PipelineError::Upload(err)
    }
}

impl From<ServiceError> for PipelineError {
    fn from(err: ServiceError) -> Self {
        PipelineError::Service(err)
    }
}

// Service failures surface through the gateway as upload errors
impl From<ServiceError> for UploadError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Transport(msg) => UploadError::Transport(msg),
            ServiceError::NotFound(msg) => UploadError::Rejected(msg),
            ServiceError::Rejected(msg) => UploadError::Rejected(msg),
        }
    }
}

impl From<String> for PipelineError {
    fn from(msg: String) -> Self {
        PipelineError::Other(msg)
    }
}

impl From<&str> for PipelineError {
    fn from(msg: &str) -> Self {
        PipelineError::Other(msg.to_string())
    }
}
