// SPDX-License-Identifier: GPL-3.0-only

//! Flow state machine and host-facing event types

use crate::capture::StreamRequest;
use crate::editor::{EditSession, EditedImage};
use crate::errors::{CaptureError, EditError, ServiceError, UploadError};
use crate::service::{PhotoDescriptor, RecordId};
use std::fmt;

/// Capture flow state machine
///
/// `Capturing` is the initial stage on every open; `Idle` is the terminal
/// stage after an upload, an abort, or before the first open. The editing
/// stages carry their working data so leaving a stage releases its buffers.
#[derive(Debug, Default)]
pub enum FlowStage {
    /// No active flow
    #[default]
    Idle,
    /// Live camera feed, waiting for the shutter
    Capturing,
    /// A frame is held by an edit session
    Editing { session: EditSession },
    /// A render is held for review before upload
    Reviewing {
        session: EditSession,
        image: EditedImage,
    },
}

impl FlowStage {
    /// Stage name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            FlowStage::Idle => "idle",
            FlowStage::Capturing => "capturing",
            FlowStage::Editing { .. } => "editing",
            FlowStage::Reviewing { .. } => "reviewing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, FlowStage::Idle)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, FlowStage::Capturing)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, FlowStage::Editing { .. })
    }

    pub fn is_reviewing(&self) -> bool {
        matches!(self, FlowStage::Reviewing { .. })
    }

    /// Take the stage out, leaving `Idle`
    pub fn take(&mut self) -> FlowStage {
        std::mem::take(self)
    }
}

/// Behavior switches for the capture flow
#[derive(Debug, Clone, Copy)]
pub struct FlowOptions {
    /// Insert the review stage between confirm and upload
    pub review_enabled: bool,
    /// Stream request used whenever the flow (re)opens the camera
    pub stream: StreamRequest,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            review_enabled: true,
            stream: StreamRequest::default(),
        }
    }
}

/// Callback receiving a persisted descriptor
pub type DescriptorCallback = Box<dyn FnMut(&PhotoDescriptor) + Send>;

/// View context bound when the flow opens
///
/// `on_uploaded` fires for photos attached to the owning record;
/// `on_pending` fires for photos uploaded before the record exists. Each
/// fires exactly once per persisted photo.
pub struct OpenParams {
    pub owner_id: Option<RecordId>,
    pub naming_key: String,
    pub on_uploaded: Option<DescriptorCallback>,
    pub on_pending: Option<DescriptorCallback>,
}

impl OpenParams {
    pub fn new(owner_id: Option<RecordId>, naming_key: impl Into<String>) -> Self {
        Self {
            owner_id,
            naming_key: naming_key.into(),
            on_uploaded: None,
            on_pending: None,
        }
    }

    /// Builder-style attached-photo callback
    pub fn on_uploaded(mut self, callback: impl FnMut(&PhotoDescriptor) + Send + 'static) -> Self {
        self.on_uploaded = Some(Box::new(callback));
        self
    }

    /// Builder-style pending-photo callback
    pub fn on_pending(mut self, callback: impl FnMut(&PhotoDescriptor) + Send + 'static) -> Self {
        self.on_pending = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for OpenParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenParams")
            .field("owner_id", &self.owner_id)
            .field("naming_key", &self.naming_key)
            .field("on_uploaded", &self.on_uploaded.is_some())
            .field("on_pending", &self.on_pending.is_some())
            .finish()
    }
}

/// What a confirm produced
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// The render is held in the review stage
    AwaitingReview,
    /// The photo was uploaded and the flow finished
    Uploaded(PhotoDescriptor),
}

/// User-visible notification emitted on the manager's event channel
///
/// Notices are how failures degrade: every one maps to a toast plus a
/// safe-state transition, never an abort of the hosting view.
#[derive(Debug)]
pub enum Notice {
    /// Camera acquisition or sampling failed; offer a retry
    CaptureFailed(CaptureError),
    /// An edit action was blocked; state is unchanged
    EditRejected(EditError),
    /// An upload failed locally or in transit
    UploadFailed(UploadError),
    /// A gallery query or mutation failed on the service side
    ServiceFailed(ServiceError),
    /// A batch finished; both counts are always reported
    BatchSettled { uploaded: usize, failed: usize },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::CaptureFailed(e) => write!(f, "Camera failed: {}", e),
            Notice::EditRejected(e) => write!(f, "{}", e),
            Notice::UploadFailed(e) => write!(f, "{}", e),
            Notice::ServiceFailed(e) => write!(f, "Photo service failed: {}", e),
            Notice::BatchSettled { uploaded, failed } => {
                write!(f, "{} photos uploaded, {} failed", uploaded, failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(FlowStage::Idle.name(), "idle");
        assert_eq!(FlowStage::Capturing.name(), "capturing");
        assert!(FlowStage::default().is_idle());
    }

    #[test]
    fn test_take_leaves_idle() {
        let mut stage = FlowStage::Capturing;
        let taken = stage.take();
        assert!(taken.is_capturing());
        assert!(stage.is_idle());
    }

    #[test]
    fn test_open_params_builder() {
        let params = OpenParams::new(None, "widget").on_pending(|_| {});
        assert!(params.on_pending.is_some());
        assert!(params.on_uploaded.is_none());
        assert_eq!(params.naming_key, "widget");
    }

    #[test]
    fn test_batch_notice_reports_both_counts() {
        let notice = Notice::BatchSettled {
            uploaded: 2,
            failed: 1,
        };
        assert_eq!(notice.to_string(), "2 photos uploaded, 1 failed");
    }
}
