// SPDX-License-Identifier: GPL-3.0-only

//! Photo collection orchestration
//!
//! [`PhotoCollectionManager`] drives the capture → edit → review → upload
//! flow as a state machine and maintains the visible gallery. The gallery is
//! never updated locally: after every upload, primary toggle, or delete the
//! manager re-queries the service listing, so server-side ordering and
//! primary-flag rules always win.
//!
//! # Stages
//!
//! ```text
//!             snapshot           confirm            confirm
//! Capturing ──────────▶ Editing ────────▶ Reviewing ────────▶ Idle (uploaded)
//!     ▲                 │     ▲               │    │
//!     │     cancel      │     │  edit again   │    │
//!     ├─────────────────┘     └───────────────┘    │
//!     │                     retake                 │
//!     └────────────────────────────────────────────┘
//! ```
//!
//! With the review stage disabled, confirm from Editing uploads directly.
//! `close` is accepted in every stage and aborts the flow. The camera is
//! released on every path out of Capturing.
//!
//! Failures never abort the flow: each one is sent as a [`Notice`] on the
//! event channel and the machine moves to the nearest safe stage (Capturing
//! for capture and transport errors, unchanged for validation errors).

pub mod state;

pub use state::{ConfirmOutcome, DescriptorCallback, FlowOptions, FlowStage, Notice, OpenParams};

use crate::capture::{CaptureManager, Facing};
use crate::editor::{CropRegion, EditSession, EditedImage, OutputSpec};
use crate::errors::{PipelineError, PipelineResult};
use crate::gateway::{BatchReport, UploadGateway, UploadImage};
use crate::service::{PhotoDescriptor, PhotoId, PhotoService, RecordId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Photo collection orchestrator
///
/// Owns the capture manager and the upload gateway, runs one flow at a time,
/// and holds the gallery plus the pending set for the bound view. Methods
/// are sequential and caller-driven; notices arrive on the channel returned
/// by [`PhotoCollectionManager::new`].
pub struct PhotoCollectionManager {
    capture: CaptureManager,
    gateway: UploadGateway,
    service: Arc<dyn PhotoService>,
    options: FlowOptions,
    stage: FlowStage,
    params: Option<OpenParams>,
    /// Photos attached to the owning record, in the service's listing order
    gallery: Vec<PhotoDescriptor>,
    /// Photos uploaded before the owning record existed
    pending: Vec<PhotoDescriptor>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl PhotoCollectionManager {
    /// Create a manager and the receiving end of its notice channel
    pub fn new(
        capture: CaptureManager,
        service: Arc<dyn PhotoService>,
        options: FlowOptions,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let manager = Self {
            capture,
            gateway: UploadGateway::new(Arc::clone(&service)),
            service,
            options,
            stage: FlowStage::Idle,
            params: None,
            gallery: Vec::new(),
            pending: Vec::new(),
            notices: sender,
        };
        (manager, receiver)
    }

    /// Bind the view context and start a capture flow
    ///
    /// Replaces any previous context, re-queries the gallery when an owning
    /// record is bound, and enters Capturing. A camera that fails to open
    /// surfaces as [`Notice::CaptureFailed`] and the flow still enters
    /// Capturing so the host can offer [`PhotoCollectionManager::reopen_camera`]
    /// as the retry action.
    pub async fn open(&mut self, params: OpenParams) {
        info!(params = ?params, "Opening capture flow");
        if !self.stage.is_idle() {
            self.close();
        }

        self.params = Some(params);
        self.gallery.clear();
        let _ = self.refresh_gallery().await;
        self.enter_capturing().await;
    }

    /// Abort the flow from any stage
    ///
    /// Releases the camera, drops the held frame and preview buffers, and
    /// parks the machine idle. The bound view context, gallery, and pending
    /// set survive for the gallery methods.
    pub fn close(&mut self) {
        let stage = self.stage.take();
        if !stage.is_idle() {
            info!(stage = stage.name(), "Capture flow closed");
        }
        self.capture.close();
    }

    /// Current stage of the flow
    pub fn stage(&self) -> &FlowStage {
        &self.stage
    }

    /// Check if the camera stream is currently playable
    pub fn is_camera_live(&self) -> bool {
        self.capture.is_open()
    }

    /// Facing of the open stream, if any
    pub fn facing(&self) -> Option<Facing> {
        self.capture.facing()
    }

    /// Retry camera acquisition after a [`Notice::CaptureFailed`]
    pub async fn reopen_camera(&mut self) -> PipelineResult<()> {
        if !self.stage.is_capturing() {
            return Err(self.stage_error("reopen the camera"));
        }
        if let Err(error) = self.capture.open(self.options.stream).await {
            self.notify(Notice::CaptureFailed(error.clone()));
            return Err(error.into());
        }
        Ok(())
    }

    /// Switch between front and back cameras
    ///
    /// Close-then-reopen through the capture manager. The new facing sticks:
    /// later reopens of the flow request it again.
    pub async fn switch_facing(&mut self) -> PipelineResult<()> {
        if !self.stage.is_capturing() {
            return Err(self.stage_error("switch camera facing"));
        }
        if let Err(error) = self.capture.switch_facing().await {
            self.notify(Notice::CaptureFailed(error.clone()));
            return Err(error.into());
        }
        self.options.stream.facing = self.options.stream.facing.flipped();
        Ok(())
    }

    /// Shutter action: sample a frame and move to Editing
    ///
    /// The camera is released as the flow leaves Capturing. A failed sample
    /// keeps the flow in Capturing and sends [`Notice::CaptureFailed`].
    pub fn snapshot(&mut self) -> PipelineResult<()> {
        if !self.stage.is_capturing() {
            return Err(self.stage_error("take a snapshot"));
        }

        let raw = match self.capture.snapshot() {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "Snapshot failed");
                self.notify(Notice::CaptureFailed(error.clone()));
                return Err(error.into());
            }
        };

        info!(capture = ?raw, "Snapshot taken");
        self.capture.close();
        self.stage = FlowStage::Editing {
            session: EditSession::new(raw),
        };
        Ok(())
    }

    /// Pointer-down on the crop canvas; inert outside Editing
    pub fn begin_drag(&mut self, x: u32, y: u32) {
        if let FlowStage::Editing { session } = &mut self.stage {
            session.begin_drag(x, y);
        }
    }

    /// Pointer-move on the crop canvas; inert outside Editing
    pub fn drag_to(&mut self, x: u32, y: u32) {
        if let FlowStage::Editing { session } = &mut self.stage {
            session.drag_to(x, y);
        }
    }

    /// Pointer-up or pointer-leave; inert outside Editing
    pub fn end_drag(&mut self) {
        if let FlowStage::Editing { session } = &mut self.stage {
            session.end_drag();
        }
    }

    /// Replace the output spec of the active edit; inert outside Editing
    pub fn set_output_spec(&mut self, spec: OutputSpec) {
        if let FlowStage::Editing { session } = &mut self.stage {
            session.set_spec(spec);
        }
    }

    /// Crop selection of the active edit, if one is running
    pub fn crop_region(&self) -> Option<CropRegion> {
        match &self.stage {
            FlowStage::Editing { session } => Some(session.region()),
            FlowStage::Reviewing { session, .. } => Some(session.region()),
            _ => None,
        }
    }

    /// The render held for review, if the flow is in Reviewing
    pub fn review_image(&self) -> Option<&EditedImage> {
        match &self.stage {
            FlowStage::Reviewing { image, .. } => Some(image),
            _ => None,
        }
    }

    /// Render a preview of the active edit
    ///
    /// `Ok(None)` when the selection is empty or the preview was superseded.
    pub async fn render_preview(&self) -> PipelineResult<Option<EditedImage>> {
        let FlowStage::Editing { session } = &self.stage else {
            return Err(self.stage_error("render a preview"));
        };
        match session.render_preview().await {
            Ok(image) => Ok(image),
            Err(error) => {
                self.notify(Notice::EditRejected(error.clone()));
                Err(error.into())
            }
        }
    }

    /// Accept the current edit
    ///
    /// From Editing: renders the final image, then either holds it for
    /// review or uploads it directly per [`FlowOptions::review_enabled`].
    /// From Reviewing: uploads the held render.
    ///
    /// An empty selection or a rejected buffer leaves the stage unchanged;
    /// a transport failure returns the flow to Capturing. Both also send
    /// the matching [`Notice`].
    pub async fn confirm(&mut self) -> PipelineResult<ConfirmOutcome> {
        match self.stage.take() {
            FlowStage::Editing { session } => {
                let image = match session.confirm().await {
                    Ok(image) => image,
                    Err(error) => {
                        self.stage = FlowStage::Editing { session };
                        self.notify(Notice::EditRejected(error.clone()));
                        return Err(error.into());
                    }
                };

                if self.options.review_enabled {
                    debug!(image = ?image, "Render held for review");
                    self.stage = FlowStage::Reviewing { session, image };
                    return Ok(ConfirmOutcome::AwaitingReview);
                }

                if let Err(error) = UploadGateway::validate(image.mime_type(), image.len()) {
                    self.stage = FlowStage::Editing { session };
                    self.notify(Notice::UploadFailed(error.clone()));
                    return Err(error.into());
                }

                drop(session);
                self.finish_upload(image).await
            }
            FlowStage::Reviewing { session, image } => {
                if let Err(error) = UploadGateway::validate(image.mime_type(), image.len()) {
                    self.stage = FlowStage::Reviewing { session, image };
                    self.notify(Notice::UploadFailed(error.clone()));
                    return Err(error.into());
                }

                drop(session);
                self.finish_upload(image).await
            }
            other => {
                self.stage = other;
                Err(self.stage_error("confirm"))
            }
        }
    }

    /// Discard the edit and return to the camera
    pub async fn cancel_edit(&mut self) -> PipelineResult<()> {
        match self.stage.take() {
            FlowStage::Editing { session } => {
                session.cancel();
                self.enter_capturing().await;
                Ok(())
            }
            other => {
                self.stage = other;
                Err(self.stage_error("cancel the edit"))
            }
        }
    }

    /// Discard the reviewed render and return to the camera
    pub async fn retake(&mut self) -> PipelineResult<()> {
        match self.stage.take() {
            FlowStage::Reviewing { session, .. } => {
                session.cancel();
                self.enter_capturing().await;
                Ok(())
            }
            other => {
                self.stage = other;
                Err(self.stage_error("retake"))
            }
        }
    }

    /// Drop the reviewed render and resume editing the same frame
    pub fn edit_again(&mut self) -> PipelineResult<()> {
        match self.stage.take() {
            FlowStage::Reviewing { session, .. } => {
                debug!("Returning to edit");
                self.stage = FlowStage::Editing { session };
                Ok(())
            }
            other => {
                self.stage = other;
                Err(self.stage_error("edit again"))
            }
        }
    }

    /// Upload already-encoded images as a batch
    ///
    /// All-settled: the report enumerates every outcome and a failed item
    /// never aborts its siblings. Successful descriptors are delivered
    /// through the bound callbacks (pending when no record owns them yet),
    /// then a single [`Notice::BatchSettled`] reports both counts.
    pub async fn upload_batch(&mut self, images: Vec<UploadImage>) -> PipelineResult<BatchReport> {
        let (owner_id, naming_key) = self.bound_params()?;
        let none_stored_yet = self.gallery.is_empty() && self.pending.is_empty();

        let report = self
            .gateway
            .upload_batch(images, owner_id, &naming_key, none_stored_yet)
            .await;

        if owner_id.is_some() && !report.succeeded.is_empty() {
            let _ = self.refresh_gallery().await;
        }
        for descriptor in &report.succeeded {
            self.deliver(descriptor.clone());
        }
        self.notify(Notice::BatchSettled {
            uploaded: report.success_count(),
            failed: report.failure_count(),
        });
        Ok(report)
    }

    /// Photos attached to the owning record, as of the last re-query
    pub fn gallery(&self) -> &[PhotoDescriptor] {
        &self.gallery
    }

    /// Photos uploaded before the owning record existed
    pub fn pending_photos(&self) -> &[PhotoDescriptor] {
        &self.pending
    }

    /// Drain the pending set
    ///
    /// Called by the host once the owning record exists and the pending
    /// photos have been attached to it on the service side.
    pub fn take_pending(&mut self) -> Vec<PhotoDescriptor> {
        std::mem::take(&mut self.pending)
    }

    /// Re-query the gallery listing for the owning record
    ///
    /// Without an owning record there is nothing to list and the call is a
    /// no-op. A failed query keeps the previous listing and sends
    /// [`Notice::ServiceFailed`].
    pub async fn refresh_gallery(&mut self) -> PipelineResult<()> {
        let Some(owner) = self.params.as_ref().and_then(|p| p.owner_id) else {
            return Ok(());
        };

        match self.service.list_photos(owner).await {
            Ok(listing) => {
                debug!(count = listing.len(), "Gallery refreshed");
                self.gallery = listing;
                Ok(())
            }
            Err(error) => {
                warn!(%error, "Gallery refresh failed");
                self.notify(Notice::ServiceFailed(error.clone()));
                Err(error.into())
            }
        }
    }

    /// Make the photo the record's only primary image, then re-query
    pub async fn set_primary(&mut self, photo: PhotoId) -> PipelineResult<()> {
        let (owner_id, _) = self.bound_params()?;
        let Some(owner) = owner_id else {
            return Err(PipelineError::Other(
                "pending photos have no primary until the owning record exists".into(),
            ));
        };

        if let Err(error) = self.gateway.set_primary(photo, owner).await {
            self.notify(Notice::ServiceFailed(error.clone()));
            return Err(error.into());
        }
        self.refresh_gallery().await
    }

    /// Delete a stored photo, then re-query
    ///
    /// Also removes the photo from the pending set when it lives there.
    pub async fn delete_photo(&mut self, photo: PhotoId) -> PipelineResult<()> {
        if let Err(error) = self.gateway.delete(photo).await {
            self.notify(Notice::ServiceFailed(error.clone()));
            return Err(error.into());
        }
        self.pending.retain(|p| p.id != photo);
        self.refresh_gallery().await
    }

    /// Ship a confirmed render and finish the flow
    ///
    /// Runs with the stage already taken. Success re-queries the gallery,
    /// delivers the descriptor, and parks the flow idle; a failed upload
    /// returns the flow to Capturing.
    async fn finish_upload(&mut self, image: EditedImage) -> PipelineResult<ConfirmOutcome> {
        let (owner_id, naming_key) = self.bound_params()?;
        let is_first = self.gallery.is_empty() && self.pending.is_empty();

        let descriptor = match self
            .gateway
            .upload(UploadImage::from(image), owner_id, &naming_key, is_first)
            .await
        {
            Ok(descriptor) => descriptor,
            Err(error) => {
                warn!(%error, "Upload failed; returning to capture");
                self.notify(Notice::UploadFailed(error.clone()));
                self.enter_capturing().await;
                return Err(error.into());
            }
        };

        info!(id = %descriptor.id, "Photo uploaded; capture flow finished");
        if owner_id.is_some() {
            let _ = self.refresh_gallery().await;
        }
        self.deliver(descriptor.clone());
        self.stage = FlowStage::Idle;
        self.capture.close();
        Ok(ConfirmOutcome::Uploaded(descriptor))
    }

    /// Hand a persisted descriptor to the bound callbacks, exactly once
    ///
    /// Owned photos go to `on_uploaded`; owner-less photos go to
    /// `on_pending` and join the pending set.
    fn deliver(&mut self, descriptor: PhotoDescriptor) {
        let Some(params) = self.params.as_mut() else {
            return;
        };

        if descriptor.owner_id.is_some() {
            if let Some(callback) = params.on_uploaded.as_mut() {
                callback(&descriptor);
            }
        } else {
            if let Some(callback) = params.on_pending.as_mut() {
                callback(&descriptor);
            }
            self.pending.push(descriptor);
        }
    }

    /// Enter Capturing, requesting the camera with the stored stream request
    ///
    /// The stage moves even when the camera fails; the failure becomes a
    /// [`Notice::CaptureFailed`] with reopen as the retry path.
    async fn enter_capturing(&mut self) {
        self.stage = FlowStage::Capturing;
        if let Err(error) = self.capture.open(self.options.stream).await {
            warn!(%error, "Camera failed to open");
            self.notify(Notice::CaptureFailed(error));
        }
    }

    fn bound_params(&self) -> PipelineResult<(Option<RecordId>, String)> {
        match &self.params {
            Some(params) => Ok((params.owner_id, params.naming_key.clone())),
            None => Err(PipelineError::Other(
                "no view context bound; open the flow first".into(),
            )),
        }
    }

    fn stage_error(&self, action: &str) -> PipelineError {
        PipelineError::Other(format!("cannot {} while {}", action, self.stage.name()))
    }

    fn notify(&self, notice: Notice) {
        debug!(notice = %notice, "Notice");
        let _ = self.notices.send(notice);
    }
}

impl std::fmt::Debug for PhotoCollectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoCollectionManager")
            .field("stage", &self.stage.name())
            .field("camera_live", &self.capture.is_open())
            .field("gallery", &self.gallery.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
