// SPDX-License-Identifier: GPL-3.0-only

//! Crop/resize/compress session over a single capture
//!
//! An [`EditSession`] owns one [`RawCapture`] and the transient editing
//! state around it: the crop selection, an in-progress drag, and the output
//! spec. Rendering is a pure function of (source, region, spec): calling it
//! again with the same inputs produces the same pixels. The JPEG encode
//! runs on a blocking worker so the caller's thread is never pinned.
//!
//! Preview supersession: every [`EditSession::render_preview`] call bumps a
//! generation counter. A render that finishes after a newer one started is
//! discarded rather than delivered, so the newest input state always wins
//! and a stale preview is never observable.

use super::geometry::{CropRegion, DragGesture};
use super::spec::OutputSpec;
use crate::capture::RawCapture;
use crate::errors::EditError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Rgba};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Re-encoded image produced by applying the crop selection and output spec
/// to the source capture
///
/// The buffer is always JPEG. Transient: superseded whenever the region or
/// spec changes; the final copy goes to the upload gateway on confirm.
#[derive(Clone)]
pub struct EditedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EditedImage {
    /// MIME type of the encoded buffer
    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    /// Length of the encoded buffer in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Width-over-height ratio of the rendered image
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl std::fmt::Debug for EditedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EditedImage({}x{}, {} bytes)",
            self.width,
            self.height,
            self.data.len()
        )
    }
}

/// Editing state for one captured frame
#[derive(Debug)]
pub struct EditSession {
    source: RawCapture,
    region: CropRegion,
    spec: OutputSpec,
    drag: Option<DragGesture>,
    generation: AtomicU64,
}

impl EditSession {
    /// Start a session over the given capture
    ///
    /// The initial selection is the centered 80% inset of the source; the
    /// initial spec targets the source dimensions at scale 1.0 and default
    /// quality.
    pub fn new(source: RawCapture) -> Self {
        let spec = OutputSpec::new(source.width, source.height);
        Self::with_spec(source, spec)
    }

    /// Start a session with an explicit output spec
    pub fn with_spec(source: RawCapture, spec: OutputSpec) -> Self {
        let region = CropRegion::default_for(source.width, source.height);
        debug!(source = ?source, region = ?region, "Edit session started");

        Self {
            source,
            region,
            spec,
            drag: None,
            generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &RawCapture {
        &self.source
    }

    /// Current crop selection
    pub fn region(&self) -> CropRegion {
        self.region
    }

    pub fn spec(&self) -> &OutputSpec {
        &self.spec
    }

    /// Replace the crop selection directly, clamped to the source bounds
    ///
    /// Cancels any in-progress drag.
    pub fn set_region(&mut self, region: CropRegion) {
        self.drag = None;
        self.region = region.clamped_to(self.source.width, self.source.height);
    }

    /// Replace the output spec
    pub fn set_spec(&mut self, spec: OutputSpec) {
        self.spec = spec;
    }

    /// Pointer-down: anchor a new selection at the given source coordinate
    ///
    /// The selection restarts empty at the anchor; every
    /// [`EditSession::drag_to`] then spans it to the opposite corner.
    pub fn begin_drag(&mut self, x: u32, y: u32) {
        let (x, y) = self.clamp_point(x, y);
        let gesture = DragGesture::new(x, y);
        self.region = gesture.region_to(x, y);
        self.drag = Some(gesture);
    }

    /// Pointer-move: span the selection from the anchor to this coordinate
    ///
    /// Normalized so drag direction never matters, clamped to the source
    /// bounds. Without an active drag this is inert.
    pub fn drag_to(&mut self, x: u32, y: u32) {
        let Some(gesture) = self.drag else {
            return;
        };
        let (x, y) = self.clamp_point(x, y);
        self.region = gesture
            .region_to(x, y)
            .clamped_to(self.source.width, self.source.height);
    }

    /// Pointer-up or pointer-leave: finalize the selection
    ///
    /// The region stays as-is until a new drag begins.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Check if a drag gesture is currently active
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Render a preview for the current region and spec
    ///
    /// Pure with respect to its inputs: the same (source, region, spec)
    /// yields the same pixel content. Returns `Ok(None)` when the selection
    /// is empty (nothing to preview, not an error) or when a newer preview
    /// superseded this one while it was encoding.
    pub async fn render_preview(&self) -> Result<Option<EditedImage>, EditError> {
        if self.region.is_empty() {
            debug!("Skipping preview for empty selection");
            return Ok(None);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let image = render(self.source.clone(), self.region, self.spec).await?;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding superseded preview");
            return Ok(None);
        }
        Ok(Some(image))
    }

    /// Render the final image for upload
    ///
    /// Same computation as the preview at the full target size × scale.
    ///
    /// # Returns
    /// * `Ok(EditedImage)` - Final render
    /// * `Err(EditError::NoRegionSelected)` - The selection has zero area;
    ///   no image is produced
    pub async fn confirm(&self) -> Result<EditedImage, EditError> {
        if self.region.is_empty() {
            return Err(EditError::NoRegionSelected);
        }
        render(self.source.clone(), self.region, self.spec).await
    }

    /// Discard the session and all transient state
    ///
    /// No image is produced; the source buffer is released.
    pub fn cancel(self) {
        debug!(source = ?self.source, "Edit session cancelled");
    }

    fn clamp_point(&self, x: u32, y: u32) -> (u32, u32) {
        (x.min(self.source.width), y.min(self.source.height))
    }
}

/// Crop, resample, and JPEG-encode the source
///
/// The CPU-bound pass runs under `spawn_blocking`; at most one encode per
/// caller is in flight since callers await the result.
async fn render(
    source: RawCapture,
    region: CropRegion,
    spec: OutputSpec,
) -> Result<EditedImage, EditError> {
    let (out_width, out_height) = spec.output_size_for(&region);
    let quality = spec.jpeg_quality();

    debug!(
        region = ?region,
        out_width,
        out_height,
        quality,
        "Rendering selection"
    );

    tokio::task::spawn_blocking(move || {
        let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_raw(source.width, source.height, source.data.to_vec())
                .ok_or_else(|| EditError::RenderFailed("source buffer size mismatch".into()))?;

        let rgb = DynamicImage::ImageRgba8(buffer)
            .crop_imm(region.x, region.y, region.width, region.height)
            .resize_exact(out_width, out_height, FilterType::Lanczos3)
            .to_rgb8();

        let mut data = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut data);

        let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
        encoder
            .encode(
                rgb.as_raw(),
                out_width,
                out_height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| EditError::RenderFailed(format!("JPEG encoding failed: {}", e)))?;

        debug!(size = data.len(), "Render complete");

        Ok(EditedImage {
            data,
            width: out_width,
            height: out_height,
        })
    })
    .await
    .map_err(|e| EditError::RenderFailed(format!("Render task error: {}", e)))?
}
