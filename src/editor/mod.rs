// SPDX-License-Identifier: GPL-3.0-only

//! Crop/resize/compress engine
//!
//! This module turns a raw capture into an upload-ready image:
//!
//! 1. **Select**: a drag gesture defines the crop region, starting from a
//!    centered 80% inset of the source ([`geometry`])
//! 2. **Fit**: the output size honors the selection's aspect ratio and the
//!    spec's scale ([`spec`])
//! 3. **Render**: crop, resample, and JPEG-encode on a blocking worker,
//!    with stale previews superseded by newer ones ([`session`])

pub mod geometry;
pub mod session;
pub mod spec;

pub use geometry::{fit_output_size, CropRegion, DragGesture};
pub use session::{EditSession, EditedImage};
pub use spec::OutputSpec;
