// SPDX-License-Identifier: GPL-3.0-only

//! Output specification for the final render
//!
//! Target dimensions, scale factor, and JPEG quality. All setters clamp to
//! the bounds in [`crate::constants::output`], so a spec is always valid.

use super::geometry::{fit_output_size, CropRegion};
use crate::constants::output;

/// Target size, scale, and compression quality for the rendered image
///
/// The requested target is an upper bound, not the literal output size: the
/// render keeps the crop selection's aspect ratio, so the dimension that is
/// too large for that ratio shrinks until it fits (see
/// [`fit_output_size`]). Scale then multiplies both dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSpec {
    target_width: u32,
    target_height: u32,
    scale: f32,
    quality: f32,
}

impl OutputSpec {
    /// Create a spec with the given target size, scale 1.0, and the default
    /// quality
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width: target_width.max(output::MIN_DIMENSION_PX),
            target_height: target_height.max(output::MIN_DIMENSION_PX),
            scale: 1.0,
            quality: output::DEFAULT_QUALITY,
        }
    }

    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn target_height(&self) -> u32 {
        self.target_height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Set the target size; zero dimensions are raised to one pixel
    pub fn set_target(&mut self, width: u32, height: u32) {
        self.target_width = width.max(output::MIN_DIMENSION_PX);
        self.target_height = height.max(output::MIN_DIMENSION_PX);
    }

    /// Set the scale factor, clamped to
    /// [`output::SCALE_MIN`]..=[`output::SCALE_MAX`]
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(output::SCALE_MIN, output::SCALE_MAX);
    }

    /// Set the compression quality, clamped to
    /// [`output::QUALITY_MIN`]..=[`output::QUALITY_MAX`]
    pub fn set_quality(&mut self, quality: f32) {
        self.quality = quality.clamp(output::QUALITY_MIN, output::QUALITY_MAX);
    }

    /// Builder-style [`OutputSpec::set_scale`]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.set_scale(scale);
        self
    }

    /// Builder-style [`OutputSpec::set_quality`]
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.set_quality(quality);
        self
    }

    /// Quality as the 1-100 value the JPEG encoder expects
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Output dimensions for the given crop selection
    pub fn output_size_for(&self, region: &CropRegion) -> (u32, u32) {
        fit_output_size(
            region.width,
            region.height,
            self.target_width,
            self.target_height,
            self.scale,
        )
    }
}
