// SPDX-License-Identifier: GPL-3.0-only

//! Crop selection geometry
//!
//! Pure dimension math for the editing stage: the default inset selection,
//! drag normalization, bound clamping, and the fit-inside output size
//! calculation. Everything here is synchronous and side-effect free.

use crate::constants::{crop, output};

/// Rectangular crop selection in source-image pixel coordinates
///
/// A region with zero width or height is an empty selection: previews skip
/// it and confirm rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Default selection for a new session: an inset rectangle covering
    /// [`crop::DEFAULT_INSET_FRACTION`] of each source dimension, centered
    pub fn default_for(source_width: u32, source_height: u32) -> Self {
        let margin = (1.0 - crop::DEFAULT_INSET_FRACTION) / 2.0;
        let x = (source_width as f32 * margin).round() as u32;
        let y = (source_height as f32 * margin).round() as u32;
        let width = (source_width as f32 * crop::DEFAULT_INSET_FRACTION).round() as u32;
        let height = (source_height as f32 * crop::DEFAULT_INSET_FRACTION).round() as u32;

        Self {
            x,
            y,
            width,
            height,
        }
        .clamped_to(source_width, source_height)
    }

    /// Check if the selection has no area
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width-over-height ratio; meaningless for empty selections
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Clamp the region so it lies fully inside the source bounds
    pub fn clamped_to(self, source_width: u32, source_height: u32) -> Self {
        let x = self.x.min(source_width);
        let y = self.y.min(source_height);
        Self {
            x,
            y,
            width: self.width.min(source_width - x),
            height: self.height.min(source_height - y),
        }
    }
}

/// An in-progress drag redefining the crop selection
///
/// Pointer-down anchors one corner; every move sets the opposite corner.
/// Normalization makes the direction of the drag irrelevant.
#[derive(Debug, Clone, Copy)]
pub struct DragGesture {
    anchor_x: u32,
    anchor_y: u32,
}

impl DragGesture {
    pub fn new(anchor_x: u32, anchor_y: u32) -> Self {
        Self { anchor_x, anchor_y }
    }

    /// Region spanned between the anchor and the given point
    pub fn region_to(&self, x: u32, y: u32) -> CropRegion {
        let left = self.anchor_x.min(x);
        let top = self.anchor_y.min(y);
        let right = self.anchor_x.max(x);
        let bottom = self.anchor_y.max(y);

        CropRegion {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// Output dimensions for a crop selection and a target size
///
/// The output keeps the selection's aspect ratio: whichever target dimension
/// is too large for that ratio shrinks until it fits, then both dimensions
/// scale by `scale`. The result never exceeds `target × scale` on either
/// axis and never collapses below one pixel.
pub fn fit_output_size(
    region_width: u32,
    region_height: u32,
    target_width: u32,
    target_height: u32,
    scale: f32,
) -> (u32, u32) {
    if region_width == 0 || region_height == 0 {
        return (output::MIN_DIMENSION_PX, output::MIN_DIMENSION_PX);
    }

    let ratio = region_width as f64 / region_height as f64;
    let (width, height) = if target_width as f64 / target_height as f64 > ratio {
        (target_height as f64 * ratio, target_height as f64)
    } else {
        (target_width as f64, target_width as f64 / ratio)
    };

    let width = (width * scale as f64).round() as u32;
    let height = (height * scale as f64).round() as u32;
    (
        width.max(output::MIN_DIMENSION_PX),
        height.max(output::MIN_DIMENSION_PX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_region_is_centered_inset() {
        let region = CropRegion::default_for(1280, 720);
        assert_eq!(region, CropRegion { x: 128, y: 72, width: 1024, height: 576 });

        let region = CropRegion::default_for(1000, 1000);
        assert_eq!(region, CropRegion { x: 100, y: 100, width: 800, height: 800 });
    }

    #[test]
    fn test_default_region_keeps_source_ratio() {
        let region = CropRegion::default_for(1280, 720);
        let source_ratio = 1280.0 / 720.0;
        assert!((region.aspect_ratio() - source_ratio).abs() < 0.01);
    }

    #[test]
    fn test_empty_region() {
        assert!(CropRegion { x: 0, y: 0, width: 0, height: 10 }.is_empty());
        assert!(CropRegion { x: 0, y: 0, width: 10, height: 0 }.is_empty());
        assert!(!CropRegion { x: 0, y: 0, width: 1, height: 1 }.is_empty());
    }

    #[test]
    fn test_drag_normalizes_all_directions() {
        let down_right = DragGesture::new(10, 20).region_to(110, 220);
        let up_left = DragGesture::new(110, 220).region_to(10, 20);
        let down_left = DragGesture::new(110, 20).region_to(10, 220);
        let up_right = DragGesture::new(10, 220).region_to(110, 20);

        let expected = CropRegion { x: 10, y: 20, width: 100, height: 200 };
        assert_eq!(down_right, expected);
        assert_eq!(up_left, expected);
        assert_eq!(down_left, expected);
        assert_eq!(up_right, expected);
    }

    #[test]
    fn test_click_without_move_is_empty() {
        let region = DragGesture::new(50, 50).region_to(50, 50);
        assert!(region.is_empty());
    }

    #[test]
    fn test_clamp_to_bounds() {
        let region = CropRegion { x: 100, y: 100, width: 500, height: 500 };
        let clamped = region.clamped_to(400, 300);
        assert_eq!(clamped, CropRegion { x: 100, y: 100, width: 300, height: 200 });

        let outside = CropRegion { x: 500, y: 400, width: 10, height: 10 };
        let clamped = outside.clamped_to(400, 300);
        assert!(clamped.is_empty());
    }

    #[test]
    fn test_fit_limited_by_width() {
        // 16:9 selection into a 4:3 target: width wins, height shrinks
        let (w, h) = fit_output_size(1024, 576, 800, 600, 1.0);
        assert_eq!((w, h), (800, 450));
    }

    #[test]
    fn test_fit_limited_by_height() {
        // Tall selection into a wide target: height wins, width shrinks
        let (w, h) = fit_output_size(300, 600, 800, 400, 1.0);
        assert_eq!((w, h), (200, 400));
    }

    #[test]
    fn test_fit_exact_ratio_match() {
        let (w, h) = fit_output_size(400, 300, 800, 600, 1.0);
        assert_eq!((w, h), (800, 600));
    }

    #[test]
    fn test_fit_applies_scale() {
        let (w, h) = fit_output_size(1024, 576, 800, 600, 0.5);
        assert_eq!((w, h), (400, 225));

        let (w, h) = fit_output_size(1024, 576, 800, 600, 2.0);
        assert_eq!((w, h), (1600, 900));
    }

    #[test]
    fn test_fit_output_ratio_matches_region_ratio() {
        let cases = [
            (1024u32, 576u32, 800u32, 600u32, 1.0f32),
            (640, 480, 1920, 1080, 1.0),
            (333, 777, 500, 500, 1.3),
            (50, 200, 640, 480, 0.7),
        ];
        for (rw, rh, tw, th, scale) in cases {
            let (w, h) = fit_output_size(rw, rh, tw, th, scale);
            let region_ratio = rw as f64 / rh as f64;
            let out_ratio = w as f64 / h as f64;
            // Rounding keeps the ratios within a pixel of each other
            assert!(
                (out_ratio - region_ratio).abs() <= region_ratio / h.min(w) as f64 + 0.01,
                "ratio drift for case ({rw},{rh},{tw},{th},{scale}): {out_ratio} vs {region_ratio}"
            );
        }
    }

    #[test]
    fn test_fit_never_collapses_to_zero() {
        let (w, h) = fit_output_size(2, 2000, 10, 10, 0.1);
        assert!(w >= 1 && h >= 1);
    }
}
