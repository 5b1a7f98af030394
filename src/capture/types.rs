// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for capture backends

use crate::constants::stream;
use std::sync::Arc;

pub use crate::errors::CaptureError;

/// Result type for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Camera facing preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Rear camera (default for product shots)
    #[default]
    Back,
    /// User-facing camera
    Front,
}

impl Facing {
    /// The opposite facing, used by the close-then-reopen switch
    pub fn flipped(&self) -> Facing {
        match self {
            Facing::Back => Facing::Front,
            Facing::Front => Facing::Back,
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facing::Back => write!(f, "back"),
            Facing::Front => write!(f, "front"),
        }
    }
}

/// Stream request: preferred facing and resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
}

impl StreamRequest {
    /// Request the default resolution with the given facing
    pub fn with_facing(facing: Facing) -> Self {
        Self {
            facing,
            ..Self::default()
        }
    }
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self {
            facing: Facing::default(),
            width: stream::DEFAULT_WIDTH,
            height: stream::DEFAULT_HEIGHT,
        }
    }
}

impl std::fmt::Display for StreamRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} ({})", self.width, self.height, self.facing)
    }
}

/// A single unedited frame sampled from the live feed
///
/// Pixel data is RGBA8, row-major, shared behind an Arc so sessions and
/// encode workers can hold the frame without copying it.
#[derive(Clone)]
pub struct RawCapture {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
}

impl RawCapture {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
        }
    }

    /// Length of the pixel buffer in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for RawCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RawCapture({}x{}, {} bytes)",
            self.width,
            self.height,
            self.data.len()
        )
    }
}
