// SPDX-License-Identifier: GPL-3.0-only

//! Capture source abstraction
//!
//! This module provides a trait-based abstraction over the camera so the
//! rest of the pipeline never touches a device API directly.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────┐
//! │ PhotoCollectionManager│
//! └───────────┬───────────┘
//!             │
//!             ▼
//! ┌───────────────────────┐
//! │    CaptureManager     │  ← Lifecycle, facing switch, guaranteed release
//! └───────────┬───────────┘
//!             │
//!             ▼
//! ┌───────────────────────┐
//! │ CaptureBackend Trait  │  ← Common interface
//! └───────────┬───────────┘
//!             │
//!             ▼
//!       ┌───────────┐
//!       │ Synthetic │  ← In-crate implementation; hosts plug in real devices
//!       └───────────┘
//! ```

pub mod manager;
pub mod synthetic;
pub mod types;

pub use manager::CaptureManager;
pub use synthetic::{CaptureStats, SyntheticCamera};
pub use types::*;

/// Capture backend trait
///
/// All capture sources must implement this trait to provide stream
/// lifecycle management and single-frame sampling. The backend holds the
/// device exclusively between `open` and `close`.
pub trait CaptureBackend: Send + Sync {
    /// Open a stream for the requested facing and resolution
    ///
    /// Resolves once the request is accepted. Streams that need warm-up time
    /// report readiness through [`CaptureBackend::is_open`]; callers poll it
    /// with a bounded deadline rather than waiting on device events.
    ///
    /// # Returns
    /// * `Ok(())` - Stream acquired
    /// * `Err(CaptureError::Unavailable)` - Permission denied
    /// * `Err(CaptureError::NoDeviceFound)` - No camera matches the facing
    /// * `Err(CaptureError::Busy)` - Device held by another consumer
    fn open(&mut self, request: &StreamRequest) -> CaptureResult<()>;

    /// Release the stream and all acquired resources
    ///
    /// Idempotent and safe to call in any pipeline state, including teardown.
    fn close(&mut self);

    /// Check if the stream is currently playable
    fn is_open(&self) -> bool;

    /// Sample the current frame as an RGBA buffer
    ///
    /// # Returns
    /// * `Ok(RawCapture)` - Frame sampled successfully
    /// * `Err(CaptureError::NotReady)` - Stream not yet playable
    fn snapshot(&self) -> CaptureResult<RawCapture>;

    /// Facing of the currently open stream, if any
    fn facing(&self) -> Option<Facing>;
}
