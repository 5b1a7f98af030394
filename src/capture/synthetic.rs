// SPDX-License-Identifier: GPL-3.0-only

//! Deterministic synthetic capture backend
//!
//! Renders a gradient test pattern instead of touching real hardware. Hosts
//! use it for camera-free environments; the integration tests drive the
//! whole pipeline over it. Frames are fully deterministic: the same request
//! always yields byte-identical captures.

use super::types::*;
use super::CaptureBackend;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared counters recording backend activity
///
/// Handed out as an Arc before the backend moves into a manager, so tests
/// can observe opens, stops, and snapshots from the outside.
#[derive(Debug, Default)]
pub struct CaptureStats {
    opens: AtomicU32,
    stops: AtomicU32,
    snapshots: AtomicU32,
}

impl CaptureStats {
    pub fn open_count(&self) -> u32 {
        self.opens.load(Ordering::Relaxed)
    }

    pub fn stop_count(&self) -> u32 {
        self.stops.load(Ordering::Relaxed)
    }

    pub fn snapshot_count(&self) -> u32 {
        self.snapshots.load(Ordering::Relaxed)
    }
}

/// Synthetic camera backend
pub struct SyntheticCamera {
    open_request: Option<StreamRequest>,
    /// Polls of `is_open` to swallow before reporting ready, simulating
    /// stream warm-up
    ready_delay: AtomicU32,
    fail_open: Option<CaptureError>,
    fail_snapshot: Option<CaptureError>,
    stats: Arc<CaptureStats>,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            open_request: None,
            ready_delay: AtomicU32::new(0),
            fail_open: None,
            fail_snapshot: None,
            stats: Arc::new(CaptureStats::default()),
        }
    }

    /// Report not-ready for the first `polls` readiness checks after open
    pub fn with_ready_delay(self, polls: u32) -> Self {
        self.ready_delay.store(polls, Ordering::Relaxed);
        self
    }

    /// Fail every open with the given error
    pub fn with_open_failure(mut self, error: CaptureError) -> Self {
        self.fail_open = Some(error);
        self
    }

    /// Fail every snapshot with the given error
    pub fn with_snapshot_failure(mut self, error: CaptureError) -> Self {
        self.fail_snapshot = Some(error);
        self
    }

    /// Activity counters, shared with the backend
    pub fn stats(&self) -> Arc<CaptureStats> {
        Arc::clone(&self.stats)
    }

    /// Render the gradient test pattern for the open stream
    ///
    /// Red ramps with x, green with y, blue carries a soft diamond wash so
    /// encoders see real detail without hard edges. Neighboring pixels never
    /// jump by more than a couple of levels, so resampling the pattern stays
    /// clean. Front and back facings mirror the wash, making switched
    /// streams distinguishable in tests.
    fn render_pattern(request: &StreamRequest) -> Vec<u8> {
        let (width, height) = (request.width, request.height);
        let mut data = Vec::with_capacity((width * height * 4) as usize);

        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                let wash = ((x % 50) as i32 - 25).abs() + ((y % 50) as i32 - 25).abs();
                let b = match request.facing {
                    Facing::Back => (90 + wash) as u8,
                    Facing::Front => (190 - wash) as u8,
                };
                data.extend_from_slice(&[r, g, b, 255]);
            }
        }

        data
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for SyntheticCamera {
    fn open(&mut self, request: &StreamRequest) -> CaptureResult<()> {
        if let Some(error) = &self.fail_open {
            return Err(error.clone());
        }

        self.stats.opens.fetch_add(1, Ordering::Relaxed);
        self.open_request = Some(*request);
        debug!(request = %request, "Synthetic stream opened");
        Ok(())
    }

    fn close(&mut self) {
        if self.open_request.take().is_some() {
            self.stats.stops.fetch_add(1, Ordering::Relaxed);
            debug!("Synthetic stream stopped");
        }
    }

    fn is_open(&self) -> bool {
        if self.open_request.is_none() {
            return false;
        }
        // Swallow the configured number of readiness polls
        let remaining = self.ready_delay.load(Ordering::Relaxed);
        if remaining > 0 {
            self.ready_delay.store(remaining - 1, Ordering::Relaxed);
            return false;
        }
        true
    }

    fn snapshot(&self) -> CaptureResult<RawCapture> {
        let Some(request) = self.open_request else {
            return Err(CaptureError::NotReady);
        };
        if self.ready_delay.load(Ordering::Relaxed) > 0 {
            return Err(CaptureError::NotReady);
        }
        if let Some(error) = &self.fail_snapshot {
            return Err(error.clone());
        }

        self.stats.snapshots.fetch_add(1, Ordering::Relaxed);
        Ok(RawCapture::new(
            request.width,
            request.height,
            Self::render_pattern(&request),
        ))
    }

    fn facing(&self) -> Option<Facing> {
        self.open_request.map(|request| request.facing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_deterministic() {
        let mut camera = SyntheticCamera::new();
        camera.open(&StreamRequest::default()).unwrap();

        let a = camera.snapshot().unwrap();
        let b = camera.snapshot().unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn test_pattern_has_no_hard_edges() {
        let mut camera = SyntheticCamera::new();
        camera.open(&StreamRequest::default()).unwrap();
        let frame = camera.snapshot().unwrap();

        let stride = (frame.width * 4) as usize;
        for row in frame.data.chunks_exact(stride) {
            for (left, right) in row.chunks_exact(4).zip(row.chunks_exact(4).skip(1)) {
                for channel in 0..3 {
                    let delta = (left[channel] as i16 - right[channel] as i16).abs();
                    assert!(delta <= 2, "neighboring pixels jump by {delta}");
                }
            }
        }
    }

    #[test]
    fn test_facings_render_differently() {
        let mut camera = SyntheticCamera::new();

        camera.open(&StreamRequest::with_facing(Facing::Back)).unwrap();
        let back = camera.snapshot().unwrap();

        camera.close();
        camera.open(&StreamRequest::with_facing(Facing::Front)).unwrap();
        let front = camera.snapshot().unwrap();

        assert_ne!(back.data, front.data);
    }

    #[test]
    fn test_close_without_open_does_not_count() {
        let mut camera = SyntheticCamera::new();
        let stats = camera.stats();

        camera.close();
        assert_eq!(stats.stop_count(), 0);
    }

    #[test]
    fn test_scripted_failures() {
        let mut busy = SyntheticCamera::new().with_open_failure(CaptureError::Busy);
        assert!(matches!(
            busy.open(&StreamRequest::default()),
            Err(CaptureError::Busy)
        ));

        let mut flaky =
            SyntheticCamera::new().with_snapshot_failure(CaptureError::Failed("frame drop".into()));
        flaky.open(&StreamRequest::default()).unwrap();
        assert!(matches!(
            flaky.snapshot(),
            Err(CaptureError::Failed(_))
        ));
    }
}
