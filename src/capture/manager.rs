// SPDX-License-Identifier: GPL-3.0-only

//! Capture source lifecycle manager
//!
//! The manager provides:
//! - Scoped stream acquisition with guaranteed release
//! - Close-then-reopen facing switches
//! - Thread-safe backend access

use super::types::*;
use super::CaptureBackend;
use crate::constants::timing;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::info;

/// Internal manager state
struct ManagerState {
    /// The owned backend instance
    backend: Box<dyn CaptureBackend>,
    /// Request behind the currently open stream
    request: Option<StreamRequest>,
}

impl Drop for ManagerState {
    fn drop(&mut self) {
        // Backstop: a dropped manager never leaves the camera light on.
        // Unconditional, so acquired-but-unready streams are covered too.
        self.backend.close();
    }
}

/// Capture source manager
///
/// Owns the backend exclusively. Opening a new stream always stops the
/// previous one first; the camera is released on every exit path, drop
/// included. Thread-safe and cheap to clone: warm-up waits take the state
/// lock per readiness poll, so other handles can read status and sample
/// frames while a stream opens. The lifecycle itself is driven by a single
/// owner.
#[derive(Clone)]
pub struct CaptureManager {
    state: Arc<Mutex<ManagerState>>,
}

impl CaptureManager {
    /// Create a manager owning the given backend
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        let state = ManagerState {
            backend,
            request: None,
        };

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Open a stream, stopping any previously held one first
    ///
    /// Resolves once the stream reports playable. On a readiness timeout
    /// the acquired stream is released before the error is returned, so a
    /// failed open never keeps the device.
    pub async fn open(&self, request: StreamRequest) -> CaptureResult<()> {
        info!(request = %request, "Opening capture stream");

        {
            let mut state = self.state.lock().unwrap();
            state.backend.close();
            state.request = None;
            state.backend.open(&request)?;
        }

        if let Err(error) = self.wait_ready().await {
            self.state.lock().unwrap().backend.close();
            return Err(error);
        }

        self.state.lock().unwrap().request = Some(request);
        Ok(())
    }

    /// Release the stream; idempotent
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        if state.request.take().is_some() {
            info!("Closing capture stream");
        }
        state.backend.close();
    }

    /// Check if a stream is currently playable
    pub fn is_open(&self) -> bool {
        self.state.lock().unwrap().backend.is_open()
    }

    /// Facing of the open stream, if any
    pub fn facing(&self) -> Option<Facing> {
        self.state.lock().unwrap().backend.facing()
    }

    /// Sample the current frame
    pub fn snapshot(&self) -> CaptureResult<RawCapture> {
        let state = self.state.lock().unwrap();
        if !state.backend.is_open() {
            return Err(CaptureError::NotReady);
        }
        state.backend.snapshot()
    }

    /// Switch between front and back cameras
    ///
    /// This is never a live reconfiguration: the held stream is fully
    /// stopped before the new request is made. A failed reopen or readiness
    /// timeout leaves the manager closed and the error is returned for the
    /// caller to surface.
    pub async fn switch_facing(&self) -> CaptureResult<()> {
        let request = {
            let mut state = self.state.lock().unwrap();
            let Some(previous) = state.request.take() else {
                return Err(CaptureError::NotReady);
            };

            let request = StreamRequest {
                facing: previous.facing.flipped(),
                ..previous
            };
            info!(facing = %request.facing, "Switching camera facing");

            state.backend.close();
            state.backend.open(&request)?;
            request
        };

        if let Err(error) = self.wait_ready().await {
            self.state.lock().unwrap().backend.close();
            return Err(error);
        }

        self.state.lock().unwrap().request = Some(request);
        Ok(())
    }

    /// Poll stream readiness, bounded by the configured deadline
    ///
    /// The state lock is taken per poll, never across a sleep, so status
    /// reads and snapshots from other handles proceed during warm-up.
    async fn wait_ready(&self) -> CaptureResult<()> {
        let ready = async {
            while !self.state.lock().unwrap().backend.is_open() {
                sleep(Duration::from_millis(timing::READY_POLL_INTERVAL_MS)).await;
            }
        };

        timeout(Duration::from_millis(timing::READY_TIMEOUT_MS), ready)
            .await
            .map_err(|_| {
                CaptureError::Failed(format!(
                    "stream not ready after {}ms",
                    timing::READY_TIMEOUT_MS
                ))
            })
    }
}

impl std::fmt::Debug for CaptureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("CaptureManager")
            .field("request", &state.request)
            .field("open", &state.backend.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::synthetic::SyntheticCamera;
    use crate::errors::CaptureError;

    #[tokio::test]
    async fn test_open_and_snapshot() {
        let camera = SyntheticCamera::new();
        let manager = CaptureManager::new(Box::new(camera));

        manager.open(StreamRequest::default()).await.unwrap();
        assert!(manager.is_open());

        let raw = manager.snapshot().unwrap();
        assert_eq!(raw.width, 1280);
        assert_eq!(raw.height, 720);
        assert_eq!(raw.len(), 1280 * 720 * 4);
    }

    #[test]
    fn test_snapshot_before_open_is_not_ready() {
        let manager = CaptureManager::new(Box::new(SyntheticCamera::new()));
        assert!(matches!(
            manager.snapshot(),
            Err(CaptureError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_switch_facing_stops_previous_stream_once() {
        let camera = SyntheticCamera::new();
        let stats = camera.stats();
        let manager = CaptureManager::new(Box::new(camera));

        manager
            .open(StreamRequest::with_facing(Facing::Back))
            .await
            .unwrap();
        manager.switch_facing().await.unwrap();

        assert_eq!(stats.stop_count(), 1);
        assert_eq!(stats.open_count(), 2);
        assert_eq!(manager.facing(), Some(Facing::Front));
    }

    #[tokio::test]
    async fn test_switch_facing_requires_open_stream() {
        let manager = CaptureManager::new(Box::new(SyntheticCamera::new()));
        assert!(matches!(
            manager.switch_facing().await,
            Err(CaptureError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_reopen_stops_previous_stream() {
        let camera = SyntheticCamera::new();
        let stats = camera.stats();
        let manager = CaptureManager::new(Box::new(camera));

        manager.open(StreamRequest::default()).await.unwrap();
        manager.open(StreamRequest::default()).await.unwrap();

        assert_eq!(stats.stop_count(), 1);
        assert_eq!(stats.open_count(), 2);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let camera = SyntheticCamera::new();
        let stats = camera.stats();
        let manager = CaptureManager::new(Box::new(camera));

        manager.open(StreamRequest::default()).await.unwrap();
        manager.close();
        manager.close();

        assert_eq!(stats.stop_count(), 1);
        assert!(!manager.is_open());
    }

    #[tokio::test]
    async fn test_drop_releases_stream() {
        let camera = SyntheticCamera::new();
        let stats = camera.stats();
        let manager = CaptureManager::new(Box::new(camera));

        manager.open(StreamRequest::default()).await.unwrap();
        drop(manager);

        assert_eq!(stats.stop_count(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_propagates() {
        let camera = SyntheticCamera::new().with_open_failure(CaptureError::Busy);
        let manager = CaptureManager::new(Box::new(camera));

        assert!(matches!(
            manager.open(StreamRequest::default()).await,
            Err(CaptureError::Busy)
        ));
        assert!(!manager.is_open());
    }

    #[tokio::test]
    async fn test_ready_delay_is_waited_out() {
        let camera = SyntheticCamera::new().with_ready_delay(3);
        let manager = CaptureManager::new(Box::new(camera));

        manager.open(StreamRequest::default()).await.unwrap();
        assert!(manager.is_open());
        assert!(manager.snapshot().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_timeout_releases_the_stream() {
        let camera = SyntheticCamera::new().with_ready_delay(u32::MAX);
        let stats = camera.stats();
        let manager = CaptureManager::new(Box::new(camera));

        assert!(manager.open(StreamRequest::default()).await.is_err());
        assert_eq!(stats.open_count(), 1);
        assert_eq!(stats.stop_count(), 1, "the unready stream was released");
        assert!(!manager.is_open());

        drop(manager);
        assert_eq!(stats.stop_count(), 1, "nothing left for the drop backstop");
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_retry_after_ready_timeout() {
        let camera = SyntheticCamera::new().with_ready_delay(200);
        let stats = camera.stats();
        let manager = CaptureManager::new(Box::new(camera));

        assert!(manager.open(StreamRequest::default()).await.is_err());
        manager.open(StreamRequest::default()).await.unwrap();

        assert!(manager.is_open());
        assert!(manager.snapshot().is_ok());
        assert_eq!(stats.open_count(), 2);
        assert_eq!(stats.stop_count(), 1, "only the timed-out stream was stopped");
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reads_interleave_with_warm_up() {
        let camera = SyntheticCamera::new().with_ready_delay(40);
        let manager = CaptureManager::new(Box::new(camera));

        let opener = manager.clone();
        let open = tokio::spawn(async move { opener.open(StreamRequest::default()).await });
        tokio::task::yield_now().await;

        // The opener is parked between readiness polls; reads do not block
        assert!(!manager.is_open());
        assert_eq!(manager.facing(), Some(Facing::Back));

        open.await.unwrap().unwrap();
        assert!(manager.is_open());
    }
}
