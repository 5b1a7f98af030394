// SPDX-License-Identifier: GPL-3.0-only

//! Stockshot - product photo capture, crop, and upload for inventory consoles
//!
//! This library provides the client-side photo pipeline of an inventory
//! management application: camera acquisition, interactive crop/resize with
//! quality-controlled JPEG re-encoding, validated uploads, and gallery
//! orchestration against a hosted photo service.
//!
//! # Architecture
//!
//! The crate is organized into several modules, leaves first:
//!
//! - [`capture`]: Camera backend abstraction and stream lifecycle
//! - [`editor`]: Crop selection, resampling, and JPEG re-encoding
//! - [`gateway`]: Upload validation, file naming, and batch settlement
//! - [`service`]: The hosted photo service contract and its in-memory double
//! - [`collection`]: The user-facing flow state machine and gallery state
//! - [`constants`]: Fixed limits and defaults shared across the pipeline
//! - [`errors`]: Error taxonomy and conversions
//!
//! # Example
//!
//! ```ignore
//! let camera = CaptureManager::new(Box::new(SyntheticCamera::new()));
//! let service = Arc::new(InMemoryPhotoService::new("https://bucket.example"));
//! let (mut photos, mut notices) =
//!     PhotoCollectionManager::new(camera, service, FlowOptions::default());
//!
//! photos.open(OpenParams::new(Some(record_id), "widget")).await;
//! photos.snapshot()?;
//! photos.begin_drag(200, 150);
//! photos.drag_to(900, 600);
//! photos.end_drag();
//! photos.confirm().await?; // hold for review
//! photos.confirm().await?; // upload
//! ```

pub mod capture;
pub mod collection;
pub mod constants;
pub mod editor;
pub mod errors;
pub mod gateway;
pub mod service;

// Re-export commonly used types
pub use capture::{CaptureBackend, CaptureManager, Facing, RawCapture, StreamRequest};
pub use collection::{ConfirmOutcome, FlowOptions, Notice, OpenParams, PhotoCollectionManager};
pub use editor::{CropRegion, EditSession, EditedImage, OutputSpec};
pub use errors::{PipelineError, PipelineResult};
pub use gateway::{BatchReport, UploadGateway, UploadImage};
pub use service::{InMemoryPhotoService, PhotoDescriptor, PhotoService};
