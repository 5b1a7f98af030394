// SPDX-License-Identifier: GPL-3.0-only

//! Crate-wide constants

/// Upload validation limits
pub mod upload {
    /// Maximum accepted payload size in bytes (10 MiB)
    pub const MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

    /// Accepted image MIME types for upload
    pub const ACCEPTED_MIME_TYPES: &[&str] = &[
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/bmp",
        "image/webp",
    ];

    /// Check if a MIME type is accepted for upload
    pub fn is_accepted_mime(mime: &str) -> bool {
        ACCEPTED_MIME_TYPES.contains(&mime.to_ascii_lowercase().as_str())
    }

    /// File extension for an accepted MIME type
    pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
        match mime.to_ascii_lowercase().as_str() {
            "image/jpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/bmp" => Some("bmp"),
            "image/webp" => Some("webp"),
            _ => None,
        }
    }
}

/// Crop selection defaults
pub mod crop {
    /// Fraction of each source dimension covered by the initial selection.
    /// The remainder splits evenly into margins on both sides.
    pub const DEFAULT_INSET_FRACTION: f32 = 0.8;
}

/// Output specification bounds
pub mod output {
    /// Minimum scale factor applied to the fitted output size
    pub const SCALE_MIN: f32 = 0.1;

    /// Maximum scale factor
    pub const SCALE_MAX: f32 = 2.0;

    /// Minimum JPEG quality (fraction of 1.0)
    pub const QUALITY_MIN: f32 = 0.1;

    /// Maximum JPEG quality
    pub const QUALITY_MAX: f32 = 1.0;

    /// Quality used by sessions that never set one explicitly
    pub const DEFAULT_QUALITY: f32 = 0.8;

    /// Smallest dimension the fit calculation will produce
    pub const MIN_DIMENSION_PX: u32 = 1;
}

/// Capture timing constants
pub mod timing {
    /// Deadline for a stream to become playable after open
    pub const READY_TIMEOUT_MS: u64 = 4_000;

    /// Poll interval while waiting for stream readiness
    pub const READY_POLL_INTERVAL_MS: u64 = 25;
}

/// Capture stream defaults
pub mod stream {
    /// Default capture width when the host does not request one
    pub const DEFAULT_WIDTH: u32 = 1280;

    /// Default capture height
    pub const DEFAULT_HEIGHT: u32 = 720;
}
