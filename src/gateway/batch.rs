// SPDX-License-Identifier: GPL-3.0-only

//! All-settled batch upload report

use crate::errors::UploadError;
use crate::service::PhotoDescriptor;
use std::fmt;

/// One file of a batch that did not make it
#[derive(Debug)]
pub struct BatchFailure {
    /// Position in the submitted batch
    pub index: usize,
    pub error: UploadError,
}

/// Outcome of a batch upload
///
/// Both sides are always carried: successes never hide failures and a
/// failure never aborts its siblings.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<PhotoDescriptor>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} uploaded, {} failed",
            self.success_count(),
            self.failure_count()
        )
    }
}
