//! Error types for region selection and capture operations
//!
//! Every failure in the crate is fatal to the operation that raised it and is
//! reported synchronously to the immediate caller. Nothing is retried. Each
//! variant carries enough context to explain what went wrong and exposes a
//! remediation hint through [`CaptureError::remediation_hint`].

use crate::model::BackendType;

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Error type for region selection, refinement and capture
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Requested monitor index does not exist
    #[error("Invalid monitor index {index}: {count} displays available (valid range 0..{count})")]
    InvalidMonitorIndex {
        /// Index that was requested
        index: usize,
        /// Number of entries reported by the grabber (index 0 is the union)
        count: usize,
    },

    /// Region has a non-positive dimension or cannot be addressed
    #[error("Invalid region {width}x{height}: {reason}")]
    InvalidRegion {
        /// Width of the rejected region
        width:  i64,
        /// Height of the rejected region
        height: i64,
        /// Why the region was rejected
        reason: String,
    },

    /// The screen-grab capability reported an error
    #[error("Screen capture failed: {reason}")]
    CaptureFailure {
        /// Backend supplied failure description
        reason: String,
    },

    /// A single grab exceeded the configured timeout
    #[error("Capture operation timed out after {duration_ms}ms")]
    CaptureTimeout {
        /// Timeout duration in milliseconds
        duration_ms: u64,
    },

    /// Interactive selection was cancelled before both corners were placed
    #[error("Region selection was aborted before both corners were selected")]
    SelectionAborted,

    /// Requested backend is not available
    #[error("Backend {backend} is not available on this platform")]
    BackendNotAvailable {
        /// Backend type that's unavailable
        backend: BackendType,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    ImageError(String),
}

impl CaptureError {
    /// Builds an [`CaptureError::InvalidRegion`] from signed dimensions
    pub fn invalid_region(width: i64, height: i64, reason: impl Into<String>) -> Self {
        CaptureError::InvalidRegion {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Builds a [`CaptureError::CaptureFailure`] from any displayable error
    pub fn capture_failure(reason: impl std::fmt::Display) -> Self {
        CaptureError::CaptureFailure {
            reason: reason.to_string(),
        }
    }

    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use frame_hook::error::CaptureError;
    ///
    /// let error = CaptureError::InvalidMonitorIndex { index: 3, count: 3 };
    /// assert!(error.remediation_hint().contains("displays"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            CaptureError::InvalidMonitorIndex { .. } => {
                "Run the displays command to list available monitors. Index 0 is the union of \
                 all monitors, individual displays start at 1."
            }
            CaptureError::InvalidRegion { .. } => {
                "Select two distinct corners so the region has a positive width and height. If \
                 trimming collapsed the region, retry without --trim or select a larger area."
            }
            CaptureError::CaptureFailure { .. } => {
                "The screen grab failed. Check that a desktop session is running and that the \
                 process is allowed to record the screen."
            }
            CaptureError::CaptureTimeout { .. } => {
                "A single grab took too long. Raise FRAME_HOOK_CAPTURE_TIMEOUT_MS or reduce the \
                 size of the captured region."
            }
            CaptureError::SelectionAborted => {
                "Selection was cancelled. Start the selection again and click both corners."
            }
            CaptureError::BackendNotAvailable { backend } => match backend {
                BackendType::Xcap => {
                    "The xcap backend is not compiled in. Rebuild with --features xcap-backend."
                }
                BackendType::Mock => "The mock backend is only meant for tests and dry runs.",
                BackendType::None => "No screen capture backend is available on this platform.",
            },
            CaptureError::IoError(_) => {
                "An I/O error occurred. Check file permissions, disk space, and system resources."
            }
            CaptureError::ImageError(_) => {
                "Image processing failed. Ensure the frame is not empty and the requested \
                 operation is supported."
            }
        }
    }
}
