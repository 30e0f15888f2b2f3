//! Screen-grab capability and its implementations
//!
//! The core never talks to the operating system directly. It consumes the
//! [`ScreenGrabber`] trait, which exposes the two capabilities the rest of the
//! crate needs:
//!
//! - [`displays`](ScreenGrabber::displays) - ordered display rectangles, with
//!   index 0 reserved for the union of every monitor
//! - [`grab`](ScreenGrabber::grab) - pixels of an absolute rectangle
//!
//! # Backends
//!
//! | Backend | Feature | Notes |
//! |---------|---------|-------|
//! | [`MockGrabber`] | always | synthetic scene, delay and error injection |
//! | `XcapGrabber` | `xcap-backend` | real monitors through xcap |
//!
//! Use [`create_default_grabber`] to pick the best backend compiled in.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    error::{CaptureError, CaptureResult},
    model::{BackendType, Rectangle},
};

pub mod constants;
pub mod frame;
pub mod mock;

#[cfg(feature = "xcap-backend")]
pub mod xcap_backend;

pub use frame::Frame;
pub use mock::MockGrabber;
#[cfg(feature = "xcap-backend")]
pub use xcap_backend::XcapGrabber;

/// Screen-grab capability consumed by selection, refinement and the capture
/// loop.
///
/// Implementations must be thread-safe (`Send + Sync`) so a grabber can be
/// shared behind an `Arc`, although the crate itself only drives it from one
/// task at a time.
///
/// # Examples
///
/// ```rust,ignore
/// use frame_hook::{capture::ScreenGrabber, model::Rectangle};
///
/// async fn grab_top_left(grabber: &dyn ScreenGrabber) -> frame_hook::error::CaptureResult<()> {
///     let frame = grabber.grab(Rectangle::new(0, 0, 640, 480)).await?;
///     assert_eq!(frame.dimensions(), (640, 480));
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ScreenGrabber: Send + Sync {
    /// Lists display rectangles in absolute coordinates
    ///
    /// Entry 0 is the virtual desktop covering every monitor; individual
    /// monitors follow in backend order.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::CaptureFailure`] - the display list could not be read
    async fn displays(&self) -> CaptureResult<Vec<Rectangle>>;

    /// Captures the pixels of an absolute rectangle
    ///
    /// The returned frame has exactly `rect.width × rect.height` pixels.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::CaptureFailure`] - the backend failed to grab
    /// - [`CaptureError::InvalidRegion`] - the rectangle is empty or lies
    ///   outside every display
    async fn grab(&self, rect: Rectangle) -> CaptureResult<Frame>;

    /// Identifies the backend for logging
    fn backend(&self) -> BackendType;
}

/// Grabs `rect`, failing with [`CaptureError::CaptureTimeout`] when the
/// backend does not answer within `timeout`.
pub async fn grab_with_timeout(
    grabber: &dyn ScreenGrabber,
    rect: Rectangle,
    timeout: Duration,
) -> CaptureResult<Frame> {
    match tokio::time::timeout(timeout, grabber.grab(rect)).await {
        Ok(result) => result,
        Err(_) => {
            let duration_ms = timeout.as_millis() as u64;
            tracing::error!("Grab of {} timed out after {}ms", rect, duration_ms);
            Err(CaptureError::CaptureTimeout { duration_ms })
        }
    }
}

/// Creates the default grabber for this build.
///
/// - With `xcap-backend`: [`XcapGrabber`]
/// - Otherwise: [`CaptureError::BackendNotAvailable`]
pub fn create_default_grabber() -> CaptureResult<Arc<dyn ScreenGrabber>> {
    #[cfg(feature = "xcap-backend")]
    {
        Ok(Arc::new(XcapGrabber::new()))
    }

    #[cfg(not(feature = "xcap-backend"))]
    {
        Err(CaptureError::BackendNotAvailable {
            backend: BackendType::Xcap,
        })
    }
}
