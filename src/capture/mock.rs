//! Mock screen grabber for testing
//!
//! [`MockGrabber`] implements [`ScreenGrabber`] without a display server. It
//! reports a fixed display layout and produces frames from one of three
//! sources:
//!
//! - **Test pattern** (default): an edge-free gradient of the requested size
//! - **Blank**: all-black frames
//! - **Scene**: a desktop image positioned at the union origin; every grab
//!   crops the requested rectangle out of it, so selection and refinement see
//!   the same pixels a real screen would show
//!
//! Delay, error injection and "fail after N grabs" make the error paths of the
//! capture loop testable.
//!
//! # Examples
//!
//! ```
//! use frame_hook::{
//!     capture::{MockGrabber, ScreenGrabber},
//!     model::Rectangle,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let grabber = MockGrabber::new();
//!
//!     let displays = grabber.displays().await.unwrap();
//!     assert_eq!(displays.len(), 3);
//!
//!     let frame = grabber.grab(Rectangle::new(100, 200, 50, 40)).await.unwrap();
//!     assert_eq!(frame.dimensions(), (50, 40));
//! }
//! ```

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use image::RgbaImage;
use tokio::time::sleep;

use super::{Frame, ScreenGrabber};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{AbsolutePoint, BackendType, Rectangle},
};

#[derive(Debug, Clone)]
enum FrameSource {
    TestPattern,
    Blank,
    Scene(Arc<RgbaImage>),
}

/// Mock grabber for tests and dry runs
#[derive(Debug)]
pub struct MockGrabber {
    /// Display list, entry 0 is the union
    displays:        Vec<Rectangle>,
    source:          FrameSource,
    /// Optional delay to simulate grab latency
    delay:           Option<Duration>,
    /// Optional error to inject for testing error handling
    error_injection: Option<CaptureError>,
    /// Number of grabs that succeed before every further grab fails
    fail_after:      Option<usize>,
    grab_count:      AtomicUsize,
    grabbed:         Mutex<Vec<Rectangle>>,
}

impl MockGrabber {
    /// Creates a grabber with two 1920x1080 monitors side by side
    pub fn new() -> Self {
        Self::with_monitors(vec![
            Rectangle::new(0, 0, 1920, 1080),
            Rectangle::new(0, 1920, 1920, 1080),
        ])
    }

    /// Creates a grabber with the given monitors
    ///
    /// The union entry at index 0 is derived from the monitors.
    pub fn with_monitors(monitors: Vec<Rectangle>) -> Self {
        let mut displays = Vec::with_capacity(monitors.len() + 1);
        displays.extend(Rectangle::union_of(&monitors));
        displays.extend(monitors);

        Self {
            displays,
            source: FrameSource::TestPattern,
            delay: None,
            error_injection: None,
            fail_after: None,
            grab_count: AtomicUsize::new(0),
            grabbed: Mutex::new(Vec::new()),
        }
    }

    /// Serves all-black frames
    pub fn with_blank_frames(mut self) -> Self {
        self.source = FrameSource::Blank;
        self
    }

    /// Serves crops of a desktop image whose top-left pixel sits at the union
    /// origin. Pixels outside the image read as black.
    pub fn with_scene(mut self, scene: RgbaImage) -> Self {
        self.source = FrameSource::Scene(Arc::new(scene));
        self
    }

    /// Sleeps before every operation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Injects an error that will be returned by all operations
    pub fn with_error(mut self, error: CaptureError) -> Self {
        self.error_injection = Some(error);
        self
    }

    /// Lets `successes` grabs through, then fails every following grab
    pub fn with_failure_after(mut self, successes: usize) -> Self {
        self.fail_after = Some(successes);
        self
    }

    /// Number of grab calls made so far, including failed ones
    pub fn grab_count(&self) -> usize {
        self.grab_count.load(Ordering::SeqCst)
    }

    /// Rectangles requested so far, in call order
    pub fn grabbed_rects(&self) -> Vec<Rectangle> {
        self.grabbed
            .lock()
            .map(|rects| rects.clone())
            .unwrap_or_default()
    }

    async fn apply_delay(&self) {
        if let Some(duration) = self.delay {
            sleep(duration).await;
        }
    }

    fn check_error_injection(&self) -> CaptureResult<()> {
        if let Some(ref error) = self.error_injection {
            return Err(match error {
                CaptureError::InvalidMonitorIndex { index, count } => {
                    CaptureError::InvalidMonitorIndex {
                        index: *index,
                        count: *count,
                    }
                }
                CaptureError::InvalidRegion {
                    width,
                    height,
                    reason,
                } => CaptureError::invalid_region(*width, *height, reason.clone()),
                CaptureError::CaptureFailure { reason } => CaptureError::CaptureFailure {
                    reason: reason.clone(),
                },
                CaptureError::CaptureTimeout { duration_ms } => CaptureError::CaptureTimeout {
                    duration_ms: *duration_ms,
                },
                CaptureError::SelectionAborted => CaptureError::SelectionAborted,
                CaptureError::BackendNotAvailable { backend } => {
                    CaptureError::BackendNotAvailable { backend: *backend }
                }
                CaptureError::IoError(e) => {
                    CaptureError::IoError(std::io::Error::new(e.kind(), e.to_string()))
                }
                CaptureError::ImageError(msg) => CaptureError::ImageError(msg.clone()),
            });
        }
        Ok(())
    }

    fn render(&self, rect: Rectangle) -> Frame {
        match &self.source {
            FrameSource::TestPattern => Frame::from_test_pattern(rect.width, rect.height),
            FrameSource::Blank => Frame::blank(rect.width, rect.height),
            FrameSource::Scene(scene) => {
                let origin = self
                    .displays
                    .first()
                    .map(Rectangle::origin)
                    .unwrap_or(AbsolutePoint::new(0, 0));
                let mut out = RgbaImage::new(rect.width, rect.height);
                let offset_x = rect.left as i64 - origin.x as i64;
                let offset_y = rect.top as i64 - origin.y as i64;

                for (x, y, pixel) in out.enumerate_pixels_mut() {
                    let sx = offset_x + x as i64;
                    let sy = offset_y + y as i64;
                    if sx >= 0 && sy >= 0 && sx < scene.width() as i64 && sy < scene.height() as i64
                    {
                        *pixel = *scene.get_pixel(sx as u32, sy as u32);
                    }
                }
                Frame::from(out)
            }
        }
    }
}

impl Default for MockGrabber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScreenGrabber for MockGrabber {
    async fn displays(&self) -> CaptureResult<Vec<Rectangle>> {
        self.apply_delay().await;
        self.check_error_injection()?;
        Ok(self.displays.clone())
    }

    async fn grab(&self, rect: Rectangle) -> CaptureResult<Frame> {
        let attempt = self.grab_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut grabbed) = self.grabbed.lock() {
            grabbed.push(rect);
        }

        self.apply_delay().await;
        self.check_error_injection()?;

        if let Some(limit) = self.fail_after {
            if attempt >= limit {
                return Err(CaptureError::capture_failure(format!(
                    "mock grab #{} failed after {} successful grabs",
                    attempt + 1,
                    limit
                )));
            }
        }

        rect.validate()?;
        Ok(self.render(rect))
    }

    fn backend(&self) -> BackendType {
        BackendType::Mock
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use image::Rgba;

    use super::*;

    #[test]
    fn test_mock_grabber_new() {
        let grabber = MockGrabber::new();
        assert_eq!(grabber.displays.len(), 3);
        assert_eq!(grabber.displays[0], Rectangle::new(0, 0, 3840, 1080));
        assert_eq!(grabber.displays[2], Rectangle::new(0, 1920, 1920, 1080));
        assert!(grabber.delay.is_none());
        assert!(grabber.error_injection.is_none());
    }

    #[tokio::test]
    async fn test_displays() {
        let grabber = MockGrabber::with_monitors(vec![Rectangle::new(0, 0, 800, 600)]);
        let displays = grabber.displays().await.unwrap();
        assert_eq!(displays, vec![Rectangle::new(0, 0, 800, 600), Rectangle::new(0, 0, 800, 600)]);
    }

    #[tokio::test]
    async fn test_grab_dimensions_and_count() {
        let grabber = MockGrabber::new();
        let frame = grabber.grab(Rectangle::new(10, 20, 300, 200)).await.unwrap();

        assert_eq!(frame.dimensions(), (300, 200));
        assert_eq!(grabber.grab_count(), 1);
        assert_eq!(grabber.grabbed_rects(), vec![Rectangle::new(10, 20, 300, 200)]);
    }

    #[tokio::test]
    async fn test_grab_rejects_empty_rect() {
        let grabber = MockGrabber::new();
        let result = grabber.grab(Rectangle::new(0, 0, 0, 10)).await;
        assert!(matches!(result, Err(CaptureError::InvalidRegion { .. })));
    }

    #[tokio::test]
    async fn test_blank_frames() {
        let grabber = MockGrabber::new().with_blank_frames();
        let frame = grabber.grab(Rectangle::new(0, 0, 8, 8)).await.unwrap();
        assert!(frame.as_bytes().iter().all(|&b| b == 0));
    }

    #[tokio::test]
    async fn test_scene_crop_follows_absolute_position() {
        let mut scene = RgbaImage::new(100, 100);
        scene.put_pixel(30, 40, Rgba([255, 0, 0, 255]));

        let grabber = MockGrabber::with_monitors(vec![Rectangle::new(0, 0, 100, 100)])
            .with_scene(scene);
        let frame = grabber.grab(Rectangle::new(35, 25, 10, 10)).await.unwrap();
        let rgba = frame.to_rgba8();

        assert_eq!(*rgba.get_pixel(5, 5), Rgba([255, 0, 0, 255]));
        assert_eq!(*rgba.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[tokio::test]
    async fn test_scene_respects_negative_union_origin() {
        let mut scene = RgbaImage::new(200, 100);
        scene.put_pixel(0, 0, Rgba([9, 9, 9, 255]));

        let grabber = MockGrabber::with_monitors(vec![
            Rectangle::new(0, -100, 100, 100),
            Rectangle::new(0, 0, 100, 100),
        ])
        .with_scene(scene);

        let frame = grabber.grab(Rectangle::new(0, -100, 1, 1)).await.unwrap();
        assert_eq!(*frame.to_rgba8().get_pixel(0, 0), Rgba([9, 9, 9, 255]));
    }

    #[tokio::test]
    async fn test_error_injection() {
        let grabber = MockGrabber::new().with_error(CaptureError::capture_failure("boom"));

        assert!(grabber.displays().await.is_err());
        let result = grabber.grab(Rectangle::new(0, 0, 10, 10)).await;
        assert!(matches!(result, Err(CaptureError::CaptureFailure { .. })));
    }

    #[tokio::test]
    async fn test_failure_after() {
        let grabber = MockGrabber::new().with_failure_after(2);
        let rect = Rectangle::new(0, 0, 4, 4);

        assert!(grabber.grab(rect).await.is_ok());
        assert!(grabber.grab(rect).await.is_ok());
        let third = grabber.grab(rect).await;
        assert!(matches!(third, Err(CaptureError::CaptureFailure { .. })));
        assert_eq!(grabber.grab_count(), 3);
    }

    #[tokio::test]
    async fn test_delay_timing() {
        let delay = Duration::from_millis(50);
        let grabber = MockGrabber::new().with_delay(delay);

        let start = Instant::now();
        grabber.grab(Rectangle::new(0, 0, 4, 4)).await.unwrap();
        assert!(start.elapsed() >= delay);
    }

    #[test]
    fn test_backend_type() {
        assert_eq!(MockGrabber::new().backend(), BackendType::Mock);
    }
}
