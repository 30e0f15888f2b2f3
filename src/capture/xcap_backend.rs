//! Screen grabber backed by xcap
//!
//! Enumerates monitors through `xcap::Monitor` and serves grabs by capturing
//! every monitor that overlaps the requested rectangle and copying the
//! overlapping pixels into a frame of exactly the requested size. Areas not
//! covered by any monitor stay black.
//!
//! xcap calls are synchronous and may block on the display server, so every
//! call runs on tokio's blocking pool.

use async_trait::async_trait;
use image::{RgbaImage, imageops};

use super::{Frame, ScreenGrabber};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{BackendType, Rectangle},
};

/// xcap-based grabber for real desktop sessions
#[derive(Debug, Default)]
pub struct XcapGrabber;

impl XcapGrabber {
    pub fn new() -> Self {
        Self
    }

    fn monitor_rect(monitor: &xcap::Monitor) -> CaptureResult<Rectangle> {
        let left = monitor.x().map_err(map_xcap_error)?;
        let top = monitor.y().map_err(map_xcap_error)?;
        let width = monitor.width().map_err(map_xcap_error)?;
        let height = monitor.height().map_err(map_xcap_error)?;
        Ok(Rectangle::new(top, left, width, height))
    }

    fn list_blocking() -> CaptureResult<Vec<Rectangle>> {
        let monitors = xcap::Monitor::all().map_err(|e| {
            tracing::error!("xcap failed to enumerate monitors: {}", e);
            map_xcap_error(e)
        })?;

        let rects = monitors
            .iter()
            .map(Self::monitor_rect)
            .collect::<CaptureResult<Vec<_>>>()?;

        let mut displays = Vec::with_capacity(rects.len() + 1);
        displays.extend(Rectangle::union_of(&rects));
        displays.extend(rects);
        Ok(displays)
    }

    fn grab_blocking(rect: Rectangle) -> CaptureResult<Frame> {
        rect.validate()?;

        let monitors = xcap::Monitor::all().map_err(map_xcap_error)?;
        let mut out = RgbaImage::new(rect.width, rect.height);
        let mut covered = false;

        for monitor in &monitors {
            let bounds = Self::monitor_rect(monitor)?;

            let left = (rect.left as i64).max(bounds.left as i64);
            let top = (rect.top as i64).max(bounds.top as i64);
            let right = rect.right().min(bounds.right());
            let bottom = rect.bottom().min(bounds.bottom());
            if left >= right || top >= bottom {
                continue;
            }

            let captured = monitor.capture_image().map_err(|e| {
                tracing::error!("xcap monitor capture failed: {}", e);
                map_xcap_error(e)
            })?;
            let (cap_w, cap_h) = (captured.width(), captured.height());
            let raw = RgbaImage::from_raw(cap_w, cap_h, captured.into_raw()).ok_or_else(|| {
                CaptureError::ImageError("xcap returned a truncated pixel buffer".to_string())
            })?;

            let dst_at = (left - rect.left as i64, top - rect.top as i64);
            let src_rect = (
                (left - bounds.left as i64) as u32,
                (top - bounds.top as i64) as u32,
                (right - left) as u32,
                (bottom - top) as u32,
            );
            blit(&mut out, &raw, dst_at, src_rect);
            covered = true;
        }

        if !covered {
            return Err(CaptureError::invalid_region(
                rect.width as i64,
                rect.height as i64,
                format!("{} does not overlap any monitor", rect),
            ));
        }

        tracing::debug!("xcap grabbed {}", rect);
        Ok(Frame::from(out))
    }
}

/// Copies `src_rect` (x, y, width, height) of a monitor image to `dst` at `at`
///
/// HiDPI monitors can report logical bounds larger than the captured image,
/// so the source rectangle is clipped to the image first.
fn blit(dst: &mut RgbaImage, monitor: &RgbaImage, at: (i64, i64), src_rect: (u32, u32, u32, u32)) {
    let (x, y, width, height) = src_rect;
    let (cap_w, cap_h) = monitor.dimensions();
    if x >= cap_w || y >= cap_h {
        return;
    }

    let patch = imageops::crop_imm(monitor, x, y, width.min(cap_w - x), height.min(cap_h - y)).to_image();
    imageops::replace(dst, &patch, at.0, at.1);
}

#[async_trait]
impl ScreenGrabber for XcapGrabber {
    async fn displays(&self) -> CaptureResult<Vec<Rectangle>> {
        tokio::task::spawn_blocking(Self::list_blocking)
            .await
            .map_err(|e| CaptureError::capture_failure(format!("display enumeration task failed: {}", e)))?
    }

    async fn grab(&self, rect: Rectangle) -> CaptureResult<Frame> {
        tokio::task::spawn_blocking(move || Self::grab_blocking(rect))
            .await
            .map_err(|e| CaptureError::capture_failure(format!("grab task failed: {}", e)))?
    }

    fn backend(&self) -> BackendType {
        BackendType::Xcap
    }
}

/// Maps xcap errors to [`CaptureError::CaptureFailure`]
fn map_xcap_error(e: xcap::XCapError) -> CaptureError {
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("permission denied") || err_str.contains("access denied") {
        tracing::warn!("xcap permission denied - check screen recording permissions");
    } else if err_str.contains("display") || err_str.contains("connection") {
        tracing::warn!("xcap failed to reach the display server - verify the session is running");
    }

    CaptureError::capture_failure(e)
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn test_backend_type() {
        assert_eq!(XcapGrabber::new().backend(), BackendType::Xcap);
    }

    #[test]
    fn test_blit_copies_overlap_into_place() {
        let monitor = RgbaImage::from_fn(8, 6, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let mut out = RgbaImage::new(4, 4);

        blit(&mut out, &monitor, (1, 2), (5, 3, 3, 2));

        assert_eq!(*out.get_pixel(1, 2), Rgba([5, 3, 0, 255]));
        assert_eq!(*out.get_pixel(3, 3), Rgba([7, 4, 0, 255]));
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_blit_clips_to_captured_image() {
        // Logical bounds twice the captured size
        let monitor = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let mut out = RgbaImage::new(8, 8);

        blit(&mut out, &monitor, (0, 0), (2, 2, 6, 6));
        assert_eq!(*out.get_pixel(1, 1), Rgba([9, 9, 9, 255]));
        assert_eq!(*out.get_pixel(2, 2), Rgba([0, 0, 0, 0]));

        blit(&mut out, &monitor, (0, 0), (5, 0, 2, 2));
        assert_eq!(*out.get_pixel(4, 4), Rgba([0, 0, 0, 0]));
    }

    #[tokio::test]
    async fn test_grab_rejects_empty_rect() {
        let result = XcapGrabber::new().grab(Rectangle::new(0, 0, 0, 5)).await;
        assert!(matches!(result, Err(CaptureError::InvalidRegion { .. })));
    }

    #[tokio::test]
    #[ignore = "Requires a live desktop session"]
    async fn test_displays_live() {
        let displays = XcapGrabber::new().displays().await.unwrap();
        assert!(displays.len() >= 2, "expected union plus at least one monitor");
    }
}
