//! Captured frame wrapper
//!
//! A [`Frame`] wraps an `image::DynamicImage` produced by one grab. The core
//! treats it as an opaque buffer of `width × height` samples: it is created
//! fresh on every capture, handed to the caller by value, and never touched by
//! the core after delivery.
//!
//! # Examples
//!
//! ```
//! use frame_hook::capture::Frame;
//!
//! let frame = Frame::from_test_pattern(1920, 1080);
//!
//! // Half-resolution preview
//! let preview = frame.downsample(2);
//! assert_eq!(preview.dimensions(), (960, 540));
//!
//! let cropped = preview.crop(100, 100, 800, 400).unwrap();
//! assert_eq!(cropped.dimensions(), (800, 400));
//! ```

use std::path::Path;

use image::{DynamicImage, GenericImageView, GrayImage, RgbaImage};

use crate::error::{CaptureError, CaptureResult};

/// Pixel buffer of one captured region
#[derive(Clone, Debug)]
pub struct Frame {
    inner: DynamicImage,
}

impl Frame {
    /// Wraps an already captured image
    pub fn new(image: DynamicImage) -> Self {
        Self { inner: image }
    }

    /// Creates an all-black RGBA frame
    ///
    /// ```
    /// use frame_hook::capture::Frame;
    ///
    /// let frame = Frame::blank(64, 48);
    /// assert_eq!(frame.dimensions(), (64, 48));
    /// ```
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(DynamicImage::ImageRgba8(RgbaImage::new(width, height)))
    }

    /// Creates a test pattern frame with the specified dimensions
    ///
    /// The pattern is a vertical gradient from blue (top) to cyan (bottom).
    /// Adjacent rows differ by at most one intensity step, so the pattern
    /// carries no edges for the refiner to latch onto.
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        use image::{ImageBuffer as ImgBuf, Rgba};

        let start_color = Rgba([0u8, 0u8, 255u8, 255u8]); // Blue
        let end_color = Rgba([0u8, 255u8, 255u8, 255u8]); // Cyan

        let img = ImgBuf::from_fn(width, height, |_x, y| {
            let ratio = y as f32 / height.max(1) as f32;
            Rgba([
                (start_color[0] as f32 * (1.0 - ratio) + end_color[0] as f32 * ratio) as u8,
                (start_color[1] as f32 * (1.0 - ratio) + end_color[1] as f32 * ratio) as u8,
                (start_color[2] as f32 * (1.0 - ratio) + end_color[2] as f32 * ratio) as u8,
                255,
            ])
        });

        Self::new(DynamicImage::ImageRgba8(img))
    }

    /// Returns the dimensions of the frame as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Returns the frame width in pixels
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Returns the frame height in pixels
    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Shrinks the frame by an integer divisor
    ///
    /// Used to build the selection preview. Bilinear filtering, and the
    /// result is never smaller than 1x1. A divisor of 0 or 1 returns a copy.
    pub fn downsample(&self, divisor: u32) -> Self {
        if divisor <= 1 {
            return self.clone();
        }

        let (width, height) = self.dimensions();
        let new_width = (width / divisor).max(1);
        let new_height = (height / divisor).max(1);

        let resized = self.inner.resize_exact(
            new_width,
            new_height,
            image::imageops::FilterType::Triangle,
        );
        Self::new(resized)
    }

    /// Crops a frame-local rectangle
    ///
    /// Returns an error if the rectangle does not fit inside the frame.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> CaptureResult<Self> {
        let (img_width, img_height) = self.dimensions();

        if x >= img_width || y >= img_height {
            return Err(CaptureError::ImageError(format!(
                "Crop origin ({}, {}) is outside frame bounds ({}x{})",
                x, y, img_width, img_height
            )));
        }

        if x as u64 + width as u64 > img_width as u64 || y as u64 + height as u64 > img_height as u64
        {
            return Err(CaptureError::ImageError(format!(
                "Crop ({}x{} at {},{}) extends beyond frame bounds ({}x{})",
                width, height, x, y, img_width, img_height
            )));
        }

        Ok(Self::new(self.inner.crop_imm(x, y, width, height)))
    }

    /// Converts to a single-channel intensity image
    pub fn to_luma8(&self) -> GrayImage {
        self.inner.to_luma8()
    }

    /// Converts to RGBA8
    pub fn to_rgba8(&self) -> RgbaImage {
        self.inner.to_rgba8()
    }

    /// Returns the raw sample bytes in the frame's native layout
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Writes the frame to disk as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> CaptureResult<()> {
        let path = path.as_ref();
        self.inner
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| match e {
                image::ImageError::IoError(io) => CaptureError::IoError(io),
                other => CaptureError::ImageError(format!(
                    "Failed to write {}: {}",
                    path.display(),
                    other
                )),
            })
    }

    /// Returns a reference to the inner DynamicImage
    pub fn inner(&self) -> &DynamicImage {
        &self.inner
    }

    /// Consumes self and returns the inner DynamicImage
    pub fn into_inner(self) -> DynamicImage {
        self.inner
    }
}

impl From<RgbaImage> for Frame {
    fn from(image: RgbaImage) -> Self {
        Self::new(DynamicImage::ImageRgba8(image))
    }
}

impl From<GrayImage> for Frame {
    fn from(image: GrayImage) -> Self {
        Self::new(DynamicImage::ImageLuma8(image))
    }
}
