//! Binary edge detection on single-channel frames
//!
//! Thin layer over [`imageproc::edges::canny`]: the frame is smoothed with a
//! Gaussian (sigma 1.4), Sobel gradients are thinned by non-maximum
//! suppression and kept by hysteresis between a low and a high threshold.
//! Gradients clamp at the borders and the outermost rows and columns are never
//! marked, so a uniform frame produces no edges at its rim.
//!
//! The output has the same dimensions as the input; edge pixels are 255,
//! everything else 0.

use image::GrayImage;

/// Lower hysteresis threshold used for region refinement
pub const CANNY_LOW: f32 = 10.0;

/// Upper hysteresis threshold used for region refinement
pub const CANNY_HIGH: f32 = 50.0;

/// Value written for edge pixels
pub const EDGE: u8 = 255;

/// Runs the detector with the given thresholds
///
/// The thresholds are swapped if given in the wrong order.
///
/// # Examples
///
/// ```
/// use frame_hook::region::edges::{detect_edges, CANNY_HIGH, CANNY_LOW};
/// use image::GrayImage;
///
/// let flat = GrayImage::from_pixel(16, 16, image::Luma([128]));
/// let edges = detect_edges(&flat, CANNY_LOW, CANNY_HIGH);
/// assert!(edges.pixels().all(|p| p.0[0] == 0));
/// ```
pub fn detect_edges(gray: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let (low, high) = if low > high { (high, low) } else { (low, high) };
    imageproc::edges::canny(gray, low, high)
}

/// Runs the detector with the refinement thresholds
pub fn canny(gray: &GrayImage) -> GrayImage {
    detect_edges(gray, CANNY_LOW, CANNY_HIGH)
}

/// Counts edge pixels in every column and every row
pub fn projections(edges: &GrayImage) -> (Vec<u32>, Vec<u32>) {
    let (width, height) = edges.dimensions();
    let mut columns = vec![0u32; width as usize];
    let mut rows = vec![0u32; height as usize];

    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel.0[0] != 0 {
            columns[x as usize] += 1;
            rows[y as usize] += 1;
        }
    }

    (columns, rows)
}
