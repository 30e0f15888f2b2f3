//! Edge-based refinement of a coarse region
//!
//! The user's clicks are rarely pixel-exact. [`EdgeRefiner`] takes a frame of
//! the coarse rectangle, runs the edge detector, and within a narrow band along
//! each side slides a three-pixel window looking for the strongest run of edge
//! pixels. The window centers become the refined borders.
//!
//! The bands are `len / 20` pixels deep. Candidates are tested from the frame
//! edge inwards and only a strictly larger count replaces the current best, so
//! ties resolve to the first window seen. A band with no edge pixels at all
//! yields center 0, and the refined rectangle then spans from the opposite
//! border back to the frame edge.

use std::ops::Range;

use image::GrayImage;

use super::{
    edges::{self, CANNY_HIGH, CANNY_LOW},
    mapper::CoordinateMapper,
};
use crate::{
    capture::Frame,
    error::{CaptureError, CaptureResult},
    model::{AbsolutePoint, Rectangle},
};

/// Width of the sliding window, in pixels
pub const SLIDING_WINDOW: u32 = 3;

/// Border bands are `len / BAND_DIVISOR` pixels deep
pub const BAND_DIVISOR: u32 = 20;

/// Window centers found along each side, in frame-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderCenters {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Snaps a coarse region to the strongest nearby edges
#[derive(Debug, Clone, Copy)]
pub struct EdgeRefiner {
    low: f32,
    high: f32,
    window: u32,
    band_divisor: u32,
}

impl Default for EdgeRefiner {
    fn default() -> Self {
        Self {
            low: CANNY_LOW,
            high: CANNY_HIGH,
            window: SLIDING_WINDOW,
            band_divisor: BAND_DIVISOR,
        }
    }
}

impl EdgeRefiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the hysteresis thresholds
    pub fn with_thresholds(mut self, low: f32, high: f32) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    /// Runs edge detection on `frame`
    pub fn edge_map(&self, frame: &Frame) -> GrayImage {
        edges::detect_edges(&frame.to_luma8(), self.low, self.high)
    }

    /// Finds the border window centers on a binary edge map
    ///
    /// Left and top scan `x in 0 .. len/20 - 3`; right and bottom scan
    /// `x in len - len/20 - 3 .. len - 3`. Windows that would start before 0
    /// are skipped.
    pub fn scan(&self, edge_map: &GrayImage) -> BorderCenters {
        let (columns, rows) = edges::projections(edge_map);

        BorderCenters {
            left: self.best_center(&columns, self.leading_band(columns.len())),
            right: self.best_center(&columns, self.trailing_band(columns.len())),
            top: self.best_center(&rows, self.leading_band(rows.len())),
            bottom: self.best_center(&rows, self.trailing_band(rows.len())),
        }
    }

    /// Refines `coarse` using `frame`, a grab of exactly that rectangle
    ///
    /// The window centers are mapped to absolute coordinates through a
    /// [`CoordinateMapper`] over `coarse`, so the result always lies inside
    /// it.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::InvalidRegion`] - `coarse` is empty, or the refined
    ///   corners share a column or a row
    pub fn refine(&self, frame: &Frame, coarse: Rectangle) -> CaptureResult<Rectangle> {
        let mapper = CoordinateMapper::new(coarse)?;

        if frame.dimensions() != mapper.dimensions() {
            tracing::warn!(
                "Refinement frame is {:?} but region is {:?}, borders will be clamped",
                frame.dimensions(),
                mapper.dimensions()
            );
        }

        let centers = self.scan(&self.edge_map(frame));
        tracing::debug!("Border centers for {}: {:?}", coarse, centers);

        let refined = corners_to_rect(&mapper, centers);
        if refined.is_empty() {
            tracing::warn!("Edge refinement of {} collapsed to {}", coarse, refined);
            return Err(CaptureError::invalid_region(
                refined.width as i64,
                refined.height as i64,
                format!("edge refinement of {} found no usable borders", coarse),
            ));
        }

        tracing::info!("Refined {} to {}", coarse, refined);
        Ok(refined)
    }

    fn leading_band(&self, len: usize) -> Range<i64> {
        let band = (len as u32 / self.band_divisor) as i64;
        0..band - self.window as i64
    }

    fn trailing_band(&self, len: usize) -> Range<i64> {
        let len = len as i64;
        let band = len / self.band_divisor as i64;
        let window = self.window as i64;
        (len - band - window)..(len - window)
    }

    fn best_center(&self, counts: &[u32], candidates: Range<i64>) -> u32 {
        let window = self.window as usize;
        let mut best = 0;
        let mut center = 0;

        for start in candidates {
            if start < 0 {
                continue;
            }
            let start = start as usize;
            let Some(slice) = counts.get(start..start + window) else {
                continue;
            };

            let count: u32 = slice.iter().sum();
            if count > best {
                best = count;
                center = (start + window / 2) as u32;
            }
        }

        center
    }
}

/// Spans the mapped leading and trailing centers, whichever way round they are
///
/// A band without edges reports center 0, so the trailing corner can land
/// before the leading one.
fn corners_to_rect(mapper: &CoordinateMapper, centers: BorderCenters) -> Rectangle {
    let (x1, y1) = mapper.region_to_absolute(to_i32(centers.left), to_i32(centers.top));
    let (x2, y2) = mapper.region_to_absolute(to_i32(centers.right), to_i32(centers.bottom));
    Rectangle::from_corners(AbsolutePoint::new(x1, y1), AbsolutePoint::new(x2, y2))
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use image::{Luma, Rgba, RgbaImage};

    use super::*;

    fn edge_map_with_columns(width: u32, height: u32, columns: &[u32]) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if columns.contains(&x) { Luma([edges::EDGE]) } else { Luma([0]) }
        })
    }

    fn edge_map_with_rows(width: u32, height: u32, rows: &[u32]) -> GrayImage {
        GrayImage::from_fn(width, height, |_, y| {
            if rows.contains(&y) { Luma([edges::EDGE]) } else { Luma([0]) }
        })
    }

    /// Dark frame with a bright rectangle spanning `[x0, x1) × [y0, y1)`
    fn content_frame(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Frame {
        Frame::from(RgbaImage::from_fn(width, height, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Rgba([230, 230, 230, 255])
            } else {
                Rgba([10, 10, 10, 255])
            }
        }))
    }

    #[test]
    fn test_single_left_column_picks_first_covering_window() {
        // Band for width 200 is 10, window starts 0..7; column 5 is covered by
        // windows starting 3, 4 and 5 with equal counts
        let map = edge_map_with_columns(200, 50, &[5]);
        let centers = EdgeRefiner::new().scan(&map);
        assert_eq!(centers.left, 4);
    }

    #[test]
    fn test_flanking_edges_center_on_line() {
        let map = edge_map_with_columns(400, 50, &[10, 12]);
        let centers = EdgeRefiner::new().scan(&map);
        assert_eq!(centers.left, 11);
    }

    #[test]
    fn test_right_band_scan() {
        // Width 200: right windows start 187..197
        let map = edge_map_with_columns(200, 50, &[190, 191]);
        let centers = EdgeRefiner::new().scan(&map);
        // Window starting 189 is the first that covers both columns
        assert_eq!(centers.right, 190);
    }

    #[test]
    fn test_rows_scanned_like_columns() {
        let map = edge_map_with_rows(50, 200, &[6, 7, 8, 193]);
        let centers = EdgeRefiner::new().scan(&map);
        assert_eq!(centers.top, 7);
        assert_eq!(centers.bottom, 192);
    }

    #[test]
    fn test_empty_band_yields_zero() {
        let map = GrayImage::new(200, 200);
        assert_eq!(EdgeRefiner::new().scan(&map), BorderCenters::default());
    }

    #[test]
    fn test_edges_outside_band_ignored() {
        // Column 30 is beyond the leading band of a 200-wide map
        let map = edge_map_with_columns(200, 50, &[30]);
        assert_eq!(EdgeRefiner::new().scan(&map).left, 0);
    }

    #[test]
    fn test_tiny_map_does_not_panic() {
        for (w, h) in [(1, 1), (2, 3), (3, 3), (25, 4)] {
            let map = GrayImage::from_pixel(w, h, Luma([edges::EDGE]));
            let _ = EdgeRefiner::new().scan(&map);
        }
    }

    #[test]
    fn test_refine_snaps_to_content_rectangle() {
        let coarse = Rectangle::new(50, 100, 400, 300);
        let frame = content_frame(400, 300, 8, 6, 392, 294);

        let refined = EdgeRefiner::new().refine(&frame, coarse).unwrap();

        assert!((106..=109).contains(&refined.left), "left {}", refined.left);
        assert!((55..=58).contains(&refined.top), "top {}", refined.top);
        let right = refined.right();
        let bottom = refined.bottom();
        assert!((488..=492).contains(&right), "right {}", right);
        assert!((340..=344).contains(&bottom), "bottom {}", bottom);
        assert!(coarse.contains(refined.origin()));
    }

    #[test]
    fn test_thin_line_frame_flanks_too_far_apart_for_one_window() {
        // Smoothing puts the flanks of a line at x=10 on columns 8 and 12, so
        // no three-pixel window covers both and the first window over column 8
        // wins
        let frame = Frame::from(RgbaImage::from_fn(400, 60, |x, _| {
            if x == 10 { Rgba([255, 255, 255, 255]) } else { Rgba([0, 0, 0, 255]) }
        }));
        let refiner = EdgeRefiner::new();

        let (columns, _) = edges::projections(&refiner.edge_map(&frame));
        let marked: Vec<usize> = (0..columns.len()).filter(|&x| columns[x] > 0).collect();
        assert_eq!(marked, vec![8, 12]);

        let centers = refiner.scan(&refiner.edge_map(&frame));
        assert_eq!(centers.left, 7);
    }

    #[test]
    fn test_corners_span_reversed_centers() {
        let mapper = CoordinateMapper::new(Rectangle::new(50, 100, 400, 300)).unwrap();
        let centers = BorderCenters { left: 6, top: 1, right: 0, bottom: 283 };

        assert_eq!(corners_to_rect(&mapper, centers), Rectangle::new(51, 100, 6, 282));
    }

    #[test]
    fn test_refine_with_edges_on_one_side_only() {
        // Step inside the left band, nothing in the right band
        let coarse = Rectangle::new(50, 100, 400, 300);
        let frame = Frame::from(RgbaImage::from_fn(400, 300, |x, _| {
            if x < 8 { Rgba([10, 10, 10, 255]) } else { Rgba([230, 230, 230, 255]) }
        }));

        let refined = EdgeRefiner::new().refine(&frame, coarse).unwrap();

        // Right center falls back to 0, so the left border is the coarse one
        assert_eq!(refined.left, 100);
        assert!((6..=7).contains(&refined.width), "width {}", refined.width);
        // Outermost rows carry no edges; first and last windows covering three
        // marked rows are centered on 2 and 283
        assert_eq!(refined.top, 52);
        assert_eq!(refined.height, 281);
    }

    #[test]
    fn test_refine_featureless_frame_fails() {
        let coarse = Rectangle::new(0, 0, 200, 100);
        let frame = Frame::blank(200, 100);

        let result = EdgeRefiner::new().refine(&frame, coarse);
        assert!(matches!(result, Err(CaptureError::InvalidRegion { .. })));
    }

    #[test]
    fn test_refine_rejects_empty_coarse() {
        let frame = Frame::blank(10, 10);
        let result = EdgeRefiner::new().refine(&frame, Rectangle::new(0, 0, 0, 10));
        assert!(matches!(result, Err(CaptureError::InvalidRegion { .. })));
    }
}
