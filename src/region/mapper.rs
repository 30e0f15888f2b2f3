//! Coordinate mapping between absolute display space and the committed region
//!
//! [`CoordinateMapper`] owns the committed [`Rectangle`]. Both conversions
//! clamp their output into the rectangle, so every coordinate handed out is
//! safe to use for capture-region addressing, whatever the input.
//!
//! For points already inside the rectangle the two conversions are exact
//! inverses. For points outside it the result is the nearest edge pixel.
//!
//! # Examples
//!
//! ```
//! use frame_hook::{model::Rectangle, region::CoordinateMapper};
//!
//! let mapper = CoordinateMapper::new(Rectangle::new(100, 200, 50, 40)).unwrap();
//!
//! assert_eq!(mapper.region_to_absolute(0, 0), (200, 100));
//! assert_eq!(mapper.region_to_absolute(49, 39), (249, 139));
//! assert_eq!(mapper.region_to_absolute(100, 100), (249, 139));
//! assert_eq!(mapper.absolute_to_region(225, 120), (25, 20));
//! ```

use crate::{
    error::{CaptureError, CaptureResult},
    model::{AbsolutePoint, Rectangle, RegionPoint},
};

/// Resolves a monitor index against a display list
///
/// Index 0 is the union of all monitors, individual monitors follow.
///
/// # Errors
///
/// [`CaptureError::InvalidMonitorIndex`] when `index >= displays.len()`.
pub fn resolve_monitor(displays: &[Rectangle], index: usize) -> CaptureResult<Rectangle> {
    displays
        .get(index)
        .copied()
        .ok_or(CaptureError::InvalidMonitorIndex {
            index,
            count: displays.len(),
        })
}

/// Owner of the committed region and its coordinate conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMapper {
    region: Rectangle,
}

impl CoordinateMapper {
    /// Commits `region`
    ///
    /// # Errors
    ///
    /// [`CaptureError::InvalidRegion`] if the width or height is zero or the
    /// region does not fit the addressable coordinate space.
    pub fn new(region: Rectangle) -> CaptureResult<Self> {
        region.validate()?;
        Ok(Self { region })
    }

    /// Replaces the committed region after an explicit re-selection
    ///
    /// On error the previous region stays committed.
    pub fn commit(&mut self, region: Rectangle) -> CaptureResult<()> {
        region.validate()?;
        tracing::debug!("Committing region {} (was {})", region, self.region);
        self.region = region;
        Ok(())
    }

    /// Returns the committed region
    pub fn region(&self) -> Rectangle {
        self.region
    }

    /// Returns `(width, height)` of the committed region
    pub fn dimensions(&self) -> (u32, u32) {
        (self.region.width, self.region.height)
    }

    /// Converts region-local to absolute coordinates, clamped into the region
    ///
    /// `sx = clamp(left + gx, left, left + width - 1)` and likewise for `y`.
    pub fn region_to_absolute(&self, gx: i32, gy: i32) -> (i32, i32) {
        let (left, top) = (self.region.left, self.region.top);
        let (last_x, last_y) = self.last_absolute();

        let sx = left.saturating_add(gx).clamp(left, last_x);
        let sy = top.saturating_add(gy).clamp(top, last_y);
        (sx, sy)
    }

    /// Converts absolute to region-local coordinates, clamped into the region
    ///
    /// `gx = clamp(sx - left, 0, width - 1)` and likewise for `y`.
    pub fn absolute_to_region(&self, sx: i32, sy: i32) -> (i32, i32) {
        let max_x = self.region.width as i32 - 1;
        let max_y = self.region.height as i32 - 1;

        let gx = sx.saturating_sub(self.region.left).clamp(0, max_x);
        let gy = sy.saturating_sub(self.region.top).clamp(0, max_y);
        (gx, gy)
    }

    /// Typed form of [`region_to_absolute`](Self::region_to_absolute)
    pub fn to_absolute(&self, point: RegionPoint) -> AbsolutePoint {
        let (x, y) = self.region_to_absolute(point.x, point.y);
        AbsolutePoint::new(x, y)
    }

    /// Typed form of [`absolute_to_region`](Self::absolute_to_region)
    pub fn to_region(&self, point: AbsolutePoint) -> RegionPoint {
        let (x, y) = self.absolute_to_region(point.x, point.y);
        RegionPoint::new(x, y)
    }

    // validate() guarantees left + width and top + height fit in i32
    fn last_absolute(&self) -> (i32, i32) {
        (
            self.region.left + (self.region.width as i32 - 1),
            self.region.top + (self.region.height as i32 - 1),
        )
    }
}
