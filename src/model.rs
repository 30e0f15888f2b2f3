//! Data models and type definitions for frame-hook
//!
//! This module defines the core value types used throughout the crate:
//! - [`Rectangle`], the committed game region in absolute display pixels
//! - [`AbsolutePoint`] and [`RegionPoint`], kept as distinct types so the two
//!   coordinate spaces are never mixed without an explicit conversion
//! - [`PointerEvent`], delivered by the pointer capability in preview space
//! - [`SelectOptions`] and [`LoopOptions`], runtime configuration with builders

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    capture::constants,
    error::{CaptureError, CaptureResult},
};

/// Screen-grab backend in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// No backend detected or not yet initialized
    None,
    /// Synthetic frames for tests and dry runs
    Mock,
    /// Cross-platform capture through the xcap crate
    Xcap,
}

impl BackendType {
    /// Returns the backend type as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::None => "none",
            BackendType::Mock => "mock",
            BackendType::Xcap => "xcap",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A point in absolute display coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsolutePoint {
    pub x: i32,
    pub y: i32,
}

impl AbsolutePoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A point relative to the committed region's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionPoint {
    pub x: i32,
    pub y: i32,
}

impl RegionPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rectangle in absolute display pixel units
///
/// Field order follows the `{top, left, width, height}` convention used when
/// regions are printed or parsed. A rectangle only becomes a committed region
/// after [`Rectangle::validate`] accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub top:    i32,
    pub left:   i32,
    pub width:  u32,
    pub height: u32,
}

impl Rectangle {
    /// Creates a rectangle without validating it
    pub fn new(top: i32, left: i32, width: u32, height: u32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Builds the rectangle spanned by two opposite corners
    ///
    /// The corners may be given in any order. The result is
    /// `{top: min(y), left: min(x), width: |dx|, height: |dy|}` and may be
    /// empty when the corners share a row or column.
    ///
    /// # Examples
    ///
    /// ```
    /// use frame_hook::model::{AbsolutePoint, Rectangle};
    ///
    /// let rect = Rectangle::from_corners(AbsolutePoint::new(300, 200), AbsolutePoint::new(100, 50));
    /// assert_eq!(rect, Rectangle::new(50, 100, 200, 150));
    /// ```
    pub fn from_corners(a: AbsolutePoint, b: AbsolutePoint) -> Self {
        Self {
            top:    a.y.min(b.y),
            left:   a.x.min(b.x),
            width:  a.x.abs_diff(b.x),
            height: a.y.abs_diff(b.y),
        }
    }

    /// Checks the committed-region invariant
    ///
    /// Width and height must be positive and the far edges must stay inside
    /// the addressable `i32` coordinate space.
    pub fn validate(&self) -> CaptureResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::invalid_region(
                self.width as i64,
                self.height as i64,
                "width and height must be positive",
            ));
        }

        let right = self.left as i64 + self.width as i64;
        let bottom = self.top as i64 + self.height as i64;
        if right > i32::MAX as i64 || bottom > i32::MAX as i64 {
            return Err(CaptureError::invalid_region(
                self.width as i64,
                self.height as i64,
                "region extends past the addressable display space",
            ));
        }

        Ok(())
    }

    /// Returns `true` when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    /// Returns the top-left corner
    pub fn origin(&self) -> AbsolutePoint {
        AbsolutePoint::new(self.left, self.top)
    }

    /// Returns `true` if the absolute point lies inside the rectangle
    pub fn contains(&self, point: AbsolutePoint) -> bool {
        let (x, y) = (point.x as i64, point.y as i64);
        x >= self.left as i64 && x < self.right() && y >= self.top as i64 && y < self.bottom()
    }

    /// Smallest rectangle covering every rectangle in the slice
    ///
    /// Returns `None` for an empty slice.
    pub fn union_of(rects: &[Rectangle]) -> Option<Rectangle> {
        let left = rects.iter().map(|r| r.left as i64).min()?;
        let top = rects.iter().map(|r| r.top as i64).min()?;
        let right = rects.iter().map(Rectangle::right).max()?;
        let bottom = rects.iter().map(Rectangle::bottom).max()?;

        Some(Rectangle::new(
            top as i32,
            left as i32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{top: {}, left: {}, width: {}, height: {}}}",
            self.top, self.left, self.width, self.height
        )
    }
}

impl FromStr for Rectangle {
    type Err = CaptureError;

    /// Parses `top,left,width,height`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(CaptureError::invalid_region(
                0,
                0,
                format!("expected top,left,width,height but got '{}'", s),
            ));
        }

        let mut values = [0i64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                CaptureError::invalid_region(0, 0, format!("'{}' is not an integer", part))
            })?;
        }
        let [top, left, width, height] = values;

        if width <= 0 || height <= 0 {
            return Err(CaptureError::invalid_region(
                width,
                height,
                "width and height must be positive",
            ));
        }

        let in_range = |v: i64| i32::try_from(v).is_ok();
        if !(in_range(top) && in_range(left) && in_range(width) && in_range(height)) {
            return Err(CaptureError::invalid_region(
                width,
                height,
                "coordinates exceed the addressable display space",
            ));
        }

        let rect = Rectangle::new(top as i32, left as i32, width as u32, height as u32);
        rect.validate()?;
        Ok(rect)
    }
}

/// Kind of pointer event reported by the input capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    /// Primary button went down
    Press,
    /// Primary button went up
    Release,
    /// Pointer moved without a button transition
    Move,
    /// Nothing happened since the last poll
    None,
}

/// Pointer event in preview-space coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x:    i32,
    pub y:    i32,
    pub kind: PointerEventKind,
}

impl PointerEvent {
    pub fn new(x: i32, y: i32, kind: PointerEventKind) -> Self {
        Self { x, y, kind }
    }

    pub fn press(x: i32, y: i32) -> Self {
        Self::new(x, y, PointerEventKind::Press)
    }

    pub fn release(x: i32, y: i32) -> Self {
        Self::new(x, y, PointerEventKind::Release)
    }

    pub fn moved(x: i32, y: i32) -> Self {
        Self::new(x, y, PointerEventKind::Move)
    }
}

/// Options for interactive region selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectOptions {
    /// Divisor applied to the monitor grab to produce the preview
    pub preview_scale:   u32,
    /// Tighten the selected rectangle with edge refinement
    pub trim:            bool,
    /// Delay between preview ticks
    pub poll_interval:   Duration,
    /// Upper bound for a single grab
    pub capture_timeout: Duration,
}

impl SelectOptions {
    /// Creates a builder starting from [`SelectOptions::default`]
    ///
    /// # Examples
    ///
    /// ```
    /// use frame_hook::model::SelectOptions;
    ///
    /// let opts = SelectOptions::builder().trim(true).preview_scale(4).build();
    /// assert!(opts.trim);
    /// assert_eq!(opts.preview_scale, 4);
    /// ```
    pub fn builder() -> SelectOptionsBuilder {
        SelectOptionsBuilder {
            opts: Self::default(),
        }
    }
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            preview_scale:   constants::preview_scale(),
            trim:            false,
            poll_interval:   Duration::from_millis(constants::select_poll_ms()),
            capture_timeout: Duration::from_millis(constants::capture_timeout_ms()),
        }
    }
}

/// Builder for [`SelectOptions`]
#[derive(Debug, Clone)]
pub struct SelectOptionsBuilder {
    opts: SelectOptions,
}

impl SelectOptionsBuilder {
    /// Sets the preview divisor (values below 1 are raised to 1)
    pub fn preview_scale(mut self, scale: u32) -> Self {
        self.opts.preview_scale = scale.max(1);
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.opts.trim = trim;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.opts.poll_interval = interval;
        self
    }

    pub fn capture_timeout(mut self, timeout: Duration) -> Self {
        self.opts.capture_timeout = timeout;
        self
    }

    pub fn build(self) -> SelectOptions {
        self.opts
    }
}

/// Options for the capture loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopOptions {
    /// Upper bound for a single grab
    pub capture_timeout: Duration,
}

impl LoopOptions {
    pub fn builder() -> LoopOptionsBuilder {
        LoopOptionsBuilder {
            opts: Self::default(),
        }
    }
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            capture_timeout: Duration::from_millis(constants::capture_timeout_ms()),
        }
    }
}

/// Builder for [`LoopOptions`]
#[derive(Debug, Clone)]
pub struct LoopOptionsBuilder {
    opts: LoopOptions,
}

impl LoopOptionsBuilder {
    pub fn capture_timeout(mut self, timeout: Duration) -> Self {
        self.opts.capture_timeout = timeout;
        self
    }

    pub fn build(self) -> LoopOptions {
        self.opts
    }
}
