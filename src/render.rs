//! Preview rendering capability
//!
//! During selection the core hands every preview frame and an [`Overlay`]
//! description to a [`PreviewSink`]. Sinks are pure outputs; nothing they do
//! feeds back into the selection state.
//!
//! [`draw_overlay`] composes the provisional selection onto an RGBA buffer
//! with `imageproc`'s drawing primitives: a 20% green fill blended over the
//! preview with a solid 1 px green border.
//! Text is left to the sink, which receives the instruction string and the
//! pulse flag as data.

use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use imageproc::{
    drawing::{Blend, draw_filled_rect_mut, draw_hollow_rect_mut},
    rect::Rect,
};

use crate::{capture::Frame, error::CaptureResult};

/// Fill and border color of the provisional selection
pub const SELECTION_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Opacity of the provisional selection fill
pub const SELECTION_FILL_ALPHA: f32 = 0.2;

pub const FIRST_CORNER_PROMPT: &str = "Left-click on the top-left corner of the game.";
pub const SECOND_CORNER_PROMPT: &str = "Now, left-click on the bottom-right corner.";

/// Axis-aligned box in preview pixels with inclusive corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl PreviewBox {
    /// Box spanning two arbitrary corners
    pub fn spanning(a: (i32, i32), b: (i32, i32)) -> Self {
        Self {
            x1: a.0.min(b.0),
            y1: a.1.min(b.1),
            x2: a.0.max(b.0),
            y2: a.1.max(b.1),
        }
    }
}

/// Overlay primitives for one preview tick
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Provisional selection, present after the first corner
    pub selection:    Option<PreviewBox>,
    pub instructions: &'static str,
    /// Alternates every half second to draw attention to the instructions
    pub pulse:        bool,
}

/// Sink for preview frames during selection
pub trait PreviewSink: Send {
    /// Shows one preview frame with its overlay
    fn present(&mut self, preview: &Frame, overlay: &Overlay) -> CaptureResult<()>;

    /// Releases display resources once selection ends
    fn close(&mut self) -> CaptureResult<()> {
        Ok(())
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PreviewSink for NullSink {
    fn present(&mut self, _preview: &Frame, _overlay: &Overlay) -> CaptureResult<()> {
        Ok(())
    }
}

/// Sink that keeps the latest composed preview and writes it as PNG on close
#[derive(Debug)]
pub struct PngSink {
    path:      PathBuf,
    last:      Option<RgbaImage>,
    presented: usize,
}

impl PngSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path:      path.into(),
            last:      None,
            presented: 0,
        }
    }

    /// Number of previews presented so far
    pub fn presented(&self) -> usize {
        self.presented
    }

    /// Latest composed preview
    pub fn last(&self) -> Option<&RgbaImage> {
        self.last.as_ref()
    }
}

impl PreviewSink for PngSink {
    fn present(&mut self, preview: &Frame, overlay: &Overlay) -> CaptureResult<()> {
        let mut canvas = preview.to_rgba8();
        draw_overlay(&mut canvas, overlay);
        self.last = Some(canvas);
        self.presented += 1;
        Ok(())
    }

    fn close(&mut self) -> CaptureResult<()> {
        let Some(last) = self.last.take() else {
            tracing::debug!("No preview presented, skipping {}", self.path.display());
            return Ok(());
        };

        Frame::from(last).save_png(&self.path)?;
        tracing::info!("Wrote selection preview to {}", self.path.display());
        Ok(())
    }
}

/// Draws the provisional selection of `overlay` onto `canvas`
///
/// The box is clipped to the canvas. Without a selection this is a no-op.
pub fn draw_overlay(canvas: &mut RgbaImage, overlay: &Overlay) {
    let Some(selection) = overlay.selection else {
        return;
    };
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }

    let width = selection.x1.abs_diff(selection.x2).saturating_add(1);
    let height = selection.y1.abs_diff(selection.y2).saturating_add(1);
    let rect = Rect::at(selection.x1, selection.y1).of_size(width, height);

    let mut blended = Blend(std::mem::take(canvas));
    draw_filled_rect_mut(&mut blended, rect, fill_color());
    *canvas = blended.0;

    draw_hollow_rect_mut(canvas, rect, SELECTION_COLOR);
}

/// Pulse phase for a given elapsed selection time
pub fn pulse_at(elapsed_ms: u64) -> bool {
    elapsed_ms % 1000 > 500
}

fn fill_color() -> Rgba<u8> {
    let [r, g, b, _] = SELECTION_COLOR.0;
    Rgba([r, g, b, (SELECTION_FILL_ALPHA * 255.0).round() as u8])
}
