//! Two-click interactive region selection
//!
//! [`RegionSelector`] is the pure state machine:
//!
//! ```text
//! AwaitingFirstClick --press--> AwaitingSecondClick --press--> Committed
//! ```
//!
//! Only a not-pressed to pressed transition counts as a click; holding the
//! button or repeated presses without a release in between register nothing.
//! Pointer positions arrive in preview space and are converted with
//! `absolute = preview * scale + monitor origin`.
//!
//! [`select_region`] drives the machine against a live preview: every tick it
//! grabs the monitor, downsamples it, polls the pointer once, and presents the
//! preview with an overlay to a [`PreviewSink`].

use std::time::Instant;

use super::refine::EdgeRefiner;
use crate::{
    capture::{ScreenGrabber, grab_with_timeout},
    error::{CaptureError, CaptureResult},
    hook::CancelToken,
    input::PointerSource,
    model::{AbsolutePoint, PointerEvent, PointerEventKind, Rectangle, SelectOptions},
    render::{self, FIRST_CORNER_PROMPT, Overlay, PreviewBox, PreviewSink, SECOND_CORNER_PROMPT},
};

/// Progress of a two-click selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    AwaitingFirstClick,
    AwaitingSecondClick {
        /// First corner in absolute coordinates
        first: AbsolutePoint,
    },
    Committed(Rectangle),
}

/// State machine turning pointer events into a coarse rectangle
#[derive(Debug, Clone)]
pub struct RegionSelector {
    monitor:       Rectangle,
    scale:         u32,
    state:         SelectionState,
    pressed:       bool,
    /// First corner as clicked, in preview space
    first_preview: Option<(i32, i32)>,
    cursor:        Option<(i32, i32)>,
}

impl RegionSelector {
    /// Creates a selector over `monitor` whose preview is downsampled by
    /// `scale` (values below 1 are treated as 1)
    pub fn new(monitor: Rectangle, scale: u32) -> Self {
        Self {
            monitor,
            scale: scale.max(1),
            state: SelectionState::AwaitingFirstClick,
            pressed: false,
            first_preview: None,
            cursor: None,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn monitor(&self) -> Rectangle {
        self.monitor
    }

    /// Converts a preview-space position to absolute coordinates
    pub fn to_absolute(&self, px: i32, py: i32) -> AbsolutePoint {
        let scale = self.scale as i32;
        AbsolutePoint::new(
            px.saturating_mul(scale).saturating_add(self.monitor.left),
            py.saturating_mul(scale).saturating_add(self.monitor.top),
        )
    }

    /// Feeds one pointer event
    ///
    /// Returns the coarse rectangle on the event that commits the selection.
    /// Events after commit are ignored.
    pub fn handle(&mut self, event: PointerEvent) -> Option<Rectangle> {
        if matches!(self.state, SelectionState::Committed(_)) {
            return None;
        }

        self.cursor = Some((event.x, event.y));

        match event.kind {
            PointerEventKind::Press if !self.pressed => {
                self.pressed = true;
                self.click(event.x, event.y)
            }
            PointerEventKind::Release => {
                self.pressed = false;
                None
            }
            _ => None,
        }
    }

    /// Overlay for the current state after `elapsed_ms` of selection
    pub fn overlay(&self, elapsed_ms: u64) -> Overlay {
        let (selection, instructions) = match self.state {
            SelectionState::AwaitingFirstClick => (None, FIRST_CORNER_PROMPT),
            _ => {
                let selection = self
                    .first_preview
                    .zip(self.cursor)
                    .map(|(first, cursor)| PreviewBox::spanning(first, cursor));
                (selection, SECOND_CORNER_PROMPT)
            }
        };

        Overlay {
            selection,
            instructions,
            pulse: render::pulse_at(elapsed_ms),
        }
    }

    fn click(&mut self, px: i32, py: i32) -> Option<Rectangle> {
        let corner = self.to_absolute(px, py);

        match self.state {
            SelectionState::AwaitingFirstClick => {
                tracing::debug!("First corner at {:?}", corner);
                self.first_preview = Some((px, py));
                self.state = SelectionState::AwaitingSecondClick { first: corner };
                None
            }
            SelectionState::AwaitingSecondClick { first } => {
                tracing::debug!("Second corner at {:?}", corner);
                let rect = Rectangle::from_corners(first, corner);
                self.state = SelectionState::Committed(rect);
                self.first_preview = None;
                Some(rect)
            }
            SelectionState::Committed(_) => None,
        }
    }
}

/// Runs an interactive selection on `monitor`
///
/// Each tick grabs the monitor, downsamples it by `opts.preview_scale`, polls
/// `pointer` once and presents the preview to `sink`, then sleeps
/// `opts.poll_interval`. The sink is closed whatever the outcome. With
/// `opts.trim` the committed rectangle is grabbed again and tightened with
/// [`EdgeRefiner`].
///
/// # Errors
///
/// - [`CaptureError::SelectionAborted`] - `cancel` fired or the pointer source
///   closed before both corners were clicked
/// - [`CaptureError::InvalidRegion`] - the corners share a row or column, or
///   refinement collapsed the rectangle
/// - [`CaptureError::CaptureFailure`] / [`CaptureError::CaptureTimeout`] -
///   a grab failed
pub async fn select_region(
    grabber: &dyn ScreenGrabber,
    monitor: Rectangle,
    pointer: &mut dyn PointerSource,
    sink: &mut dyn PreviewSink,
    opts: &SelectOptions,
    cancel: Option<&CancelToken>,
) -> CaptureResult<Rectangle> {
    tracing::info!("Select two corners on {}", monitor);

    let driven = drive(grabber, monitor, pointer, sink, opts, cancel).await;
    let closed = sink.close();
    let coarse = driven?;
    closed?;

    coarse.validate().inspect_err(|e| tracing::error!("Selected region rejected: {}", e))?;

    if !opts.trim {
        tracing::info!("Selected region {}", coarse);
        return Ok(coarse);
    }

    let frame = grab_with_timeout(grabber, coarse, opts.capture_timeout).await?;
    EdgeRefiner::new().refine(&frame, coarse)
}

async fn drive(
    grabber: &dyn ScreenGrabber,
    monitor: Rectangle,
    pointer: &mut dyn PointerSource,
    sink: &mut dyn PreviewSink,
    opts: &SelectOptions,
    cancel: Option<&CancelToken>,
) -> CaptureResult<Rectangle> {
    let started = Instant::now();
    let mut selector = RegionSelector::new(monitor, opts.preview_scale);

    loop {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            tracing::info!("Selection cancelled");
            return Err(CaptureError::SelectionAborted);
        }

        let screen = grab_with_timeout(grabber, monitor, opts.capture_timeout).await?;
        let preview = screen.downsample(opts.preview_scale);

        let Some(event) = pointer.poll() else {
            tracing::info!("Pointer source closed during selection");
            return Err(CaptureError::SelectionAborted);
        };

        if let Some(rect) = selector.handle(event) {
            return Ok(rect);
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        sink.present(&preview, &selector.overlay(elapsed_ms))?;

        tokio::time::sleep(opts.poll_interval).await;
    }
}
