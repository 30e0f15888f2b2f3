//! Capture loop over the committed region
//!
//! [`CaptureLoop::run`] grabs the committed rectangle over and over and hands
//! each [`Frame`] to a caller callback together with a [`FrameContext`]:
//!
//! - `frame_counter` starts at 0 and is incremented once per iteration right
//!   before the callback, so the first callback sees 1
//! - `elapsed_ms` is wall-clock time since loop entry, rounded to the nearest
//!   millisecond and sampled at the start of the iteration
//! - `fps` is the value computed at the end of the *previous* iteration as
//!   `frame_counter / elapsed_seconds`; the first callback sees exactly 0
//!
//! The stop signal is polled after every callback, so a callback always runs
//! to completion and at least one frame is delivered. A failed or timed-out
//! grab ends the loop immediately with the error; there are no retries.
//!
//! # Examples
//!
//! ```
//! use frame_hook::{
//!     capture::MockGrabber,
//!     hook::{CaptureLoop, MaxFrames},
//!     model::{LoopOptions, Rectangle},
//!     region::CoordinateMapper,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let grabber = MockGrabber::new().with_blank_frames();
//!     let mapper = CoordinateMapper::new(Rectangle::new(0, 0, 64, 48)).unwrap();
//!
//!     let summary = CaptureLoop::new(&grabber, mapper, LoopOptions::default())
//!         .run(|frame, _ctx| assert_eq!(frame.dimensions(), (64, 48)), MaxFrames(3))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(summary.frames, 3);
//! }
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use serde::Serialize;

use crate::{
    capture::{Frame, ScreenGrabber, grab_with_timeout},
    error::CaptureResult,
    model::{AbsolutePoint, LoopOptions, Rectangle, RegionPoint},
    region::CoordinateMapper,
};

/// Cooperative cancellation flag shared between tasks
///
/// Cloning yields another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-run loop counters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoopState {
    pub frame_counter: u64,
    pub elapsed_ms:    u64,
    pub fps:           f64,
}

/// Bookkeeping for [`LoopState`], driven by explicit instants
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
    state: LoopState,
}

impl FrameClock {
    pub fn start(now: Instant) -> Self {
        Self {
            start: now,
            state: LoopState::default(),
        }
    }

    /// Samples elapsed time and counts the frame about to be delivered
    ///
    /// The returned state carries the fps of the previous iteration.
    pub fn begin_iteration(&mut self, now: Instant) -> LoopState {
        self.state.elapsed_ms = round_ms(now.saturating_duration_since(self.start));
        self.state.frame_counter += 1;
        self.state
    }

    /// Recomputes fps once the callback has returned
    pub fn finish_iteration(&mut self, now: Instant) {
        self.state.fps = rate(self.state.frame_counter, now.saturating_duration_since(self.start));
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn summary(&self, now: Instant) -> LoopSummary {
        let elapsed = now.saturating_duration_since(self.start);
        LoopSummary {
            frames:      self.state.frame_counter,
            elapsed_ms:  round_ms(elapsed),
            average_fps: rate(self.state.frame_counter, elapsed),
        }
    }
}

/// Outcome of a completed loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoopSummary {
    pub frames:      u64,
    pub elapsed_ms:  u64,
    pub average_fps: f64,
}

/// What the callback gets to see besides the frame
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub mapper:        &'a CoordinateMapper,
    /// Rate measured after the previous frame, 0 on the first
    pub fps:           f64,
    pub frame_counter: u64,
    pub elapsed_ms:    u64,
}

impl FrameContext<'_> {
    pub fn region(&self) -> Rectangle {
        self.mapper.region()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.mapper.dimensions()
    }

    pub fn to_absolute(&self, point: RegionPoint) -> AbsolutePoint {
        self.mapper.to_absolute(point)
    }

    pub fn to_region(&self, point: AbsolutePoint) -> RegionPoint {
        self.mapper.to_region(point)
    }
}

/// Decides after each callback whether the loop ends
pub trait StopSignal {
    fn should_stop(&mut self, state: &LoopState) -> bool;
}

impl StopSignal for CancelToken {
    fn should_stop(&mut self, _state: &LoopState) -> bool {
        self.is_cancelled()
    }
}

/// Stops once this many frames have been delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxFrames(pub u64);

impl StopSignal for MaxFrames {
    fn should_stop(&mut self, state: &LoopState) -> bool {
        state.frame_counter >= self.0
    }
}

/// Adapts a predicate over [`LoopState`]
pub struct StopWhen<F>(pub F);

impl<F> StopSignal for StopWhen<F>
where
    F: FnMut(&LoopState) -> bool,
{
    fn should_stop(&mut self, state: &LoopState) -> bool {
        (self.0)(state)
    }
}

/// Never stops; only a capture error ends the loop
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl StopSignal for Never {
    fn should_stop(&mut self, _state: &LoopState) -> bool {
        false
    }
}

/// Stops when either signal does
impl<A: StopSignal, B: StopSignal> StopSignal for (A, B) {
    fn should_stop(&mut self, state: &LoopState) -> bool {
        // Poll both so stateful signals see every iteration
        let a = self.0.should_stop(state);
        let b = self.1.should_stop(state);
        a || b
    }
}

/// Repeated capture of one committed region
pub struct CaptureLoop<'a> {
    grabber: &'a dyn ScreenGrabber,
    mapper:  CoordinateMapper,
    options: LoopOptions,
}

impl<'a> CaptureLoop<'a> {
    pub fn new(grabber: &'a dyn ScreenGrabber, mapper: CoordinateMapper, options: LoopOptions) -> Self {
        Self {
            grabber,
            mapper,
            options,
        }
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Runs until `stop` fires or a grab fails
    ///
    /// # Errors
    ///
    /// - [`CaptureError::CaptureFailure`](crate::error::CaptureError::CaptureFailure) - the grabber failed
    /// - [`CaptureError::CaptureTimeout`](crate::error::CaptureError::CaptureTimeout) - a grab exceeded
    ///   the configured timeout
    pub async fn run<F, S>(&self, mut on_frame: F, mut stop: S) -> CaptureResult<LoopSummary>
    where
        F: FnMut(Frame, &FrameContext<'_>),
        S: StopSignal,
    {
        let region = self.mapper.region();
        tracing::info!(
            "Capture loop started on {} using {} backend",
            region,
            self.grabber.backend()
        );

        let mut clock = FrameClock::start(Instant::now());

        loop {
            let state = clock.begin_iteration(Instant::now());

            let frame = grab_with_timeout(self.grabber, region, self.options.capture_timeout)
                .await
                .inspect_err(|e| {
                    tracing::error!("Capture loop stopped at frame {}: {}", state.frame_counter, e)
                })?;

            tracing::debug!(
                "Frame {} at {}ms ({:.2} fps)",
                state.frame_counter,
                state.elapsed_ms,
                state.fps
            );

            let ctx = FrameContext {
                mapper:        &self.mapper,
                fps:           state.fps,
                frame_counter: state.frame_counter,
                elapsed_ms:    state.elapsed_ms,
            };
            on_frame(frame, &ctx);

            clock.finish_iteration(Instant::now());
            if stop.should_stop(&clock.state()) {
                break;
            }
        }

        let summary = clock.summary(Instant::now());
        tracing::info!(
            "Capture loop finished: {} frames in {}ms ({:.2} fps)",
            summary.frames,
            summary.elapsed_ms,
            summary.average_fps
        );
        Ok(summary)
    }
}

fn round_ms(elapsed: Duration) -> u64 {
    ((elapsed.as_nanos() + 500_000) / 1_000_000) as u64
}

fn rate(frames: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { frames as f64 / secs } else { 0.0 }
}
