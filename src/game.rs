//! Game region facade
//!
//! [`GameRegion`] ties the pieces together for the common case: resolve a
//! monitor, commit a region on it (given up front or picked interactively),
//! answer coordinate queries, and run the capture loop over it.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use frame_hook::{
//!     capture::MockGrabber,
//!     game::GameRegion,
//!     hook::MaxFrames,
//!     model::Rectangle,
//! };
//!
//! #[tokio::main]
//! async fn main() -> frame_hook::error::CaptureResult<()> {
//!     let game = GameRegion::builder(Arc::new(MockGrabber::new()))
//!         .monitor_index(1)
//!         .region(Rectangle::new(100, 200, 50, 40))
//!         .build()
//!         .await?;
//!
//!     assert_eq!(game.region_to_absolute(100, 100), (249, 139));
//!
//!     let summary = game.play(|_frame, _ctx| {}, MaxFrames(2)).await?;
//!     assert_eq!(summary.frames, 2);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use crate::{
    capture::{Frame, ScreenGrabber},
    error::{CaptureError, CaptureResult},
    hook::{CancelToken, CaptureLoop, FrameContext, LoopSummary, StopSignal},
    input::PointerSource,
    model::{LoopOptions, Rectangle, SelectOptions},
    region::{CoordinateMapper, resolve_monitor, select_region},
    render::PreviewSink,
};

/// A committed region on one monitor plus the grabber that captures it
pub struct GameRegion {
    grabber:      Arc<dyn ScreenGrabber>,
    monitor:      Rectangle,
    mapper:       CoordinateMapper,
    loop_options: LoopOptions,
}

impl std::fmt::Debug for GameRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRegion")
            .field("backend", &self.grabber.backend())
            .field("monitor", &self.monitor)
            .field("region", &self.mapper.region())
            .finish()
    }
}

impl GameRegion {
    pub fn builder(grabber: Arc<dyn ScreenGrabber>) -> GameRegionBuilder {
        GameRegionBuilder {
            grabber,
            monitor_index: 0,
            region: None,
            select: SelectOptions::default(),
            loop_options: LoopOptions::default(),
        }
    }

    /// Rectangle of the monitor the region was selected on
    pub fn monitor(&self) -> Rectangle {
        self.monitor
    }

    pub fn region(&self) -> Rectangle {
        self.mapper.region()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.mapper.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.mapper.region().width
    }

    pub fn height(&self) -> u32 {
        self.mapper.region().height
    }

    /// See [`CoordinateMapper::region_to_absolute`]
    pub fn region_to_absolute(&self, gx: i32, gy: i32) -> (i32, i32) {
        self.mapper.region_to_absolute(gx, gy)
    }

    /// See [`CoordinateMapper::absolute_to_region`]
    pub fn absolute_to_region(&self, sx: i32, sy: i32) -> (i32, i32) {
        self.mapper.absolute_to_region(sx, sy)
    }

    /// Runs a fresh interactive selection on the same monitor and commits it
    ///
    /// The previous region stays committed if selection fails.
    pub async fn reselect(
        &mut self,
        pointer: &mut dyn PointerSource,
        sink: &mut dyn PreviewSink,
        opts: &SelectOptions,
        cancel: Option<&CancelToken>,
    ) -> CaptureResult<Rectangle> {
        let region = select_region(self.grabber.as_ref(), self.monitor, pointer, sink, opts, cancel).await?;
        self.mapper.commit(region)?;
        tracing::info!("Selected game region: {}", region);
        Ok(region)
    }

    /// Captures the committed region until `stop` fires
    ///
    /// See [`CaptureLoop::run`].
    pub async fn play<F, S>(&self, on_frame: F, stop: S) -> CaptureResult<LoopSummary>
    where
        F: FnMut(Frame, &FrameContext<'_>),
        S: StopSignal,
    {
        CaptureLoop::new(self.grabber.as_ref(), self.mapper, self.loop_options)
            .run(on_frame, stop)
            .await
    }
}

/// Builder for [`GameRegion`]
pub struct GameRegionBuilder {
    grabber:       Arc<dyn ScreenGrabber>,
    monitor_index: usize,
    region:        Option<Rectangle>,
    select:        SelectOptions,
    loop_options:  LoopOptions,
}

impl GameRegionBuilder {
    /// Display index; 0 is the union of every monitor
    pub fn monitor_index(mut self, index: usize) -> Self {
        self.monitor_index = index;
        self
    }

    /// Commits this region instead of asking the user
    pub fn region(mut self, region: Rectangle) -> Self {
        self.region = Some(region);
        self
    }

    /// Tightens an interactive selection with edge refinement
    pub fn trim(mut self, trim: bool) -> Self {
        self.select.trim = trim;
        self
    }

    pub fn select_options(mut self, opts: SelectOptions) -> Self {
        self.select = opts;
        self
    }

    pub fn loop_options(mut self, opts: LoopOptions) -> Self {
        self.loop_options = opts;
        self
    }

    /// Commits the region given through [`region`](Self::region)
    ///
    /// # Errors
    ///
    /// - [`CaptureError::InvalidMonitorIndex`] - the monitor index is out of range
    /// - [`CaptureError::InvalidRegion`] - no region was given, or it is empty
    pub async fn build(self) -> CaptureResult<GameRegion> {
        let monitor = self.resolve().await?;
        let region = self.region.ok_or_else(|| {
            CaptureError::invalid_region(0, 0, "no region given, select one interactively instead")
        })?;
        self.finish(monitor, region)
    }

    /// Commits the given region, or runs an interactive selection when none
    /// was given
    ///
    /// # Errors
    ///
    /// As [`build`](Self::build), plus everything [`select_region`] returns.
    pub async fn select(
        self,
        pointer: &mut dyn PointerSource,
        sink: &mut dyn PreviewSink,
        cancel: Option<&CancelToken>,
    ) -> CaptureResult<GameRegion> {
        let monitor = self.resolve().await?;

        let region = match self.region {
            Some(region) => region,
            None => {
                let region =
                    select_region(self.grabber.as_ref(), monitor, pointer, sink, &self.select, cancel)
                        .await?;
                tracing::info!("Selected game region: {}", region);
                region
            }
        };

        self.finish(monitor, region)
    }

    async fn resolve(&self) -> CaptureResult<Rectangle> {
        let displays = self.grabber.displays().await?;
        resolve_monitor(&displays, self.monitor_index).inspect_err(|e| tracing::error!("{}", e))
    }

    fn finish(self, monitor: Rectangle, region: Rectangle) -> CaptureResult<GameRegion> {
        let mapper = CoordinateMapper::new(region)?;
        tracing::debug!("Committed {} on monitor {} ({})", region, self.monitor_index, monitor);

        Ok(GameRegion {
            grabber: self.grabber,
            monitor,
            mapper,
            loop_options: self.loop_options,
        })
    }
}
