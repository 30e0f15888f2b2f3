//! Region selection, refinement and coordinate mapping
//!
//! - [`mapper`] - the committed rectangle and its clamped conversions
//! - [`edges`] - binary edge maps for refinement
//! - [`refine`] - snapping a coarse rectangle to nearby content borders
//! - [`selector`] - the two-click selection state machine and its driver

pub mod edges;
pub mod mapper;
pub mod refine;
pub mod selector;

pub use mapper::{CoordinateMapper, resolve_monitor};
pub use refine::{BorderCenters, EdgeRefiner};
pub use selector::{RegionSelector, SelectionState, select_region};
