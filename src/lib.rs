//! frame-hook: select a screen region and hook a callback onto its frames
//!
//! The crate picks a rectangular "game region" on a display, either from a
//! caller-supplied rectangle or through a two-click selection over a live
//! preview, optionally snaps it to nearby content edges, and then captures it
//! repeatedly, handing every frame to caller code with frame count, elapsed
//! time and frame rate.
//!
//! Platform access sits behind three capabilities: [`capture::ScreenGrabber`]
//! for pixels and display geometry, [`input::PointerSource`] for clicks and
//! [`render::PreviewSink`] for the selection preview. [`game::GameRegion`] is
//! the usual entry point.

pub mod capture;
pub mod error;
pub mod game;
pub mod hook;
pub mod input;
pub mod model;
pub mod region;
pub mod render;
