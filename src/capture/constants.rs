//! Centralized timing and scaling constants for capture and selection.
//!
//! # Runtime Configuration
//!
//! All values can be overridden at runtime via environment variables:
//!
//! | Environment Variable | Default | Description |
//! |---------------------|---------|-------------|
//! | `FRAME_HOOK_CAPTURE_TIMEOUT_MS` | 2000 | Upper bound for a single grab |
//! | `FRAME_HOOK_SELECT_POLL_MS` | 1 | Delay between selection preview ticks |
//! | `FRAME_HOOK_PREVIEW_SCALE` | 2 | Downsample divisor for the selection preview |
//!
//! Invalid values (unparseable, or zero for the preview scale) fall back to
//! the defaults.

/// Default upper bound for a single grab of the committed region.
///
/// Grabbing a full monitor through xcap is typically well under 100ms. Two
/// seconds only triggers when the display server has stopped answering.
pub const CAPTURE_TIMEOUT_MS: u64 = 2000;

/// Delay between selection preview ticks.
///
/// The selector polls the pointer once per tick, so this also bounds how
/// quickly a click is noticed.
pub const SELECT_POLL_MS: u64 = 1;

/// Preview downsample divisor. Pointer coordinates reported on the preview
/// are multiplied by this to reach absolute display space.
pub const PREVIEW_SCALE: u32 = 2;

// =============================================================================
// Environment Variable Overrides
// =============================================================================

fn get_from_env<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    std::env::var(env_var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Get the per-grab timeout, checking environment variable override.
///
/// Override with: `FRAME_HOOK_CAPTURE_TIMEOUT_MS`
///
/// ```bash
/// # Allow slow remote X servers more time
/// export FRAME_HOOK_CAPTURE_TIMEOUT_MS=5000
/// ```
pub fn capture_timeout_ms() -> u64 {
    get_from_env("FRAME_HOOK_CAPTURE_TIMEOUT_MS", CAPTURE_TIMEOUT_MS)
}

/// Get the selection tick interval, checking environment variable override.
///
/// Override with: `FRAME_HOOK_SELECT_POLL_MS`
pub fn select_poll_ms() -> u64 {
    get_from_env("FRAME_HOOK_SELECT_POLL_MS", SELECT_POLL_MS)
}

/// Get the preview divisor, checking environment variable override.
///
/// Override with: `FRAME_HOOK_PREVIEW_SCALE`. Zero is rejected.
pub fn preview_scale() -> u32 {
    match get_from_env("FRAME_HOOK_PREVIEW_SCALE", PREVIEW_SCALE) {
        0 => PREVIEW_SCALE,
        scale => scale,
    }
}
