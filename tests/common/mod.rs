//! Shared fixtures for integration tests
//!
//! The desktop is two 640x480 monitors side by side. A dark scene covers both,
//! with a bright "game window" on the second monitor.

#![allow(dead_code)]

use frame_hook::{
    capture::MockGrabber,
    model::{AbsolutePoint, Rectangle},
};
use image::{Rgba, RgbaImage};

pub const BACKGROUND: Rgba<u8> = Rgba([12, 12, 12, 255]);
pub const CONTENT: Rgba<u8> = Rgba([220, 200, 180, 255]);

pub fn monitors() -> Vec<Rectangle> {
    vec![Rectangle::new(0, 0, 640, 480), Rectangle::new(0, 640, 640, 480)]
}

pub fn second_monitor() -> Rectangle {
    monitors()[1]
}

/// Absolute rectangle of the game content
pub fn game_content() -> Rectangle {
    Rectangle::new(80, 720, 320, 300)
}

/// Scene covering the whole desktop, origin at (0, 0)
pub fn desktop_scene() -> RgbaImage {
    let content = game_content();
    RgbaImage::from_fn(1280, 480, |x, y| {
        if content.contains(AbsolutePoint::new(x as i32, y as i32)) {
            CONTENT
        } else {
            BACKGROUND
        }
    })
}

pub fn scene_grabber() -> MockGrabber {
    MockGrabber::with_monitors(monitors()).with_scene(desktop_scene())
}

pub fn assert_near(actual: i64, expected: i64, tolerance: i64, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{} was {}, expected {} ± {}",
        what,
        actual,
        expected,
        tolerance
    );
}
