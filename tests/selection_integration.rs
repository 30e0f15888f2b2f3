//! End-to-end selection over a synthetic desktop
//!
//! Drives the selector with scripted clicks against a mock grabber that serves
//! crops of a fixed scene, so refinement sees real content borders.

mod common;

use std::{sync::Arc, time::Duration};

use frame_hook::{
    capture::ScreenGrabber,
    error::CaptureError,
    game::GameRegion,
    hook::CancelToken,
    input::ScriptedPointer,
    model::{PointerEvent, Rectangle, SelectOptions},
    region::select_region,
    render::{NullSink, PngSink, SELECTION_COLOR},
};

use common::*;

fn opts(trim: bool) -> SelectOptions {
    SelectOptions::builder()
        .preview_scale(2)
        .trim(trim)
        .poll_interval(Duration::from_millis(1))
        .build()
}

/// Preview clicks that land a little outside the game content
fn loose_clicks() -> ScriptedPointer {
    // Monitor-local (70, 70) and (410, 390), halved for the preview
    ScriptedPointer::new([
        PointerEvent::moved(10, 10),
        PointerEvent::press(35, 35),
        PointerEvent::release(35, 35),
        PointerEvent::moved(120, 120),
        PointerEvent::moved(200, 190),
        PointerEvent::press(205, 195),
    ])
}

#[tokio::test]
async fn test_untrimmed_selection_is_coarse_rectangle() {
    let grabber = scene_grabber();
    let mut pointer = loose_clicks();

    let rect = select_region(&grabber, second_monitor(), &mut pointer, &mut NullSink, &opts(false), None)
        .await
        .unwrap();

    assert_eq!(rect, Rectangle::new(70, 710, 340, 320));
}

#[tokio::test]
async fn test_trimmed_selection_snaps_to_content() {
    let grabber = scene_grabber();
    let mut pointer = loose_clicks();

    let rect = select_region(&grabber, second_monitor(), &mut pointer, &mut NullSink, &opts(true), None)
        .await
        .unwrap();

    let content = game_content();
    assert_near(rect.left as i64, content.left as i64, 2, "left");
    assert_near(rect.top as i64, content.top as i64, 2, "top");
    assert_near(rect.right(), content.right(), 3, "right");
    assert_near(rect.bottom(), content.bottom(), 3, "bottom");

    // The refinement grab covers exactly the coarse rectangle
    let last = grabber.grabbed_rects().pop().unwrap();
    assert_eq!(last, Rectangle::new(70, 710, 340, 320));
}

#[tokio::test]
async fn test_game_region_from_trimmed_selection() {
    let grabber: Arc<dyn ScreenGrabber> = Arc::new(scene_grabber());
    let mut pointer = loose_clicks();

    let game = GameRegion::builder(grabber)
        .monitor_index(2)
        .select_options(opts(false))
        .trim(true)
        .select(&mut pointer, &mut NullSink, None)
        .await
        .unwrap();

    assert_eq!(game.monitor(), second_monitor());
    let (width, height) = game.dimensions();
    assert_near(width as i64, 320, 4, "width");
    assert_near(height as i64, 300, 4, "height");
}

#[tokio::test]
async fn test_preview_written_with_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("selection.png");

    let grabber = scene_grabber();
    let mut pointer = loose_clicks();
    let mut sink = PngSink::new(&path);

    select_region(&grabber, second_monitor(), &mut pointer, &mut sink, &opts(false), None)
        .await
        .unwrap();

    // The committing tick is not presented
    assert_eq!(sink.presented(), 5);

    let preview = image::open(&path).unwrap().to_rgba8();
    assert_eq!(preview.dimensions(), (320, 240));
    // Corner of the provisional box from (35, 35) to (200, 190)
    assert_eq!(*preview.get_pixel(35, 35), SELECTION_COLOR);
}

#[tokio::test]
async fn test_cancel_while_waiting_for_clicks() {
    let grabber = scene_grabber();
    let mut pointer = ScriptedPointer::default().hold_open();
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = select_region(
        &grabber,
        second_monitor(),
        &mut pointer,
        &mut NullSink,
        &opts(false),
        Some(&cancel),
    )
    .await;

    assert!(matches!(result, Err(CaptureError::SelectionAborted)));
    assert!(grabber.grab_count() > 0);
}

#[tokio::test]
async fn test_invalid_monitor_index() {
    let grabber: Arc<dyn ScreenGrabber> = Arc::new(scene_grabber());
    let mut pointer = loose_clicks();

    let result = GameRegion::builder(grabber)
        .monitor_index(3)
        .select(&mut pointer, &mut NullSink, None)
        .await;

    assert!(matches!(
        result,
        Err(CaptureError::InvalidMonitorIndex { index: 3, count: 3 })
    ));
    assert_eq!(pointer.polled(), 0);
}
