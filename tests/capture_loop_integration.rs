//! Capture loop behaviour against the synthetic desktop

mod common;

use std::{sync::Arc, time::Duration};

use frame_hook::{
    capture::{MockGrabber, ScreenGrabber},
    error::CaptureError,
    game::GameRegion,
    hook::{CancelToken, LoopState, MaxFrames, Never, StopWhen},
    model::{AbsolutePoint, LoopOptions, Rectangle, RegionPoint},
};

use common::*;

async fn game_over(grabber: Arc<dyn ScreenGrabber>, region: Rectangle) -> GameRegion {
    GameRegion::builder(grabber)
        .monitor_index(2)
        .region(region)
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_frames_are_crops_of_the_region() {
    let grabber: Arc<dyn ScreenGrabber> = Arc::new(scene_grabber());
    // Straddles the top-left corner of the game content
    let game = game_over(grabber, Rectangle::new(70, 710, 40, 30)).await;

    let mut checked = 0;
    game.play(
        |frame, ctx| {
            let rgba = frame.to_rgba8();
            assert_eq!(rgba.dimensions(), (40, 30));
            assert_eq!(*rgba.get_pixel(0, 0), BACKGROUND);
            assert_eq!(*rgba.get_pixel(15, 15), CONTENT);

            let abs = ctx.to_absolute(RegionPoint::new(10, 10));
            assert_eq!(abs, AbsolutePoint::new(720, 80));
            checked += 1;
        },
        MaxFrames(3),
    )
    .await
    .unwrap();

    assert_eq!(checked, 3);
}

#[tokio::test]
async fn test_counters_over_many_frames() {
    let mock = Arc::new(MockGrabber::new().with_blank_frames().with_delay(Duration::from_millis(2)));
    let game = game_over(mock.clone(), Rectangle::new(0, 1920, 64, 48)).await;

    let mut states = Vec::new();
    let summary = game
        .play(
            |frame, ctx| {
                assert_eq!(frame.dimensions(), (64, 48));
                states.push((ctx.frame_counter, ctx.elapsed_ms, ctx.fps));
            },
            MaxFrames(10),
        )
        .await
        .unwrap();

    assert_eq!(summary.frames, 10);
    assert_eq!(mock.grab_count(), 10);

    let counters: Vec<u64> = states.iter().map(|s| s.0).collect();
    assert_eq!(counters, (1..=10).collect::<Vec<_>>());

    assert_eq!(states[0].2, 0.0, "first frame has no rate yet");
    for pair in states.windows(2) {
        assert!(pair[1].1 >= pair[0].1, "elapsed_ms must not decrease");
    }
    // Every grab sleeps 2ms, so the rate is bounded
    for &(_, _, fps) in &states[1..] {
        assert!(fps > 0.0 && fps <= 500.0, "fps {} out of range", fps);
    }
    assert!(summary.elapsed_ms >= 20);
}

#[tokio::test]
async fn test_stop_predicate_sees_loop_state() {
    let grabber: Arc<dyn ScreenGrabber> = Arc::new(MockGrabber::new().with_blank_frames());
    let game = game_over(grabber, Rectangle::new(0, 1920, 16, 16)).await;

    let mut polls = 0;
    let summary = game
        .play(
            |_, _| {},
            StopWhen(|state: &LoopState| {
                polls += 1;
                state.frame_counter == 7
            }),
        )
        .await
        .unwrap();

    assert_eq!(summary.frames, 7);
    assert_eq!(polls, 7);
}

#[tokio::test]
async fn test_external_cancel_stops_loop() {
    let grabber: Arc<dyn ScreenGrabber> =
        Arc::new(MockGrabber::new().with_blank_frames().with_delay(Duration::from_millis(1)));
    let game = game_over(grabber, Rectangle::new(0, 1920, 16, 16)).await;

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });

    let summary = game.play(|_, _| {}, cancel).await.unwrap();
    assert!(summary.frames >= 1);
}

#[tokio::test]
async fn test_failure_mid_loop_propagates() {
    let mock = Arc::new(MockGrabber::new().with_failure_after(5));
    let game = game_over(mock.clone(), Rectangle::new(0, 1920, 16, 16)).await;

    let mut delivered = 0;
    let err = game.play(|_, _| delivered += 1, Never).await.unwrap_err();

    assert!(matches!(err, CaptureError::CaptureFailure { .. }));
    assert!(!err.remediation_hint().is_empty());
    assert_eq!(delivered, 5);
}

#[tokio::test]
async fn test_loop_timeout_from_options() {
    let mock: Arc<dyn ScreenGrabber> =
        Arc::new(MockGrabber::new().with_delay(Duration::from_millis(200)));
    let game = GameRegion::builder(mock)
        .region(Rectangle::new(0, 0, 16, 16))
        .loop_options(
            LoopOptions::builder()
                .capture_timeout(Duration::from_millis(20))
                .build(),
        )
        .build()
        .await;

    // displays() is delayed too, but has no timeout
    let game = game.unwrap();
    let err = game.play(|_, _| {}, Never).await.unwrap_err();
    assert!(matches!(err, CaptureError::CaptureTimeout { duration_ms: 20 }));
}
