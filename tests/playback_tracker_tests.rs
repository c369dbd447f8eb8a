// Integration tests for the playback tracker
//
// The fake player never fires callbacks on its own; each test decides when
// the file is "prepared" or "complete".

mod common;

use common::{settle, FakePlayer};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::sleep;
use voice_journal::{PlaybackPhase, PlaybackSessionState, PlaybackTracker, Timer};

fn tracker(player: &Arc<FakePlayer>) -> PlaybackTracker {
    PlaybackTracker::with_timer(
        Handle::current(),
        Arc::clone(player) as Arc<dyn voice_journal::AudioPlayer>,
        Timer::new(Duration::from_millis(100)),
    )
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Play `file` and wait for the tracker to report playing.
async fn start_playing(tracker: &PlaybackTracker, player: &FakePlayer, file: &str) {
    tracker.play_file(Path::new(file));
    player.fire_prepared();
    let mut rx = tracker.subscribe();
    common::wait_until(&mut rx, |s| s.is_playing).await;
}

#[tokio::test(start_paused = true)]
async fn test_play_waits_for_prepared() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);

    tracker.play_file(Path::new("/journal/a.mp4"));
    assert_eq!(tracker.phase(), PlaybackPhase::Preparing);
    assert!(!tracker.state().is_playing);
    assert!(tracker.is_active());

    player.fire_prepared();
    let mut rx = tracker.subscribe();
    let state = common::wait_until(&mut rx, |s| s.is_playing).await;

    assert_eq!(tracker.phase(), PlaybackPhase::Playing);
    assert!(!state.is_paused);
    assert_eq!(state.duration, ms(4_000));
    assert_eq!(player.calls(), vec!["play /journal/a.mp4"]);
}

#[tokio::test(start_paused = true)]
async fn test_position_is_polled_while_playing() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);
    start_playing(&tracker, &player, "/journal/a.mp4").await;

    player.set_position(1_500);
    sleep(ms(150)).await;
    assert_eq!(tracker.state().position, ms(1_500));

    player.set_position(1_800);
    sleep(ms(100)).await;
    assert_eq!(tracker.state().position, ms(1_800));
}

#[tokio::test(start_paused = true)]
async fn test_pause_stops_polling_and_resume_restarts_it() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);
    start_playing(&tracker, &player, "/journal/a.mp4").await;

    player.set_position(1_000);
    sleep(ms(150)).await;
    tracker.pause();
    assert_eq!(tracker.phase(), PlaybackPhase::Paused);

    player.set_position(9_999);
    sleep(ms(500)).await;
    assert_eq!(tracker.state().position, ms(1_000));

    tracker.resume();
    sleep(ms(50)).await;
    assert_eq!(tracker.state().position, ms(9_999));
    assert_eq!(tracker.phase(), PlaybackPhase::Playing);
    assert!(player.calls().ends_with(&["pause".to_string(), "resume".to_string()]));
}

#[tokio::test(start_paused = true)]
async fn test_seek_publishes_position_immediately() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);
    start_playing(&tracker, &player, "/journal/a.mp4").await;

    tracker.seek_to(3_000);
    assert_eq!(tracker.state().position, ms(3_000));
    assert!(player.calls().contains(&"seek 3000".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_seek_ignored_when_idle() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);

    tracker.seek_to(500);
    assert_eq!(tracker.state(), PlaybackSessionState::default());
    assert!(player.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_completion_returns_to_idle_keeping_duration() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);
    start_playing(&tracker, &player, "/journal/a.mp4").await;

    player.set_position(3_900);
    sleep(ms(150)).await;
    player.fire_complete();
    settle().await;

    let state = tracker.state();
    assert!(!state.is_playing);
    assert!(!state.is_paused);
    assert_eq!(state.position, Duration::ZERO);
    assert_eq!(state.duration, ms(4_000));
    assert_eq!(tracker.phase(), PlaybackPhase::Idle);
    assert!(player.calls().contains(&"stop".to_string()));

    // No poller left running after completion
    sleep(ms(500)).await;
    assert_eq!(tracker.state().position, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_prepared_from_superseded_load_is_ignored() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);

    tracker.play_file(Path::new("/journal/a.mp4"));
    let stale = player.take_prepared().expect("prepared callback registered");
    tracker.play_file(Path::new("/journal/b.mp4"));

    stale();
    settle().await;
    assert_eq!(tracker.phase(), PlaybackPhase::Preparing);
    assert!(!tracker.state().is_playing);

    player.fire_prepared();
    let mut rx = tracker.subscribe();
    common::wait_until(&mut rx, |s| s.is_playing).await;
    assert_eq!(
        player.calls(),
        vec!["play /journal/a.mp4", "stop", "play /journal/b.mp4"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_while_preparing_cancels_load() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);

    tracker.play_file(Path::new("/journal/a.mp4"));
    tracker.stop();
    assert_eq!(tracker.phase(), PlaybackPhase::Idle);

    // The player still holds the callback; firing it late changes nothing
    player.fire_prepared();
    settle().await;
    assert_eq!(tracker.phase(), PlaybackPhase::Idle);
    assert!(!tracker.state().is_playing);
    assert_eq!(player.calls(), vec!["play /journal/a.mp4", "stop"]);
}

#[tokio::test(start_paused = true)]
async fn test_prepared_fired_inside_play_file() {
    let player = FakePlayer::with_duration(2_500);
    player.prepare_inline.store(true, Ordering::SeqCst);
    let tracker = tracker(&player);

    tracker.play_file(Path::new("/journal/a.mp4"));
    let mut rx = tracker.subscribe();
    let state = common::wait_until(&mut rx, |s| s.is_playing).await;
    assert_eq!(state.duration, ms(2_500));
}

#[tokio::test(start_paused = true)]
async fn test_position_failure_reads_as_zero() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);
    start_playing(&tracker, &player, "/journal/a.mp4").await;

    player.set_position(700);
    sleep(ms(150)).await;
    assert_eq!(tracker.state().position, ms(700));

    player.position_fails.store(true, Ordering::SeqCst);
    sleep(ms(100)).await;
    assert_eq!(tracker.state().position, Duration::ZERO);
    assert!(tracker.state().is_playing);
}

#[tokio::test(start_paused = true)]
async fn test_stop_when_idle_is_a_no_op() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);

    tracker.stop();
    tracker.pause();
    tracker.resume();

    assert_eq!(tracker.phase(), PlaybackPhase::Idle);
    assert!(player.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_seek_while_preparing_reaches_player() {
    let player = FakePlayer::with_duration(4_000);
    let tracker = tracker(&player);

    tracker.play_file(Path::new("/journal/a.mp4"));
    tracker.seek_to(1_200);

    assert_eq!(tracker.phase(), PlaybackPhase::Preparing);
    assert_eq!(tracker.state().position, ms(1_200));
    assert_eq!(player.calls(), vec!["play /journal/a.mp4", "seek 1200"]);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_load_stays_idle() {
    let player = FakePlayer::with_duration(4_000);
    player.fail_load.store(true, Ordering::SeqCst);
    let tracker = tracker(&player);

    assert!(!tracker.play_file(Path::new("/journal/broken.mp4")));
    assert_eq!(tracker.phase(), PlaybackPhase::Idle);
    assert!(!tracker.is_active());

    // A prepared callback registered for the rejected load is stale
    player.fire_prepared();
    settle().await;
    assert!(!tracker.state().is_playing);
}
