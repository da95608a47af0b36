use std::thread;
use std::time::Duration;

use super::fake::{FakeBackend, Probe, track};
use super::{AudioPlayer, PlaybackError};
use crate::config::AudioSettings;

#[test]
fn start_then_stop_releases_the_voice() {
    let probe = Probe::default();
    let player = FakeBackend::new(probe.clone()).into_player();

    player.start(track(1)).unwrap();
    assert!(player.wait_idle());
    let info = player.status();
    assert_eq!(info.track_id, Some(1));
    assert!(info.playing);
    assert_eq!(probe.live(), vec![1]);

    player.stop().unwrap();
    assert!(player.wait_idle());
    let info = player.status();
    assert_eq!(info.track_id, None);
    assert!(!info.playing);
    assert!(probe.live().is_empty());
}

#[test]
fn stop_is_idempotent() {
    let probe = Probe::default();
    let player = FakeBackend::new(probe.clone()).into_player();

    player.stop().unwrap();
    player.stop().unwrap();
    assert!(player.wait_idle());
    assert!(!player.is_playing());

    player.start(track(1)).unwrap();
    player.stop().unwrap();
    player.stop().unwrap();
    assert!(player.wait_idle());
    assert!(!player.is_playing());
    assert!(probe.live().is_empty());
}

#[test]
fn rapid_starts_never_overlap() {
    let probe = Probe::default();
    let player = FakeBackend::new(probe.clone())
        .slow(1, Duration::from_millis(30))
        .slow(2, Duration::from_millis(30))
        .into_player();

    for id in [1, 2, 3, 4] {
        player.start(track(id)).unwrap();
        thread::sleep(Duration::from_millis(5));
    }
    assert!(player.wait_idle());

    assert_eq!(probe.max_live(), 1);
    assert_eq!(probe.live(), vec![4]);
    assert_eq!(player.status().track_id, Some(4));
}

#[test]
fn start_queued_behind_a_newer_start_is_skipped() {
    let probe = Probe::default();
    let player = FakeBackend::new(probe.clone())
        .slow(9, Duration::from_millis(200))
        .into_player();

    player.start(track(9)).unwrap();
    // The audio thread is busy loading 9 while these two queue up.
    thread::sleep(Duration::from_millis(50));
    player.start(track(1)).unwrap();
    player.start(track(2)).unwrap();
    assert!(player.wait_idle());

    assert_eq!(probe.loads(), vec![9, 2]);
    assert_eq!(probe.live(), vec![2]);
}

#[test]
fn load_failure_leaves_nothing_playing() {
    let probe = Probe::default();
    let player = FakeBackend::new(probe.clone()).broken(2).into_player();

    player.start(track(1)).unwrap();
    player.start(track(2)).unwrap();
    assert!(player.wait_idle());

    let info = player.status();
    assert!(!info.playing);
    assert_eq!(info.track_id, None);
    assert!(info.last_error.is_some());
    assert!(probe.live().is_empty());

    player.start(track(3)).unwrap();
    assert!(player.wait_idle());
    let info = player.status();
    assert!(info.playing);
    assert!(info.last_error.is_none());
}

#[test]
fn toggle_pauses_and_resumes_but_never_starts() {
    let probe = Probe::default();
    let player = FakeBackend::new(probe.clone()).into_player();

    player.toggle().unwrap();
    assert!(player.wait_idle());
    assert!(!player.is_playing());
    assert!(probe.loads().is_empty());

    player.start(track(1)).unwrap();
    player.toggle().unwrap();
    assert!(player.wait_idle());
    assert!(!player.is_playing());
    assert_eq!(player.status().track_id, Some(1));

    player.toggle().unwrap();
    assert!(player.wait_idle());
    assert!(player.is_playing());
    assert_eq!(probe.loads(), vec![1]);
}

#[test]
fn finished_voice_is_released() {
    let probe = Probe::default();
    let player = FakeBackend::new(probe.clone()).into_player();

    player.start(track(1)).unwrap();
    assert!(player.wait_idle());
    probe.finish(1);

    // Finished voices are noticed on the periodic tick.
    thread::sleep(Duration::from_millis(500));
    assert!(player.wait_idle());
    assert!(!player.is_playing());
    assert!(probe.live().is_empty());
}

#[test]
fn missing_output_device_is_not_fatal() {
    let player = AudioPlayer::spawn(
        || -> Result<FakeBackend, PlaybackError> {
            Err(PlaybackError::Output("no device".into()))
        },
        &AudioSettings::default(),
    )
    .unwrap();

    player.start(track(1)).unwrap();
    assert!(player.wait_idle());
    let info = player.status();
    assert!(!info.playing);
    assert!(info.last_error.is_some());
}

#[test]
fn quit_stops_the_thread() {
    let probe = Probe::default();
    let player = FakeBackend::new(probe.clone()).into_player();
    player.start(track(1)).unwrap();
    player.quit_softly(Duration::ZERO);

    assert!(probe.live().is_empty());
    assert!(!player.wait_idle());
}
