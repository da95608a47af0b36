use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::track::{Track, TrackId};

use super::backend::{AudioBackend, Voice};
use super::types::{AudioCmd, PlaybackError, StatusHandle};

const TICK: Duration = Duration::from_millis(200);

struct Active<V> {
    voice: V,
    track_id: TrackId,
    paused: bool,
    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl<V> Active<V> {
    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }
}

/// The one slot a voice may live in. Replacing the occupant always stops and
/// drops the previous voice first.
struct VoiceSlot<B: AudioBackend> {
    backend: Option<B>,
    active: Option<Active<B::Voice>>,
    status: StatusHandle,
    volume: f32,
}

impl<B: AudioBackend> VoiceSlot<B> {
    fn new(backend: Option<B>, status: StatusHandle, volume: f32) -> Self {
        Self {
            backend,
            active: None,
            status,
            volume,
        }
    }

    fn start(&mut self, track: &Track) {
        self.stop();

        let loaded = match self.backend.as_mut() {
            Some(backend) => backend.load(track),
            None => Err(PlaybackError::Output("output device was not opened".into())),
        };

        match loaded {
            Ok(voice) => {
                voice.set_volume(self.volume);
                voice.play();
                self.active = Some(Active {
                    voice,
                    track_id: track.id,
                    paused: false,
                    started_at: Some(Instant::now()),
                    accumulated: Duration::ZERO,
                });
                log::debug!("playing track {}", track.id);
                if let Ok(mut info) = self.status.lock() {
                    info.track_id = Some(track.id);
                    info.elapsed = Duration::ZERO;
                    info.playing = true;
                    info.last_error = None;
                }
            }
            Err(e) => {
                log::warn!("playback of track {} failed: {e}", track.id);
                if let Ok(mut info) = self.status.lock() {
                    info.last_error = Some(e.to_string());
                }
            }
        }
    }

    fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.voice.stop();
            log::debug!("released voice for track {}", active.track_id);
        }
        if let Ok(mut info) = self.status.lock() {
            info.track_id = None;
            info.elapsed = Duration::ZERO;
            info.playing = false;
            info.last_error = None;
        }
    }

    fn toggle(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.paused {
            active.voice.play();
            active.started_at = Some(Instant::now());
        } else {
            active.voice.pause();
            if let Some(st) = active.started_at.take() {
                active.accumulated += st.elapsed();
            }
        }
        active.paused = !active.paused;
        let playing = !active.paused;
        if let Ok(mut info) = self.status.lock() {
            info.playing = playing;
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(active) = self.active.as_ref() {
            active.voice.set_volume(self.volume);
        }
    }

    /// Periodic bookkeeping: publish elapsed time, release finished voices.
    fn tick(&mut self) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if !active.paused && active.voice.is_finished() {
            log::debug!("track {} played to the end", active.track_id);
            self.stop();
            return;
        }
        let elapsed = active.elapsed();
        if let Ok(mut info) = self.status.lock() {
            info.elapsed = elapsed;
        }
    }

    fn fade_out(&self, fade_out_ms: u64) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if active.paused || fade_out_ms == 0 {
            return;
        }
        let steps: u64 = 20;
        let step_ms = (fade_out_ms / steps).max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            active.voice.set_volume(self.volume * (1.0 - t));
            thread::sleep(Duration::from_millis(step_ms));
        }
    }
}

impl<B: AudioBackend> Drop for VoiceSlot<B> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.voice.stop();
        }
    }
}

/// Spawn the thread owning the voice slot. `open` runs on that thread, since
/// output streams generally cannot move between threads.
pub(super) fn spawn_audio_thread<B, F>(
    open: F,
    rx: Receiver<AudioCmd>,
    status: StatusHandle,
    volume: f32,
) -> io::Result<JoinHandle<()>>
where
    B: AudioBackend,
    F: FnOnce() -> Result<B, PlaybackError> + Send + 'static,
{
    thread::Builder::new()
        .name("swipetune-audio".to_string())
        .spawn(move || {
            let backend = match open() {
                Ok(b) => Some(b),
                Err(e) => {
                    // Keep serving commands so the session never blocks on audio.
                    log::warn!("audio disabled: {e}");
                    None
                }
            };
            let mut slot = VoiceSlot::new(backend, status, volume);
            let mut backlog: VecDeque<AudioCmd> = VecDeque::new();

            loop {
                let cmd = match backlog.pop_front() {
                    Some(cmd) => cmd,
                    None => match rx.recv_timeout(TICK) {
                        Ok(cmd) => cmd,
                        Err(RecvTimeoutError::Timeout) => {
                            slot.tick();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    },
                };

                match cmd {
                    AudioCmd::Start(track) => {
                        // Loading can take a while (remote previews). Skip it when a
                        // newer start/stop is already waiting.
                        while let Ok(next) = rx.try_recv() {
                            backlog.push_back(next);
                        }
                        if backlog.iter().any(AudioCmd::supersedes_start) {
                            log::debug!("skipping superseded start of track {}", track.id);
                            continue;
                        }
                        slot.start(&track);
                    }
                    AudioCmd::Stop => slot.stop(),
                    AudioCmd::Toggle => slot.toggle(),
                    AudioCmd::SetVolume(v) => slot.set_volume(v),
                    AudioCmd::Barrier(ack) => {
                        let _ = ack.send(());
                    }
                    AudioCmd::Quit { fade_out_ms } => {
                        slot.fade_out(fade_out_ms);
                        slot.stop();
                        break;
                    }
                }
            }
        })
}
