use std::io;
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::track::Track;

use super::backend::AudioBackend;
use super::sink::RodioBackend;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, PlaybackError, PlaybackInfo, StatusHandle};

/// Cheap front for the audio thread. Every method only enqueues a command;
/// ordering between commands is what guarantees a single active voice.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    status: StatusHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Spawn the audio thread with a custom backend.
    pub fn spawn<B, F>(open: F, settings: &AudioSettings) -> io::Result<Self>
    where
        B: AudioBackend,
        F: FnOnce() -> Result<B, PlaybackError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let status: StatusHandle = StatusHandle::default();

        let handle = spawn_audio_thread(open, rx, status.clone(), settings.volume)?;

        Ok(Self {
            tx,
            status,
            join: Mutex::new(Some(handle)),
        })
    }

    /// Spawn the audio thread on the default output device.
    pub fn with_rodio(settings: &AudioSettings) -> io::Result<Self> {
        let fetch_timeout = Duration::from_millis(settings.fetch_timeout_ms);
        Self::spawn(move || RodioBackend::open(fetch_timeout), settings)
    }

    pub fn status_handle(&self) -> StatusHandle {
        self.status.clone()
    }

    pub fn status(&self) -> PlaybackInfo {
        self.status
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    pub fn is_playing(&self) -> bool {
        self.status().playing
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    pub fn start(&self, track: Track) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.send(AudioCmd::Start(track))
    }

    pub fn stop(&self) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.send(AudioCmd::Stop)
    }

    pub fn toggle(&self) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.send(AudioCmd::Toggle)
    }

    /// Block until every command sent so far has been applied.
    /// Returns `false` if the audio thread is gone.
    pub fn wait_idle(&self) -> bool {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.send(AudioCmd::Barrier(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.quit_softly(Duration::ZERO);
    }
}
