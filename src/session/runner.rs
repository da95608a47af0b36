use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::audio::{AudioPlayer, PlaybackInfo, StatusHandle};
use crate::client::{Recommender, Replacement};
use crate::gesture::SwipeDecision;
use crate::track::{Track, TrackId};

use super::machine::{Effect, Phase, Session, SessionSnapshot, Ticket};

/// Everything that may change a session, in arrival order.
pub enum SessionEvent {
    Decide(SwipeDecision),
    TogglePlayback,
    Resolved { ticket: Ticket, outcome: Replacement },
    /// Acknowledged once every earlier event, and the audio commands it
    /// caused, have been applied.
    Barrier(Sender<()>),
    Shutdown,
}

pub type SnapshotHandle = Arc<Mutex<SessionSnapshot>>;

/// Owner side of a running session. Dropping it tears the session down.
pub struct SessionHandle {
    tx: Sender<SessionEvent>,
    snapshot: SnapshotHandle,
    playback: StatusHandle,
    join: Option<JoinHandle<AudioPlayer>>,
}

impl SessionHandle {
    /// Start a session on `tracks` and begin playing the first card.
    ///
    /// `report_timeout` bounds how long shutdown waits for the like that
    /// completed the session to reach the backend.
    pub fn spawn(
        tracks: Vec<Track>,
        threshold: u32,
        recommender: Arc<dyn Recommender>,
        player: AudioPlayer,
        report_timeout: Duration,
    ) -> io::Result<Self> {
        let session = Session::new(tracks, threshold);
        let snapshot: SnapshotHandle = Arc::new(Mutex::new(session.snapshot()));
        let playback = player.status_handle();
        let (tx, rx) = mpsc::channel();

        let runner = Runner {
            session,
            recommender,
            player,
            events: tx.clone(),
            snapshot: Arc::clone(&snapshot),
            report_timeout,
        };
        let join = thread::Builder::new()
            .name("swipetune-session".into())
            .spawn(move || runner.run(rx))?;

        Ok(Self {
            tx,
            snapshot,
            playback,
            join: Some(join),
        })
    }

    pub fn decide(&self, decision: SwipeDecision) {
        let _ = self.tx.send(SessionEvent::Decide(decision));
    }

    pub fn toggle_playback(&self) {
        let _ = self.tx.send(SessionEvent::TogglePlayback);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match self.snapshot.lock() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// What the audio thread last reported. Display only.
    pub fn playback(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    pub fn phase(&self) -> Phase {
        self.snapshot().phase
    }

    /// Block until the runner has caught up. Replacement requests still on
    /// the wire are not waited for.
    pub fn wait_idle(&self) -> bool {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(SessionEvent::Barrier(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }

    /// Stop the session and take back the audio player, silenced.
    ///
    /// After a completed session this returns only once the completing like
    /// has been answered (or the report timeout ran out), so a playlist
    /// fetched afterwards includes it.
    pub fn shutdown(mut self) -> Option<AudioPlayer> {
        self.finish()
    }

    fn finish(&mut self) -> Option<AudioPlayer> {
        let join = self.join.take()?;
        let _ = self.tx.send(SessionEvent::Shutdown);
        join.join().ok()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

struct Runner {
    session: Session,
    recommender: Arc<dyn Recommender>,
    player: AudioPlayer,
    events: Sender<SessionEvent>,
    snapshot: SnapshotHandle,
    report_timeout: Duration,
}

impl Runner {
    fn run(mut self, rx: Receiver<SessionEvent>) -> AudioPlayer {
        let fx = self.session.mount();
        self.apply(fx);

        while let Ok(event) = rx.recv() {
            match event {
                SessionEvent::Decide(decision) => {
                    let fx = self.session.decide(decision);
                    self.apply(fx);
                }
                SessionEvent::Resolved { ticket, outcome } => {
                    let fx = self.session.resolve(ticket, outcome);
                    self.apply(fx);
                }
                SessionEvent::TogglePlayback => {
                    if self.session.phase() == Phase::Active && self.player.toggle().is_err() {
                        let fx = self.session.fail("audio thread is gone");
                        self.apply(fx);
                    }
                }
                SessionEvent::Barrier(ack) => {
                    self.player.wait_idle();
                    let _ = ack.send(());
                }
                SessionEvent::Shutdown => {
                    self.await_final_report(&rx);
                    break;
                }
            }
        }

        log::debug!("session runner exiting in phase {:?}", self.session.phase());
        let _ = self.player.stop();
        self.player.wait_idle();
        self.player
    }

    /// Keep taking answers until the completing like is acknowledged.
    /// Gestures arriving meanwhile are dropped.
    fn await_final_report(&mut self, rx: &Receiver<SessionEvent>) {
        let deadline = Instant::now() + self.report_timeout;
        while self.session.awaiting_final_report() {
            let left = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(left) {
                Ok(SessionEvent::Resolved { ticket, outcome }) => {
                    let fx = self.session.resolve(ticket, outcome);
                    self.apply(fx);
                }
                Ok(SessionEvent::Barrier(ack)) => {
                    let _ = ack.send(());
                }
                Ok(_) => {}
                Err(_) => {
                    log::warn!(
                        "final like unconfirmed after {} ms",
                        self.report_timeout.as_millis()
                    );
                    break;
                }
            }
        }
    }

    fn apply(&mut self, fx: Vec<Effect>) {
        let mut pending: VecDeque<Effect> = fx.into();
        while let Some(effect) = pending.pop_front() {
            let follow_up = match effect {
                Effect::RequestReplacement {
                    ticket,
                    track_id,
                    liked,
                } => self.request(ticket, track_id, liked),
                Effect::StartAudio(track) => {
                    let id = track.id;
                    match self.player.start(track) {
                        Ok(()) => Vec::new(),
                        Err(_) => self.session.fail(&format!("could not start track {id}")),
                    }
                }
                Effect::StopAudio => match self.player.stop() {
                    Ok(()) => Vec::new(),
                    Err(_) => self.session.fail("audio thread is gone"),
                },
                Effect::PhaseChanged(phase) => {
                    log::debug!("published phase {phase:?}");
                    Vec::new()
                }
                Effect::Notice(_) => Vec::new(),
            };
            pending.extend(follow_up);
        }
        self.publish();
    }

    fn request(&mut self, ticket: Ticket, track_id: TrackId, liked: bool) -> Vec<Effect> {
        let recommender = Arc::clone(&self.recommender);
        let events = self.events.clone();
        let spawned = thread::Builder::new()
            .name("swipetune-fetch".into())
            .spawn(move || {
                let outcome = recommender.request_replacement(track_id, liked);
                // The runner may be gone; the result is dropped with it.
                let _ = events.send(SessionEvent::Resolved { ticket, outcome });
            });

        match spawned {
            Ok(_) => Vec::new(),
            Err(e) => self
                .session
                .resolve(ticket, Replacement::TransientError(format!("swipe not sent: {e}"))),
        }
    }

    fn publish(&self) {
        let snap = self.session.snapshot();
        match self.snapshot.lock() {
            Ok(mut s) => *s = snap,
            Err(poisoned) => *poisoned.into_inner() = snap,
        }
    }
}
