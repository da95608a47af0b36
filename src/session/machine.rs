//! The swipe session as an explicit state machine.
//!
//! Every input (`mount`, `decide`, `resolve`) returns the side effects the
//! runner has to carry out. The machine itself never blocks: a decision pops
//! its card immediately and the replacement is appended whenever the
//! backend answers.

use std::collections::HashMap;

use crate::client::Replacement;
use crate::gesture::SwipeDecision;
use crate::track::{Track, TrackId};

use super::queue::TrackQueue;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Active,
    /// Like quota reached; the front end moves on to the playlist.
    Completed,
    /// Nothing left to show; the front end returns to photo capture.
    Exhausted,
    /// The audio thread went away.
    Error,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        self != Phase::Active
    }
}

/// Identifies one outstanding replacement request.
pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Report the swipe and ask for a replacement; answer with `resolve(ticket, ..)`.
    RequestReplacement {
        ticket: Ticket,
        track_id: TrackId,
        liked: bool,
    },
    StartAudio(Track),
    StopAudio,
    PhaseChanged(Phase),
    /// Non-blocking message for the user.
    Notice(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub head: Option<Track>,
    pub queued: usize,
    pub like_count: u32,
    pub threshold: u32,
    pub phase: Phase,
    pub pending_requests: usize,
    pub notice: Option<String>,
}

pub struct Session {
    queue: TrackQueue,
    phase: Phase,
    /// Outstanding replacement requests and the card each one was made for.
    in_flight: HashMap<Ticket, TrackId>,
    /// The like that completed the session, until the backend has seen it.
    final_report: Option<Ticket>,
    next_ticket: Ticket,
    notice: Option<String>,
}

impl Session {
    pub fn new(tracks: Vec<Track>, threshold: u32) -> Self {
        Self {
            queue: TrackQueue::new(tracks, threshold),
            phase: Phase::Active,
            in_flight: HashMap::new(),
            final_report: None,
            next_ticket: 1,
            notice: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    pub fn like_count(&self) -> u32 {
        self.queue.like_count()
    }

    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    /// True while the completing like is still on its way to the backend.
    /// The playlist must not be read before this clears.
    pub fn awaiting_final_report(&self) -> bool {
        self.final_report.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            head: self.queue.peek_head().cloned(),
            queued: self.queue.len(),
            like_count: self.queue.like_count(),
            threshold: self.queue.threshold(),
            phase: self.phase,
            pending_requests: self.in_flight.len(),
            notice: self.notice.clone(),
        }
    }

    /// The screen appeared: play the first card, or give up on an empty deck.
    pub fn mount(&mut self) -> Vec<Effect> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        match self.queue.peek_head() {
            Some(head) => vec![Effect::StartAudio(head.clone())],
            None => self.enter(Phase::Exhausted, Vec::new()),
        }
    }

    pub fn decide(&mut self, decision: SwipeDecision) -> Vec<Effect> {
        let Some(track_id) = decision.track_id() else {
            return Vec::new();
        };
        if self.phase.is_terminal() {
            log::debug!("ignoring swipe on {track_id}: session is {:?}", self.phase);
            return Vec::new();
        }
        if self.queue.head_id() != Some(track_id) {
            log::debug!("ignoring swipe on {track_id}: not the current card");
            return Vec::new();
        }
        if self.in_flight.values().any(|&id| id == track_id) {
            log::debug!("ignoring swipe on {track_id}: already decided");
            return Vec::new();
        }

        let liked = decision.liked();
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.notice = None;

        if liked && self.queue.record_like() {
            // The last like still goes to the backend so the playlist sees
            // it. Its replacement is discarded.
            self.final_report = Some(ticket);
            let fx = vec![
                Effect::RequestReplacement {
                    ticket,
                    track_id,
                    liked,
                },
                Effect::StopAudio,
            ];
            return self.enter(Phase::Completed, fx);
        }

        log::debug!(
            "{} track {track_id} ({} liked)",
            if liked { "accepted" } else { "rejected" },
            self.queue.like_count()
        );
        self.in_flight.insert(ticket, track_id);
        self.queue.pop_and_append(None);

        let mut fx = vec![Effect::RequestReplacement {
            ticket,
            track_id,
            liked,
        }];
        match self.queue.peek_head() {
            Some(next) if next.id != track_id => fx.push(Effect::StartAudio(next.clone())),
            Some(_) => {}
            None => fx.push(Effect::StopAudio),
        }
        fx
    }

    /// A replacement request finished. Late answers for a finished session
    /// or an unknown ticket are dropped.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Replacement) -> Vec<Effect> {
        if self.final_report == Some(ticket) {
            self.final_report = None;
            match outcome {
                Replacement::TransientError(msg) => {
                    log::warn!("final like not recorded, playlist may miss it: {msg}")
                }
                _ => log::debug!("final like recorded"),
            }
            return Vec::new();
        }
        if self.phase.is_terminal() {
            return Vec::new();
        }
        let Some(swiped) = self.in_flight.remove(&ticket) else {
            return Vec::new();
        };

        let mut fx = Vec::new();
        match outcome {
            Replacement::NextTrack(track) if track.id != swiped => {
                let was_empty = self.queue.is_empty();
                let id = track.id;
                if self.queue.append(track) {
                    log::debug!("track {id} queued as replacement for {swiped}");
                    if was_empty {
                        if let Some(head) = self.queue.peek_head() {
                            fx.push(Effect::StartAudio(head.clone()));
                        }
                    }
                } else {
                    log::debug!("dropping replacement {id}: already queued");
                }
            }
            Replacement::NextTrack(_) | Replacement::NoMoreCandidates => {
                log::debug!("no replacement for {swiped}");
            }
            Replacement::TransientError(msg) => {
                log::warn!("replacement for {swiped} failed: {msg}");
                self.notice = Some(msg.clone());
                fx.push(Effect::Notice(msg));
            }
        }

        if self.queue.is_empty() && self.in_flight.is_empty() {
            return self.enter(Phase::Exhausted, fx);
        }
        fx
    }

    /// Audio can no longer be controlled; stop accepting gestures.
    pub fn fail(&mut self, reason: &str) -> Vec<Effect> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        log::error!("session failed: {reason}");
        self.notice = Some(reason.to_string());
        self.enter(Phase::Error, Vec::new())
    }

    fn enter(&mut self, phase: Phase, mut fx: Vec<Effect>) -> Vec<Effect> {
        log::info!(
            "session {:?} -> {:?} ({}/{} liked)",
            self.phase,
            phase,
            self.queue.like_count(),
            self.queue.threshold()
        );
        self.phase = phase;
        self.in_flight.clear();
        if phase == Phase::Exhausted && !fx.contains(&Effect::StopAudio) {
            fx.push(Effect::StopAudio);
        }
        fx.push(Effect::PhaseChanged(phase));
        fx
    }
}
