//! Ordered candidate cards plus the like counter that ends a session.
//!
//! The queue does no locking of its own; the session runner is its only
//! caller and serializes every mutation.

use std::collections::VecDeque;

use crate::track::{Track, TrackId};

#[derive(Debug, Clone)]
pub struct TrackQueue {
    tracks: VecDeque<Track>,
    like_count: u32,
    threshold: u32,
    completed: bool,
}

impl TrackQueue {
    /// Build a queue in presentation order. Repeated ids keep their first slot.
    pub fn new(tracks: Vec<Track>, threshold: u32) -> Self {
        let mut queue = Self {
            tracks: VecDeque::with_capacity(tracks.len()),
            like_count: 0,
            threshold,
            completed: false,
        };
        for t in tracks {
            queue.append(t);
        }
        queue
    }

    pub fn peek_head(&self) -> Option<&Track> {
        self.tracks.front()
    }

    pub fn head_id(&self) -> Option<TrackId> {
        self.peek_head().map(|t| t.id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.tracks.iter().any(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn like_count(&self) -> u32 {
        self.like_count
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Drop the head and, when given, put `replacement` at the tail.
    /// Returns the removed head.
    pub fn pop_and_append(&mut self, replacement: Option<Track>) -> Option<Track> {
        let popped = self.tracks.pop_front();
        if let Some(t) = replacement {
            self.append(t);
        }
        popped
    }

    /// Tail insert for a replacement that arrives after its card was popped.
    /// A track already queued is refused.
    pub fn append(&mut self, track: Track) -> bool {
        if self.contains(track.id) {
            return false;
        }
        self.tracks.push_back(track);
        true
    }

    /// Count one like. True exactly once: on the like that reaches the threshold.
    pub fn record_like(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.like_count += 1;
        if self.like_count >= self.threshold {
            self.completed = true;
            return true;
        }
        false
    }
}
