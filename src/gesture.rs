//! Swipe gesture classification.
//!
//! A drag is classified purely by its horizontal displacement at release;
//! release velocity only shapes the exit animation. Between updates the
//! front end reads a signed progress value in `[-1, 1]` for overlay effects.

use std::time::Duration;

use crate::track::TrackId;

/// Tilt of a card dragged half a viewport away from center.
const MAX_ROTATION_DEG: f32 = 15.0;

const DEFAULT_EXIT: Duration = Duration::from_millis(250);
const MIN_EXIT: Duration = Duration::from_millis(120);
const MAX_EXIT: Duration = Duration::from_millis(400);

/// Outcome of one completed drag.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SwipeOutcome {
    Accept,
    Reject,
    /// Spring back to center.
    Cancel,
}

impl SwipeOutcome {
    /// Bind the outcome to the card it was made on.
    pub fn for_track(self, id: TrackId) -> SwipeDecision {
        match self {
            SwipeOutcome::Accept => SwipeDecision::Accept(id),
            SwipeOutcome::Reject => SwipeDecision::Reject(id),
            SwipeOutcome::Cancel => SwipeDecision::Cancel,
        }
    }
}

/// A resolved gesture as seen by the session controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SwipeDecision {
    Accept(TrackId),
    Reject(TrackId),
    Cancel,
}

impl SwipeDecision {
    pub fn track_id(self) -> Option<TrackId> {
        match self {
            SwipeDecision::Accept(id) | SwipeDecision::Reject(id) => Some(id),
            SwipeDecision::Cancel => None,
        }
    }

    pub fn liked(self) -> bool {
        matches!(self, SwipeDecision::Accept(_))
    }
}

/// Commit distance in the same units as the drag (pixels, terminal cells, ...).
pub fn threshold_for_viewport(viewport_width: f32, fraction: f32) -> f32 {
    (viewport_width * fraction).max(0.0)
}

fn usable(threshold: f32) -> bool {
    threshold.is_finite() && threshold > 0.0
}

/// Signed drag progress, `clamp(dx / threshold, -1, 1)`.
pub fn progress(dx: f32, threshold: f32) -> f32 {
    if !usable(threshold) || !dx.is_finite() {
        return 0.0;
    }
    (dx / threshold).clamp(-1.0, 1.0)
}

/// Classify a release. Reaching the threshold exactly is not enough.
pub fn classify(dx: f32, threshold: f32) -> SwipeOutcome {
    if !usable(threshold) {
        return SwipeOutcome::Cancel;
    }
    if dx > threshold {
        SwipeOutcome::Accept
    } else if dx < -threshold {
        SwipeOutcome::Reject
    } else {
        SwipeOutcome::Cancel
    }
}

/// Card tilt in degrees for a drag of `dx` across a viewport of `viewport_width`.
pub fn rotation_deg(dx: f32, viewport_width: f32) -> f32 {
    let half = viewport_width / 2.0;
    if !(half.is_finite() && half > 0.0) || !dx.is_finite() {
        return 0.0;
    }
    (dx / half).clamp(-1.0, 1.0) * MAX_ROTATION_DEG
}

/// How long the card takes to leave the screen after a committed swipe.
pub fn exit_duration(remaining: f32, velocity_x: f32) -> Duration {
    let speed = velocity_x.abs();
    if !speed.is_finite() || speed < 1.0 || !remaining.is_finite() {
        return DEFAULT_EXIT;
    }
    Duration::try_from_secs_f32(remaining.abs() / speed)
        .unwrap_or(MAX_EXIT)
        .clamp(MIN_EXIT, MAX_EXIT)
}

/// What the front end should animate after a release.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Release {
    pub outcome: SwipeOutcome,
    /// `None` for a cancelled drag, which springs back instead.
    pub exit: Option<Duration>,
}

/// Live displacement of the card currently under the finger.
///
/// Only the current gesture is remembered; `release` returns the card to center.
#[derive(Debug, Clone)]
pub struct DragTracker {
    dx: f32,
    dy: f32,
    threshold: f32,
    viewport_width: f32,
    dragging: bool,
}

impl DragTracker {
    pub fn new(viewport_width: f32, fraction: f32) -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            threshold: threshold_for_viewport(viewport_width, fraction),
            viewport_width,
            dragging: false,
        }
    }

    /// Recompute the threshold after a resize.
    pub fn resize(&mut self, viewport_width: f32, fraction: f32) {
        self.viewport_width = viewport_width;
        self.threshold = threshold_for_viewport(viewport_width, fraction);
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn dx(&self) -> f32 {
        self.dx
    }

    pub fn dy(&self) -> f32 {
        self.dy
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn progress(&self) -> f32 {
        progress(self.dx, self.threshold)
    }

    pub fn rotation_deg(&self) -> f32 {
        rotation_deg(self.dx, self.viewport_width)
    }

    /// Absolute displacement from gesture start; returns the new progress.
    pub fn update(&mut self, dx: f32, dy: f32) -> f32 {
        self.dragging = true;
        self.dx = dx;
        self.dy = dy;
        self.progress()
    }

    /// Relative horizontal move (keyboard driven drags).
    pub fn nudge(&mut self, delta_x: f32) -> f32 {
        let (dx, dy) = (self.dx + delta_x, self.dy);
        self.update(dx, dy)
    }

    /// End the gesture. The tracker is back at center afterwards.
    pub fn release(&mut self, velocity_x: f32) -> Release {
        let outcome = classify(self.dx, self.threshold);
        let exit = match outcome {
            SwipeOutcome::Cancel => None,
            _ => Some(exit_duration(
                self.viewport_width - self.dx.abs(),
                velocity_x,
            )),
        };
        self.reset();
        Release { outcome, exit }
    }

    pub fn reset(&mut self) {
        self.dx = 0.0;
        self.dy = 0.0;
        self.dragging = false;
    }
}
