//! Swipe session: the card queue, the state machine driving it, and the
//! runner thread that serializes gestures, network answers and audio.
//!
//! A decision pops its card right away and plays the next one; the
//! replacement from the recommender is appended whenever it arrives.

mod machine;
mod queue;
mod runner;
mod seed;

pub use machine::{Effect, Phase, Session, SessionSnapshot, Ticket};
pub use queue::TrackQueue;
pub use runner::{SessionEvent, SessionHandle, SnapshotHandle};
pub use seed::{parse_seed, seed_or_fallback, usable_seed, SeedError};
