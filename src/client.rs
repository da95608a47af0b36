//! Recommendation backend boundary.
//!
//! The session only sees [`Recommender`]: one replacement candidate per
//! swipe, plus the final playlist. `HttpRecommender` talks to the real
//! backend; `OfflineRecommender` deals from a local catalog with the same
//! queue-advancement semantics.

mod error;
mod http;
mod model;
mod offline;

pub use error::ClientError;
pub use http::{HttpRecommender, TokenGetter};
pub use model::{Playlist, Replacement, SwipeRequest, SwipeResponse};
pub use offline::{OfflineRecommender, builtin_catalog};

use crate::track::TrackId;

pub trait Recommender: Send + Sync {
    /// Report a swipe on `track_id` and ask for one replacement candidate.
    /// Never fails outright: problems come back as `TransientError`.
    fn request_replacement(&self, track_id: TrackId, liked: bool) -> Replacement;

    /// Liked tracks plus recommendations, once the session is complete.
    fn fetch_playlist(&self) -> Result<Playlist, ClientError>;
}
