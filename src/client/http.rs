use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::track::TrackId;

use super::error::ClientError;
use super::model::{Playlist, Replacement, SwipeRequest, SwipeResponse};
use super::Recommender;

/// Supplies the current bearer token; `None` sends the request unauthenticated.
pub type TokenGetter = Arc<dyn Fn() -> Option<String> + Send + Sync>;

pub struct HttpRecommender {
    base_url: String,
    client: Client,
    token: TokenGetter,
}

impl HttpRecommender {
    /// `timeout` bounds every request; expiry surfaces as a transient error.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        token: TokenGetter,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("swipetune/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match (self.token)() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

impl Recommender for HttpRecommender {
    fn request_replacement(&self, track_id: TrackId, liked: bool) -> Replacement {
        let req = self.authorized(
            self.client
                .post(self.url("swipe"))
                .json(&SwipeRequest {
                    song_id: track_id,
                    liked,
                }),
        );

        let resp = match req.send() {
            Ok(resp) => resp,
            Err(e) => return Replacement::TransientError(format!("swipe not delivered: {e}")),
        };
        let status = resp.status();
        match resp.text() {
            Ok(body) => classify_swipe_response(track_id, status, &body),
            Err(e) => Replacement::TransientError(format!("swipe response lost: {e}")),
        }
    }

    fn fetch_playlist(&self) -> Result<Playlist, ClientError> {
        let resp = self
            .authorized(self.client.get(self.url("playlist")))
            .send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a `POST /swipe` answer onto the replacement protocol.
pub(super) fn classify_swipe_response(
    swiped: TrackId,
    status: StatusCode,
    body: &str,
) -> Replacement {
    if status == StatusCode::NOT_FOUND {
        return Replacement::NoMoreCandidates;
    }
    if !status.is_success() {
        return Replacement::TransientError(format!(
            "swipe rejected ({}): {}",
            status.as_u16(),
            error_detail(body)
        ));
    }
    match serde_json::from_str::<SwipeResponse>(body) {
        // The backend occasionally echoes the card that was just swiped.
        Ok(SwipeResponse { song: Some(song) }) if song.id != swiped => Replacement::NextTrack(song),
        Ok(_) => Replacement::NoMoreCandidates,
        Err(e) => Replacement::TransientError(format!("unreadable swipe response: {e}")),
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Human readable part of an error body (`{"detail": ...}` when present).
pub(super) fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => "no details".to_string(),
        Err(_) => body.trim().chars().take(200).collect(),
    }
}
