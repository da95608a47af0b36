#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
}
