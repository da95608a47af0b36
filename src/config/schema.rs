use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/swipetune/config.toml` or `~/.config/swipetune/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SWIPETUNE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub audio: AudioSettings,
    pub offline: OfflineSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Recommendation backend, e.g. `https://api.example.com`.
    /// When unset the session runs against the local offline catalog.
    pub base_url: Option<String>,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// File holding the bearer token; re-read on every request so a
    /// login flow can rotate it underneath a running session.
    pub token_file: Option<PathBuf>,
    /// Upper bound for a single request (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            token_file: None,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Number of liked tracks that completes a session.
    pub like_threshold: u32,
    /// Horizontal drag, as a fraction of the viewport width, that commits a swipe.
    pub swipe_threshold: f32,
    /// Number of cards dealt from the offline catalog when there is no seed.
    pub initial_cards: usize,
    /// Photo-analysis payload (JSON track list) used to seed the queue.
    pub seed_file: Option<PathBuf>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            like_threshold: 5,
            swipe_threshold: 0.25,
            initial_cards: 3,
            seed_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Output volume applied to every preview (0.0 - 1.0).
    pub volume: f32,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// Upper bound for downloading a remote preview (milliseconds).
    pub fetch_timeout_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            quit_fade_out_ms: 300,
            fetch_timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OfflineSettings {
    /// Local directory scanned for candidates instead of the built-in catalog.
    pub music_dir: Option<PathBuf>,
    /// Shuffle the offline catalog before dealing cards.
    pub shuffle: bool,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for OfflineSettings {
    fn default() -> Self {
        Self {
            music_dir: None,
            shuffle: false,
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// How far one arrow key press drags the card, as a fraction of the viewport width.
    pub nudge_fraction: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ swipe right to keep it ~ ".to_string(),
            nudge_fraction: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log file. The terminal belongs to the UI, so without a file logs only
    /// go to stderr when `RUST_LOG` is set explicitly.
    pub file: Option<PathBuf>,
    /// Default filter when `RUST_LOG` is not set (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}
