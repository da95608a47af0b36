use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_swipetune_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SWIPETUNE_CONFIG_PATH", "/tmp/swipetune-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/swipetune-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("swipetune")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("swipetune")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[api]
base_url = "http://localhost:8000"
token = "abc"
timeout_ms = 2500

[session]
like_threshold = 3
swipe_threshold = 0.4
initial_cards = 2
seed_file = "/tmp/seed.json"

[audio]
volume = 0.5
quit_fade_out_ms = 0

[offline]
music_dir = "/srv/music"
shuffle = true
extensions = ["mp3"]
include_hidden = true

[ui]
header_text = "hello"
nudge_fraction = 0.05

[log]
file = "/tmp/swipetune.log"
level = "debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SWIPETUNE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SWIPETUNE__SESSION__LIKE_THRESHOLD");

    let s = Settings::load().unwrap();
    assert_eq!(s.api.base_url.as_deref(), Some("http://localhost:8000"));
    assert_eq!(s.api.token.as_deref(), Some("abc"));
    assert_eq!(s.api.timeout_ms, 2500);
    assert_eq!(s.session.like_threshold, 3);
    assert!((s.session.swipe_threshold - 0.4).abs() < f32::EPSILON);
    assert_eq!(s.session.initial_cards, 2);
    assert_eq!(
        s.session.seed_file,
        Some(std::path::PathBuf::from("/tmp/seed.json"))
    );
    assert!((s.audio.volume - 0.5).abs() < f32::EPSILON);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert_eq!(
        s.offline.music_dir,
        Some(std::path::PathBuf::from("/srv/music"))
    );
    assert!(s.offline.shuffle);
    assert_eq!(s.offline.extensions, vec!["mp3".to_string()]);
    assert!(s.offline.include_hidden);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.log.level, "debug");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[session]
like_threshold = 5
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SWIPETUNE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SWIPETUNE__SESSION__LIKE_THRESHOLD", "3");

    let s = Settings::load().unwrap();
    assert_eq!(s.session.like_threshold, 3);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("does-not-exist.toml");
    let _g1 = EnvGuard::set("SWIPETUNE_CONFIG_PATH", cfg_path.to_str().unwrap());

    let s = Settings::load().unwrap();
    assert_eq!(s.session.like_threshold, 5);
    assert!(s.api.base_url.is_none());
    assert_eq!(s.session.initial_cards, 3);
}

#[test]
fn validate_rejects_zero_like_threshold() {
    let mut s = Settings::default();
    s.session.like_threshold = 0;
    assert!(s.validate().is_err());
}

#[test]
fn validate_rejects_out_of_range_swipe_threshold() {
    let mut s = Settings::default();
    s.session.swipe_threshold = 0.0;
    assert!(s.validate().is_err());
    s.session.swipe_threshold = 1.5;
    assert!(s.validate().is_err());
    s.session.swipe_threshold = f32::NAN;
    assert!(s.validate().is_err());
    s.session.swipe_threshold = 1.0;
    assert!(s.validate().is_ok());
}

#[test]
fn default_settings_render_as_toml() {
    let text = Settings::default().to_toml().unwrap();
    assert!(text.contains("[session]"));
    assert!(text.contains("like_threshold = 5"));
}
