use crate::config;

/// Loaded and validated settings. The logger is not up yet at this point,
/// so problems go to stderr before the TUI takes the terminal.
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("swipetune: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("swipetune: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
