use std::fs::{self, OpenOptions};
use std::io;

use env_logger::{Builder, Env, Target};

use crate::config::LogSettings;

/// Where log records go while the TUI owns the terminal.
#[derive(Debug, PartialEq, Eq)]
enum Sink {
    File,
    Stderr,
    Off,
}

fn choose_sink(settings: &LogSettings, rust_log_set: bool) -> Sink {
    if settings.file.is_some() {
        Sink::File
    } else if rust_log_set {
        Sink::Stderr
    } else {
        Sink::Off
    }
}

/// Install the global logger. Call once, before anything logs.
pub fn init(settings: &LogSettings) -> io::Result<()> {
    let env = Env::default().default_filter_or(format!("swipetune={}", settings.level));
    let mut builder = Builder::from_env(env);

    match choose_sink(settings, std::env::var_os("RUST_LOG").is_some()) {
        Sink::File => {
            if let Some(path) = settings.file.as_deref() {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                builder.target(Target::Pipe(Box::new(file)));
            }
        }
        Sink::Stderr => {
            builder.target(Target::Stderr);
        }
        Sink::Off => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }

    // A second init (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
    Ok(())
}
