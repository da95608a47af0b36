use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::logging;
use crate::session::SessionHandle;

mod event_loop;
mod settings;
mod startup;

/// `swipetune [--print-config] [SEED.json]`
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let settings = settings::load_settings();

    if args.iter().any(|a| a == "--print-config") {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    logging::init(&settings.log)?;

    let seed_path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .or_else(|| settings.session.seed_file.clone());

    let startup = startup::prepare(&settings, seed_path.as_deref())?;
    let player = AudioPlayer::with_rodio(&settings.audio)?;
    let recommender = startup.recommender;
    let session = SessionHandle::spawn(
        startup.tracks,
        settings.session.like_threshold,
        recommender.clone(),
        player,
        Duration::from_millis(settings.api.timeout_ms),
    )?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let width = terminal.size()?.width;
        let mut app = App::new(&settings, session.snapshot(), f32::from(width));

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            event_loop::Stage::Swiping(session),
            &recommender,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
