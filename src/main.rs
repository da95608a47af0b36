mod app;
mod audio;
mod client;
mod config;
mod gesture;
mod library;
mod logging;
mod playlist;
mod runtime;
mod session;
mod track;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
