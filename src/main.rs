use anyhow::Result;

use gtsearch::config::Config;
use gtsearch::tui::{self, EventHandler};
use gtsearch::{handler, logging, ui, App};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is best-effort; the UI runs without it
    let log_path = logging::init().ok();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "could not read config, using defaults");
            Config::new()
        }
    };
    tracing::info!(endpoint = config.endpoint(), log = ?log_path, "starting gtsearch");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, App::from_config(&config)).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, mut app: App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event),
            None => break,
        }

        app.poll_search().await;
    }

    tracing::info!(messages = app.transcript().len(), in_flight = app.in_flight(), "exiting");
    Ok(())
}
