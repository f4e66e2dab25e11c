mod action;
mod app;
mod auth;
mod cache;
mod config;
mod container;
mod error;
mod event;
mod github;
mod install;
mod pagination;
mod privacy;
mod probe;
mod store;
mod tui;
mod types;
mod ui;
mod view;

use std::panic;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::event::Event;
use crate::tui::EventHandler;

/// GitHub issue and pull request columns in the terminal
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file (default: ~/.config/colview/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Column to show first
    #[arg(long)]
    column: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let config = Config::load(cli.config.as_deref());
    let credentials = auth::load_credentials(&config.auth);

    // Run the application
    let result = run(config, credentials, cli.column).await;

    // Restore terminal
    tui::restore()?;

    result
}

async fn run(
    config: Config,
    credentials: types::Credentials,
    start_column: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(config, credentials, action_tx.clone())?;
    if let Some(column_id) = start_column {
        match app.containers.iter().position(|c| c.column_id() == column_id) {
            Some(index) => app.column_index = index,
            None => tracing::warn!(%column_id, "unknown column, showing the first one"),
        }
    }

    // Initialize terminal
    let mut terminal = tui::init()?;

    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(render_rate);

    // Main loop
    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
