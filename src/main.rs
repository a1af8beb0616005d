use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod ai;
mod app;
mod autopilot;
mod config;
mod db;
mod error;
mod models;
mod tui;

use ai::GeminiGenerator;
use app::App;
use autopilot::{Autopilot, SharedActivityLog};
use config::Config;
use db::Repository;
use error::{AppError, Result};
use tui::{draw, handle_key_event};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Check for --import flag
    let import_path = if args.len() >= 3 && args[1] == "--import" {
        Some(PathBuf::from(&args[2]))
    } else {
        None
    };

    // Check for --autopilot flag (headless processing)
    let headless_autopilot = args.len() >= 2 && args[1] == "--autopilot";

    // The UI only shows warnings and errors, headless mode also reports progress
    let default_level = if headless_autopilot {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Config::load()?;

    // If import path provided, import drafts and exit
    if let Some(path) = import_path {
        let repository = Repository::new(&config.db_path).await?;
        let count = repository.import_drafts(&path).await?;
        println!("Imported {} drafts from {:?}", count, path);
        return Ok(());
    }

    if headless_autopilot {
        return run_headless(&config).await;
    }

    // Initialize app
    let mut app = App::new(&config).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    if let Some(autopilot) = app.autopilot.as_mut() {
        autopilot.stop();
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Poll for completed on-demand generation
        app.poll_generation_result();

        // Pick up items published by the autopilot
        app.poll_item_updates();

        // Poll for events with timeout to allow async operations
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(key, app.input_mode()) {
                        let should_quit = app.handle_action(action).await?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// Process the draft queue without the UI until Ctrl-C.
async fn run_headless(config: &Config) -> Result<()> {
    let Some(api_key) = config.gemini_api_key.clone() else {
        return Err(AppError::Config(format!(
            "autopilot needs a Gemini API key (set GEMINI_API_KEY or edit {})",
            Config::config_path().display()
        )));
    };

    let repository = Repository::new(&config.db_path).await?;
    let generator = GeminiGenerator::new(api_key, config.gemini_model.clone())?;

    let mut autopilot = Autopilot::new(
        Arc::new(repository),
        Arc::new(generator),
        SharedActivityLog::new(config.activity_log_capacity),
        config.autopilot_interval(),
    );

    autopilot.start();
    tokio::signal::ctrl_c().await?;
    autopilot.stop();

    // Let a draft that is mid-generation reach the store before exiting
    tracing::info!("waiting for the running attempt to finish");
    autopilot.wait_idle().await;

    Ok(())
}
