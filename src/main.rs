//! Noor Al-Huda - Prayer times and a live countdown in the terminal
//!
//! Without a mode flag the program runs the interactive dashboard. The
//! `--once`, `--surahs`, `--surah` and `--tafsir` flags print a report and exit.

use std::io;
use std::panic;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use noorhuda::app::App;
use noorhuda::cli::{Cli, StartupConfig};
use noorhuda::countdown::{try_recv, CountdownHandle, MonotonicClock};
use noorhuda::logging::{self, LogTarget};
use noorhuda::{report, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let startup = match StartupConfig::from_cli(&cli) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let target = if startup.mode.is_interactive() {
        LogTarget::default_file()
    } else {
        LogTarget::Stderr
    };
    if let Err(e) = logging::init(&target) {
        eprintln!("Warning: {}", e);
    }

    if startup.mode.is_interactive() {
        return match run_dashboard(startup).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    match report::run(startup.mode, &startup.config, Local::now()).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "report failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_dashboard(startup: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&startup.config);
    let mut countdown = CountdownHandle::spawn(app.subscribe(), MonotonicClock::new());

    // Initial render to show loading state
    terminal.draw(|f| ui::render(f, &app))?;

    let result = loop {
        let today = Local::now().date_naive();
        if app.needs_reload(today) || app.refresh_requested {
            app.load_prayer_times(today).await;
        }

        while let Some(update) = try_recv(&mut countdown) {
            app.apply_update(update);
        }

        if let Err(e) = terminal.draw(|f| ui::render(f, &app)) {
            break Err(e);
        }

        // Poll for keyboard events with 100ms timeout
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => app.handle_key(key),
                Ok(_) => {}
                Err(e) => break Err(e),
            },
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    countdown.cancel().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result.map_err(Into::into)
}
