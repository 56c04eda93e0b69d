//! flashdrill - spaced repetition drill over a plain text deck file.
//!
//! Cards that keep being answered right drift to the back of the deck and are
//! skipped once they reach long-term memory; the rest come back first.

mod codec;
mod config;
mod console;
mod models;
mod scheduler;
mod session;
mod storage;
mod ui;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use config::Config;
use console::Console;
use session::{Outcome, Session};
use storage::DeckFile;
use ui::App;

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "flashdrill")]
#[command(author, version, about = "Spaced repetition flashcard drill", long_about = None)]
struct Args {
    /// Deck file to review; it is rewritten in review order on exit
    #[arg(required_unless_present = "template")]
    file: Option<PathBuf>,

    /// Print the deck file template and exit
    #[arg(short, long)]
    template: bool,

    /// Use the line-oriented console instead of the full-screen interface
    #[arg(short, long)]
    plain: bool,

    /// Theme for the full-screen interface
    #[arg(long)]
    theme: Option<String>,
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if args.template {
        print!("{}", codec::template());
        return Ok(());
    }
    let path = args.file.context("No deck file given")?;

    let mut config = Config::load().unwrap_or_else(|e| {
        log::warn!("Ignoring config: {:#}", e);
        Config::default()
    });
    if let Some(theme) = args.theme {
        config.theme = theme;
    }
    let full_screen =
        !(args.plain || config.plain) && io::stdin().is_terminal() && io::stdout().is_terminal();

    let session = Session::open(DeckFile::new(path.clone()), Utc::now())?;
    install_interrupt_handler(&session, full_screen)?;

    let result = if full_screen {
        run_tui(&session, config, &path)
    } else {
        run_console(&session, &config)
    };

    // progress is written back whatever way the review ended
    session
        .finalize(Utc::now())
        .context("Review progress could not be saved")?;
    let outcome = result?;
    log::info!("Review ended ({:?}) after {} cards", outcome, outcome.reviewed());

    Ok(())
}

/// Save and exit on SIGINT/SIGTERM, wherever the review currently is.
fn install_interrupt_handler(session: &Session, full_screen: bool) -> Result<()> {
    let session = session.clone();
    ctrlc::set_handler(move || {
        if full_screen {
            let _ = restore_terminal();
        }
        let code = match session.finalize(Utc::now()) {
            Ok(_) => 0,
            Err(e) => {
                eprintln!("Error: {:#}", anyhow::Error::from(e));
                1
            }
        };
        process::exit(code);
    })
    .context("Failed to install signal handler")
}

fn run_console(session: &Session, config: &Config) -> Result<Outcome> {
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout(), config.ansi_clear);
    session.run(&mut console, Utc::now())
}

fn run_tui(session: &Session, config: Config, path: &Path) -> Result<Outcome> {
    enable_raw_mode()?;
    with_restore(|| review_in_terminal(session, config, path), restore_terminal)
}

/// Run `body`, then `restore` whether `body` failed or not. An error from
/// `body` wins over one from `restore`.
fn with_restore<T>(
    body: impl FnOnce() -> Result<T>,
    restore: impl FnOnce() -> io::Result<()>,
) -> Result<T> {
    let result = body();
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

fn review_in_terminal(session: &Session, config: Config, path: &Path) -> Result<Outcome> {
    // Setup terminal
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    let title = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut app = App::new(terminal, config, title);

    let outcome = session.run(&mut app, Utc::now())?;
    app.finish(outcome)?;
    Ok(outcome)
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)
}
