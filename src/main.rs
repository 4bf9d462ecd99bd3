//! Compliance Adventure
//!
//! Three short missions about responsible purchasing, played in the terminal.

use clap::Parser;
use compliance_adventure::game::{Catalog, Session, TracingSink};
use compliance_adventure::tui::App;
use compliance_adventure::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::OpenOptions;
use std::io::{stdout, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "compliance-adventure", version, about)]
struct Args {
    /// Load missions and departments from this TOML file instead of the built-in content
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Append logs to this file (controlled by RUST_LOG, default "info")
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Validate the catalog and exit without starting the game
    #[arg(long)]
    check: bool,
}

/// Raw mode + alternate screen, restored on drop
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        // The TUI owns stdout, so logs only go to a file
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };

    if args.check {
        println!(
            "Catalog OK: {} missions, {} departments, max score {}",
            catalog.len(),
            catalog.departments().len(),
            catalog.max_score()
        );
        return Ok(());
    }

    let session = Session::new(Arc::new(catalog)).with_sink(Arc::new(TracingSink));
    tracing::info!(session = %session.id(), version = compliance_adventure::VERSION, "starting");

    // Create app
    let mut app = App::new(session);

    {
        let mut terminal_session = TerminalSession::new()?;
        let terminal = &mut terminal_session.terminal;

        // Main loop
        while app.running {
            terminal.draw(|frame| app.render(frame))?;

            if !app.handle_input()? {
                break;
            }
        }
    }

    println!("\nThanks for playing Compliance Adventure!");
    if let Some(user) = app.session.user() {
        println!("{}: final score {}", user.name, app.session.score());
    }
    Ok(())
}
