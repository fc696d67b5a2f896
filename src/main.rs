use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use four_in_a_row::ai::HeuristicAgent;
use four_in_a_row::config::AppConfig;
use four_in_a_row::game::Mark;
use four_in_a_row::session::{GameMode, GameSession};
use four_in_a_row::ui::App;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

/// Play 4x4 tic-tac-toe in the terminal.
#[derive(Parser)]
#[command(name = "four_in_a_row", about = "4x4 tic-tac-toe: get four in a row to win")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Game mode: pvp or pvc
    #[arg(long)]
    mode: Option<GameMode>,

    /// Mark the computer plays: X or O
    #[arg(long)]
    computer: Option<Mark>,

    /// Seed for the computer's random choices
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    if let Some(mode) = cli.mode {
        config.session.mode = mode;
    }
    if let Some(mark) = cli.computer {
        config.session.computer_mark = mark;
    }
    if cli.seed.is_some() {
        config.ai.seed = cli.seed;
    }

    let agent = HeuristicAgent::from_seed(config.ai.seed);
    let session = GameSession::new(&config.session, Box::new(agent));

    run(App::new(session)).context("terminal error")
}

fn run(mut app: App) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal even if the app failed
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res
}
