use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;

use makao_cli::config::GameConfig;
use makao_cli::logging::init_logging;
use makao_cli::render;
use makao_cli::session::Session;

/// Makao card game for the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "makao",
    author,
    version,
    about = "Play Makao against automated opponents"
)]
struct Cli {
    /// Optional YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Your name at the table.
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Number of automated opponents (1 to 3).
    #[arg(long, value_name = "COUNT")]
    opponents: Option<usize>,

    /// Seed for the shuffle; a random one is picked when omitted.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Stop the game after this many turns.
    #[arg(long, value_name = "TURNS")]
    max_turns: Option<u64>,

    /// Let a bot take your seat and print the game as it unfolds.
    #[arg(long)]
    autoplay: bool,

    /// Bot difficulty: easy or normal.
    #[arg(long, value_name = "LEVEL")]
    difficulty: Option<String>,

    /// Tracing level (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Exit after validating the configuration (no game is played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_ref() {
        Some(path) => GameConfig::from_path(path)?,
        None => GameConfig::default(),
    };

    if let Some(name) = cli.name {
        config.player_name = name;
    }

    if let Some(opponents) = cli.opponents {
        config.opponents = opponents;
    }

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    if let Some(max_turns) = cli.max_turns {
        config.max_turns = max_turns;
    }

    if cli.autoplay {
        config.autoplay = true;
    }

    if let Some(difficulty) = cli.difficulty {
        config.difficulty = Some(difficulty);
    }

    if let Some(level) = cli.log_level {
        config.logging.tracing_level = level;
    }

    config.validate()?;

    if cli.validate_only {
        println!(
            "Configuration is valid: {} against {} opponent{}",
            config.player_name,
            config.opponents,
            if config.opponents == 1 { "" } else { "s" }
        );
        return Ok(());
    }

    let _logging_guard = init_logging(&config.logging)?;
    let seed = config.seed.unwrap_or_else(rand::random);

    let mut session = if config.autoplay {
        Session::autoplay(&config, seed)?
    } else {
        Session::interactive(&config, seed, io::stdin().lock(), io::stdout())?
    };

    let mut stdout = io::stdout();
    writeln!(stdout, "Dealing with seed {seed}")?;
    let summary = session.run(&mut stdout)?;
    if summary.input_closed {
        writeln!(stdout)?;
        writeln!(stdout, "Input closed, leaving the table.")?;
    }
    write!(stdout, "{}", render::ranking(&summary.result, session.names()))?;

    Ok(())
}
