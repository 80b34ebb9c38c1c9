//! # Chess Master — terminal chess with a rules engine
//!
//! Binary front end for the `chessmaster` library: an interactive
//! two-player board in the terminal, and a replay command that rebuilds
//! a game from its recorded move history.
//!
//! ## Usage
//!
//! ```bash
//! # Play a local two-player game
//! chessmaster play
//!
//! # Reproducible feedback remarks, German interface
//! chessmaster play --seed 42 --lang de
//!
//! # Replay a recorded history (one entry per line, e.g. "♙e2 to e4")
//! chessmaster replay game.txt
//!
//! # Replay from stdin and print the final state as JSON
//! cat game.txt | chessmaster replay - --json
//! ```
//!
//! Set `RUST_LOG=debug` to see rule decisions as they are made.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, BufReader, Read};

use chessmaster::feedback::CannedFeedback;
use chessmaster::game::{Game, GameOptions};
use chessmaster::{i18n, terminal};

/// Chess Master — a chess rules engine with a terminal board.
#[derive(Parser, Debug)]
#[command(name = "chessmaster")]
#[command(about = "Two-player chess in the terminal with full move validation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a chess game in the terminal (two-player).
    Play {
        /// Accept moves that leave your own king in check.
        #[arg(long)]
        allow_self_check: bool,

        /// Seed for the feedback remarks.
        #[arg(long)]
        seed: Option<u64>,

        /// Interface language (en, de).
        #[arg(long)]
        lang: Option<String>,
    },

    /// Replay a recorded move history and show the resulting position.
    Replay {
        /// History file with one entry per line, or `-` for stdin.
        path: String,

        /// Print the final game state as JSON instead of a board.
        #[arg(long)]
        json: bool,

        /// Accept moves that leave your own king in check.
        #[arg(long)]
        allow_self_check: bool,

        /// Interface language (en, de).
        #[arg(long)]
        lang: Option<String>,
    },
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            allow_self_check,
            seed,
            lang,
        } => {
            i18n::init_locale(lang.as_deref());
            let options = GameOptions { allow_self_check };
            let provider = seed.map(CannedFeedback::with_seed).unwrap_or_default();
            let game = Game::with_feedback_provider(options, Box::new(provider));
            log::info!("Starting terminal game {}", game.id);
            terminal::run_terminal_game(game)
        }
        Commands::Replay {
            path,
            json,
            allow_self_check,
            lang,
        } => {
            i18n::init_locale(lang.as_deref());
            run_replay(&path, json, GameOptions { allow_self_check })
        }
    }
}

/// Reads history entries from `path` (or stdin for `-`) and replays them.
fn run_replay(path: &str, json: bool, options: GameOptions) -> io::Result<()> {
    let reader: Box<dyn Read> = if path == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(std::fs::File::open(path)?)
    };

    let mut entries = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            entries.push(line);
        }
    }
    log::debug!("Read {} history entries from {}", entries.len(), path);

    let game = Game::replay(&entries, options)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if json {
        let text = serde_json::to_string_pretty(&game.snapshot()).map_err(io::Error::other)?;
        println!("{}", text);
    } else {
        terminal::print_board(&game, None);
        terminal::print_status(&game);
        terminal::print_history(&game);
        terminal::print_game_result(&game);
    }
    Ok(())
}
