//! Terminal interface for the Chess Master engine.
//!
//! This module provides a command-line board for two players sharing a
//! terminal. It supports:
//!
//! - Colored board display with Unicode pieces
//! - Move input as `e2e4` / `e2 e4`, or select-then-move by typing one
//!   square at a time
//! - Game state display (check, castling rights, en passant, move history)
//! - Feedback requests through the game's feedback provider

use colored::Colorize;
use std::io::{self, BufRead, Write};

use crate::game::{Game, MoveOutcome};
use crate::types::*;

/// Renders the board to the terminal with colors and piece symbols.
///
/// The board is displayed from White's perspective (rank 8 at top).
/// The selected square, if any, is highlighted.
pub fn print_board(game: &Game, selected: Option<Square>) {
    println!();
    println!("  +---+---+---+---+---+---+---+---+");

    for row in 0..8u8 {
        print!("{} ", 8 - row);
        for col in 0..8u8 {
            let sq = Square::at(row, col);
            let is_dark_square = (row + col) % 2 == 1;

            let mut cell = match game.board().get(sq) {
                Some(piece) => {
                    let symbol = piece.glyph().to_string();
                    if piece.color == Color::White {
                        symbol.white().bold()
                    } else {
                        symbol.blue().bold()
                    }
                }
                None if is_dark_square => "·".dimmed(),
                None => " ".normal(),
            };
            if selected == Some(sq) {
                cell = cell.on_yellow();
            }

            print!("| {} ", cell);
        }
        println!("|");
        println!("  +---+---+---+---+---+---+---+---+");
    }
    println!("    a   b   c   d   e   f   g   h");
    println!();
}

fn side_label(color: Color) -> colored::ColoredString {
    match color {
        Color::White => color.title().white().bold(),
        Color::Black => color.title().blue().bold(),
    }
}

/// Prints the game status bar (turn, check, castling rights, etc.).
pub fn print_status(game: &Game) {
    print!("{}", t!("terminal.turn_status", color = side_label(game.turn())));

    if game.is_check() {
        print!("  {}", t!("terminal.check").to_string().red().bold());
    }

    println!(
        "  {}",
        t!("terminal.legal_moves_count", count = game.legal_moves().len())
    );

    println!(
        "{}",
        t!("terminal.castling_info", rights = game.position().castling.summary())
    );

    if let Some(ep) = game.position().en_passant {
        println!("{}", t!("terminal.en_passant_info", square = ep));
    }

    if let Some(text) = game.last_feedback() {
        println!("{}", text.yellow());
    }

    println!();
}

/// Prints the game result when the game ends.
pub fn print_game_result(game: &Game) {
    if let Some(winner) = game.winner() {
        println!();
        println!("{}", "═══════════════════════════════════".yellow());
        println!("  {}", t!("terminal.game_over_label").to_string().yellow().bold());
        println!(
            "  {}",
            t!("terminal.result_label", winner = winner.title()).to_string().green().bold()
        );
        println!("{}", "═══════════════════════════════════".yellow());
        println!();
    }
}

/// Prints available commands in the terminal.
pub fn print_help() {
    println!("{}", t!("terminal.cmd_header").to_string().yellow().bold());
    println!("  {}      - {}", "e2e4".green(), t!("terminal.cmd_move"));
    println!("  {}        - {}", "e2".green(), t!("terminal.cmd_select"));
    println!("  {}     - {}", "moves".green(), t!("terminal.cmd_moves"));
    println!("  {}     - {}", "board".green(), t!("terminal.cmd_board"));
    println!("  {}   - {}", "history".green(), t!("terminal.cmd_history"));
    println!("  {}  - {}", "feedback".green(), t!("terminal.cmd_feedback"));
    println!("  {}      - {}", "json".green(), t!("terminal.cmd_json"));
    println!("  {}      - {}", "help".green(), t!("terminal.cmd_help"));
    println!("  {}      - {}", "quit".green(), t!("terminal.cmd_quit"));
    println!();
}

/// Prints the move history.
pub fn print_history(game: &Game) {
    if game.history_records().is_empty() {
        println!("{}", t!("terminal.no_moves_yet"));
        return;
    }

    println!("{}", t!("terminal.move_history_label").to_string().yellow().bold());
    for record in game.history_records() {
        println!("  {}. {}", record.ply, record.notation);
    }
    println!();
}

/// Prints every legal move of the side to move.
pub fn print_legal_moves(game: &Game) {
    let moves = game.legal_moves();
    println!(
        "{} {}",
        t!("terminal.legal_moves_header").to_string().yellow().bold(),
        t!("terminal.moves_count", count = moves.len())
    );
    for (i, (from, to)) in moves.iter().enumerate() {
        if i > 0 && i % 8 == 0 {
            println!();
        }
        print!("  {}", format!("{}{}", from, to).green());
    }
    println!();
    println!();
}

// ---------------------------------------------------------------------------
// Input handling
// ---------------------------------------------------------------------------

/// A parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Quit,
    Help,
    Board,
    Moves,
    History,
    Json,
    Feedback(Option<String>),
    Square(Square),
    Move(Square, Square),
    Unknown(String),
}

/// Parses one line of input.
///
/// Accepts formats:
/// - `e2e4` / `e2 e4`: a complete move
/// - `e2`: a single square (select, or complete a pending selection)
/// - `feedback <hint>`: feedback request, the hint keeps its case
/// - the keyword commands listed by [`print_help`]
fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (trimmed, ""),
    };

    match word.to_lowercase().as_str() {
        "quit" | "exit" | "q" => return Command::Quit,
        "help" | "h" | "?" => return Command::Help,
        "board" | "b" => return Command::Board,
        "moves" | "m" => return Command::Moves,
        "history" => return Command::History,
        "json" | "j" => return Command::Json,
        "feedback" | "f" => {
            let hint = (!rest.is_empty()).then(|| rest.to_string());
            return Command::Feedback(hint);
        }
        _ => {}
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    match compact.len() {
        _ if !compact.is_ascii() => None,
        2 => Square::from_algebraic(&compact).map(Command::Square),
        4 => Square::from_algebraic(&compact[0..2])
            .zip(Square::from_algebraic(&compact[2..4]))
            .map(|(from, to)| Command::Move(from, to)),
        _ => None,
    }
    .unwrap_or_else(|| Command::Unknown(trimmed.to_string()))
}

/// Result of typing a single square.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Click {
    /// A piece was selected; these are its destinations.
    Selected(Square, Vec<Square>),
    /// A pending selection was turned into a move proposal.
    Proposed(MoveOutcome),
    /// Empty square with nothing selected.
    Ignored,
}

/// Select-then-move flow: the first square picks a piece, the second
/// proposes the move. The selection is cleared after every proposal,
/// accepted or not.
fn click(game: &mut Game, selected: &mut Option<Square>, sq: Square) -> Click {
    if let Some(from) = selected.take() {
        return Click::Proposed(game.propose_move(from, sq));
    }
    if game.board().get(sq).is_some() {
        *selected = Some(sq);
        return Click::Selected(sq, game.legal_destinations(sq));
    }
    Click::Ignored
}

/// Space-separated destination squares, e.g. `f3 h3`.
fn destination_list(dests: &[Square]) -> String {
    dests
        .iter()
        .map(|s| s.to_algebraic())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prints the result of a proposal.
fn report_outcome(game: &Game, outcome: &MoveOutcome) {
    match outcome.rejection {
        Some(reason) => println!(
            "{}: {}. {}",
            t!("terminal.illegal_move").to_string().red().bold(),
            reason,
            t!("terminal.selection_cleared")
        ),
        None => {
            print_board(game, None);
            print_status(game);
        }
    }
}

/// Runs the interactive terminal chess game on stdin/stdout.
///
/// Two players alternate entering moves. The game continues until
/// checkmate or until a player quits.
pub fn run_terminal_game(mut game: Game) -> io::Result<()> {
    println!();
    println!("{}", "╔═══════════════════════════════════════╗".cyan());
    println!("{}", format!("  {}", t!("terminal.banner_title")).cyan().bold());
    println!("{}", format!("  {}", t!("terminal.banner_subtitle")).cyan());
    println!("{}", "╚═══════════════════════════════════════╝".cyan());
    println!();

    log::info!("Game {}: terminal session started", game.id);

    print_help();
    print_board(&game, None);
    print_status(&game);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut selected: Option<Square> = None;

    loop {
        if game.is_over() {
            print_game_result(&game);
            break;
        }

        print!("{} > ", side_label(game.turn()));
        io::stdout().flush()?;

        let input = match lines.next() {
            None => break,
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                log::warn!("Failed to read input: {}", e);
                println!("{}", t!("terminal.input_error"));
                break;
            }
        };
        if input.trim().is_empty() {
            continue;
        }

        match parse_command(&input) {
            Command::Quit => {
                println!("{}", t!("terminal.goodbye"));
                break;
            }
            Command::Help => print_help(),
            Command::Board => {
                print_board(&game, selected);
                print_status(&game);
            }
            Command::Moves => print_legal_moves(&game),
            Command::History => print_history(&game),
            Command::Json => match serde_json::to_string_pretty(&game.snapshot()) {
                Ok(json) => println!("{}\n", json),
                Err(e) => println!("{}: {}", t!("terminal.error_label").to_string().red().bold(), e),
            },
            Command::Feedback(hint) => {
                let remark = game.request_feedback(hint.as_deref());
                println!("{} {}", t!("terminal.feedback_label").to_string().yellow().bold(), remark);
                println!();
            }
            Command::Move(from, to) => {
                selected = None;
                let outcome = game.propose_move(from, to);
                report_outcome(&game, &outcome);
            }
            Command::Square(sq) => match click(&mut game, &mut selected, sq) {
                Click::Selected(sq, dests) if dests.is_empty() => {
                    println!("{}", t!("terminal.no_destinations", square = sq));
                }
                Click::Selected(sq, dests) => {
                    print_board(&game, Some(sq));
                    println!(
                        "{}",
                        t!("terminal.selected", square = sq, moves = destination_list(&dests))
                    );
                }
                Click::Proposed(outcome) => report_outcome(&game, &outcome),
                Click::Ignored => {}
            },
            Command::Unknown(cmd) => {
                println!(
                    "{}",
                    t!("terminal.unknown_cmd_hint", cmd = cmd, help = "help".green())
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Rejection;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn test_parse_move_normal() {
        assert_eq!(parse_command("e2e4"), Command::Move(sq("e2"), sq("e4")));
    }

    #[test]
    fn test_parse_move_with_space() {
        assert_eq!(parse_command(" E2 e4 "), Command::Move(sq("e2"), sq("e4")));
    }

    #[test]
    fn test_parse_single_square() {
        assert_eq!(parse_command("g1"), Command::Square(sq("g1")));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command("Q"), Command::Quit);
        assert_eq!(parse_command("moves"), Command::Moves);
        assert_eq!(parse_command("feedback"), Command::Feedback(None));
        assert_eq!(
            parse_command("feedback Is my King safe?"),
            Command::Feedback(Some("Is my King safe?".to_string()))
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse_command("abc"), Command::Unknown(_)));
        assert!(matches!(parse_command("z9z9"), Command::Unknown(_)));
        assert!(matches!(parse_command("e2e4x"), Command::Unknown(_)));
    }

    #[test]
    fn test_click_select_then_move() {
        let mut game = Game::new();
        let mut selected = None;

        match click(&mut game, &mut selected, sq("g1")) {
            Click::Selected(from, dests) => {
                assert_eq!(from, sq("g1"));
                assert_eq!(dests, vec![sq("f3"), sq("h3")]);
            }
            other => panic!("expected selection, got {:?}", other),
        }
        assert_eq!(selected, Some(sq("g1")));

        match click(&mut game, &mut selected, sq("f3")) {
            Click::Proposed(outcome) => assert!(outcome.accepted),
            other => panic!("expected proposal, got {:?}", other),
        }
        assert_eq!(selected, None);
        assert_eq!(game.turn(), Color::Black);
    }

    #[test]
    fn test_destination_list() {
        let mut game = Game::new();
        let mut selected = None;
        match click(&mut game, &mut selected, sq("b1")) {
            Click::Selected(_, dests) => assert_eq!(destination_list(&dests), "a3 c3"),
            other => panic!("expected selection, got {:?}", other),
        }
        assert_eq!(destination_list(&[]), "");
    }

    #[test]
    fn test_click_rejection_clears_selection() {
        let mut game = Game::new();
        let mut selected = None;
        click(&mut game, &mut selected, sq("e7"));
        match click(&mut game, &mut selected, sq("e5")) {
            Click::Proposed(outcome) => {
                assert_eq!(outcome.rejection, Some(Rejection::NotYourTurn));
            }
            other => panic!("expected proposal, got {:?}", other),
        }
        assert_eq!(selected, None);
        assert_eq!(click(&mut game, &mut selected, sq("e4")), Click::Ignored);
    }
}
