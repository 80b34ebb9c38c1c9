//! Game session management for the Chess Master engine.
//!
//! This module owns a single game: it validates proposed moves against
//! turn and ownership, applies them through the rules core, maintains
//! the special-move state and the move history, and recomputes check and
//! checkmate for the side about to move. It is the only mutating entry
//! point; presentation code reads snapshots and dispatches intents.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::error::ChessError;
use crate::feedback::{CannedFeedback, FeedbackProvider};
use crate::movegen::{self, AppliedMove};
use crate::types::*;

// ---------------------------------------------------------------------------
// Options, records and outcomes
// ---------------------------------------------------------------------------

/// Rule options for a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GameOptions {
    /// Accept moves that leave the mover's own king attacked.
    ///
    /// Off by default. Turning it on checks piece geometry only, so a move
    /// may expose the mover's king. The exposed king is still never
    /// captured: a move onto it is refused with [`Rejection::KingCapture`].
    pub allow_self_check: bool,
}

/// Why a proposed move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The game already ended in checkmate.
    GameOver,
    /// There is no piece on the origin square.
    EmptySquare,
    /// The piece belongs to the side not on move.
    NotYourTurn,
    /// The piece cannot move that way.
    IllegalMove,
    /// The move would leave the mover's own king in check.
    LeavesKingInCheck,
    /// The destination holds the opposing king.
    KingCapture,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::GameOver => t!("rejection.game_over"),
            Rejection::EmptySquare => t!("rejection.empty_square"),
            Rejection::NotYourTurn => t!("rejection.not_your_turn"),
            Rejection::IllegalMove => t!("rejection.illegal_move"),
            Rejection::LeavesKingInCheck => t!("rejection.leaves_king_in_check"),
            Rejection::KingCapture => t!("rejection.king_capture"),
        };
        f.write_str(&text)
    }
}

/// A record of a single move in the game history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    /// 1-based position of the move in the history.
    pub ply: usize,
    /// Which side made the move.
    pub side: Color,
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    /// History notation, e.g. `♘g1 to f3`.
    pub notation: String,
}

/// Result of [`Game::propose_move`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub accepted: bool,
    /// Whether the side to move is in check after this call.
    pub check: bool,
    /// Whether the side to move is checkmated after this call.
    pub checkmate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_entry: Option<String>,
    /// Status text for the player ("… is in check!", "Checkmate! …").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
}

/// Read-only, serializable view of a game.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub game_id: Uuid,
    /// Map of occupied squares. Key = square name (e.g. "e4"), value = FEN letter.
    pub board: BTreeMap<String, String>,
    pub turn: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub check: bool,
    pub checkmate: bool,
    pub winner: Option<Color>,
    pub move_history: Vec<String>,
}

// ---------------------------------------------------------------------------
// Game struct
// ---------------------------------------------------------------------------

/// A chess game with full state and history tracking.
///
/// Moves are validated and applied one at a time. When a game is shared
/// between threads it must sit behind a `Mutex` so that validation and
/// application of a move happen as one critical section.
pub struct Game {
    /// Unique identifier, used to tag log lines and snapshots.
    pub id: Uuid,
    position: Position,
    options: GameOptions,
    check: bool,
    checkmate: bool,
    history: Vec<MoveRecord>,
    feedback_text: Option<String>,
    feedback: Box<dyn FeedbackProvider>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("options", &self.options)
            .field("check", &self.check)
            .field("checkmate", &self.checkmate)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game from the standard starting position.
    pub fn new() -> Self {
        Self::with_options(GameOptions::default())
    }

    pub fn with_options(options: GameOptions) -> Self {
        Self::with_feedback_provider(options, Box::new(CannedFeedback::default()))
    }

    /// Creates a new game that answers feedback requests with `provider`.
    pub fn with_feedback_provider(options: GameOptions, provider: Box<dyn FeedbackProvider>) -> Self {
        Self::from_position(Position::new(), options, provider)
    }

    /// Starts a game from an arbitrary (already validated) position.
    pub fn from_position(
        position: Position,
        options: GameOptions,
        provider: Box<dyn FeedbackProvider>,
    ) -> Self {
        let mut game = Self {
            id: Uuid::new_v4(),
            position,
            options,
            check: false,
            checkmate: false,
            history: Vec::new(),
            feedback_text: None,
            feedback: provider,
        };
        game.refresh_status();
        game
    }

    /// Rebuilds a game by replaying history entries in order.
    ///
    /// Every entry must parse, name the piece actually standing on its
    /// origin square, and be accepted by [`Game::propose_move`].
    pub fn replay<I, S>(entries: I, options: GameOptions) -> Result<Self, ChessError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut game = Self::with_options(options);
        for (i, entry) in entries.into_iter().enumerate() {
            let entry = entry.as_ref();
            let (piece, from, to) = parse_history_entry(entry)?;
            let rejected = |reason: String| ChessError::ReplayRejected {
                index: i + 1,
                entry: entry.to_string(),
                reason,
            };

            if game.position.board.get(from) != Some(piece) {
                return Err(rejected(format!("{} is not on {}", piece.glyph(), from)));
            }
            let outcome = game.propose_move(from, to);
            if let Some(reason) = outcome.rejection {
                return Err(rejected(reason.to_string()));
            }
        }
        log::info!("Game {}: replayed {} moves", game.id, game.history.len());
        Ok(game)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn board(&self) -> &Board {
        &self.position.board
    }

    pub fn turn(&self) -> Color {
        self.position.turn
    }

    pub fn options(&self) -> GameOptions {
        self.options
    }

    /// Whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.check
    }

    pub fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    /// Returns `true` once checkmate has been reached; no further moves are accepted.
    pub fn is_over(&self) -> bool {
        self.checkmate
    }

    /// The side that delivered checkmate, if any.
    pub fn winner(&self) -> Option<Color> {
        self.checkmate.then(|| self.position.turn.opponent())
    }

    /// The move history as notation strings, oldest first.
    pub fn move_history(&self) -> Vec<&str> {
        self.history.iter().map(|r| r.notation.as_str()).collect()
    }

    pub fn history_records(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Last status or feedback text shown to the players.
    pub fn last_feedback(&self) -> Option<&str> {
        self.feedback_text.as_deref()
    }

    /// Every square the piece on `from` could move to right now.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        Square::all()
            .filter(|&to| self.validate(from, to).is_ok())
            .collect()
    }

    /// Every move the side to move could make right now.
    pub fn legal_moves(&self) -> Vec<(Square, Square)> {
        self.position
            .board
            .pieces_of(self.position.turn)
            .flat_map(|(from, _)| {
                self.legal_destinations(from)
                    .into_iter()
                    .map(move |to| (from, to))
            })
            .collect()
    }

    /// Returns the current game state as a serializable snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_id: self.id,
            board: self.position.board.to_map(),
            turn: self.position.turn,
            castling: self.position.castling,
            en_passant: self.position.en_passant,
            check: self.check,
            checkmate: self.checkmate,
            winner: self.winner(),
            move_history: self.history.iter().map(|r| r.notation.clone()).collect(),
        }
    }

    /// Asks the feedback provider for a remark on the current position.
    pub fn request_feedback(&mut self, hint: Option<&str>) -> String {
        let hint = hint.map(str::trim).filter(|h| !h.is_empty());
        let remark = self.feedback.request_feedback(&self.position, hint);
        self.feedback_text = Some(remark.clone());
        remark
    }

    /// Checks turn, ownership, piece legality and king safety.
    fn validate(&self, from: Square, to: Square) -> Result<Piece, Rejection> {
        if self.checkmate {
            return Err(Rejection::GameOver);
        }
        let piece = self.position.board.get(from).ok_or(Rejection::EmptySquare)?;
        if piece.color != self.position.turn {
            return Err(Rejection::NotYourTurn);
        }
        if let Some(target) = self.position.board.get(to)
            && target.kind == PieceKind::King
            && target.color != piece.color
        {
            return Err(Rejection::KingCapture);
        }
        if !movegen::is_legal(&self.position, from, to) {
            return Err(Rejection::IllegalMove);
        }
        if !self.options.allow_self_check
            && movegen::leaves_king_in_check(&self.position, from, to, piece.color)
        {
            return Err(Rejection::LeavesKingInCheck);
        }
        Ok(piece)
    }

    /// Proposes a move for the side to move.
    ///
    /// An accepted move is applied, recorded in the history and hands the
    /// turn to the opponent. A rejected move changes nothing.
    pub fn propose_move(&mut self, from: Square, to: Square) -> MoveOutcome {
        if let Err(reason) = self.validate(from, to) {
            log::debug!("Game {}: rejected {}{} ({:?})", self.id, from, to, reason);
            return self.rejected(reason);
        }

        let mover = self.position.turn;
        let applied = match movegen::apply_move_to_board(
            &mut self.position.board,
            from,
            to,
            self.position.en_passant,
        ) {
            Some(applied) => applied,
            None => return self.rejected(Rejection::EmptySquare),
        };

        // En passant target only lives for the very next move
        self.position.en_passant = if applied.is_double_pawn_push() {
            from.offset(mover.pawn_direction(), 0)
        } else {
            None
        };

        self.update_castling_rights(&applied);

        let notation = applied.notation();
        self.history.push(MoveRecord {
            ply: self.history.len() + 1,
            side: mover,
            piece: applied.piece,
            from,
            to,
            notation: notation.clone(),
        });

        self.position.turn = mover.opponent();
        self.refresh_status();

        log::info!("Game {}: {} played {}", self.id, mover, notation);
        if self.checkmate {
            log::info!("Game {}: checkmate, {} wins", self.id, mover);
        } else if self.check {
            log::info!("Game {}: {} is in check", self.id, self.position.turn);
        }

        MoveOutcome {
            accepted: true,
            check: self.check,
            checkmate: self.checkmate,
            history_entry: Some(notation),
            feedback: self.feedback_text.clone(),
            rejection: None,
        }
    }

    fn rejected(&self, reason: Rejection) -> MoveOutcome {
        MoveOutcome {
            accepted: false,
            check: self.check,
            checkmate: self.checkmate,
            history_entry: None,
            feedback: None,
            rejection: Some(reason),
        }
    }

    /// Recomputes check, checkmate and the status text for the side to move.
    fn refresh_status(&mut self) {
        let side = self.position.turn;
        self.check = movegen::is_king_in_check(&self.position.board, side);
        self.checkmate = self.check && movegen::is_checkmate(&self.position, side);

        self.feedback_text = if self.checkmate {
            Some(t!("status.checkmate", winner = side.opponent().title()).to_string())
        } else if self.check {
            Some(t!("status.check", side = side.title()).to_string())
        } else {
            None
        };
    }

    /// Updates castling rights after a move.
    fn update_castling_rights(&mut self, applied: &AppliedMove) {
        // Any king move, castling included, loses both rights for that side
        if applied.piece.kind == PieceKind::King {
            *self.position.castling.for_color_mut(applied.piece.color) = SideCastlingRights::none();
        }

        // A rook leaving its corner, or being captured there, kills that wing
        let clear_corner = |sq: Square, castling: &mut CastlingRights| {
            for color in [Color::White, Color::Black] {
                let row = color.back_row();
                let rights = castling.for_color_mut(color);
                if sq == Square::at(row, 7) {
                    rights.kingside = false;
                }
                if sq == Square::at(row, 0) {
                    rights.queenside = false;
                }
            }
        };

        clear_corner(applied.from, &mut self.position.castling);
        clear_corner(applied.to, &mut self.position.castling);
    }
}

// ---------------------------------------------------------------------------
// History notation parsing
// ---------------------------------------------------------------------------

/// Parses a history entry such as `♙e2 to e4` (optionally prefixed with a
/// move number like `3. `) into the piece and its origin and destination.
pub fn parse_history_entry(entry: &str) -> Result<(Piece, Square, Square), ChessError> {
    let invalid = || ChessError::InvalidNotation(entry.to_string());

    let body = strip_move_number(entry.trim());
    let mut chars = body.chars();
    let piece = chars.next().and_then(Piece::from_glyph).ok_or_else(invalid)?;
    let (from, to) = chars.as_str().split_once(" to ").ok_or_else(invalid)?;
    let from = Square::from_algebraic(from.trim()).ok_or_else(invalid)?;
    let to = Square::from_algebraic(to.trim()).ok_or_else(invalid)?;
    Ok((piece, from, to))
}

fn strip_move_number(s: &str) -> &str {
    match s.split_once(". ") {
        Some((n, rest)) if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => s,
    }
}
