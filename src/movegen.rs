//! Move legality and attack detection for the Chess Master engine.
//!
//! This module implements the rules core:
//!
//! - Per-piece move legality (geometry, obstruction, captures)
//! - Castling (rights, empty path, unattacked king path)
//! - En passant captures
//! - Attack and check detection
//! - Checkmate detection by exhaustive escape search
//! - Applying a move to a board (piece relocation, rook hop, captured pawn removal)
//!
//! Legality here is piece-type legality only. Whose turn it is, and
//! whether a move leaves the mover's own king in check, are decided by
//! the caller (see [`crate::game::Game::propose_move`]).

use crate::types::*;

// ---------------------------------------------------------------------------
// Castling geometry
// ---------------------------------------------------------------------------

/// Which wing a castling move goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleWing {
    Kingside,
    Queenside,
}

impl CastleWing {
    /// Maps a king destination column to a wing (g-file or c-file).
    fn for_king_destination(col: u8) -> Option<Self> {
        match col {
            6 => Some(CastleWing::Kingside),
            2 => Some(CastleWing::Queenside),
            _ => None,
        }
    }

    fn rook_from_col(self) -> u8 {
        match self {
            CastleWing::Kingside => 7,
            CastleWing::Queenside => 0,
        }
    }

    fn rook_to_col(self) -> u8 {
        match self {
            CastleWing::Kingside => 5,
            CastleWing::Queenside => 3,
        }
    }

    /// Columns that must be empty between king and rook.
    fn between_cols(self) -> &'static [u8] {
        match self {
            CastleWing::Kingside => &[5, 6],
            CastleWing::Queenside => &[1, 2, 3],
        }
    }

    /// Columns the king starts on, crosses, and lands on.
    fn king_path_cols(self) -> &'static [u8] {
        match self {
            CastleWing::Kingside => &[4, 5, 6],
            CastleWing::Queenside => &[4, 3, 2],
        }
    }

    fn allowed_by(self, rights: &SideCastlingRights) -> bool {
        match self {
            CastleWing::Kingside => rights.kingside,
            CastleWing::Queenside => rights.queenside,
        }
    }
}

const KING_HOME_COL: u8 = 4;

// ---------------------------------------------------------------------------
// Move legality
// ---------------------------------------------------------------------------

/// Returns `true` if the piece on `from` may move to `to` by its own rules.
///
/// `from == to`, an empty origin, and a destination holding a piece of the
/// mover's own color are never legal. Neither is a destination holding a
/// king: kings are attacked, never captured.
pub fn is_legal(pos: &Position, from: Square, to: Square) -> bool {
    if from == to {
        return false;
    }
    let piece = match pos.board.get(from) {
        Some(p) => p,
        None => return false,
    };
    if let Some(target) = pos.board.get(to)
        && (target.color == piece.color || target.kind == PieceKind::King)
    {
        return false;
    }

    match piece.kind {
        PieceKind::Pawn => pawn_move_is_legal(pos, from, to, piece.color),
        PieceKind::King => {
            reaches(&pos.board, piece, from, to) || castling_is_legal(pos, from, to, piece.color)
        }
        _ => reaches(&pos.board, piece, from, to),
    }
}

/// Capture geometry shared by move legality and attack detection.
///
/// Pawns reach their two forward diagonals regardless of occupancy and
/// kings reach adjacent squares only; pushes and castling are handled
/// by [`is_legal`].
fn reaches(board: &Board, piece: Piece, from: Square, to: Square) -> bool {
    let drow = to.row() as i8 - from.row() as i8;
    let dcol = to.col() as i8 - from.col() as i8;
    let (adr, adc) = (drow.abs(), dcol.abs());

    match piece.kind {
        PieceKind::Pawn => drow == piece.color.pawn_direction() && adc == 1,
        PieceKind::Knight => (adr == 1 && adc == 2) || (adr == 2 && adc == 1),
        PieceKind::Bishop => adr == adc && path_is_clear(board, from, to),
        PieceKind::Rook => (drow == 0 || dcol == 0) && path_is_clear(board, from, to),
        PieceKind::Queen => {
            (drow == 0 || dcol == 0 || adr == adc) && path_is_clear(board, from, to)
        }
        PieceKind::King => adr <= 1 && adc <= 1,
    }
}

/// Walks unit steps strictly between `from` and `to`; any piece blocks.
///
/// Only meaningful for distinct squares on a shared row, column or diagonal.
fn path_is_clear(board: &Board, from: Square, to: Square) -> bool {
    let step_row = (to.row() as i8 - from.row() as i8).signum();
    let step_col = (to.col() as i8 - from.col() as i8).signum();

    let mut cur = from;
    loop {
        match cur.offset(step_row, step_col) {
            None => return false,
            Some(next) if next == to => return true,
            Some(next) => {
                if board.get(next).is_some() {
                    return false;
                }
                cur = next;
            }
        }
    }
}

fn pawn_move_is_legal(pos: &Position, from: Square, to: Square, color: Color) -> bool {
    let board = &pos.board;
    let dir = color.pawn_direction();
    let drow = to.row() as i8 - from.row() as i8;
    let dcol = to.col() as i8 - from.col() as i8;

    if dcol == 0 {
        // Single step forward
        if drow == dir {
            return board.get(to).is_none();
        }
        // Double step from the starting row
        if drow == 2 * dir && from.row() == color.pawn_start_row() {
            let mid_empty = from
                .offset(dir, 0)
                .is_some_and(|mid| board.get(mid).is_none());
            return mid_empty && board.get(to).is_none();
        }
        return false;
    }

    // Diagonal capture, normal or en passant
    drow == dir
        && dcol.abs() == 1
        && (matches!(board.get(to), Some(target) if target.color != color)
            || pos.en_passant == Some(to))
}

fn castling_is_legal(pos: &Position, from: Square, to: Square, color: Color) -> bool {
    let row = color.back_row();
    if from != Square::at(row, KING_HOME_COL) || to.row() != row {
        return false;
    }
    let wing = match CastleWing::for_king_destination(to.col()) {
        Some(w) => w,
        None => return false,
    };
    if !wing.allowed_by(pos.castling.for_color(color)) {
        return false;
    }

    let board = &pos.board;

    // Rook must still be on its corner
    let rook_present = board.get(Square::at(row, wing.rook_from_col()))
        == Some(Piece::new(PieceKind::Rook, color));

    // Squares between king and rook must be empty
    let path_clear = wing
        .between_cols()
        .iter()
        .all(|&col| board.get(Square::at(row, col)).is_none());

    // King may not start on, cross, or land on an attacked square
    let safe = wing
        .king_path_cols()
        .iter()
        .all(|&col| !is_square_attacked(board, Square::at(row, col), color.opponent()));

    rook_present && path_clear && safe
}

// ---------------------------------------------------------------------------
// Attack detection
// ---------------------------------------------------------------------------

/// Returns `true` if the given square is attacked by any piece of `attacker_color`.
///
/// This is used for:
/// - Check detection (is the king attacked?)
/// - Castling validation (king must not start on, pass through or land on attacked squares)
pub fn is_square_attacked(board: &Board, sq: Square, attacker_color: Color) -> bool {
    board
        .pieces_of(attacker_color)
        .any(|(from, piece)| from != sq && reaches(board, piece, from, sq))
}

/// Returns the square of the given side's king.
///
/// # Panics
///
/// Panics if the board has no king of that color. Positions built through
/// [`Position::setup`] always have one, and no move may capture a king.
pub fn king_square(board: &Board, color: Color) -> Square {
    board
        .find_king(color)
        .unwrap_or_else(|| panic!("board invariant violated: no {color} king on the board"))
}

/// Returns `true` if the king of the given color is currently in check.
pub fn is_king_in_check(board: &Board, color: Color) -> bool {
    is_square_attacked(board, king_square(board, color), color.opponent())
}

/// Returns `true` if playing `from`→`to` would leave `color`'s king attacked.
pub fn leaves_king_in_check(pos: &Position, from: Square, to: Square, color: Color) -> bool {
    let mut scratch = pos.board.clone();
    if apply_move_to_board(&mut scratch, from, to, pos.en_passant).is_none() {
        return false;
    }
    is_king_in_check(&scratch, color)
}

// ---------------------------------------------------------------------------
// Checkmate detection
// ---------------------------------------------------------------------------

/// Returns `true` if `side` is in check and no legal move resolves it.
///
/// Every (piece, destination) pair of `side` is tried on a scratch board;
/// the search stops at the first move that leaves the king safe.
pub fn is_checkmate(pos: &Position, side: Color) -> bool {
    if !is_king_in_check(&pos.board, side) {
        return false;
    }

    let escape = pos.board.pieces_of(side).find_map(|(from, _)| {
        Square::all().find(|&to| is_legal(pos, from, to) && !leaves_king_in_check(pos, from, to, side))
            .map(|to| (from, to))
    });

    match escape {
        Some((from, to)) => {
            log::trace!("{} escapes check with {}{}", side, from, to);
            false
        }
        None => true,
    }
}

// ---------------------------------------------------------------------------
// Move application
// ---------------------------------------------------------------------------

/// What happened on the board when a move was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    /// Piece removed from the board, including an en-passant victim.
    pub captured: Option<Piece>,
    pub is_en_passant: bool,
    pub castling: Option<CastleWing>,
}

impl AppliedMove {
    /// History notation, e.g. `♙e2 to e4`.
    pub fn notation(&self) -> String {
        format!("{}{} to {}", self.piece.glyph(), self.from, self.to)
    }

    /// `true` for a pawn advancing two rows.
    pub fn is_double_pawn_push(&self) -> bool {
        self.piece.kind == PieceKind::Pawn && self.from.row().abs_diff(self.to.row()) == 2
    }
}

/// Applies a move to a board (mutating it). Used for checkmate search,
/// self-check tests, and for actually making moves in the game.
///
/// This handles:
/// - Normal moves and captures
/// - Castling (moves both king and rook)
/// - En passant (removes the captured pawn beside the destination)
///
/// Returns `None`, leaving the board untouched, if `from` is empty.
/// The move itself is not validated.
pub fn apply_move_to_board(
    board: &mut Board,
    from: Square,
    to: Square,
    en_passant: Option<Square>,
) -> Option<AppliedMove> {
    let piece = board.get(from)?;
    let mut captured = board.get(to);

    board.set(from, None);
    board.set(to, Some(piece));

    // En passant: the captured pawn sits on the origin row, destination column
    let is_en_passant = piece.kind == PieceKind::Pawn
        && from.col() != to.col()
        && captured.is_none()
        && en_passant == Some(to);
    if is_en_passant {
        let victim = Square::at(from.row(), to.col());
        captured = board.get(victim);
        board.set(victim, None);
    }

    // Castling: hop the rook over the king
    let castling = if piece.kind == PieceKind::King && from.col().abs_diff(to.col()) == 2 {
        CastleWing::for_king_destination(to.col())
    } else {
        None
    };
    if let Some(wing) = castling {
        let row = from.row();
        let rook_from = Square::at(row, wing.rook_from_col());
        let rook = board.get(rook_from);
        board.set(rook_from, None);
        board.set(Square::at(row, wing.rook_to_col()), rook);
    }

    Some(AppliedMove {
        piece,
        from,
        to,
        captured,
        is_en_passant,
        castling,
    })
}
