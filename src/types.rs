//! Core types for the Chess Master rules engine.
//!
//! This module defines the board-state data structures: sides, pieces,
//! squares, castling rights, the 8×8 board, and the [`Position`] that
//! bundles the board with the side to move and the special-move state.
//!
//! Squares use (row, column) coordinates. Row 0 is Black's back rank
//! (rank 8) and row 7 is White's back rank (rank 1); column 0 is the
//! a-file.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ChessError;

// ---------------------------------------------------------------------------
// Piece & Color
// ---------------------------------------------------------------------------

/// Represents the color (side) of a chess piece or player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// The White side (back rank on row 7).
    White,
    /// The Black side (back rank on row 0).
    Black,
}

impl Color {
    /// Returns the opposite color.
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Returns the row pawns of this color start on.
    pub fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Returns the row the king and rooks of this color start on.
    pub fn back_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Returns the row direction pawns move in: -1 for White, +1 for Black.
    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Capitalized name, used in status messages.
    pub fn title(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Represents a chess piece type (without color information).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

/// A chess piece with both kind and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    /// Creates a new piece.
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// Converts the piece to its FEN character representation.
    /// Uppercase for White, lowercase for Black.
    pub fn to_fen_char(self) -> char {
        let c = match self.kind {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        };
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    /// Parses a FEN character into a `Piece`.
    /// Returns `None` if the character is not a valid piece symbol.
    pub fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_uppercase() {
            'K' => PieceKind::King,
            'Q' => PieceKind::Queen,
            'R' => PieceKind::Rook,
            'B' => PieceKind::Bishop,
            'N' => PieceKind::Knight,
            'P' => PieceKind::Pawn,
            _ => return None,
        };
        Some(Piece { kind, color })
    }

    /// Unicode chess glyph, used as the piece symbol in move history.
    pub fn glyph(self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceKind::King) => '♔',
            (Color::White, PieceKind::Queen) => '♕',
            (Color::White, PieceKind::Rook) => '♖',
            (Color::White, PieceKind::Bishop) => '♗',
            (Color::White, PieceKind::Knight) => '♘',
            (Color::White, PieceKind::Pawn) => '♙',
            (Color::Black, PieceKind::King) => '♚',
            (Color::Black, PieceKind::Queen) => '♛',
            (Color::Black, PieceKind::Rook) => '♜',
            (Color::Black, PieceKind::Bishop) => '♝',
            (Color::Black, PieceKind::Knight) => '♞',
            (Color::Black, PieceKind::Pawn) => '♟',
        }
    }

    /// Inverse of [`Piece::glyph`].
    pub fn from_glyph(c: char) -> Option<Self> {
        let (color, kind) = match c {
            '♔' => (Color::White, PieceKind::King),
            '♕' => (Color::White, PieceKind::Queen),
            '♖' => (Color::White, PieceKind::Rook),
            '♗' => (Color::White, PieceKind::Bishop),
            '♘' => (Color::White, PieceKind::Knight),
            '♙' => (Color::White, PieceKind::Pawn),
            '♚' => (Color::Black, PieceKind::King),
            '♛' => (Color::Black, PieceKind::Queen),
            '♜' => (Color::Black, PieceKind::Rook),
            '♝' => (Color::Black, PieceKind::Bishop),
            '♞' => (Color::Black, PieceKind::Knight),
            '♟' => (Color::Black, PieceKind::Pawn),
            _ => return None,
        };
        Some(Piece { kind, color })
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the board, always within bounds.
///
/// - `row`: 0 (rank 8) to 7 (rank 1)
/// - `col`: 0 (a-file) to 7 (h-file)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Creates a square from raw coordinates, rejecting anything outside 0–7.
    pub fn new(row: i32, col: i32) -> Result<Self, ChessError> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Ok(Self::at(row as u8, col as u8))
        } else {
            Err(ChessError::OutOfRange { row, col })
        }
    }

    pub(crate) const fn at(row: u8, col: u8) -> Self {
        debug_assert!(row < 8 && col < 8, "Square out of bounds");
        Self { row, col }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// Parses an algebraic notation string (e.g. "e4") into a `Square`.
    /// Returns `None` for invalid input.
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if col < 8 && rank < 8 {
            Some(Square::at(7 - rank, col))
        } else {
            None
        }
    }

    /// Converts the square to its algebraic notation string (e.g. "e4").
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }

    /// File letter 'a'..='h'.
    pub fn file_char(self) -> char {
        (b'a' + self.col) as char
    }

    /// Rank digit '1'..='8'; rank 8 is row 0.
    pub fn rank_char(self) -> char {
        (b'8' - self.row) as char
    }

    /// Returns a new square offset by `(drow, dcol)`, or `None` if out of bounds.
    pub fn offset(self, drow: i8, dcol: i8) -> Option<Square> {
        let r = self.row as i8 + drow;
        let c = self.col as i8 + dcol;
        if (0..8).contains(&r) && (0..8).contains(&c) {
            Some(Square::at(r as u8, c as u8))
        } else {
            None
        }
    }

    /// Returns a flat index (0..63) for the square.
    pub fn index(self) -> usize {
        (self.row as usize) * 8 + self.col as usize
    }

    /// All 64 squares, row by row starting at a8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square::at(row, col)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl std::str::FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Castling Rights
// ---------------------------------------------------------------------------

/// Castling rights for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideCastlingRights {
    /// Whether kingside castling (short castling) is still available.
    pub kingside: bool,
    /// Whether queenside castling (long castling) is still available.
    pub queenside: bool,
}

impl Default for SideCastlingRights {
    fn default() -> Self {
        Self {
            kingside: true,
            queenside: true,
        }
    }
}

impl SideCastlingRights {
    /// Rights with both flags cleared.
    pub fn none() -> Self {
        Self {
            kingside: false,
            queenside: false,
        }
    }
}

/// Castling rights for both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white: SideCastlingRights,
    pub black: SideCastlingRights,
}

impl CastlingRights {
    /// Both sides without any right left.
    pub fn none() -> Self {
        Self {
            white: SideCastlingRights::none(),
            black: SideCastlingRights::none(),
        }
    }

    /// Returns the castling rights for the given color.
    pub fn for_color(&self, color: Color) -> &SideCastlingRights {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// Returns a mutable reference to the castling rights for the given color.
    pub fn for_color_mut(&mut self, color: Color) -> &mut SideCastlingRights {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Compact "KQkq" form, with '-' for every cleared right.
    pub fn summary(&self) -> String {
        [
            (self.white.kingside, 'K'),
            (self.white.queenside, 'Q'),
            (self.black.kingside, 'k'),
            (self.black.queenside, 'q'),
        ]
        .iter()
        .map(|&(set, c)| if set { c } else { '-' })
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Represents the chess board as a flat 64-element array.
///
/// Each element is `Option<Piece>`; `None` means the square is empty.
/// Index mapping: `row * 8 + col`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Default for Board {
    /// Returns an empty board.
    fn default() -> Self {
        Self {
            squares: [None; 64],
        }
    }
}

impl Board {
    /// Returns the piece at the given square, if any.
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    /// Sets (or clears) the piece at the given square.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.index()] = piece;
    }

    /// Creates the standard starting position.
    pub fn starting_position() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Board::default();
        for color in [Color::White, Color::Black] {
            for (col, &kind) in BACK_RANK.iter().enumerate() {
                let col = col as u8;
                board.set(Square::at(color.back_row(), col), Some(Piece::new(kind, color)));
                board.set(
                    Square::at(color.pawn_start_row(), col),
                    Some(Piece::new(PieceKind::Pawn, color)),
                );
            }
        }
        board
    }

    /// Iterates over every occupied square of the given color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.get(sq) {
            Some(piece) if piece.color == color => Some((sq, piece)),
            _ => None,
        })
    }

    /// Finds the king square for the given color.
    /// Returns `None` if the king is not on the board.
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Converts the board to a map of occupied squares ("e4" → FEN letter).
    pub fn to_map(&self) -> BTreeMap<String, String> {
        Square::all()
            .filter_map(|sq| {
                self.get(sq)
                    .map(|piece| (sq.to_algebraic(), piece.to_fen_char().to_string()))
            })
            .collect()
    }

    /// Creates a board from the map format produced by [`Board::to_map`].
    pub fn from_map<K, V>(map: impl IntoIterator<Item = (K, V)>) -> Result<Self, ChessError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut board = Board::default();
        for (sq_str, piece_str) in map {
            let sq: Square = sq_str.as_ref().parse()?;
            let piece_str = piece_str.as_ref();
            let mut chars = piece_str.chars();
            let piece = match (chars.next(), chars.next()) {
                (Some(ch), None) => Piece::from_fen_char(ch),
                _ => None,
            }
            .ok_or_else(|| ChessError::InvalidPiece(piece_str.to_string()))?;
            board.set(sq, Some(piece));
        }
        Ok(board)
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// The board together with everything the rules depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    /// Side to move.
    pub turn: Color,
    pub castling: CastlingRights,
    /// Square skipped by the previous move's double pawn step, if any.
    pub en_passant: Option<Square>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The standard starting position with White to move.
    pub fn new() -> Self {
        Self {
            board: Board::starting_position(),
            turn: Color::White,
            castling: CastlingRights::default(),
            en_passant: None,
        }
    }

    /// Builds a position from an arbitrary board.
    ///
    /// Each side must have exactly one king, and the side not on move may
    /// not be in check. A missing or capturable king would break the rules
    /// engine, so both are rejected here.
    pub fn setup(
        board: Board,
        turn: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
    ) -> Result<Self, ChessError> {
        for color in [Color::White, Color::Black] {
            let kings = board
                .pieces_of(color)
                .filter(|(_, p)| p.kind == PieceKind::King)
                .count();
            match kings {
                0 => return Err(ChessError::MissingKing(color)),
                1 => {}
                _ => return Err(ChessError::DuplicateKing(color)),
            }
        }
        if crate::movegen::is_king_in_check(&board, turn.opponent()) {
            return Err(ChessError::OpponentInCheck(turn.opponent()));
        }
        Ok(Self {
            board,
            turn,
            castling,
            en_passant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn test_algebraic_maps_to_rows_and_cols() {
        let e2 = sq("e2");
        assert_eq!((e2.row(), e2.col()), (6, 4));
        let a8 = sq("a8");
        assert_eq!((a8.row(), a8.col()), (0, 0));
        let h1 = sq("h1");
        assert_eq!((h1.row(), h1.col()), (7, 7));
        assert_eq!(Square::new(4, 4).unwrap().to_algebraic(), "e4");
    }

    #[test]
    fn test_square_new_rejects_out_of_range() {
        assert_eq!(
            Square::new(8, 0),
            Err(ChessError::OutOfRange { row: 8, col: 0 })
        );
        assert!(Square::new(0, -1).is_err());
        assert!(Square::new(7, 7).is_ok());
    }

    #[test]
    fn test_from_algebraic_invalid() {
        assert!(Square::from_algebraic("i1").is_none());
        assert!(Square::from_algebraic("a9").is_none());
        assert!(Square::from_algebraic("a").is_none());
        assert!("zz".parse::<Square>().is_err());
    }

    #[test]
    fn test_offset_stays_on_board() {
        assert_eq!(sq("a1").offset(1, 0), None);
        assert_eq!(sq("a1").offset(-1, 1), Some(sq("b2")));
    }

    #[test]
    fn test_starting_position_layout() {
        let board = Board::starting_position();
        assert_eq!(board.to_map().len(), 32);
        assert_eq!(
            board.get(sq("e1")),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            board.get(sq("d8")),
            Some(Piece::new(PieceKind::Queen, Color::Black))
        );
        assert_eq!(board.find_king(Color::Black), Some(sq("e8")));
        for col in 0..8 {
            let p = board.get(Square::new(1, col).unwrap()).unwrap();
            assert_eq!(p, Piece::new(PieceKind::Pawn, Color::Black));
        }
    }

    #[test]
    fn test_glyph_roundtrip_for_all_pieces() {
        let board = Board::starting_position();
        for (_, piece) in board
            .pieces_of(Color::White)
            .chain(board.pieces_of(Color::Black))
        {
            assert_eq!(Piece::from_glyph(piece.glyph()), Some(piece));
        }
        assert_eq!(Piece::from_glyph('x'), None);
    }

    #[test]
    fn test_board_from_map_rejects_bad_entries() {
        assert!(Board::from_map([("e9", "K")]).is_err());
        assert_eq!(
            Board::from_map([("e1", "X")]),
            Err(ChessError::InvalidPiece("X".to_string()))
        );
        let board = Board::from_map([("e1", "K"), ("e8", "k")]).unwrap();
        assert_eq!(board.to_map().len(), 2);
    }

    #[test]
    fn test_setup_requires_one_king_each() {
        let board = Board::from_map([("e1", "K")]).unwrap();
        assert_eq!(
            Position::setup(board, Color::White, CastlingRights::none(), None),
            Err(ChessError::MissingKing(Color::Black))
        );
        let board = Board::from_map([("e1", "K"), ("e8", "k"), ("a8", "k")]).unwrap();
        assert_eq!(
            Position::setup(board, Color::White, CastlingRights::none(), None),
            Err(ChessError::DuplicateKing(Color::Black))
        );
    }

    #[test]
    fn test_setup_rejects_side_not_on_move_in_check() {
        let pieces = [("e1", "K"), ("e4", "R"), ("e8", "k")];
        let board = Board::from_map(pieces).unwrap();
        assert_eq!(
            Position::setup(board, Color::White, CastlingRights::none(), None),
            Err(ChessError::OpponentInCheck(Color::Black))
        );
        // The same board is fine with Black to move
        let board = Board::from_map(pieces).unwrap();
        assert!(Position::setup(board, Color::Black, CastlingRights::none(), None).is_ok());
    }

    #[test]
    fn test_castling_summary() {
        let mut rights = CastlingRights::default();
        assert_eq!(rights.summary(), "KQkq");
        rights.white.queenside = false;
        rights.black = SideCastlingRights::none();
        assert_eq!(rights.summary(), "K---");
    }
}
