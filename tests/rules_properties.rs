//! End-to-end rule checks driven through the public game API.

use chessmaster::feedback::CannedFeedback;
use chessmaster::game::{Game, GameOptions, Rejection, parse_history_entry};
use chessmaster::types::*;
use chessmaster::ChessError;

fn sq(s: &str) -> Square {
    Square::from_algebraic(s).unwrap()
}

fn play(game: &mut Game, moves: &[&str]) {
    for mv in moves {
        let (from, to) = mv.split_at(2);
        let outcome = game.propose_move(sq(from), sq(to));
        assert!(outcome.accepted, "{} rejected: {:?}", mv, outcome.rejection);
    }
}

#[test]
fn test_starting_position_is_standard() {
    let game = Game::new();
    let board = game.board();
    let back = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    for square in Square::all() {
        let expected = match square.row() {
            0 => Some(Piece::new(back[square.col() as usize], Color::Black)),
            1 => Some(Piece::new(PieceKind::Pawn, Color::Black)),
            6 => Some(Piece::new(PieceKind::Pawn, Color::White)),
            7 => Some(Piece::new(back[square.col() as usize], Color::White)),
            _ => None,
        };
        assert_eq!(board.get(square), expected, "square {}", square);
    }

    assert_eq!(game.turn(), Color::White);
    assert_eq!(game.position().castling.summary(), "KQkq");
    assert_eq!(game.position().en_passant, None);
    assert!(game.move_history().is_empty());
    assert_eq!(game.legal_moves().len(), 20);
}

#[test]
fn test_out_of_range_squares_are_errors() {
    assert_eq!(
        Square::new(8, 0),
        Err(ChessError::OutOfRange { row: 8, col: 0 })
    );
    assert_eq!(
        Square::new(-1, 3),
        Err(ChessError::OutOfRange { row: -1, col: 3 })
    );
    assert!(Square::new(7, 7).is_ok());
}

#[test]
fn test_turns_alternate_and_rejections_keep_the_turn() {
    let mut game = Game::new();

    let outcome = game.propose_move(sq("e7"), sq("e5"));
    assert_eq!(outcome.rejection, Some(Rejection::NotYourTurn));
    assert_eq!(game.turn(), Color::White);

    play(&mut game, &["e2e4"]);
    assert_eq!(game.turn(), Color::Black);

    let outcome = game.propose_move(sq("d2"), sq("d4"));
    assert_eq!(outcome.rejection, Some(Rejection::NotYourTurn));
    assert_eq!(game.turn(), Color::Black);

    play(&mut game, &["e7e5"]);
    assert_eq!(game.turn(), Color::White);
}

#[test]
fn test_double_step_through_an_occupied_square_is_rejected() {
    let mut game = Game::new();
    play(&mut game, &["b1c3", "a7a6"]);

    let outcome = game.propose_move(sq("c2"), sq("c4"));
    assert!(!outcome.accepted);
    assert_eq!(outcome.rejection, Some(Rejection::IllegalMove));
}

#[test]
fn test_en_passant_is_only_available_immediately() {
    let setup = ["a2a3", "d7d5", "a3a4", "d5d4", "e2e4"];

    let mut game = Game::new();
    play(&mut game, &setup);
    assert_eq!(game.position().en_passant, Some(sq("e3")));
    play(&mut game, &["d4e3"]);
    assert_eq!(game.board().get(sq("e4")), None);
    assert_eq!(
        game.board().get(sq("e3")),
        Some(Piece::new(PieceKind::Pawn, Color::Black))
    );

    let mut game = Game::new();
    play(&mut game, &setup);
    play(&mut game, &["h7h6", "h2h3"]);
    assert_eq!(game.position().en_passant, None);
    let outcome = game.propose_move(sq("d4"), sq("e3"));
    assert_eq!(outcome.rejection, Some(Rejection::IllegalMove));
}

#[test]
fn test_castling_rights_are_lost_after_king_or_rook_moves() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "h7h5", "e1e2"]);
    assert_eq!(game.position().castling.summary(), "--kq");

    play(&mut game, &["h8h6"]);
    assert_eq!(game.position().castling.summary(), "---q");

    // Walking the rook back does not restore the right
    play(&mut game, &["e2e1", "h6h8"]);
    assert_eq!(game.position().castling.summary(), "---q");
}

#[test]
fn test_castling_refused_after_rook_returns_to_corner() {
    let mut game = Game::new();
    play(
        &mut game,
        &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "h1g1", "f8c5", "g1h1", "d7d6"],
    );
    assert_eq!(game.board().get(sq("f1")), None);
    assert_eq!(game.board().get(sq("g1")), None);
    assert_eq!(
        game.board().get(sq("h1")),
        Some(Piece::new(PieceKind::Rook, Color::White))
    );
    assert_eq!(game.position().castling.summary(), "-Qkq");

    let outcome = game.propose_move(sq("e1"), sq("g1"));
    assert_eq!(outcome.rejection, Some(Rejection::IllegalMove));
    assert_eq!(
        game.board().get(sq("e1")),
        Some(Piece::new(PieceKind::King, Color::White))
    );
}

#[test]
fn test_kingside_castling_moves_both_pieces() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"]);

    assert_eq!(
        game.board().get(sq("g1")),
        Some(Piece::new(PieceKind::King, Color::White))
    );
    assert_eq!(
        game.board().get(sq("f1")),
        Some(Piece::new(PieceKind::Rook, Color::White))
    );
    assert_eq!(game.board().get(sq("h1")), None);
    assert_eq!(game.position().castling.summary(), "--kq");
    assert_eq!(game.move_history().last(), Some(&"♔e1 to g1"));
}

#[test]
fn test_fools_mate_ends_the_game() {
    let mut game = Game::new();
    play(&mut game, &["f2f3", "e7e5", "g2g4"]);

    let outcome = game.propose_move(sq("d8"), sq("h4"));
    assert!(outcome.accepted);
    assert!(outcome.check);
    assert!(outcome.checkmate);
    assert_eq!(outcome.feedback.as_deref(), Some("Checkmate! Black wins!"));

    assert!(game.is_over());
    assert_eq!(game.winner(), Some(Color::Black));
    assert!(game.legal_moves().is_empty());

    let outcome = game.propose_move(sq("a2"), sq("a3"));
    assert_eq!(outcome.rejection, Some(Rejection::GameOver));
}

#[test]
fn test_self_check_guard_can_be_relaxed() {
    let board = Board::from_map([("e1", "K"), ("e2", "R"), ("e8", "r"), ("h8", "k")]).unwrap();
    let position = Position::setup(board, Color::White, CastlingRights::none(), None).unwrap();

    let mut strict = Game::from_position(
        position.clone(),
        GameOptions::default(),
        Box::new(CannedFeedback::with_seed(1)),
    );
    let outcome = strict.propose_move(sq("e2"), sq("a2"));
    assert_eq!(outcome.rejection, Some(Rejection::LeavesKingInCheck));

    let mut permissive = Game::from_position(
        position,
        GameOptions {
            allow_self_check: true,
        },
        Box::new(CannedFeedback::with_seed(1)),
    );
    let outcome = permissive.propose_move(sq("e2"), sq("a2"));
    assert!(outcome.accepted);
}

#[test]
fn test_kings_are_never_captured() {
    let permissive = GameOptions {
        allow_self_check: true,
    };
    let mut game = Game::with_feedback_provider(permissive, Box::new(CannedFeedback::with_seed(3)));
    play(&mut game, &["f2f3", "e7e5", "a2a3", "d8h4", "b2b3"]);

    let outcome = game.propose_move(sq("h4"), sq("e1"));
    assert!(!outcome.accepted);
    assert_eq!(outcome.rejection, Some(Rejection::KingCapture));
    assert_eq!(game.board().find_king(Color::White), Some(sq("e1")));

    // A position that would let the side on move take the king is refused
    let board = Board::from_map([("e1", "K"), ("e4", "R"), ("e8", "k")]).unwrap();
    assert_eq!(
        Position::setup(board, Color::White, CastlingRights::none(), None),
        Err(ChessError::OpponentInCheck(Color::Black))
    );
}

#[test]
fn test_rejected_moves_change_nothing() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "e7e5"]);
    let before = game.position().clone();
    let history_before: Vec<String> = game.move_history().iter().map(|s| s.to_string()).collect();

    for (from, to) in [("e1", "e3"), ("e4", "e5"), ("d4", "d5"), ("a1", "a1"), ("b1", "d2")] {
        let outcome = game.propose_move(sq(from), sq(to));
        assert!(!outcome.accepted, "{}{} should be rejected", from, to);
        assert_eq!(outcome.history_entry, None);
        assert_eq!(game.position(), &before);
        assert_eq!(game.move_history(), history_before);
    }
}

#[test]
fn test_history_entries_parse_back_and_replay() {
    let moves = ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5c6", "d7c6", "e1g1"];
    let mut game = Game::new();
    play(&mut game, &moves);

    let history = game.move_history();
    assert_eq!(history.len(), moves.len());
    for (entry, mv) in history.iter().zip(moves) {
        let (piece, from, to) = parse_history_entry(entry).unwrap();
        assert_eq!(format!("{}{}", from, to), mv);
        assert!(entry.starts_with(piece.glyph()));
    }

    let replayed = Game::replay(&history, GameOptions::default()).unwrap();
    assert_eq!(replayed.position(), game.position());
    assert_eq!(replayed.move_history(), history);
}

#[test]
fn test_replay_reports_the_failing_entry() {
    let err = Game::replay(["♙e2 to e4", "♙e2 to e3"], GameOptions::default()).unwrap_err();
    match err {
        ChessError::ReplayRejected { index, entry, .. } => {
            assert_eq!(index, 2);
            assert_eq!(entry, "♙e2 to e3");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = Game::replay(["e2e4"], GameOptions::default()).unwrap_err();
    assert_eq!(err, ChessError::InvalidNotation("e2e4".to_string()));
}
