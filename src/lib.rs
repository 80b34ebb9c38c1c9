//! # Chess Master — chess rules engine
//!
//! Chess Master is a small rules engine for two-player chess with an
//! interactive terminal board. The engine answers one question well:
//! is this move legal here, and what state does it leave behind?
//!
//! ## Features
//!
//! - **Rules core**: per-piece legality with path obstruction, castling
//!   (rights, empty path, unattacked king path) and en passant.
//!
//! - **Check and checkmate**: attack detection for any square, check
//!   detection for either side, and an exhaustive escape search that
//!   stops at the first move that saves the king.
//!
//! - **Game session**: turn and ownership enforcement, a king-safety
//!   guard, an append-only move history (`♘g1 to f3`) that can be
//!   replayed, and serializable snapshots.
//!
//! - **Feedback hook**: a [`feedback::FeedbackProvider`] trait. The bundled
//!   provider returns one of five canned remarks at random.
//!
//! Not implemented: pawn promotion, stalemate, repetition and move-count
//! draws, engine search or evaluation.
//!
//! ## Usage
//!
//! ```no_run
//! use chessmaster::game::Game;
//! use chessmaster::types::Square;
//!
//! let mut game = Game::new();
//! let e2: Square = "e2".parse().unwrap();
//! let e4: Square = "e4".parse().unwrap();
//! let outcome = game.propose_move(e2, e4);
//! assert!(outcome.accepted);
//! ```

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

pub mod error;
pub mod feedback;
pub mod game;
pub mod i18n;
pub mod movegen;
pub mod terminal;
pub mod types;

pub use error::ChessError;
pub use game::{Game, GameOptions, MoveOutcome};
