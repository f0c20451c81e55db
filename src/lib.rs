//! Move search for 8x8 draughts.
//!
//! A driver keeps the authoritative [`Board`], hands a snapshot to
//! [`Engine::get_best_move`] and replaces its board with the result, or ends
//! the game when no board comes back.

pub mod board;
pub mod engine;

pub use board::{Board, Piece, Side, Square, ValidMoves};
pub use engine::{candidate_boards, Engine, SearchPolicy, SearchStats};
