//! go-minimax: a Go rules engine with a bounded-depth minimax search.
//!
//! The engine works on any rectangular grid, with off-board cells marked as
//! Void. It enforces captures, suicide prevention and positional superko,
//! scores positions with an eye- and liberty-aware heuristic, and searches a
//! fixed number of plies to recommend a move.
//!
//! ## Modules
//!
//! - [`point`] - Row-major coordinate helpers
//! - [`board`] - Cells, side to move, packed integer codes
//! - [`chain`] - Flood-fill decomposition into chains and empty regions
//! - [`state`] - Legal moves, captures, ownership, eyes and scores
//! - [`search`] - Memoized minimax and candidate policies
//! - [`game`] - Committed moves and repetition history
//! - [`config`] / [`constants`] - Tunable settings
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use go_minimax::board::{Board, Color};
//! use go_minimax::game::Game;
//!
//! let board = Board::from_rows(&["W_", "X_"], Color::Black, false).unwrap();
//! let mut game = Game::new(board);
//!
//! // Capturing the white stone is the best reply.
//! let best = game.find_best_move(0);
//! assert_eq!(best, Some(1));
//! game.play(best).unwrap();
//! assert_eq!(game.state().board().to_rows(), ["_B", "X_"]);
//! ```

pub mod board;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod point;
pub mod search;
pub mod state;
