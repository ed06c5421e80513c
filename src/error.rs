//! Error types for board parsing and move validation.

use thiserror::Error;

use crate::point::Point;

/// Failure to build a board from its text grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A grid cell holds a symbol that is not `X`, `_`, `B` or `W`.
    #[error("unknown board cell '{symbol}' at ({x},{y})")]
    UnknownCell { symbol: char, x: usize, y: usize },
    /// The side to move is not `B` or `W`.
    #[error("unknown side to move '{0}', expected B or W")]
    UnknownSide(String),
    /// The grid has no rows or no columns.
    #[error("board grid is empty")]
    EmptyGrid,
    /// A row differs in length from the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Result of attempting to commit a move to a game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The point is occupied, suicidal, or recreates an earlier position.
    #[error("illegal move at {}", .0.map_or_else(|| "pass".to_string(), |p| p.to_string()))]
    Illegal(Option<Point>),
}
