//! Constants for cell encoding, scoring and search defaults.
//!
//! The engine works on any rectangular grid, so unlike a fixed-size engine
//! there are no board dimension constants here. Everything that shapes the
//! scoring heuristic lives in this module so the numbers are easy to find.

// =============================================================================
// Cell Encoding
// =============================================================================

/// Number of bits used by one cell in a packed code.
pub const CELL_BITS: u32 = 2;

/// Mask for a single packed cell.
pub const CELL_MASK: u8 = 0b11;

/// Number of prefix bits in a packed code (side to move + pass flag).
pub const PACK_PREFIX_BITS: u32 = 2;

/// Bit holding the side to move in a packed code (0 = Black, 1 = White).
pub const PACK_PLAYER_BIT: u8 = 0b01;

/// Bit holding the pass flag in a packed code.
pub const PACK_PASS_BIT: u8 = 0b10;

// =============================================================================
// Text Grid Symbols
// =============================================================================

/// Off-board, unplayable cell.
pub const SYMBOL_VOID: char = 'X';

/// Empty point.
pub const SYMBOL_EMPTY: char = '_';

/// Black stone (player one).
pub const SYMBOL_BLACK: char = 'B';

/// White stone (player two).
pub const SYMBOL_WHITE: char = 'W';

// =============================================================================
// Chain Scoring
// =============================================================================

/// Confidence of a stone chain with zero or one liberty.
pub const LONE_LIBERTY_MULTIPLIER: f64 = 0.25;

/// Number of distinct owned eyes that makes a chain unconditionally safe.
pub const SECURE_EYE_COUNT: usize = 2;

/// Empty chains up to this size always count their stone contacts when
/// grouping eyes.
pub const SMALL_REGION_POINTS: usize = 2;

/// Stone chains of at least this size count as contacts for any region.
pub const SOLID_CHAIN_POINTS: usize = 2;

// =============================================================================
// Search Defaults
// =============================================================================

/// Default search depth for `Game::find_best_move` callers that don't care.
pub const DEFAULT_DEPTH: u32 = 1;

/// Default cap on the number of plies in a self-play game.
pub const DEFAULT_MAX_MOVES: usize = 200;
