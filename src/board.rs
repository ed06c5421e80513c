//! Board representation and its packed integer encoding.
//!
//! A [`Board`] is a rectangular grid of [`Cell`]s plus the side to move and
//! whether the move that produced it was a pass. Cells that are not part of
//! the playing area are marked [`Cell::Void`], which is how irregular shapes
//! are expressed on a rectangular grid.
//!
//! Boards pack into a single [`BigUint`]: bit 0 is the side to move, bit 1 the
//! pass flag, then two bits per cell in row-major order. The cell bits alone
//! form the *board code* that repetition history is keyed on.

use std::collections::VecDeque;
use std::fmt;

use num_bigint::BigUint;

use crate::constants::{
    CELL_BITS, CELL_MASK, PACK_PASS_BIT, PACK_PLAYER_BIT, PACK_PREFIX_BITS, SYMBOL_BLACK,
    SYMBOL_EMPTY, SYMBOL_VOID, SYMBOL_WHITE,
};
use crate::error::FormatError;
use crate::point::{self, Point};

/// Cells stored per 32-bit digit of a packed code.
const CELLS_PER_DIGIT: usize = 32 / CELL_BITS as usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Parse a side to move given as `"B"` or `"W"`.
    pub fn from_symbol(s: &str) -> Result<Color, FormatError> {
        match s.trim() {
            "B" | "b" => Ok(Color::Black),
            "W" | "w" => Ok(Color::White),
            other => Err(FormatError::UnknownSide(other.to_string())),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Color::Black => SYMBOL_BLACK,
            Color::White => SYMBOL_WHITE,
        }
    }

    /// The cell value a stone of this color occupies.
    pub fn stone(self) -> Cell {
        match self {
            Color::Black => Cell::Black,
            Color::White => Cell::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Content of one grid position. The discriminants are the packed 2-bit codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cell {
    Empty = 0,
    Black = 1,
    White = 2,
    Void = 3,
}

impl Cell {
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode the low two bits of `code`.
    #[inline]
    pub fn from_code(code: u8) -> Cell {
        match code & CELL_MASK {
            0 => Cell::Empty,
            1 => Cell::Black,
            2 => Cell::White,
            _ => Cell::Void,
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Cell> {
        match symbol {
            SYMBOL_VOID => Some(Cell::Void),
            SYMBOL_EMPTY => Some(Cell::Empty),
            SYMBOL_BLACK => Some(Cell::Black),
            SYMBOL_WHITE => Some(Cell::White),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => SYMBOL_EMPTY,
            Cell::Black => SYMBOL_BLACK,
            Cell::White => SYMBOL_WHITE,
            Cell::Void => SYMBOL_VOID,
        }
    }

    /// The stone color on this cell, if any.
    pub fn stone(self) -> Option<Color> {
        match self {
            Cell::Black => Some(Color::Black),
            Cell::White => Some(Color::White),
            Cell::Empty | Cell::Void => None,
        }
    }
}

/// A Go board: cells, side to move and pass flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    player: Color,
    is_pass: bool,
}

impl Board {
    /// Create a board with every cell empty.
    pub fn empty(width: usize, height: usize, player: Color) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
            player,
            is_pass: false,
        }
    }

    /// Same shape with every stone removed; Void cells are kept.
    pub fn cleared(&self, player: Color, is_pass: bool) -> Self {
        let cells = self
            .cells
            .iter()
            .map(|&c| if c == Cell::Void { Cell::Void } else { Cell::Empty })
            .collect();
        Self {
            width: self.width,
            height: self.height,
            cells,
            player,
            is_pass,
        }
    }

    /// Build a board from rows of `X`, `_`, `B`, `W` symbols.
    ///
    /// # Errors
    /// - [`FormatError::EmptyGrid`] if there are no rows or the rows are empty
    /// - [`FormatError::RaggedRow`] if a row differs in length from the first
    /// - [`FormatError::UnknownCell`] on any other symbol
    pub fn from_rows<S: AsRef<str>>(
        rows: &[S],
        player: Color,
        is_pass: bool,
    ) -> Result<Self, FormatError> {
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        if width == 0 {
            return Err(FormatError::EmptyGrid);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(FormatError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, symbol) in row.chars().enumerate() {
                let cell = Cell::from_symbol(symbol).ok_or(FormatError::UnknownCell { symbol, x, y })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
            player,
            is_pass,
        })
    }

    /// Render the grid back into rows of symbols (inverse of [`Board::from_rows`]).
    ///
    /// A zero-width board has no rows.
    pub fn to_rows(&self) -> Vec<String> {
        if self.width == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|c| c.symbol()).collect())
            .collect()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells, Void included.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Side to move.
    #[inline]
    pub fn player(&self) -> Color {
        self.player
    }

    #[inline]
    pub fn opponent(&self) -> Color {
        self.player.opponent()
    }

    /// Whether the move that produced this board was a pass.
    #[inline]
    pub fn is_pass(&self) -> bool {
        self.is_pass
    }

    /// Cell at `p`. Points must come from grid iteration or chain data.
    #[inline]
    pub fn get(&self, p: Point) -> Cell {
        self.cells[p]
    }

    #[inline]
    pub fn set(&mut self, p: Point, cell: Cell) {
        self.cells[p] = cell;
    }

    /// Orthogonal neighbours of `p` inside the grid (Void cells included).
    pub fn neighbors(&self, p: Point) -> impl Iterator<Item = Point> {
        point::neighbors(p, self.width, self.height)
    }

    /// Board code: two bits per cell, no side-to-move or pass prefix.
    pub fn code(&self) -> BigUint {
        let digits = self
            .cells
            .chunks(CELLS_PER_DIGIT)
            .map(|chunk| {
                chunk.iter().enumerate().fold(0u32, |acc, (i, cell)| {
                    acc | (u32::from(cell.code()) << (i as u32 * CELL_BITS))
                })
            })
            .collect();
        BigUint::new(digits)
    }

    /// Packed code: side to move in bit 0, pass flag in bit 1, cells above.
    pub fn pack(&self) -> BigUint {
        let mut prefix = 0u8;
        if self.player == Color::White {
            prefix |= PACK_PLAYER_BIT;
        }
        if self.is_pass {
            prefix |= PACK_PASS_BIT;
        }
        (self.code() << PACK_PREFIX_BITS) | BigUint::from(prefix)
    }

    /// Rebuild a board from [`Board::pack`] output.
    ///
    /// The dimensions are trusted: a code packed with other dimensions yields
    /// a well-formed but meaningless board.
    pub fn unpack(value: &BigUint, width: usize, height: usize) -> Self {
        let digits = value.to_u32_digits();
        let bits_at = |offset: usize| -> u8 {
            let digit = digits.get(offset / 32).copied().unwrap_or(0);
            ((digit >> (offset % 32)) as u8) & CELL_MASK
        };

        let prefix = bits_at(0);
        let player = if prefix & PACK_PLAYER_BIT != 0 {
            Color::White
        } else {
            Color::Black
        };
        let is_pass = prefix & PACK_PASS_BIT != 0;

        let base = PACK_PREFIX_BITS as usize;
        let cells = (0..width * height)
            .map(|i| Cell::from_code(bits_at(base + i * CELL_BITS as usize)))
            .collect();

        Self {
            width,
            height,
            cells,
            player,
            is_pass,
        }
    }

    /// Average BFS distance from each playable cell to every playable cell it
    /// can reach, floored to two decimals. Void cells are `None`.
    pub fn heat_map(&self) -> Vec<Option<f64>> {
        (0..self.len())
            .map(|p| (self.get(p) != Cell::Void).then(|| self.average_distance(p)))
            .collect()
    }

    /// [`Board::heat_map`] scaled into `[0, 1]`: 0 for the most central cell,
    /// 1 for the most remote. A uniform heat map scales to all zeros.
    pub fn depth_map(&self) -> Vec<Option<f64>> {
        let heat = self.heat_map();
        let values = heat.iter().flatten().copied();
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        heat.into_iter()
            .map(|h| h.map(|v| if span > 0.0 { (v - min) / span } else { 0.0 }))
            .collect()
    }

    fn average_distance(&self, start: Point) -> f64 {
        let mut dist = vec![usize::MAX; self.len()];
        let mut queue = VecDeque::from([start]);
        dist[start] = 0;
        let (mut sum, mut count) = (0usize, 0usize);

        while let Some(p) = queue.pop_front() {
            sum += dist[p];
            count += 1;
            for n in self.neighbors(p) {
                if dist[n] == usize::MAX && self.get(n) != Cell::Void {
                    dist[n] = dist[p] + 1;
                    queue.push_back(n);
                }
            }
        }

        (sum as f64 / count as f64 * 100.0).floor() / 100.0
    }
}

/// Diagnostic dump: a `B`/`W` header (with ` (pass)` when set), then the rows.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.player)?;
        if self.is_pass {
            write!(f, " (pass)")?;
        }
        for row in self.to_rows() {
            write!(f, "\n{row}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let board = Board::from_rows(&["X__X", "BB_W", "_WBW", "XXX_"], Color::White, true).unwrap();

        assert_eq!(board.player(), Color::White);
        assert_eq!(board.opponent(), Color::Black);
        assert!(board.is_pass());
        assert_eq!((board.width(), board.height()), (4, 4));

        let expected = [3, 0, 0, 3, 1, 1, 0, 2, 0, 2, 1, 2, 3, 3, 3, 0];
        for (p, &code) in expected.iter().enumerate() {
            assert_eq!(board.get(p).code(), code, "cell {p}");
        }
    }

    #[test]
    fn test_set_and_display() {
        let mut board = Board::from_rows(&["X__X", "BB_W", "_WBW", "XXX_"], Color::White, true).unwrap();
        board.set(10, Cell::Void);
        assert_eq!(board.get(10), Cell::Void);
        assert_eq!(board.to_string(), "W (pass)\nX__X\nBB_W\n_WXW\nXXX_");
    }

    #[test]
    fn test_rows_roundtrip() {
        let rows = ["X_BWW", "__WWX", "BBXWX"];
        let board = Board::from_rows(&rows, Color::White, false).unwrap();
        assert_eq!(board.to_rows(), rows);
    }

    #[test]
    fn test_unknown_symbol() {
        let err = Board::from_rows(&["_?"], Color::Black, false).unwrap_err();
        assert_eq!(err, FormatError::UnknownCell { symbol: '?', x: 1, y: 0 });
        assert!(err.to_string().contains('?'));
    }

    #[test]
    fn test_malformed_grids() {
        let empty: [&str; 0] = [];
        assert_eq!(Board::from_rows(&empty, Color::Black, false), Err(FormatError::EmptyGrid));
        assert_eq!(
            Board::from_rows(&["___", "__"], Color::Black, false),
            Err(FormatError::RaggedRow { row: 1, expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_pack_value() {
        let board = Board::from_rows(&["X_W_X", "BBXBB", "BW_X_"], Color::Black, false).unwrap();
        assert_eq!(board.pack(), BigUint::from(844_586_124u64));
        assert_eq!(board.code(), BigUint::from(844_586_124u64 >> 2));

        let unpacked = Board::unpack(&board.pack(), 5, 3);
        assert_eq!(unpacked, board);
        assert_eq!(unpacked.to_string(), "B\nX_W_X\nBBXBB\nBW_X_");
    }

    #[test]
    fn test_pack_single_void() {
        let board = Board::from_rows(&["X"], Color::White, true).unwrap();
        assert_eq!(board.pack(), BigUint::from(15u32));
        assert_eq!(Board::unpack(&board.pack(), 1, 1).to_string(), "W (pass)\nX");
    }

    #[test]
    fn test_pack_large_board_roundtrip() {
        let mut board = Board::empty(19, 19, Color::White);
        for p in (0..board.len()).step_by(7) {
            board.set(p, Cell::from_code((p % 4) as u8));
        }
        board.set(360, Cell::Black);
        let unpacked = Board::unpack(&board.pack(), 19, 19);
        assert_eq!(unpacked, board);
        assert!(board.pack().bits() > 64);
    }

    #[test]
    fn test_code_ignores_side_and_pass() {
        let a = Board::from_rows(&["B_W"], Color::Black, false).unwrap();
        let b = Board::from_rows(&["B_W"], Color::White, true).unwrap();
        assert_eq!(a.code(), b.code());
        assert_ne!(a.pack(), b.pack());
    }

    #[test]
    fn test_depth_map_open_board() {
        let board = Board::from_rows(&["__X__", "_____", "_____", "_____", "_____"], Color::White, false)
            .unwrap();
        let depth = board.depth_map();
        assert_eq!(depth[2], None);
        assert_eq!(depth[12], Some(0.0));
        assert_eq!(depth[0], Some(1.0));
        assert_eq!(depth[4], Some(1.0));
        assert!(depth[24].unwrap() < 1.0);
        assert!(depth.iter().flatten().all(|&d| (0.0..=1.0).contains(&d)));
    }

    #[test]
    fn test_zero_width_board_has_no_rows() {
        let board = Board::unpack(&BigUint::from(5u32), 0, 3);
        assert!(board.to_rows().is_empty());
        assert_eq!(board.to_string(), "W");

        let board = Board::empty(0, 4, Color::Black);
        assert_eq!(board.to_string(), "B");
    }

    #[test]
    fn test_depth_map_uniform() {
        let board = Board::from_rows(&["_X_"], Color::Black, false).unwrap();
        assert_eq!(board.depth_map(), vec![Some(0.0), None, Some(0.0)]);
    }
}
