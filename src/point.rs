//! Row-major coordinate helpers.
//!
//! Points are plain `usize` indices into a board's cell array. These helpers
//! convert between indices and `(x, y)` pairs and enumerate the orthogonal
//! neighbourhood without ever leaving the grid.

/// A point on the board, represented as an index into the row-major cell array.
pub type Point = usize;

/// Index of the cell at column `x`, row `y`.
#[inline]
pub fn index(x: usize, y: usize, width: usize) -> Point {
    y * width + x
}

/// Column of a point.
#[inline]
pub fn x(p: Point, width: usize) -> usize {
    p % width
}

/// Row of a point.
#[inline]
pub fn y(p: Point, width: usize) -> usize {
    p / width
}

/// Get the orthogonal in-grid neighbours of a point (left, right, up, down).
pub fn neighbors(p: Point, width: usize, height: usize) -> impl Iterator<Item = Point> {
    let (px, py) = (x(p, width), y(p, width));
    let left = (px > 0).then(|| p - 1);
    let right = (px + 1 < width).then(|| p + 1);
    let up = (py > 0).then(|| p - width);
    let down = (py + 1 < height).then(|| p + width);
    [left, right, up, down].into_iter().flatten()
}

/// Format a point as `(x,y)`.
pub fn format(p: Point, width: usize) -> String {
    format!("({},{})", x(p, width), y(p, width))
}
