//! Connected-component decomposition of a board.
//!
//! A [`ChainSet`] splits every non-Void cell of a [`Board`] into maximal
//! 4-connected regions of the same content: stone chains of the side to move,
//! stone chains of the opponent, and empty regions. Each chain records the
//! cells where it touches a different kind of region:
//! - a stone chain records its empty neighbours (its liberties)
//! - an empty region records its stone neighbours, split by side
//!
//! Chains are stored in plain vectors and the cell map holds [`ChainRef`]
//! indices into them, so nothing points back at the board. A chain set is
//! rebuilt from scratch for every board and never updated incrementally.

use std::collections::VecDeque;
use std::fmt;

use crate::board::{Board, Cell, Color};
use crate::point::Point;

/// Which vector of a [`ChainSet`] a chain lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChainGroup {
    /// Stones of the side to move.
    Player,
    /// Stones of the side that just moved.
    Opponent,
    /// Empty regions.
    Neutral,
}

/// Index of a chain inside a [`ChainSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChainRef {
    pub group: ChainGroup,
    pub index: usize,
}

/// Per-variant contact bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub enum ChainKind {
    Stones {
        color: Color,
        /// Empty cells adjacent to the chain, sorted and unique.
        connections: Vec<Point>,
    },
    Empty {
        /// Adjacent cells holding stones of the side to move.
        player_connections: Vec<Point>,
        /// Adjacent cells holding stones of the opponent.
        opponent_connections: Vec<Point>,
        /// Set by the state's ownership pass.
        is_eye: bool,
    },
}

/// A maximal connected region of identical cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Chain {
    /// Sequential index within its group, in discovery order.
    pub id: usize,
    /// Cells of the chain, sorted and unique.
    pub points: Vec<Point>,
    pub kind: ChainKind,
}

/// Average normalized distance to the empty cells a chain can reach, and
/// how many there are.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Reach {
    pub average: f64,
    pub count: usize,
}

impl Chain {
    /// The cell value this chain is made of.
    pub fn cell(&self) -> Cell {
        match &self.kind {
            ChainKind::Stones { color, .. } => color.stone(),
            ChainKind::Empty { .. } => Cell::Empty,
        }
    }

    /// Liberties of a stone chain. Empty for empty regions.
    pub fn connections(&self) -> &[Point] {
        match &self.kind {
            ChainKind::Stones { connections, .. } => connections,
            ChainKind::Empty { .. } => &[],
        }
    }

    pub fn player_connections(&self) -> &[Point] {
        match &self.kind {
            ChainKind::Empty { player_connections, .. } => player_connections,
            ChainKind::Stones { .. } => &[],
        }
    }

    pub fn opponent_connections(&self) -> &[Point] {
        match &self.kind {
            ChainKind::Empty { opponent_connections, .. } => opponent_connections,
            ChainKind::Stones { .. } => &[],
        }
    }

    /// Total number of recorded contacts.
    pub fn connection_count(&self) -> usize {
        match &self.kind {
            ChainKind::Stones { connections, .. } => connections.len(),
            ChainKind::Empty {
                player_connections,
                opponent_connections,
                ..
            } => player_connections.len() + opponent_connections.len(),
        }
    }

    pub fn is_eye(&self) -> bool {
        matches!(self.kind, ChainKind::Empty { is_eye: true, .. })
    }

    pub(crate) fn mark_eye(&mut self) {
        if let ChainKind::Empty { is_eye, .. } = &mut self.kind {
            *is_eye = true;
        }
    }

    /// Write this chain's cell value onto each of its points.
    pub fn apply_to(&self, board: &mut Board) {
        let cell = self.cell();
        for &p in &self.points {
            board.set(p, cell);
        }
    }

    /// BFS from this chain through empty cells.
    ///
    /// Distances are reduced by one and normalized by `width + height - 3`,
    /// then averaged over every reached cell outside the chain itself.
    pub fn reach(&self, board: &Board) -> Reach {
        let map = distance_map(board, std::iter::once(self));
        let norm = (board.width() + board.height()) as f64 - 3.0;

        let (sum, count) = map
            .iter()
            .filter(|&&d| d > 0)
            .fold((0.0, 0usize), |(sum, count), &d| {
                let scaled = if norm > 0.0 { f64::from(d - 1) / norm } else { 0.0 };
                (sum + scaled, count + 1)
            });

        if count == 0 {
            return Reach::default();
        }
        Reach {
            average: sum / count as f64,
            count,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<C{} {} PS:{} CN:", self.id, self.cell().symbol(), self.points.len())?;
        match &self.kind {
            ChainKind::Stones { connections, .. } => write!(f, "{}>", connections.len()),
            ChainKind::Empty {
                player_connections,
                opponent_connections,
                ..
            } => write!(f, "[P:{},O:{}]>", player_connections.len(), opponent_connections.len()),
        }
    }
}

/// Multi-source BFS from every point of `seeds`, expanding through empty cells.
///
/// Seed points get 0, reached empty cells their layer number, and everything
/// else (Void, other stones, unreachable regions) gets -1.
pub fn distance_map<'a>(board: &Board, seeds: impl IntoIterator<Item = &'a Chain>) -> Vec<i32> {
    let mut map = vec![-1; board.len()];
    let mut queue = VecDeque::new();
    for chain in seeds {
        for &p in &chain.points {
            map[p] = 0;
            queue.push_back(p);
        }
    }

    while let Some(p) = queue.pop_front() {
        let next = map[p] + 1;
        for n in board.neighbors(p) {
            if map[n] == -1 && board.get(n) == Cell::Empty {
                map[n] = next;
                queue.push_back(n);
            }
        }
    }
    map
}

/// All chains of a board, bucketed by owner, plus the cell-to-chain map.
#[derive(Clone, Debug)]
pub struct ChainSet {
    pub player: Vec<Chain>,
    pub opponent: Vec<Chain>,
    pub neutral: Vec<Chain>,
    cells: Vec<Option<ChainRef>>,
}

impl ChainSet {
    /// Decompose `board` in a single row-major pass.
    pub fn from_board(board: &Board) -> Self {
        let mut set = ChainSet {
            player: Vec::new(),
            opponent: Vec::new(),
            neutral: Vec::new(),
            cells: vec![None; board.len()],
        };

        for start in 0..board.len() {
            let cell = board.get(start);
            if cell == Cell::Void || set.cells[start].is_some() {
                continue;
            }

            let group = match cell.stone() {
                None => ChainGroup::Neutral,
                Some(c) if c == board.player() => ChainGroup::Player,
                Some(_) => ChainGroup::Opponent,
            };
            let chain_ref = ChainRef {
                group,
                index: set.group(group).len(),
            };

            let (points, contacts) = fill(board, start, chain_ref, &mut set.cells);
            let kind = match cell.stone() {
                Some(color) => ChainKind::Stones {
                    color,
                    connections: sorted_unique(contacts.into_iter().map(|(p, _)| p).collect()),
                },
                None => {
                    let player = board.player().stone();
                    let (mine, theirs): (Vec<_>, Vec<_>) =
                        contacts.into_iter().partition(|&(_, c)| c == player);
                    ChainKind::Empty {
                        player_connections: sorted_unique(mine.into_iter().map(|(p, _)| p).collect()),
                        opponent_connections: sorted_unique(theirs.into_iter().map(|(p, _)| p).collect()),
                        is_eye: false,
                    }
                }
            };

            let chain = Chain {
                id: chain_ref.index,
                points: sorted_unique(points),
                kind,
            };
            set.group_mut(group).push(chain);
        }

        set
    }

    pub fn group(&self, group: ChainGroup) -> &[Chain] {
        match group {
            ChainGroup::Player => &self.player,
            ChainGroup::Opponent => &self.opponent,
            ChainGroup::Neutral => &self.neutral,
        }
    }

    fn group_mut(&mut self, group: ChainGroup) -> &mut Vec<Chain> {
        match group {
            ChainGroup::Player => &mut self.player,
            ChainGroup::Opponent => &mut self.opponent,
            ChainGroup::Neutral => &mut self.neutral,
        }
    }

    pub fn get(&self, chain_ref: ChainRef) -> &Chain {
        &self.group(chain_ref.group)[chain_ref.index]
    }

    /// Reference to the chain owning `p`, `None` for Void cells.
    pub fn owner_ref(&self, p: Point) -> Option<ChainRef> {
        self.cells[p]
    }

    /// The chain owning `p`, `None` for Void cells.
    pub fn owner(&self, p: Point) -> Option<&Chain> {
        self.cells[p].map(|r| self.get(r))
    }

    /// Number of empty cells on the board.
    pub fn free_cells(&self) -> usize {
        self.neutral.iter().map(|c| c.points.len()).sum()
    }

    pub(crate) fn mark_eye(&mut self, index: usize) {
        self.neutral[index].mark_eye();
    }
}

/// Flood-fill the region of `start` with an explicit worklist, claiming its
/// cells in `cells`. Returns the region's points and every contact with a
/// neighbour where exactly one side is empty.
fn fill(
    board: &Board,
    start: Point,
    chain_ref: ChainRef,
    cells: &mut [Option<ChainRef>],
) -> (Vec<Point>, Vec<(Point, Cell)>) {
    let value = board.get(start);
    let mut points = Vec::new();
    let mut contacts = Vec::new();
    let mut stack = vec![start];
    cells[start] = Some(chain_ref);

    while let Some(p) = stack.pop() {
        points.push(p);
        for n in board.neighbors(p) {
            let other = board.get(n);
            if other == Cell::Void {
                continue;
            }
            if other == value {
                if cells[n].is_none() {
                    cells[n] = Some(chain_ref);
                    stack.push(n);
                }
            } else if value == Cell::Empty || other == Cell::Empty {
                contacts.push((n, other));
            }
        }
    }

    (points, contacts)
}

fn sorted_unique(mut v: Vec<Point>) -> Vec<Point> {
    v.sort_unstable();
    v.dedup();
    v
}
