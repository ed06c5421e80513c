//! Game state: a board with its chain decomposition and repetition history.
//!
//! This module provides the rules and the evaluation heuristic:
//! - Ownership of empty regions and eye detection
//! - Legal move generation with suicide prevention and positional superko
//! - Move application (captures and placement)
//! - Piece, area and chain scores
//!
//! A [`State`] is immutable once built. [`State::make_move`] is the only way
//! to derive a new one, and it rebuilds the chain set from scratch. Scores
//! are always `[side to move, opponent]` for the state they were computed on.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use num_bigint::BigUint;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::board::Board;
use crate::chain::{Chain, ChainGroup, ChainSet};
use crate::config::Weighting;
use crate::constants::{LONE_LIBERTY_MULTIPLIER, SECURE_EYE_COUNT, SMALL_REGION_POINTS, SOLID_CHAIN_POINTS};
use crate::point::Point;

/// A move: a point to play on, or `None` to pass.
pub type Move = Option<Point>;

/// Board codes of previously seen positions.
pub type History = FxHashSet<BigUint>;

/// Per-game weighting data shared by every state of the game.
#[derive(Clone, Debug, PartialEq)]
pub enum ScoreWeights {
    Flat,
    Reach,
    /// Normalized distance of each cell from the center (`None` for Void).
    DepthMap(Rc<Vec<Option<f64>>>),
}

impl ScoreWeights {
    /// Precompute whatever `weighting` needs for games played on `board`.
    pub fn for_board(weighting: Weighting, board: &Board) -> Self {
        match weighting {
            Weighting::Flat => ScoreWeights::Flat,
            Weighting::Reach => ScoreWeights::Reach,
            Weighting::DepthMap => ScoreWeights::DepthMap(Rc::new(board.depth_map())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Player,
    Opponent,
}

impl Side {
    fn slot(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }

    fn stones(self) -> ChainGroup {
        match self {
            Side::Player => ChainGroup::Player,
            Side::Opponent => ChainGroup::Opponent,
        }
    }

    /// Whether an empty region touches only this side's stones.
    fn owns(self, region: &Chain) -> bool {
        let (mine, theirs) = match self {
            Side::Player => (region.player_connections(), region.opponent_connections()),
            Side::Opponent => (region.opponent_connections(), region.player_connections()),
        };
        !mine.is_empty() && theirs.is_empty()
    }

    fn contacts(self, region: &Chain) -> &[Point] {
        match self {
            Side::Player => region.player_connections(),
            Side::Opponent => region.opponent_connections(),
        }
    }
}

const SIDES: [Side; 2] = [Side::Player, Side::Opponent];

/// A position in the game tree.
#[derive(Clone, Debug)]
pub struct State {
    board: Board,
    chains: ChainSet,
    weights: ScoreWeights,
    /// Fraction of the board that is empty, for depth-map weighting.
    depth_scale: f64,
    local_history: Rc<History>,
    global_history: Rc<History>,
}

impl State {
    /// State with reach weighting and empty histories.
    pub fn new(board: Board) -> Self {
        Self::with_history(board, ScoreWeights::Reach, Rc::default(), Rc::default())
    }

    pub fn with_weights(board: Board, weights: ScoreWeights) -> Self {
        Self::with_history(board, weights, Rc::default(), Rc::default())
    }

    /// Decompose `board` and classify its empty regions.
    pub fn with_history(
        board: Board,
        weights: ScoreWeights,
        local_history: Rc<History>,
        global_history: Rc<History>,
    ) -> Self {
        let mut chains = ChainSet::from_board(&board);
        classify_eyes(&mut chains);
        let depth_scale = chains.free_cells() as f64 / board.len() as f64;

        Self {
            board,
            chains,
            weights,
            depth_scale,
            local_history,
            global_history,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn chains(&self) -> &ChainSet {
        &self.chains
    }

    /// Board codes seen along the current search branch.
    pub fn local_history(&self) -> &History {
        &self.local_history
    }

    /// Board codes of the committed game.
    pub fn global_history(&self) -> &History {
        &self.global_history
    }

    /// Same position with an empty local history and a new global history.
    pub(crate) fn rebase(self, global_history: Rc<History>) -> Self {
        Self {
            local_history: Rc::default(),
            global_history,
            ..self
        }
    }

    /// Every point of every empty region marked as an eye.
    pub fn eye_points(&self) -> FxHashSet<Point> {
        self.chains
            .neutral
            .iter()
            .filter(|c| c.is_eye())
            .flat_map(|c| c.points.iter().copied())
            .collect()
    }

    /// Apply `mv` for the side to move.
    ///
    /// Opponent chains whose single liberty is `mv` are captured. The new
    /// board code is appended to a copy of the local history; the global
    /// history is shared.
    pub fn make_move(&self, mv: Move) -> State {
        let mut board = self.board.cleared(self.board.opponent(), mv.is_none());

        for chain in &self.chains.player {
            chain.apply_to(&mut board);
        }
        for chain in &self.chains.opponent {
            let captured = matches!(chain.connections(), [only] if Some(*only) == mv);
            if !captured {
                chain.apply_to(&mut board);
            }
        }
        if let Some(p) = mv {
            board.set(p, self.board.player().stone());
        }

        let mut local = (*self.local_history).clone();
        local.insert(board.code());

        State::with_history(
            board,
            self.weights.clone(),
            Rc::new(local),
            Rc::clone(&self.global_history),
        )
    }

    /// Legal moves and the states they lead to, pass first, then by point.
    ///
    /// A point is offered if its empty region has more than one cell, if it
    /// is a liberty of one of our chains that has another liberty, or if it
    /// is the last liberty of an opponent chain. Moves that recreate a board
    /// in either history are dropped; passing is always allowed.
    pub fn valid_moves(&self) -> BTreeMap<Move, State> {
        let alive: FxHashSet<Point> = self
            .chains
            .player
            .iter()
            .filter(|c| c.connections().len() > 1)
            .flat_map(|c| c.connections().iter().copied())
            .collect();
        let dead: FxHashSet<Point> = self
            .chains
            .opponent
            .iter()
            .filter_map(|c| match c.connections() {
                [only] => Some(*only),
                _ => None,
            })
            .collect();

        let mut result = BTreeMap::new();
        result.insert(None, self.make_move(None));

        for region in &self.chains.neutral {
            let first = region.points[0];
            if region.points.len() == 1 && !alive.contains(&first) && !dead.contains(&first) {
                continue;
            }
            for &p in &region.points {
                let next = self.make_move(Some(p));
                let code = next.board.code();
                if self.global_history.contains(&code) || self.local_history.contains(&code) {
                    continue;
                }
                result.insert(Some(p), next);
            }
        }

        result
    }

    fn cell_score(&self, p: Point) -> f64 {
        match &self.weights {
            ScoreWeights::DepthMap(depth) => 1.0 - depth[p].unwrap_or(0.0) * self.depth_scale,
            ScoreWeights::Flat | ScoreWeights::Reach => 1.0,
        }
    }

    fn points_score(&self, points: &[Point]) -> f64 {
        points.iter().map(|&p| self.cell_score(p)).sum()
    }

    /// Stones on the board per side.
    pub fn piece_score(&self) -> [f64; 2] {
        [
            self.chains.player.iter().map(|c| self.points_score(&c.points)).sum(),
            self.chains.opponent.iter().map(|c| self.points_score(&c.points)).sum(),
        ]
    }

    /// Stones plus empty regions bordered by a single side.
    pub fn area_score(&self) -> [f64; 2] {
        let mut result = self.piece_score();
        for region in &self.chains.neutral {
            for side in SIDES {
                if side.owns(region) {
                    result[side.slot()] += self.points_score(&region.points);
                }
            }
        }
        result
    }

    /// Eye territory plus each stone chain discounted by its safety.
    pub fn chain_score(&self) -> [f64; 2] {
        let mut result = [0.0; 2];
        let total_free = self.chains.free_cells();

        for side in SIDES {
            let slot = side.slot();
            for region in &self.chains.neutral {
                if region.is_eye() && side.owns(region) {
                    result[slot] += self.points_score(&region.points);
                }
            }
            for chain in self.chains.group(side.stones()) {
                result[slot] += self.points_score(&chain.points)
                    * self.safety(chain, side)
                    * self.attenuation(chain, total_free);
            }
        }

        result
    }

    fn safety(&self, chain: &Chain, side: Side) -> f64 {
        let eyes: FxHashSet<usize> = chain
            .connections()
            .iter()
            .filter_map(|&p| self.chains.owner(p))
            .filter(|region| region.is_eye() && side.owns(region))
            .map(|region| region.id)
            .collect();

        if eyes.len() >= SECURE_EYE_COUNT {
            1.0
        } else {
            liberty_multiplier(chain.connections().len())
        }
    }

    fn attenuation(&self, chain: &Chain, total_free: usize) -> f64 {
        match self.weights {
            ScoreWeights::Reach if total_free == 0 => 0.0,
            ScoreWeights::Reach => {
                let reach = chain.reach(&self.board);
                (1.0 - reach.average) * reach.count as f64 / total_free as f64
            }
            ScoreWeights::Flat | ScoreWeights::DepthMap(_) => 1.0,
        }
    }
}

/// Confidence in a chain with `liberties` liberties and fewer than two eyes.
///
/// One liberty or none scores 0.25; from two on it is the partial sum
/// 0.5 + 0.25 + ... of `liberties - 1` terms, which approaches 1.
pub fn liberty_multiplier(liberties: usize) -> f64 {
    if liberties <= 1 {
        LONE_LIBERTY_MULTIPLIER
    } else {
        (2..=liberties).map(|i| 0.5f64.powi(i as i32 - 1)).sum()
    }
}

/// Mark owned empty regions that share their bordering chains with another
/// owned region of the same side.
///
/// A region's signature is the set of stone chains it touches, skipping
/// single-stone chains unless the region itself is small.
///
/// Large regions bordered only by single stones all get the empty
/// signature and are grouped together, so two of them count as eyes.
fn classify_eyes(chains: &mut ChainSet) {
    let mut eyes = Vec::new();

    for side in SIDES {
        let mut signatures: FxHashMap<Vec<usize>, Vec<usize>> = FxHashMap::default();
        for (index, region) in chains.neutral.iter().enumerate() {
            if !side.owns(region) {
                continue;
            }
            let small = region.points.len() <= SMALL_REGION_POINTS;
            let signature: BTreeSet<usize> = side
                .contacts(region)
                .iter()
                .filter_map(|&p| chains.owner(p))
                .filter(|stones| small || stones.points.len() >= SOLID_CHAIN_POINTS)
                .map(|stones| stones.id)
                .collect();
            signatures
                .entry(signature.into_iter().collect())
                .or_default()
                .push(index);
        }

        eyes.extend(
            signatures
                .into_values()
                .filter(|members| members.len() > 1)
                .flatten(),
        );
    }

    for index in eyes {
        chains.mark_eye(index);
    }
}

fn chain_lines(name: &str, chains: &[Chain]) -> Vec<String> {
    if chains.is_empty() {
        return vec![format!("{name}:")];
    }
    chains
        .iter()
        .enumerate()
        .map(|(i, c)| if i == 0 { format!("{name}: {c}") } else { format!("   {c}") })
        .collect()
}

/// Diagnostic dump: board rows on the left, chain listings on the right.
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.board.to_string();
        let mut board_lines = board.lines();
        write!(f, "{}", board_lines.next().unwrap_or_default())?;
        let rows: Vec<&str> = board_lines.collect();

        let mut chains = chain_lines("N", &self.chains.neutral);
        chains.extend(chain_lines("P", &self.chains.player));
        chains.extend(chain_lines("O", &self.chains.opponent));

        let blank = " ".repeat(self.board.width());
        for i in 0..rows.len().max(chains.len()) {
            let row = rows.get(i).copied().unwrap_or(blank.as_str());
            let chain = chains.get(i).map(String::as_str).unwrap_or_default();
            write!(f, "\n{row}   {chain}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    fn state(rows: &[&str], player: Color, is_pass: bool) -> State {
        State::new(Board::from_rows(rows, player, is_pass).unwrap())
    }

    fn moves(state: &State) -> Vec<Move> {
        state.valid_moves().into_keys().collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_making_state() {
        let s = state(&["X_X", "WWB"], Color::Black, false);
        assert_eq!(s.chains().neutral.len(), 1);
        assert_eq!(s.chains().neutral[0].points, vec![1]);
        assert_eq!(s.chains().player[0].points, vec![5]);
        assert_eq!(s.chains().opponent[0].points, vec![3, 4]);
    }

    #[test]
    fn test_state_display() {
        let s = state(&["W_W", "W_B", "B_X"], Color::White, true);
        let expected = [
            "W (pass)",
            "W_W   N: <C0 _ PS:3 CN:[P:3,O:2]>",
            "W_B   P: <C0 W PS:2 CN:2>",
            "B_X      <C1 W PS:1 CN:1>",
            "      O: <C0 B PS:1 CN:1>",
            "         <C1 B PS:1 CN:1>",
        ];
        assert_eq!(s.to_string(), expected.join("\n"));
    }

    #[test]
    fn test_piece_and_area_score() {
        let s = state(&["X__", "WWW", "__B", "BB_"], Color::White, false);
        assert_eq!(s.area_score(), [5.0, 4.0]);
        assert_eq!(s.piece_score(), [3.0, 3.0]);
    }

    #[test]
    fn test_chain_score_favors_connected_group() {
        let s = state(&["_BB", "XW_", "_B_", "___"], Color::Black, false);
        let score = s.chain_score();
        assert!(score[0] > score[1], "{score:?}");
    }

    #[test]
    fn test_chain_score_symmetric_eyes() {
        let s = state(&["_W_", "X_X", "_B_"], Color::White, false);
        let score = s.chain_score();
        assert_eq!(score[0], score[1]);
        assert!(s.chains().neutral.iter().filter(|c| c.is_eye()).count() == 4);
    }

    #[test]
    fn test_chain_score_proper_eyes() {
        let s = state(&["B_B", "WX_"], Color::Black, true);
        let score = s.chain_score();
        assert!(score[0] > score[1], "{score:?}");
    }

    #[test]
    fn test_single_stone_does_not_make_eyes() {
        let s = state(&["X_X__", "_B___", "_____"], Color::White, false);
        assert!(s.eye_points().is_empty());
        let score = s.chain_score();
        assert_eq!(score[0], 0.0);
        assert!(score[1] > 0.0);
    }

    #[test]
    fn test_longer_chain_scores_higher() {
        let bent = state(&["___", "_W_", "_W_", "WW_", "___"], Color::White, false);
        let straight = state(&["___", "_W_", "_W_", "_W_", "_W_"], Color::White, false);
        assert!(straight.chain_score()[0] > bent.chain_score()[0]);
    }

    #[test]
    fn test_liberty_multiplier() {
        assert_eq!(liberty_multiplier(0), 0.25);
        assert_eq!(liberty_multiplier(1), 0.25);
        assert_eq!(liberty_multiplier(2), 0.5);
        assert_eq!(liberty_multiplier(3), 0.75);
        assert_eq!(liberty_multiplier(4), 0.875);
        assert!(liberty_multiplier(40) < 1.0);
    }

    #[test]
    fn test_flat_weights_skip_reach() {
        let board = Board::from_rows(&["_B_"], Color::Black, false).unwrap();
        let s = State::with_weights(board, ScoreWeights::Flat);
        // Both corners are eyes sharing the stone, so the stone is secure.
        assert_eq!(s.chain_score(), [2.0 + 1.0, 0.0]);
    }

    #[test]
    fn test_reach_attenuation() {
        // One liberty, a second layer at distance 2 and a walled-off free
        // cell: average reach 1/6 over 2 of 3 free cells.
        let s = state(&["B__X_"], Color::Black, false);
        let reach = s.chains().player[0].reach(s.board());
        assert_eq!(reach.count, 2);
        assert_close(reach.average, 1.0 / 6.0);

        let score = s.chain_score();
        assert_close(score[0], 0.25 * (5.0 / 6.0) * (2.0 / 3.0));
        assert_eq!(score[1], 0.0);
    }

    #[test]
    fn test_depth_map_weights() {
        let board = Board::from_rows(&["_B_", "_W_", "B__"], Color::White, false).unwrap();
        let weights = ScoreWeights::for_board(Weighting::DepthMap, &board);
        let s = State::with_weights(board, weights);
        assert_close(s.depth_scale, 6.0 / 9.0);

        // Heat: corners 2.0, edges 1.66, centre 1.33. The edge stone sits at
        // depth 0.33 / 0.67 and the corner stone at depth 1.
        let edge = 1.0 - (0.33 / 0.67) * (6.0 / 9.0);
        let corner = 1.0 - 6.0 / 9.0;
        let piece = s.piece_score();
        assert_eq!(piece[0], 1.0);
        assert_close(piece[1], edge + corner);

        // Both empty regions touch both colours, so no territory is added.
        let area = s.area_score();
        assert_eq!(area[0], piece[0]);
        assert_close(area[1], piece[1]);
    }

    #[test]
    fn test_regions_beside_single_stones_share_a_signature() {
        let s = state(&["___B___"], Color::White, false);
        let eyes: FxHashSet<Point> = [0, 1, 2, 4, 5, 6].into_iter().collect();
        assert_eq!(s.eye_points(), eyes);

        // Six eye points plus the now secure stone at reach 1 - 0.2.
        let score = s.chain_score();
        assert_eq!(score[0], 0.0);
        assert_close(score[1], 6.8);
    }

    #[test]
    fn test_valid_moves() {
        let s = state(&["X__X", "BBWW", "____"], Color::White, false);
        assert_eq!(moves(&s), vec![None, Some(1), Some(2), Some(8), Some(9), Some(10), Some(11)]);
    }

    #[test]
    fn test_no_suicide() {
        let s = state(&["_WW", "BBB", "_W_"], Color::White, false);
        assert_eq!(moves(&s), vec![None, Some(6), Some(8)]);
    }

    #[test]
    fn test_capturing_into_single_point() {
        let s = state(&["W_X", "BBB"], Color::Black, false);
        assert_eq!(moves(&s), vec![None, Some(1)]);
    }

    #[test]
    fn test_making_pass() {
        let s = state(&["___"], Color::Black, false);
        let moved = s.make_move(None);

        assert!(s.local_history().is_empty());
        assert!(moved.global_history().is_empty());
        assert_eq!(moved.local_history().len(), 1);
        assert!(moved.local_history().contains(&moved.board().code()));
        assert_eq!(moved.board().to_rows(), s.board().to_rows());
        assert_eq!(moved.board().player(), Color::White);
        assert!(moved.board().is_pass());
    }

    #[test]
    fn test_making_move() {
        let s = state(&["___W", "BBBB"], Color::White, false);
        let moved = s.make_move(Some(1));

        assert_eq!(moved.board().to_rows(), ["_W_W", "BBBB"]);
        assert_eq!(moved.board().player(), Color::Black);
        assert!(!moved.board().is_pass());

        let neutral: Vec<_> = moved.chains().neutral.iter().map(|c| c.points.clone()).collect();
        assert_eq!(neutral, vec![vec![0], vec![2]]);
        let opponent: Vec<_> = moved.chains().opponent.iter().map(|c| c.points.clone()).collect();
        assert_eq!(opponent, vec![vec![1], vec![3]]);
    }

    #[test]
    fn test_capture() {
        let s = state(&["W_", "BB"], Color::White, false);
        let moved = s.make_move(Some(1));

        assert_eq!(moved.board().to_rows(), ["WW", "__"]);
        assert_eq!(moved.board().player(), Color::Black);
        assert_eq!(moved.chains().neutral[0].points, vec![2, 3]);
        assert!(moved.chains().player.is_empty());
        assert_eq!(moved.chains().opponent[0].points, vec![0, 1]);
    }

    #[test]
    fn test_void_survives_moves() {
        let s = state(&["X_", "_X"], Color::Black, false);
        let moved = s.make_move(Some(1));
        assert_eq!(moved.board().to_rows(), ["XB", "_X"]);
    }

    #[test]
    fn test_cannot_repeat_positions() {
        let s = state(&["__"], Color::White, false);
        let s = s.make_move(Some(0));
        let s = s.make_move(Some(1));
        assert_eq!(s.board().to_rows(), ["_B"]);
        assert_eq!(moves(&s), vec![None]);
    }

    #[test]
    fn test_local_history_is_copy_on_write() {
        let s = state(&["___"], Color::Black, false);
        let a = s.make_move(Some(0));
        let b = a.make_move(Some(2));
        assert_eq!(a.local_history().len(), 1);
        assert_eq!(b.local_history().len(), 2);
        assert!(s.local_history().is_empty());
    }
}
