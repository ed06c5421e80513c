//! Depth-bounded minimax over [`State`]s.
//!
//! Values alternate perspective every ply: a state's value is from the point
//! of view of its side to move, so a parent picks the child with the lowest
//! value and negates it. Leaves are scored with [`State::chain_score`].
//!
//! Each call to [`find_best_move`] owns a fresh transposition cache keyed by
//! the full packed code (side to move and pass flag included). Nothing
//! survives between calls.

use num_bigint::BigUint;
use rustc_hash::FxHashMap;

use crate::board::Color;
use crate::point;
use crate::state::{Move, State};

/// Candidate moves for a state, in search order.
pub type CandidateFn = fn(&State) -> Vec<(Move, State)>;

/// Per-side candidate selection.
#[derive(Copy, Clone)]
pub struct Policy {
    pub black: CandidateFn,
    pub white: CandidateFn,
}

impl Policy {
    /// Use `candidates` for both sides.
    pub fn uniform(candidates: CandidateFn) -> Self {
        Self {
            black: candidates,
            white: candidates,
        }
    }

    pub fn candidates(&self, state: &State) -> Vec<(Move, State)> {
        match state.board().player() {
            Color::Black => (self.black)(state),
            Color::White => (self.white)(state),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::uniform(all_moves)
    }
}

/// Every legal move.
pub fn all_moves(state: &State) -> Vec<(Move, State)> {
    state.valid_moves().into_iter().collect()
}

/// Legal moves except those filling an eye, of either side.
pub fn avoid_eyes(state: &State) -> Vec<(Move, State)> {
    let eyes = state.eye_points();
    state
        .valid_moves()
        .into_iter()
        .filter(|(mv, _)| mv.is_none_or(|p| !eyes.contains(&p)))
        .collect()
}

/// Result of one search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub best_move: Move,
    /// Value of the root for its side to move.
    pub value: f64,
    /// Successor states examined, cache hits excluded.
    pub states_visited: usize,
}

/// Static evaluation from the side to move's point of view.
pub fn evaluate(state: &State) -> f64 {
    let [player, opponent] = state.chain_score();
    player - opponent
}

/// Search `depth` plies below `state` and return the best move for its side
/// to move.
pub fn find_best_move(state: &State, depth: u32, policy: &Policy) -> SearchOutcome {
    let mut searcher = Searcher {
        policy,
        cache: FxHashMap::default(),
        states_visited: 0,
    };
    let (best_move, value) = searcher.search(state, depth);

    log::debug!(
        "search depth {depth}: best {} value {value:.3}, {} states, {} cached",
        format_move(best_move, state.board().width()),
        searcher.states_visited,
        searcher.cache.len()
    );

    SearchOutcome {
        best_move,
        value,
        states_visited: searcher.states_visited,
    }
}

/// `pass` or `(x,y)`.
pub fn format_move(mv: Move, width: usize) -> String {
    match mv {
        Some(p) => point::format(p, width),
        None => "pass".into(),
    }
}

struct Searcher<'a> {
    policy: &'a Policy,
    cache: FxHashMap<BigUint, (Move, f64)>,
    states_visited: usize,
}

impl Searcher<'_> {
    fn search(&mut self, state: &State, depth: u32) -> (Move, f64) {
        let code = state.board().pack();
        if let Some(&hit) = self.cache.get(&code) {
            return hit;
        }

        let mut best: Option<(Move, f64)> = None;
        for (mv, next) in self.policy.candidates(state) {
            self.states_visited += 1;

            // Two passes in a row end the game, so the position is final.
            let game_over = state.board().is_pass() && mv.is_none();
            let value = if depth == 0 || game_over {
                evaluate(&next)
            } else {
                self.search(&next, depth - 1).1
            };

            if best.is_none_or(|(_, b)| value < b) {
                best = Some((mv, value));
            }
        }

        let result = match best {
            Some((mv, value)) => (mv, -value),
            None => (None, evaluate(state)),
        };
        self.cache.insert(code, result);
        result
    }
}
