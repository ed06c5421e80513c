//! A game in progress: the authoritative state and its repetition history.
//!
//! Every committed move folds the board codes it produced into the game's
//! history, so real moves can never recreate an earlier position. Search
//! branches only extend their own local history, which is discarded.

use std::rc::Rc;

use crate::board::Board;
use crate::config::SearchConfig;
use crate::error::MoveError;
use crate::search::{self, Policy, SearchOutcome};
use crate::state::{History, Move, ScoreWeights, State};

pub struct Game {
    state: State,
    history: Rc<History>,
    config: SearchConfig,
    consecutive_passes: usize,
}

impl Game {
    /// Start a game on `board` with the default configuration.
    pub fn new(board: Board) -> Self {
        Self::with_config(board, SearchConfig::default())
    }

    pub fn with_config(board: Board, config: SearchConfig) -> Self {
        let weights = ScoreWeights::for_board(config.weighting, &board);
        let history = Rc::new(History::from_iter([board.code()]));
        let state = State::with_history(board, weights, Rc::default(), Rc::clone(&history));
        Self {
            state,
            history,
            config,
            consecutive_passes: 0,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Board codes of every position the game has been in.
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Both sides passed in a row.
    pub fn is_over(&self) -> bool {
        self.consecutive_passes >= 2
    }

    /// Record a position the game must not return to.
    pub fn add_history(&mut self, board: &Board) {
        let mut history = (*self.history).clone();
        history.insert(board.code());
        self.history = Rc::new(history);
        self.state = self.state.clone().rebase(Rc::clone(&self.history));
    }

    /// Commit `mv` without checking it against the legal moves.
    pub fn make_move(&mut self, mv: Move) {
        let next = self.state.make_move(mv);
        self.commit(mv, next);
    }

    /// Commit `mv` if it is among the state's legal moves.
    ///
    /// # Errors
    /// [`MoveError::Illegal`] if the point is occupied, suicidal or repeats a
    /// position. Passing is always legal.
    pub fn play(&mut self, mv: Move) -> Result<(), MoveError> {
        let next = self
            .state
            .valid_moves()
            .remove(&mv)
            .ok_or(MoveError::Illegal(mv))?;
        self.commit(mv, next);
        Ok(())
    }

    fn commit(&mut self, mv: Move, next: State) {
        let mut history = (*self.history).clone();
        history.extend(next.local_history().iter().cloned());
        self.history = Rc::new(history);
        self.state = next.rebase(Rc::clone(&self.history));

        self.consecutive_passes = if mv.is_none() { self.consecutive_passes + 1 } else { 0 };
        log::trace!(
            "committed {} ({} positions in history)",
            search::format_move(mv, self.state.board().width()),
            self.history.len()
        );
    }

    /// Best move at `depth` for the side to move, searching every legal move.
    pub fn find_best_move(&self, depth: u32) -> Move {
        self.search(depth, &Policy::default()).best_move
    }

    /// Best move at the configured depth.
    pub fn suggest(&self) -> Move {
        self.find_best_move(self.config.depth)
    }

    pub fn search(&self, depth: u32, policy: &Policy) -> SearchOutcome {
        search::find_best_move(&self.state, depth, policy)
    }
}
