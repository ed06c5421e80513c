//! Runtime configuration for games and searches.

use clap::ValueEnum;

use crate::constants::DEFAULT_DEPTH;

/// How stone and territory counts are weighted when scoring.
///
/// Exactly one scheme applies to a game; they are never combined.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Weighting {
    /// Every cell counts 1.
    Flat,
    /// Stone chains are attenuated by how far and how widely they reach
    /// into empty space.
    #[default]
    Reach,
    /// Every cell is discounted by its distance from the board's center,
    /// scaled by how much of the board is still empty.
    DepthMap,
}

/// Settings for a [`crate::game::Game`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies searched below the root by `Game::find_best_move`.
    pub depth: u32,
    pub weighting: Weighting,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            weighting: Weighting::default(),
        }
    }
}
