//! go-minimax command line front end.
//!
//! ## Usage
//!
//! - `go-minimax` / `go-minimax demo` - Walk through a few positions
//! - `go-minimax best _WW BBB _W_ --side W --depth 2` - Recommend a move
//! - `go-minimax moves _WW BBB _W_ --side W` - List legal moves
//! - `go-minimax selfplay --width 5 --height 5` - Let the engine play itself
//!
//! Set `RUST_LOG=debug` (or pass `--verbose`) to see search statistics.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use go_minimax::board::{Board, Color};
use go_minimax::config::{SearchConfig, Weighting};
use go_minimax::constants::{DEFAULT_DEPTH, DEFAULT_MAX_MOVES};
use go_minimax::game::Game;
use go_minimax::search::{Policy, all_moves, avoid_eyes, format_move};
use go_minimax::state::{Move, ScoreWeights, State};

/// go-minimax: a Go rules engine with bounded minimax search
#[derive(Parser)]
#[command(name = "go-minimax")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log search statistics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// A position given on the command line.
#[derive(Args)]
struct PositionArgs {
    /// Board rows: X = void, _ = empty, B = black, W = white
    #[arg(required = true)]
    rows: Vec<String>,

    /// Side to move (B or W)
    #[arg(short, long, default_value = "B")]
    side: String,

    /// The previous move was a pass
    #[arg(long)]
    pass: bool,
}

impl PositionArgs {
    fn board(&self) -> Result<Board> {
        let side = Color::from_symbol(&self.side)?;
        Board::from_rows(&self.rows, side, self.pass).context("invalid board")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a short demo of the engine
    Demo,
    /// Recommend a move for a position
    Best {
        #[command(flatten)]
        position: PositionArgs,

        /// Plies to search below the root
        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: u32,

        /// Scoring scheme
        #[arg(short, long, value_enum, default_value_t)]
        weighting: Weighting,

        /// Skip moves that fill an eye
        #[arg(long)]
        avoid_eyes: bool,
    },
    /// List legal moves for a position
    Moves {
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Let the engine play both sides on an empty board
    Selfplay {
        #[arg(long, default_value_t = 5)]
        width: usize,

        #[arg(long, default_value_t = 5)]
        height: usize,

        /// Plies to search below the root
        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: u32,

        /// Scoring scheme
        #[arg(short, long, value_enum, default_value_t)]
        weighting: Weighting,

        /// Stop after this many plies
        #[arg(long, default_value_t = DEFAULT_MAX_MOVES)]
        max_moves: usize,

        /// Random legal moves to play before searching
        #[arg(long, default_value_t = 0)]
        opening: usize,

        /// Seed for the random opening
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Some(Commands::Best {
            position,
            depth,
            weighting,
            avoid_eyes: skip_eyes,
        }) => {
            let board = position.board()?;
            let config = SearchConfig { depth, weighting };
            let game = Game::with_config(board, config);
            let policy = if skip_eyes {
                Policy::uniform(avoid_eyes)
            } else {
                Policy::uniform(all_moves)
            };
            let outcome = game.search(depth, &policy);
            info!(
                "{} states examined, value {:.3}",
                outcome.states_visited, outcome.value
            );
            println!("{}", format_move(outcome.best_move, game.state().board().width()));
        }
        Some(Commands::Moves { position }) => {
            let board = position.board()?;
            let width = board.width();
            let state = State::with_weights(board, ScoreWeights::Reach);
            println!("{state}");
            for (mv, next) in state.valid_moves() {
                let [player, opponent] = next.chain_score();
                println!("{:>8}  {:+.3}", format_move(mv, width), opponent - player);
            }
        }
        Some(Commands::Selfplay {
            width,
            height,
            depth,
            weighting,
            max_moves,
            opening,
            seed,
        }) => {
            anyhow::ensure!(width > 0 && height > 0, "board must have at least one cell");
            let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
            let config = SearchConfig { depth, weighting };
            let game = Game::with_config(Board::empty(width, height, Color::Black), config);
            self_play(game, max_moves, opening, &mut rng)?;
        }
        Some(Commands::Demo) | None => run_demo()?,
    }

    Ok(())
}

fn self_play(mut game: Game, max_moves: usize, opening: usize, rng: &mut fastrand::Rng) -> Result<()> {
    let width = game.state().board().width();
    let config = game.config();
    info!("self-play at depth {} with {:?} weighting", config.depth, config.weighting);

    for ply in 0..max_moves {
        if game.is_over() {
            break;
        }
        let side = game.state().board().player();
        let mv: Move = if ply < opening {
            let placements: Vec<Move> = game
                .state()
                .valid_moves()
                .into_keys()
                .filter(Option::is_some)
                .collect();
            rng.choice(placements).flatten()
        } else {
            game.suggest()
        };

        info!("{side} plays {}", format_move(mv, width));
        game.play(mv).with_context(|| format!("engine chose an illegal move at ply {ply}"))?;
    }

    let state = game.state();
    println!("{}", state.board());
    let [player, opponent] = state.area_score();
    let (black, white) = match state.board().player() {
        Color::Black => (player, opponent),
        Color::White => (opponent, player),
    };
    println!("Area: B {black:.1} W {white:.1}");
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("go-minimax: Go rules engine with bounded minimax\n");

    println!("=== Suicide Prevention ===");
    let board = Board::from_rows(&["_WW", "BBB", "_W_"], Color::White, false)?;
    let state = State::new(board);
    println!("{state}");
    let legal: Vec<String> = state.valid_moves().into_keys().map(|m| format_move(m, 3)).collect();
    println!("Legal moves: {}\n", legal.join(" "));

    println!("=== Capture ===");
    let board = Board::from_rows(&["W_", "BB"], Color::White, false)?;
    let captured = State::new(board).make_move(Some(1));
    println!("{}\n", captured.board());

    println!("=== Search ===");
    let board = Board::from_rows(&["_BB", "XW_", "_B_", "___"], Color::Black, false)?;
    let game = Game::new(board);
    let [black, white] = game.state().chain_score();
    println!("Chain score: B {black:.3} W {white:.3}");
    let outcome = game.search(2, &Policy::default());
    println!(
        "Best move at depth 2: {} (value {:.3}, {} states)\n",
        format_move(outcome.best_move, 3),
        outcome.value,
        outcome.states_visited
    );

    println!("=== Self-play 4x4 ===");
    let game = Game::new(Board::empty(4, 4, Color::Black));
    self_play(game, 12, 0, &mut fastrand::Rng::with_seed(7))
}
