//! # Connect Four MCTS
//!
//! A Monte Carlo Tree Search decision engine for Connect Four on the
//! standard 7×6 board.
//!
//! Given a position and the side to move, the engine grows a search tree by
//! repeated select → expand → simulate → backpropagate passes guided by the
//! UCT policy, then answers with the column whose child has the best average
//! rollout score.
//!
//! ```
//! use mcts::position::{Position, Side};
//!
//! let mut position = Position::new();
//! mcts::apply_move(&mut position, Side::A, 3).unwrap();
//! let column = mcts::decide_move(&position, Side::B, 300).unwrap();
//! assert!(column < mcts::lines::NUM_COLS);
//! ```

pub mod config;
pub mod error;
pub mod game_controller;
pub mod game_state;
pub mod lines;
pub mod node;
pub mod position;
pub mod search;
pub mod tactics;
pub mod tree;
pub mod uct;

pub use config::{EngineConfig, OutcomeValues};
pub use error::{ConfigError, EngineError, MoveError, ParsePositionError};
pub use game_controller::{BudgetSchedule, GameController, MoveRecord};
pub use game_state::GameState;
pub use position::{Outcome, Position, Side, Status};
pub use search::{ChildSummary, Decision, DecisionSource, Engine, Search, SearchLimits};

/// Chooses a column for `side` with the default configuration and the given budget.
pub fn decide_move(position: &Position, side: Side, iterations: u32) -> Result<usize, EngineError> {
    let engine = Engine::new(EngineConfig::default().with_iterations(iterations))?;
    let decision = engine.decide(&GameState::new(*position, side))?;
    Ok(decision.column)
}

/// Drops a disc for `side` into `column`.
///
/// # Returns
/// The row the disc landed in, using the same gravity rule as the engine.
pub fn apply_move(position: &mut Position, side: Side, column: usize) -> Result<usize, MoveError> {
    position.place(side, column)
}
