//! Error types for the board model, the engine, and configuration.
//!
//! Every failure in this crate is a broken contract rather than an
//! environmental problem: playing into a full column, asking for a move on a
//! finished game, or configuring a search that cannot run.

use thiserror::Error;

use crate::node::NodeId;
use crate::position::Status;

/// Errors raised when a disc cannot be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("column {0} is outside the board")]
    ColumnOutOfRange(usize),

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("no legal columns remain")]
    NoLegalColumns,

    #[error("the game is already over")]
    GameOver,
}

/// Errors raised when parsing a textual board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePositionError {
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown symbol '{symbol}' at column {col}, row {row}")]
    UnknownSymbol { symbol: char, col: usize, row: usize },

    #[error("disc at column {col}, row {row} is floating above an empty cell")]
    FloatingDisc { col: usize, row: usize },
}

/// Errors raised by an invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("iteration budget must be at least 1")]
    ZeroIterations,

    #[error("simulations per iteration must be at least 1")]
    ZeroSimulations,

    #[error("node cap must be between 1 and u32::MAX, got {0}")]
    InvalidMaxNodes(usize),

    #[error("exploration constant must be finite and non-negative, got {0}")]
    InvalidExploration(f64),

    #[error("outcome value '{name}' must be finite, got {value}")]
    InvalidOutcomeValue { name: &'static str, value: f64 },
}

/// Errors raised by the search engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot search a finished position ({0:?})")]
    TerminalPosition(Status),

    #[error("node {0:?} has no children to choose from")]
    NoChildren(NodeId),

    #[error("search stopped before any move was evaluated")]
    NoEvaluatedMoves,

    #[error("search tree is full ({limit} nodes)")]
    TreeFull { limit: usize },

    #[error("move error: {0}")]
    Move(#[from] MoveError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
