//! # Game Controller - authoritative game record
//!
//! The `GameController` is the single source of truth for a game in
//! progress. The engine only ever searches copies of its state, and every
//! move, human or engine, is validated here before it touches the board.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                GameController                │
//! │   position + side to move + status + history │
//! └──────────────────────────────────────────────┘
//!        │ copy                       ▲ column
//!        ▼                            │
//! ┌───────────────┐            ┌─────────────┐
//! │    Engine     │── decide ─▶│  MoveRecord │
//! └───────────────┘            └─────────────┘
//! ```

use std::fmt::Write as _;

use tracing::info;

use crate::error::{EngineError, MoveError};
use crate::game_state::GameState;
use crate::lines::NUM_COLS;
use crate::position::{Position, Side, Status};
use crate::search::{Decision, Engine};

/// A single entry in the move history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    /// Move number (1-indexed)
    pub number: usize,
    pub side: Side,
    pub column: usize,
    /// Row the disc landed in, 0 being the top
    pub row: usize,
}

/// Reduces the engine budget as the board fills up.
///
/// After each engine move the budget drops by the number of discs on the
/// board, never going below `min_iterations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSchedule {
    pub min_iterations: u32,
}

impl BudgetSchedule {
    pub fn next_budget(&self, current: u32, discs_on_board: usize) -> u32 {
        let discs = u32::try_from(discs_on_board).unwrap_or(u32::MAX);
        current.saturating_sub(discs).max(self.min_iterations.max(1))
    }
}

/// The central game controller that owns the authoritative game state.
#[derive(Debug, Clone)]
pub struct GameController {
    state: GameState,
    history: Vec<MoveRecord>,
    status: Status,
    schedule: Option<BudgetSchedule>,
}

impl GameController {
    /// A new game on an empty board with `first` to move.
    pub fn new(first: Side) -> Self {
        Self::from_state(GameState::new(Position::new(), first))
    }

    /// Continues a game from an arbitrary state. The history starts empty.
    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            history: Vec::new(),
            status: state.status(),
            schedule: None,
        }
    }

    /// Builder pattern: shrink the engine budget after every engine move.
    pub fn with_budget_schedule(mut self, schedule: BudgetSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Checks a column without applying it.
    pub fn validate_move(&self, column: usize) -> Result<(), MoveError> {
        if self.status.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if column >= NUM_COLS {
            return Err(MoveError::ColumnOutOfRange(column));
        }
        if !self.state.position().is_legal(column) {
            return Err(MoveError::ColumnFull(column));
        }
        Ok(())
    }

    /// Validates and plays `column` for the side to move.
    pub fn apply_move(&mut self, column: usize) -> Result<MoveRecord, MoveError> {
        self.validate_move(column)?;

        let side = self.state.to_move();
        let row = self.state.play(column)?;
        let record = MoveRecord {
            number: self.history.len() + 1,
            side,
            column,
            row,
        };
        self.history.push(record);
        self.status = self.state.status();

        info!(number = record.number, %side, column, row, "Move applied");
        match self.status {
            Status::InProgress => {}
            Status::Win(winner) => info!(%winner, moves = self.history.len(), "Game won"),
            Status::Draw => info!(moves = self.history.len(), "Game drawn"),
        }

        Ok(record)
    }

    /// Asks `engine` for a column, plays it, then applies the budget schedule.
    pub fn engine_move(&mut self, engine: &mut Engine) -> Result<(Decision, MoveRecord), EngineError> {
        if self.status.is_terminal() {
            return Err(MoveError::GameOver.into());
        }
        let decision = engine.decide(&self.state)?;
        let record = self.apply_move(decision.column)?;

        if let Some(schedule) = self.schedule {
            let current = engine.config().iterations;
            let next = schedule.next_budget(current, self.state.position().move_count());
            if next != current {
                engine.set_iterations(next)?;
                info!(from = current, to = next, "Engine budget reduced");
            }
        }

        Ok((decision, record))
    }

    /// A copy of the current state for searching or rendering.
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn position(&self) -> &Position {
        self.state.position()
    }

    pub fn to_move(&self) -> Side {
        self.state.to_move()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    /// Starts over on an empty board with `first` to move.
    pub fn reset(&mut self, first: Side) {
        self.state = GameState::new(Position::new(), first);
        self.history.clear();
        self.status = Status::InProgress;
    }

    /// Move list plus result, one move per line.
    pub fn format_history(&self) -> String {
        if self.history.is_empty() {
            return String::from("No moves made yet.\n");
        }
        let mut output = String::new();
        for record in &self.history {
            let _ = writeln!(
                output,
                "{}. {} - column {} (row {})",
                record.number, record.side, record.column, record.row
            );
        }
        let _ = match self.status {
            Status::Win(winner) => writeln!(output, "\nResult: {winner} wins"),
            Status::Draw => writeln!(output, "\nResult: draw"),
            Status::InProgress => writeln!(output, "\n(Game in progress - {} to move)", self.to_move()),
        };
        output
    }
}
