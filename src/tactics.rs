//! One-ply tactical shortcut taken before searching.
//!
//! A column that wins on the spot is always right, and a column that stops
//! the opponent winning on their next disc is almost always right. Neither
//! needs a tree search to find.

use crate::game_state::GameState;
use crate::position::{Position, Side, Status};

/// Why the engine chose a column without searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tactic {
    /// The side to move wins by playing the column.
    ImmediateWin(usize),
    /// The opponent would win by playing the column next.
    ForcedBlock(usize),
}

impl Tactic {
    pub fn column(self) -> usize {
        match self {
            Tactic::ImmediateWin(column) | Tactic::ForcedBlock(column) => column,
        }
    }
}

/// Lowest column in which `side` completes four in a row with one disc.
pub fn winning_column(position: &Position, side: Side) -> Option<usize> {
    position.legal_columns().into_iter().find(|&column| {
        let mut next = *position;
        next.place(side, column).is_ok() && next.status() == Status::Win(side)
    })
}

/// Looks for an immediate win for the mover, then for a forced block.
pub fn immediate_tactic(state: &GameState) -> Option<Tactic> {
    let position = state.position();
    let mover = state.to_move();
    if let Some(column) = winning_column(position, mover) {
        return Some(Tactic::ImmediateWin(column));
    }
    winning_column(position, mover.opponent()).map(Tactic::ForcedBlock)
}
