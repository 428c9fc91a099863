//! A board plus the side whose turn it is.

use rand::Rng;

use crate::error::MoveError;
use crate::position::{Position, Side, Status};

/// The state searched by the engine: a [`Position`] and the side to move.
///
/// Successor states own independent copies of the board, so no two tree nodes
/// ever share a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    position: Position,
    to_move: Side,
}

impl GameState {
    pub fn new(position: Position, to_move: Side) -> Self {
        Self { position, to_move }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The side that places the next disc.
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn status(&self) -> Status {
        self.position.status()
    }

    /// Flips the side to move without touching the board.
    pub fn toggle_side(&mut self) {
        self.to_move = self.to_move.opponent();
    }

    /// Places the mover's disc in `column` and passes the turn.
    ///
    /// # Returns
    /// The row the disc landed in. On error neither the board nor the side
    /// to move changes.
    pub fn play(&mut self, column: usize) -> Result<usize, MoveError> {
        let row = self.position.place(self.to_move, column)?;
        self.toggle_side();
        Ok(row)
    }

    /// The state reached by playing `column`.
    pub fn successor(&self, column: usize) -> Result<GameState, MoveError> {
        let mut next = *self;
        next.play(column)?;
        Ok(next)
    }

    /// One successor per legal column, in ascending column order.
    pub fn successors(&self) -> Vec<(usize, GameState)> {
        self.position
            .legal_columns()
            .into_iter()
            .filter_map(|column| self.successor(column).ok().map(|state| (column, state)))
            .collect()
    }

    /// Plays a uniformly random legal column for the side to move.
    ///
    /// Only meant for rollouts. Calling it on a board with no legal column is
    /// a caller error and reported as [`MoveError::NoLegalColumns`].
    pub fn random_play<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, MoveError> {
        let columns = self.position.legal_columns();
        if columns.is_empty() {
            return Err(MoveError::NoLegalColumns);
        }
        let column = columns[rng.random_range(0..columns.len())];
        self.play(column)?;
        Ok(column)
    }
}
