//! # Connect Four Board Model
//!
//! This module implements the physical board: which side owns each cell and
//! how many discs have been dropped so far. It knows nothing about whose turn
//! it is; that lives in [`crate::game_state::GameState`].
//!
//! ## Rules
//! - A disc always falls to the lowest empty cell of its column
//! - Four equal discs in a row, column or diagonal win
//! - A full board without a winner is a draw

use std::fmt;
use std::str::FromStr;

use crate::error::{MoveError, ParsePositionError};
use crate::lines::{self, scan_for_run, NUM_COLS, NUM_ROWS};

/// One of the two players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Side::A => 'A',
            Side::B => 'B',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Result of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win(Side),
    Draw,
}

/// Terminal status of a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    InProgress,
    Draw,
    Win(Side),
}

impl Status {
    /// Returns the outcome if the game is over.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Status::InProgress => None,
            Status::Draw => Some(Outcome::Draw),
            Status::Win(side) => Some(Outcome::Win(side)),
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Status::InProgress
    }
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win(side) => Status::Win(side),
            Outcome::Draw => Status::Draw,
        }
    }
}

/// Disc occupancy of the 7×6 grid plus the number of discs placed.
///
/// Cells are indexed `[column][row]`, row 0 being the top row. The type is
/// `Copy`, so every clone is an independent board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    cells: [[Option<Side>; NUM_ROWS]; NUM_COLS],
    move_count: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [[None; NUM_ROWS]; NUM_COLS],
            move_count: 0,
        }
    }

    /// Drops a disc for `side` into `column`.
    ///
    /// # Arguments
    /// * `side` - Owner of the new disc
    /// * `column` - 0-based column index
    ///
    /// # Returns
    /// The row the disc landed in, or an error if the column is out of range
    /// or already full. The board is left untouched on error.
    pub fn place(&mut self, side: Side, column: usize) -> Result<usize, MoveError> {
        if column >= NUM_COLS {
            return Err(MoveError::ColumnOutOfRange(column));
        }
        let row = self
            .next_empty_row(column)
            .ok_or(MoveError::ColumnFull(column))?;
        self.cells[column][row] = Some(side);
        self.move_count += 1;
        Ok(row)
    }

    /// Lowest empty row of `column`, scanning from the bottom.
    pub fn next_empty_row(&self, column: usize) -> Option<usize> {
        let cells = self.cells.get(column)?;
        (0..NUM_ROWS).rev().find(|&row| cells[row].is_none())
    }

    /// A column is legal when its top cell is empty.
    pub fn is_legal(&self, column: usize) -> bool {
        column < NUM_COLS && self.cells[column][0].is_none()
    }

    /// Every legal column in ascending order.
    pub fn legal_columns(&self) -> Vec<usize> {
        (0..NUM_COLS).filter(|&col| self.is_legal(col)).collect()
    }

    /// Checks every catalog line for a winning run, then for a full board.
    pub fn status(&self) -> Status {
        let catalog = lines::catalog();
        for line in catalog.lines() {
            let owners = line
                .cells()
                .iter()
                .map(|cell| self.cell_at(cell.col, cell.row));
            if let Some(side) = scan_for_run(owners, catalog.win_length()) {
                return Status::Win(side);
            }
        }
        if self.legal_columns().is_empty() {
            Status::Draw
        } else {
            Status::InProgress
        }
    }

    /// Owner of a cell; coordinates off the board read as empty.
    pub fn cell_at(&self, column: usize, row: usize) -> Option<Side> {
        self.cells
            .get(column)
            .and_then(|cells| cells.get(row))
            .copied()
            .flatten()
    }

    /// Total number of discs placed.
    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn is_full(&self) -> bool {
        self.move_count >= NUM_COLS * NUM_ROWS
    }

    /// Finds the column of the single disc present in `after` but not in `self`.
    ///
    /// Cells are scanned from the top row down and left to right; the first
    /// cell that is empty here and occupied in `after` decides the column.
    pub fn column_played(&self, after: &Position) -> Option<usize> {
        (0..NUM_ROWS).find_map(|row| {
            (0..NUM_COLS).find(|&col| {
                self.cell_at(col, row).is_none() && after.cell_at(col, row).is_some()
            })
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..NUM_ROWS {
            for col in 0..NUM_COLS {
                let symbol = self.cell_at(col, row).map_or('.', Side::symbol);
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    /// Parses the `Display` form: six rows of seven cells, top row first,
    /// using `A`, `B` and `.`. Blank lines and surrounding spaces are ignored.
    ///
    /// # Examples
    /// ```
    /// use mcts::position::{Position, Side};
    /// let position: Position = "
    ///     .......
    ///     .......
    ///     .......
    ///     .......
    ///     .......
    ///     ...A...
    /// ".parse().unwrap();
    /// assert_eq!(position.cell_at(3, 5), Some(Side::A));
    /// assert_eq!(position.move_count(), 1);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.len() != NUM_ROWS {
            return Err(ParsePositionError::RowCount {
                expected: NUM_ROWS,
                found: rows.len(),
            });
        }

        let mut position = Position::new();
        for (row, text) in rows.iter().enumerate() {
            let symbols: Vec<char> = text.chars().collect();
            if symbols.len() != NUM_COLS {
                return Err(ParsePositionError::RowWidth {
                    row,
                    expected: NUM_COLS,
                    found: symbols.len(),
                });
            }
            for (col, &symbol) in symbols.iter().enumerate() {
                let cell = match symbol {
                    'A' | 'a' => Some(Side::A),
                    'B' | 'b' => Some(Side::B),
                    '.' => None,
                    other => {
                        return Err(ParsePositionError::UnknownSymbol {
                            symbol: other,
                            col,
                            row,
                        })
                    }
                };
                position.cells[col][row] = cell;
                if cell.is_some() {
                    position.move_count += 1;
                }
            }
        }

        for col in 0..NUM_COLS {
            for row in 0..NUM_ROWS - 1 {
                if position.cells[col][row].is_some() && position.cells[col][row + 1].is_none() {
                    return Err(ParsePositionError::FloatingDisc { col, row });
                }
            }
        }

        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_column(position: &mut Position, column: usize) {
        let mut side = Side::A;
        for _ in 0..NUM_ROWS {
            position.place(side, column).unwrap();
            side = side.opponent();
        }
    }

    #[test]
    fn test_new_board() {
        let position = Position::new();
        assert_eq!(position.move_count(), 0);
        assert_eq!(position.legal_columns(), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(position.status(), Status::InProgress);
    }

    #[test]
    fn test_place_obeys_gravity() {
        let mut position = Position::new();
        assert_eq!(position.place(Side::A, 3), Ok(5));
        assert_eq!(position.place(Side::B, 3), Ok(4));
        assert_eq!(position.cell_at(3, 5), Some(Side::A));
        assert_eq!(position.cell_at(3, 4), Some(Side::B));
        assert_eq!(position.move_count(), 2);
    }

    #[test]
    fn test_place_into_full_column_fails_without_change() {
        let mut position = Position::new();
        fill_column(&mut position, 0);
        let before = position;
        assert_eq!(position.place(Side::A, 0), Err(MoveError::ColumnFull(0)));
        assert_eq!(position, before);
        assert_eq!(position.place(Side::A, 7), Err(MoveError::ColumnOutOfRange(7)));
    }

    #[test]
    fn test_filling_a_column_removes_it() {
        let mut position = Position::new();
        fill_column(&mut position, 2);
        fill_column(&mut position, 3);
        assert_eq!(position.legal_columns(), vec![0, 1, 4, 5, 6]);
    }

    #[test]
    fn test_cell_at_out_of_range_is_empty() {
        let position = Position::new();
        assert_eq!(position.cell_at(NUM_COLS, 0), None);
        assert_eq!(position.cell_at(0, NUM_ROWS), None);
        assert_eq!(position.cell_at(usize::MAX, usize::MAX), None);
    }

    #[test]
    fn test_win_horizontal_bottom_row() {
        let mut position = Position::new();
        for col in 0..4 {
            position.place(Side::A, col).unwrap();
        }
        assert_eq!(position.status(), Status::Win(Side::A));
    }

    #[test]
    fn test_win_vertical() {
        let mut position = Position::new();
        for _ in 0..4 {
            position.place(Side::B, 6).unwrap();
        }
        assert_eq!(position.status(), Status::Win(Side::B));
    }

    #[test]
    fn test_win_diagonals() {
        let rising: Position = "
            .......
            .......
            ...A...
            ..AB...
            .ABB...
            ABBA...
        "
        .parse()
        .unwrap();
        assert_eq!(rising.status(), Status::Win(Side::A));

        let falling: Position = "
            .......
            .......
            B......
            AB.....
            AAB....
            ABAB...
        "
        .parse()
        .unwrap();
        assert_eq!(falling.status(), Status::Win(Side::B));
    }

    #[test]
    fn test_interrupted_run_is_not_a_win() {
        let position: Position = "
            .......
            .......
            .......
            .......
            .......
            AAABAAA
        "
        .parse()
        .unwrap();
        assert_eq!(position.status(), Status::InProgress);
    }

    #[test]
    fn test_draw_on_full_board() {
        // Column pattern that never lines up four.
        let position: Position = "
            AABBAAB
            BBAABBA
            AABBAAB
            BBAABBA
            AABBAAB
            BBAABBA
        "
        .parse()
        .unwrap();
        assert!(position.is_full());
        assert_eq!(position.status(), Status::Draw);
    }

    #[test]
    fn test_last_disc_wins_instead_of_drawing() {
        let mut position: Position = "
            AABAA.A
            BABABAB
            BBABBBA
            ABBBABB
            AABABAB
            AABAABA
        "
        .parse()
        .unwrap();
        assert_eq!(position.move_count(), 41);
        assert_eq!(position.status(), Status::InProgress);

        // The 42nd disc fills the board and completes a diagonal.
        assert_eq!(position.place(Side::B, 5), Ok(0));
        assert!(position.is_full());
        assert!(position.legal_columns().is_empty());
        assert_eq!(position.status(), Status::Win(Side::B));
    }

    #[test]
    fn test_column_played() {
        let before = Position::new();
        let mut after = before;
        after.place(Side::B, 4).unwrap();
        assert_eq!(before.column_played(&after), Some(4));
        assert_eq!(before.column_played(&before), None);
    }

    #[test]
    fn test_display_round_trip() {
        let mut position = Position::new();
        position.place(Side::A, 0).unwrap();
        position.place(Side::B, 0).unwrap();
        position.place(Side::A, 6).unwrap();
        let text = position.to_string();
        assert!(text.ends_with("B......\nA.....A\n"));
        assert_eq!(text.parse::<Position>().unwrap(), position);
    }

    #[test]
    fn test_parse_rejects_floating_disc() {
        let err = "
            .......
            .......
            .......
            .......
            ...A...
            .......
        "
        .parse::<Position>()
        .unwrap_err();
        assert_eq!(err, ParsePositionError::FloatingDisc { col: 3, row: 4 });
    }

    #[test]
    fn test_parse_rejects_bad_shape() {
        assert!(matches!(
            "......".parse::<Position>(),
            Err(ParsePositionError::RowCount { .. })
        ));
        let wide = ".......\n".repeat(5) + "........";
        assert!(matches!(
            wide.parse::<Position>(),
            Err(ParsePositionError::RowWidth { row: 5, .. })
        ));
    }
}
