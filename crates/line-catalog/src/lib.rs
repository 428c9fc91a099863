#![no_std]

//! Board geometry shared by the Connect Four engine.
//!
//! The catalog lists every maximal straight line of cells long enough to hold
//! a winning run. Win detection never probes around a disc; it walks each
//! catalog line once and looks for a run of equal owners.

extern crate alloc;

use alloc::vec::Vec;

/// Number of columns on the standard board.
pub const NUM_COLS: usize = 7;
/// Number of rows on the standard board.
pub const NUM_ROWS: usize = 6;
/// Number of equal discs in a line needed to win.
pub const WIN_LENGTH: usize = 4;

/// A cell coordinate. Row 0 is the top row, row `rows - 1` the bottom row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    pub col: usize,
    pub row: usize,
}

impl Coord {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// The four line families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// One line per row, left to right.
    Horizontal,
    /// One line per column, top to bottom.
    Vertical,
    /// Steps one column right and one row down.
    Diagonal,
    /// Steps one column right and one row up.
    AntiDiagonal,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::Diagonal,
        Direction::AntiDiagonal,
    ];
}

/// An ordered run of coordinates along one axis of the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    direction: Direction,
    cells: Vec<Coord>,
}

impl Line {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Every line of a board on which a winning run can appear.
///
/// Built once per board size and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineCatalog {
    cols: usize,
    rows: usize,
    win_length: usize,
    horizontal: Vec<Line>,
    vertical: Vec<Line>,
    diagonal: Vec<Line>,
    anti_diagonal: Vec<Line>,
}

impl LineCatalog {
    /// Builds the catalog for a `cols` × `rows` board.
    ///
    /// # Arguments
    /// * `cols` - Board width
    /// * `rows` - Board height
    /// * `win_length` - Lines shorter than this are left out
    pub fn new(cols: usize, rows: usize, win_length: usize) -> Self {
        let keep = |line: &Line| line.len() >= win_length && win_length > 0;

        let horizontal = (0..rows)
            .map(|row| Line {
                direction: Direction::Horizontal,
                cells: (0..cols).map(|col| Coord::new(col, row)).collect(),
            })
            .filter(keep)
            .collect();

        let vertical = (0..cols)
            .map(|col| Line {
                direction: Direction::Vertical,
                cells: (0..rows).map(|row| Coord::new(col, row)).collect(),
            })
            .filter(keep)
            .collect();

        // Diagonal origins: left edge bottom-up to the corner, then along the top edge.
        let diagonal = (0..rows)
            .rev()
            .map(|row| Coord::new(0, row))
            .chain((1..cols).map(|col| Coord::new(col, 0)))
            .map(|origin| walk(origin, Direction::Diagonal, cols, rows))
            .filter(keep)
            .collect();

        // Anti-diagonal origins: left edge top-down to the corner, then along the bottom edge.
        let anti_diagonal = if rows == 0 {
            Vec::new()
        } else {
            (0..rows)
                .map(|row| Coord::new(0, row))
                .chain((1..cols).map(|col| Coord::new(col, rows - 1)))
                .map(|origin| walk(origin, Direction::AntiDiagonal, cols, rows))
                .filter(keep)
                .collect()
        };

        Self {
            cols,
            rows,
            win_length,
            horizontal,
            vertical,
            diagonal,
            anti_diagonal,
        }
    }

    /// The catalog for the standard 7×6 board with four in a row.
    pub fn standard() -> Self {
        Self::new(NUM_COLS, NUM_ROWS, WIN_LENGTH)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// Lines of a single family.
    pub fn family(&self, direction: Direction) -> &[Line] {
        match direction {
            Direction::Horizontal => &self.horizontal,
            Direction::Vertical => &self.vertical,
            Direction::Diagonal => &self.diagonal,
            Direction::AntiDiagonal => &self.anti_diagonal,
        }
    }

    /// All lines, family by family in [`Direction::ALL`] order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        Direction::ALL
            .into_iter()
            .flat_map(move |direction| self.family(direction).iter())
    }

    pub fn len(&self) -> usize {
        self.horizontal.len() + self.vertical.len() + self.diagonal.len() + self.anti_diagonal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn walk(origin: Coord, direction: Direction, cols: usize, rows: usize) -> Line {
    let mut cells = Vec::new();
    let (mut col, mut row) = (origin.col, origin.row);
    while col < cols && row < rows {
        cells.push(Coord::new(col, row));
        col += 1;
        row = match direction {
            Direction::AntiDiagonal => match row.checked_sub(1) {
                Some(r) => r,
                None => break,
            },
            _ => row + 1,
        };
    }
    Line { direction, cells }
}

/// Scans one line left to right for `win_length` consecutive equal owners.
///
/// A cell owned by the current run's owner extends the run, a cell owned by
/// someone else starts a new run of length one, and an empty cell (`None`)
/// resets the run to zero.
///
/// # Returns
/// The owner of the first winning run found, if any.
pub fn scan_for_run<T, I>(cells: I, win_length: usize) -> Option<T>
where
    T: PartialEq + Copy,
    I: IntoIterator<Item = Option<T>>,
{
    if win_length == 0 {
        return None;
    }
    let mut owner: Option<T> = None;
    let mut run = 0;
    for cell in cells {
        match cell {
            Some(disc) if owner == Some(disc) => run += 1,
            Some(disc) => {
                owner = Some(disc);
                run = 1;
            }
            None => {
                owner = None;
                run = 0;
            }
        }
        if run == win_length {
            return owner;
        }
    }
    None
}
