//! Process-wide Line Catalog for the standard board.

use std::sync::OnceLock;

use line_catalog::LineCatalog;

pub use line_catalog::{scan_for_run, Coord, Direction, Line, NUM_COLS, NUM_ROWS, WIN_LENGTH};

static CATALOG: OnceLock<LineCatalog> = OnceLock::new();

/// Returns the catalog of the standard 7×6 board, building it on first use.
///
/// The catalog is immutable and may be read from any number of threads.
pub fn catalog() -> &'static LineCatalog {
    CATALOG.get_or_init(LineCatalog::standard)
}
