//! Steps between orthogonally adjacent cells.

use ndarray::Array2;
use strum::VariantArray;

use crate::location::Location;

/// A step between orthogonally adjacent cells of a rectangular grid, as found in Numberlink puzzles.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum SquareStep {
    #[allow(missing_docs)]
    Up,
    #[allow(missing_docs)]
    Down,
    #[allow(missing_docs)]
    Left,
    #[allow(missing_docs)]
    Right,
    // switch it up like nintendo
}

impl SquareStep {
    /// The "forward" directions.
    ///
    /// Stepping in a forward direction always lands on a location indexed higher in the row-major cell array.
    /// These are also the directions in which the decision order visits edges: every horizontal edge is a
    /// [`Right`](Self::Right) step and every vertical edge a [`Down`](Self::Down) step from its first cell.
    pub const FORWARD_VARIANTS: &'static [Self] = &[Self::Right, Self::Down];

    /// Attempt the step from `location` in the direction specified by `self` and return the resultant [`Location`].
    ///
    /// Stepping off the top or left edge wraps around to a huge coordinate, which no grid contains.
    pub fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }

    /// Get all neighbors of a [`Location`] in "theory", without regard for grid bounds.
    pub fn neighbors_of(location: Location) -> impl Iterator<Item = (Self, Location)> {
        Self::VARIANTS.iter().map(move |dir| (*dir, dir.attempt_from(location)))
    }

    /// Determine the direction from `a` to `b`, or [`None`] if they are not adjacent.
    pub fn direction_to(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().find(|dir| dir.attempt_from(a) == b).copied()
    }

    /// Dump the specified [`ndarray::Array2`] one row per line.
    pub(crate) fn print(board: Array2<char>) -> String {
        let mut out = String::with_capacity(board.nrows() * (board.ncols() + 1));

        for row in board.rows() {
            for col in row {
                out.push(*col);
            }
            out.push('\n');
        }

        out
    }
}
