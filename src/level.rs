//! Decision levels and the positions they stand for.
//!
//! The decision variables are the horizontal edges `(x, y)-(x + 1, y)` of the grid, taken in row-major order.
//! Level `max_level` is the top-left edge and level 1 the bottom-right one.
//! Vertical edges never need a variable of their own: once the lines above, to the left and to the right of a
//! cell are known, the line below it is forced by the cell's degree (see [`forced_down`]).

use crate::grid::Grid;
use crate::location::Location;
use crate::shape::SquareStep;
use crate::spec::Level;

/// Maps decision levels to grid positions and back.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct LevelIndex {
    cols: usize,
    max_level: Level,
}

impl LevelIndex {
    pub(crate) fn new(grid: &Grid) -> Self {
        Self {
            cols: grid.cols(),
            max_level: (grid.rows() * (grid.cols() - 1)) as Level,
        }
    }

    /// The level of the first decision, i.e. the number of decision variables.
    #[inline]
    pub(crate) fn max_level(&self) -> Level {
        self.max_level
    }

    /// Left end of the horizontal edge decided at `level`.
    #[inline]
    pub(crate) fn location_of(&self, level: Level) -> Location {
        let offset = (self.max_level - level) as usize;
        Location(offset % (self.cols - 1), offset / (self.cols - 1))
    }

    /// Inverse of [`location_of`](Self::location_of).
    #[inline]
    pub(crate) fn level_of(&self, location: Location) -> Level {
        self.max_level - (location.row() * (self.cols - 1) + location.col()) as Level
    }

    /// Whether the edge starting at `location` is the last one in its row.
    #[inline]
    pub(crate) fn ends_row(&self, location: Location) -> bool {
        location.col() == self.cols - 2
    }
}

/// Whether a line must leave the cell at `location` downwards, given `incoming` lines already meeting it from
/// above, the left and the right.
///
/// A terminus has exactly one line, a hole none and any other cell either none or two.
/// Returns [`None`] if no choice of the lower line can satisfy that, including when the line would be forced
/// through the bottom of the grid, a wall or into a hole.
pub(crate) fn forced_down(grid: &Grid, location: Location, incoming: usize) -> Option<bool> {
    let down = match (grid.terminus_at(location).is_some(), incoming) {
        (true, 0) => true,
        (true, 1) => false,
        (true, _) => return None,
        (false, 0 | 2) => false,
        (false, 1) => true,
        (false, _) => return None,
    };

    if down && !grid.can_step(location, SquareStep::Down) {
        return None;
    }

    Some(down)
}
