//! The no-U-turn automaton.
//!
//! A U-turn is a unit square of four cells with three of its sides drawn: the path runs along two adjacent cells
//! and straight back, when it could have jumped across the fourth side instead. Puzzle authors never intend
//! such detours, so solutions containing one are dropped. A detour around a wall or a hole is not a U-turn,
//! since there is no shortcut to take.

use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::grid::Grid;
use crate::level::{forced_down, LevelIndex};
use crate::location::Location;
use crate::shape::SquareStep;
use crate::spec::{DdSpec, Level, ACCEPT, REJECT};

/// What is known about the most recently completed cell of one column, which is also the upper-left corner
/// of the next unit square in that column.
///
/// Only the two line bits decide what may follow, so equality and hashing ignore `filled`; corners that differ in
/// it alone are interchangeable and may be merged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Corner {
    /// A line leaves the cell to the right, along the top of the square.
    pub hline: bool,
    /// A line leaves the cell downwards, along the left of the square.
    pub vline: bool,
    /// The cell is a terminus or some line touches it. Shown by `print_state` only.
    pub filled: bool,
}

impl PartialEq for Corner {
    fn eq(&self, other: &Self) -> bool {
        (self.hline, self.vline) == (other.hline, other.vline)
    }
}

impl Eq for Corner {}

impl Hash for Corner {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.hline, self.vline).hash(state);
    }
}

/// Rejects every set of horizontal edges whose completed line drawing contains a U-turn.
///
/// It completes vertical lines with the same degree rule as [`PathSpec`](crate::mate::PathSpec), so it also
/// rejects drawings in which some cell has an impossible degree.
pub struct NoUTurnSpec<'a> {
    grid: &'a Grid,
    index: LevelIndex,
}

impl<'a> NoUTurnSpec<'a> {
    /// U-turn constraints on `grid`.
    pub fn new(grid: &'a Grid) -> Self {
        let index = LevelIndex::new(grid);
        debug!(max_level = index.max_level(), "no-U-turn spec");

        Self { grid, index }
    }

    // sides of the square with `corner` top left, in the order top, left, right, bottom
    fn sides(corner: Location) -> [(Location, Location); 4] {
        let right = SquareStep::Right.attempt_from(corner);
        let below = SquareStep::Down.attempt_from(corner);
        let diagonal = SquareStep::Down.attempt_from(right);

        [(corner, right), (corner, below), (right, diagonal), (below, diagonal)]
    }

    fn is_u_turn(&self, corner: Location, drawn: [bool; 4]) -> bool {
        if drawn.iter().filter(|d| **d).count() != 3 {
            return false;
        }

        Self::sides(corner).into_iter()
            .zip(drawn)
            .any(|((a, b), d)| !d && self.grid.is_linkable(a, b))
    }

    fn complete(&self, location: Location, up: bool, left: bool, right: bool) -> Option<Corner> {
        let incoming = [up, left, right].into_iter().filter(|line| *line).count();
        let down = forced_down(self.grid, location, incoming)?;

        Some(Corner {
            hline: right,
            vline: down,
            filled: self.grid.terminus_at(location).is_some() || incoming > 0 || down,
        })
    }
}

impl DdSpec for NoUTurnSpec<'_> {
    type State = Box<[Corner]>;

    fn new_state(&self) -> Self::State {
        vec![Corner::default(); self.grid.cols()].into_boxed_slice()
    }

    fn get_root(&self, corners: &mut Self::State) -> Level {
        corners.fill(Corner::default());
        self.index.max_level()
    }

    fn get_child(&self, corners: &mut Self::State, level: Level, take: bool) -> Level {
        let location = self.index.location_of(level);
        let (x, y) = (location.col(), location.row());
        if take && !self.grid.can_step(location, SquareStep::Right) {
            return REJECT;
        }

        // the square above this edge now has all four sides
        if y > 0 {
            let drawn = [corners[x].hline, corners[x].vline, corners[x + 1].vline, take];
            if self.is_u_turn(Location(x, y - 1), drawn) {
                return REJECT;
            }
        }

        let left = x > 0 && corners[x - 1].hline;
        let Some(corner) = self.complete(location, corners[x].vline, left, take) else {
            return REJECT;
        };
        corners[x] = corner;

        if self.index.ends_row(location) {
            let last = SquareStep::Right.attempt_from(location);
            let Some(corner) = self.complete(last, corners[x + 1].vline, take, false) else {
                return REJECT;
            };
            corners[x + 1] = corner;
        }

        if level == 1 {
            return ACCEPT;
        }

        level - 1
    }

    fn print_state(&self, out: &mut dyn fmt::Write, corners: &Self::State) -> fmt::Result {
        write!(out, "[")?;
        for corner in corners.iter() {
            let glyph = match (corner.hline, corner.vline, corner.filled) {
                (true, true, _) => '+',
                (true, false, _) => '-',
                (false, true, _) => '|',
                (false, false, true) => 'o',
                (false, false, false) => '.',
            };
            write!(out, "{}", glyph)?;
        }
        write!(out, "]")
    }
}
