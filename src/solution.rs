//! Decoding accepted members back onto the grid.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::ops::IndexMut;

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use thiserror::Error;
use tracing::debug;
use unordered_pair::UnorderedPair;

use crate::affiliation::AffiliationID;
use crate::cell::Cell;
use crate::grid::Grid;
use crate::level::{forced_down, LevelIndex};
use crate::location::Location;
use crate::search::Solutions;
use crate::shape::SquareStep;
use crate::spec::Level;

/// Reasons a grid may fail to yield a [`Solution`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum SolverFailure {
    /// No set of lines satisfies the grid, i.e. the puzzle as stated is unsolvable.
    #[error("the grid has no solution")]
    Inconsistent,
    /// The given edge set could not be turned into paths with one affiliation each.
    /// This never happens for members produced by [`Grid::numberlink`].
    #[error("edge set does not decode to a solution")]
    NoAffFound,
}

/// A member of the solution set of a [`Grid`], decoded back onto the grid.
pub struct Solution<'a> {
    grid: &'a Grid,
    levels: Vec<Level>,
    // every line, horizontal and vertical, weighted by the direction from its lower-indexed end
    lines: UnGraphMap<Location, SquareStep>,
    cells: Array2<Cell>,
}

impl<'a> Solution<'a> {
    /// Decode the set of taken horizontal-edge `levels` on `grid`.
    ///
    /// Vertical lines are recovered with the same degree rule the automata use, then every path is walked from
    /// one of its termini to label the cells it runs through.
    pub fn decode(grid: &'a Grid, levels: Vec<Level>) -> Result<Self, SolverFailure> {
        let index = LevelIndex::new(grid);
        let horizontal: HashSet<Location> = levels.iter().map(|level| index.location_of(*level)).collect();

        let mut lines = UnGraphMap::with_capacity(grid.rows() * grid.cols(), levels.len() * 2);
        let mut from_above = vec![false; grid.cols()];
        for y in 0..grid.rows() {
            let mut from_left = false;
            for x in 0..grid.cols() {
                let location = Location(x, y);
                let right = horizontal.contains(&location);
                if right && !grid.can_step(location, SquareStep::Right) {
                    return Err(SolverFailure::NoAffFound);
                }

                let incoming = [from_above[x], from_left, right].into_iter().filter(|line| *line).count();
                let down = forced_down(grid, location, incoming).ok_or(SolverFailure::NoAffFound)?;

                lines.add_node(location);
                for (present, direction) in [(right, SquareStep::Right), (down, SquareStep::Down)] {
                    if present {
                        lines.add_edge(location, direction.attempt_from(location), direction);
                    }
                }

                from_above[x] = down;
                from_left = right;
            }
        }

        let mut cells = grid.cells.clone();
        for (start, affiliation) in grid.termini() {
            let mut bfs = Bfs::new(&lines, start);
            while let Some(location) = bfs.next(&lines) {
                let cell = cells.index_mut(location.as_index());
                let current = *cell;
                match current {
                    Cell::Empty => *cell = Cell::Path { affiliation },
                    Cell::Path { affiliation: other } | Cell::Terminus { affiliation: other } if other == affiliation => {}
                    _ => return Err(SolverFailure::NoAffFound),
                }
            }
        }

        // a line nobody claimed belongs to a loop
        let stray = lines.all_edges()
            .any(|(a, _, _)| cells.get(a.as_index()).and_then(Cell::affiliation).is_none());
        if stray {
            return Err(SolverFailure::NoAffFound);
        }

        Ok(Self { grid, levels, lines, cells })
    }

    /// The taken horizontal-edge levels this solution was decoded from, highest first.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Every line of the solution, horizontal and vertical.
    pub fn edges(&self) -> impl Iterator<Item = UnorderedPair<Location>> + '_ {
        self.lines.all_edges().map(|(a, b, _)| UnorderedPair(a, b))
    }

    /// The affiliation of the path through (or ending at) `location`, if any.
    pub fn affiliation_at(&self, location: Location) -> Option<AffiliationID> {
        self.cells.get(location.as_index()).and_then(Cell::affiliation)
    }

    /// The locations of the path with `affiliation`, from its first terminus in row-major order to the other.
    pub fn path_of(&self, affiliation: AffiliationID) -> Vec<Location> {
        let Some((start, _)) = self.grid.termini().find(|(_, aff)| *aff == affiliation) else {
            return Vec::new();
        };

        let mut path = vec![start];
        let mut previous = None;
        let mut current = start;
        while let Some(next) = self.lines.neighbors(current).find(|n| Some(*n) != previous) {
            path.push(next);
            previous = Some(current);
            current = next;
        }

        path
    }
}

impl Display for Solution<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.grid.render(&self.cells))
    }
}

impl Grid {
    /// Every solution of this grid without U-turns, in no particular order.
    pub fn solutions(&self) -> impl Iterator<Item = Result<Solution<'_>, SolverFailure>> + '_ {
        Solutions::new(self.numberlink()).map(move |levels| Solution::decode(self, levels))
    }

    /// Count the solutions of this grid without U-turns.
    pub fn count_solutions(&self) -> usize {
        let count = Solutions::new(self.numberlink()).count();
        debug!(count, "counted solutions");
        count
    }

    /// Find one solution of this grid without U-turns.
    ///
    /// Returns [`SolverFailure::Inconsistent`] if there is none.
    pub fn solve(&self) -> Result<Solution<'_>, SolverFailure> {
        self.solutions().next().unwrap_or(Err(SolverFailure::Inconsistent))
    }
}
