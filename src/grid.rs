//! The validated puzzle grid, its queries and its text form.

use std::fmt::{Display, Formatter};
use std::num::NonZero;
use std::str::FromStr;

use itertools::Itertools;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use thiserror::Error;

use crate::affiliation::AffiliationID;
use crate::builder::{BuilderInvalidReason, GridBuilder};
use crate::cell::Cell;
use crate::location::{Dimension, Location};
use crate::mate::PathSpec;
use crate::no_u_turn::NoUTurnSpec;
use crate::shape::SquareStep;
use crate::spec::Intersection;

/// A validated rectangular Numberlink grid.
///
/// [`Grid`]s should be built using a [`GridBuilder`] or parsed from text with [`str::parse`].
/// Once built a grid is never mutated; the automata in this crate borrow it for as long as they live.
pub struct Grid {
    pub(crate) cells: Array2<Cell>,
    // every edge a path may use, keyed by location; holes have no node at all
    pub(crate) graph: UnGraphMap<Location, SquareStep>,
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) affiliation_displays: Vec<char>,
}

impl Grid {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.dims.1.get()
    }

    /// Number of columns; always at least 2.
    pub fn cols(&self) -> usize {
        self.dims.0.get()
    }

    /// The contents of the cell at `location`, or [`None`] outside the grid.
    pub fn cell(&self, location: Location) -> Option<Cell> {
        self.cells.get(location.as_index()).copied()
    }

    /// The affiliation of the terminus at `location`, if there is one.
    pub fn terminus_at(&self, location: Location) -> Option<AffiliationID> {
        match self.cell(location)? {
            Cell::Terminus { affiliation } => Some(affiliation),
            _ => None,
        }
    }

    /// Whether a path may run directly between `a` and `b`.
    ///
    /// False for non-adjacent locations, locations off the grid, walls and holes.
    pub fn is_linkable(&self, a: Location, b: Location) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// Whether `location` has any linkable neighbor in direction `direction`.
    pub(crate) fn can_step(&self, location: Location, direction: SquareStep) -> bool {
        self.is_linkable(location, direction.attempt_from(location))
    }

    /// Number of terminus pairs.
    pub fn num_affiliations(&self) -> usize {
        self.affiliation_displays.len() - 1
    }

    /// The character a pair was declared with; `'.'` for affiliation 0.
    pub fn display_of(&self, affiliation: AffiliationID) -> Option<char> {
        self.affiliation_displays.get(affiliation).copied()
    }

    /// Every terminus on the grid, in row-major order.
    pub fn termini(&self) -> impl Iterator<Item = (Location, AffiliationID)> + '_ {
        self.cells.indexed_iter().filter_map(|(index, cell)| match cell {
            Cell::Terminus { affiliation } => Some((Location::from(index), *affiliation)),
            _ => None,
        })
    }

    /// The full Numberlink constraint on this grid: path connectivity intersected with the no-U-turn rule.
    pub fn numberlink(&self) -> Intersection<PathSpec<'_>, NoUTurnSpec<'_>> {
        Intersection::new(PathSpec::new(self), NoUTurnSpec::new(self))
    }

    pub(crate) fn render(&self, cells: &Array2<Cell>) -> String {
        SquareStep::print(cells.map(|cell| match cell {
            Cell::Terminus { affiliation } => self.display_char(*affiliation).to_ascii_uppercase(),
            Cell::Path { affiliation } => self.display_char(*affiliation).to_ascii_lowercase(),
            Cell::Hole => '#',
            Cell::Empty => '.',
        }))
    }

    fn display_char(&self, affiliation: AffiliationID) -> char {
        self.display_of(affiliation).unwrap_or('?')
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(&self.cells))
    }
}

/// Reasons the text form of a grid may fail to parse.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseGridError {
    /// The text has no non-blank line.
    #[error("no rows given")]
    Empty,
    /// Row `row` has a different width than the first row.
    #[error("row {row} has width {width}, expected {expected}")]
    #[allow(missing_docs)]
    Ragged { row: usize, width: usize, expected: usize },
    /// A label appeared some number of times other than twice.
    #[error("label '{label}' appears {count} times")]
    #[allow(missing_docs)]
    LabelCount { label: char, count: usize },
    /// The grid parsed but failed to build.
    #[error("invalid grid: {0:?}")]
    Invalid(Vec<BuilderInvalidReason>),
}

impl FromStr for Grid {
    type Err = ParseGridError;

    /// Parse one line per row: `.` is a blank cell, `#` a hole and any other character one end of the
    /// pair it names, compared case-insensitively. Blank lines and surrounding whitespace are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect_vec())
            .collect_vec();

        let expected = rows.first().ok_or(ParseGridError::Empty)?.len();
        if let Some((row, cells)) = rows.iter().find_position(|cells| cells.len() != expected) {
            return Err(ParseGridError::Ragged { row, width: cells.len(), expected });
        }

        let width = NonZero::new(expected).ok_or(ParseGridError::Empty)?;
        let height = NonZero::new(rows.len()).ok_or(ParseGridError::Empty)?;
        let mut builder = GridBuilder::with_dims((width, height));

        // labels in order of first appearance, so that affiliation IDs follow reading order
        let mut labels: Vec<(char, Vec<Location>)> = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, display) in row.iter().enumerate() {
                let location = Location(x, y);
                match display {
                    '.' => {}
                    '#' => { builder.drop_location(location); }
                    other => {
                        let label = other.to_ascii_uppercase();
                        match labels.iter_mut().find(|(l, _)| *l == label) {
                            Some((_, locations)) => locations.push(location),
                            None => labels.push((label, vec![location])),
                        }
                    }
                }
            }
        }

        for (label, locations) in labels {
            match locations.as_slice() {
                [a, b] => { builder.add_termini(label, (*a, *b)); }
                _ => return Err(ParseGridError::LabelCount { label, count: locations.len() }),
            }
        }

        builder.build().map_err(ParseGridError::Invalid)
    }
}
