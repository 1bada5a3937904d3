//! The path-connectivity automaton.
//!
//! Cells are completed one at a time in row-major order. Every line leaving a completed cell towards a cell that
//! is not yet complete is a dangling half-edge, and there are at most `cols + 1` of them at any time: one per
//! column pointing down into the next row, and one pointing right into the next cell of the current row.
//! Each half-edge records what sits at the other end of its path fragment; that record is the [`Mate`].

use std::fmt;
use std::mem;

use tracing::debug;

use crate::affiliation::AffiliationID;
use crate::grid::Grid;
use crate::level::{forced_down, LevelIndex};
use crate::location::Location;
use crate::shape::SquareStep;
use crate::spec::{DdSpec, Level, ACCEPT, REJECT};

/// What lies at the far end of the path fragment running through a dangling half-edge.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mate {
    /// No line runs through this half-edge.
    #[default]
    Empty,
    /// The fragment started at a terminus with this affiliation.
    Terminal(AffiliationID),
    /// Both ends of the fragment are dangling; the other one sits in this slot.
    Link(usize),
}

/// Accepts exactly the sets of horizontal edges whose completed line drawing is a set of vertex-disjoint
/// simple paths, each joining the two termini of one pair, with every other cell left blank.
pub struct PathSpec<'a> {
    grid: &'a Grid,
    index: LevelIndex,
    // slot of the half-edge pointing right; slots below it are columns
    horizontal: usize,
    // level at which the last terminus in row-major order is completed; None without termini
    final_level: Option<Level>,
}

impl<'a> PathSpec<'a> {
    /// Path constraints on `grid`.
    pub fn new(grid: &'a Grid) -> Self {
        let index = LevelIndex::new(grid);
        // the last column is completed together with the cell to its left
        let final_level = grid.termini()
            .last()
            .map(|(location, _)| index.level_of(Location(location.col().min(grid.cols() - 2), location.row())));
        debug!(max_level = index.max_level(), ?final_level, slots = grid.cols() + 1, "path connectivity spec");

        Self {
            grid,
            index,
            horizontal: grid.cols(),
            final_level,
        }
    }

    /// Complete the cell at `location` now that its line to the right is known, joining the fragments that
    /// meet in it. Returns [`None`] if the cell cannot be completed consistently.
    fn complete(&self, mate: &mut [Mate], location: Location, right: bool) -> Option<()> {
        let column = location.col();
        let up = mem::take(&mut mate[column]);
        let left = mem::take(&mut mate[self.horizontal]);

        let incoming = [up, left].into_iter().filter(|m| *m != Mate::Empty).count() + usize::from(right);
        let down = forced_down(self.grid, location, incoming)?;

        // fragment ends arriving here; a terminus is the end of its own trivial fragment
        let mut ends = [up, left].into_iter()
            .chain(self.grid.terminus_at(location).map(Mate::Terminal))
            .filter(|m| *m != Mate::Empty);
        let outgoing = [(right, self.horizontal), (down, column)].into_iter()
            .filter_map(|(present, slot)| present.then_some(slot));

        match (ends.next(), ends.next()) {
            (Some(a), Some(b)) => {
                // two lines arrive from the same fragment: closing them would make a cycle
                if up == Mate::Link(self.horizontal) {
                    return None;
                }
                Self::join(mate, a, b)
            }
            (Some(a), None) => {
                let slot = outgoing.into_iter().next()?;
                Self::extend(mate, a, slot);
                Some(())
            }
            (None, _) => {
                if right && down {
                    mate[self.horizontal] = Mate::Link(column);
                    mate[column] = Mate::Link(self.horizontal);
                }
                Some(())
            }
        }
    }

    fn join(mate: &mut [Mate], a: Mate, b: Mate) -> Option<()> {
        match (a, b) {
            (Mate::Terminal(p), Mate::Terminal(q)) => (p == q).then_some(()),
            (Mate::Terminal(p), Mate::Link(k)) | (Mate::Link(k), Mate::Terminal(p)) => {
                mate[k] = Mate::Terminal(p);
                Some(())
            }
            (Mate::Link(k), Mate::Link(m)) => {
                mate[k] = Mate::Link(m);
                mate[m] = Mate::Link(k);
                Some(())
            }
            _ => None,
        }
    }

    fn extend(mate: &mut [Mate], end: Mate, slot: usize) {
        mate[slot] = end;
        if let Mate::Link(other) = end {
            mate[other] = Mate::Link(slot);
        }
    }

    /// Once every terminus is behind the frontier, an empty frontier is a solution with every remaining edge left
    /// out, and a frontier with no terminal fragment left can never be closed.
    fn check_completion(&self, mate: &[Mate], level: Level) -> Level {
        if mate.iter().all(|m| *m == Mate::Empty) {
            return ACCEPT;
        }

        if level == 1 || !mate.iter().any(|m| matches!(m, Mate::Terminal(_))) {
            return REJECT;
        }

        level - 1
    }

    fn write_mate(&self, out: &mut dyn fmt::Write, mate: &Mate) -> fmt::Result {
        match mate {
            Mate::Empty => write!(out, "."),
            Mate::Terminal(affiliation) => {
                write!(out, "{}", self.grid.display_of(*affiliation).unwrap_or('?').to_ascii_uppercase())
            }
            Mate::Link(slot) if *slot == self.horizontal => write!(out, "-"),
            Mate::Link(slot) => write!(out, "{}", slot),
        }
    }
}

impl DdSpec for PathSpec<'_> {
    type State = Box<[Mate]>;

    fn new_state(&self) -> Self::State {
        vec![Mate::Empty; self.horizontal + 1].into_boxed_slice()
    }

    fn get_root(&self, mate: &mut Self::State) -> Level {
        mate.fill(Mate::Empty);
        if self.final_level.is_none() {
            return ACCEPT;
        }

        let stranded = self.grid.termini()
            .any(|(location, _)| !SquareStep::neighbors_of(location).any(|(_, other)| self.grid.is_linkable(location, other)));
        if stranded {
            return REJECT;
        }

        self.index.max_level()
    }

    fn get_child(&self, mate: &mut Self::State, level: Level, take: bool) -> Level {
        let location = self.index.location_of(level);
        if take && !self.grid.can_step(location, SquareStep::Right) {
            return REJECT;
        }

        if self.complete(mate, location, take).is_none() {
            return REJECT;
        }

        if self.index.ends_row(location)
            && self.complete(mate, SquareStep::Right.attempt_from(location), false).is_none() {
            return REJECT;
        }

        match self.final_level {
            Some(final_level) if level <= final_level => self.check_completion(mate, level),
            _ => level - 1,
        }
    }

    fn print_state(&self, out: &mut dyn fmt::Write, mate: &Self::State) -> fmt::Result {
        let (columns, horizontal) = mate.split_at(self.horizontal);
        write!(out, "[")?;
        for (column, m) in columns.iter().enumerate() {
            if column > 0 {
                write!(out, " ")?;
            }
            self.write_mate(out, m)?;
        }
        for m in horizontal {
            write!(out, " | ")?;
            self.write_mate(out, m)?;
        }
        write!(out, "]")
    }
}
