#![warn(missing_docs)]

//! # `numberlink-zdd`
//!
//! The solution space of a [Numberlink](https://en.wikipedia.org/wiki/Numberlink) puzzle, described as a
//! zero-suppressed decision diagram.
//! Begin by building a grid with a [`GridBuilder`] or parsing one from text, then hand it to the automata in this
//! crate, or simply call [`Grid::solve`] or [`Grid::solutions`].
//!
//! # Internals
//! A decision diagram engine builds a diagram top-down from a specification: it asks for a root state and level,
//! then for each level asks which level (and state) the 0- and 1-children lead to, merging equal states on the way.
//! [`DdSpec`] is that specification; this crate provides two of them.
//!
//! The variables are the horizontal edges of the grid in row-major order, highest level first.
//! Vertical edges are never decided directly: a terminus has exactly one line and every other cell none or two,
//! so once the lines above, left and right of a cell are known the line below it is forced.
//!
//! 1. [`PathSpec`] keeps a mate array over the frontier of dangling half-edges and rejects any choice that would
//! close a loop, branch a path, strand a terminus or join termini of different pairs.
//! 2. [`NoUTurnSpec`] keeps three bits per column and rejects any unit square with exactly three sides drawn when
//! the fourth could have been drawn instead; such a detour never appears in an intended solution.
//!
//! Their [`Intersection`] (see [`Grid::numberlink`]) is the full puzzle. The [`Solutions`] iterator walks any spec
//! depth-first, which is enough for small grids; large ones want a real diagram engine.

pub use builder::{BuilderInvalidReason, GridBuilder};
pub use cell::Cell;
pub use grid::{Grid, ParseGridError};
pub use location::{Dimension, Location};
pub use mate::{Mate, PathSpec};
pub use no_u_turn::{Corner, NoUTurnSpec};
pub use search::Solutions;
pub use shape::SquareStep;
pub use solution::{Solution, SolverFailure};
pub use spec::{DdSpec, Intersection, Level, Outcome, PairState, StateDisplay, ACCEPT, REJECT};

mod tests;
pub(crate) mod affiliation;
pub(crate) mod location;
pub(crate) mod level;
pub(crate) mod cell;
pub mod shape;
pub mod builder;
pub mod grid;
pub mod spec;
pub mod mate;
pub mod no_u_turn;
pub mod search;
pub mod solution;
