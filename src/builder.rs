//! Building and validating [`Grid`]s.

use std::collections::HashSet;
use std::ops::IndexMut;

use itertools::Itertools;
use ndarray::{Array2, AssignElem};
use petgraph::graphmap::UnGraphMap;
use thiserror::Error;
use tracing::debug;
use unordered_pair::UnorderedPair;

use crate::cell::Cell;
use crate::grid::Grid;
use crate::location::{Dimension, Location};
use crate::shape::SquareStep;

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum BuilderInvalidReason {
    /// A feature like a terminus or a hole was inserted outside the bounds specified by `dims` on a builder.
    #[error("feature placed outside the grid")]
    FeatureOutOfBounds,
    /// The grid has a single column, so it has no horizontal edge to decide.
    #[error("grid must have at least two columns")]
    TooFewColumns,
    /// Both termini of a pair were placed on the same cell.
    #[error("both termini of pair '{0}' share a cell")]
    DegenerateTermini(char),
    /// A pair no longer has exactly two termini, e.g. because a later pair or a hole was placed on top of it.
    #[error("pair '{0}' does not have exactly two termini")]
    UnpairedTerminus(char),
}

/// A builder for rectangular Numberlink grids.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// Nothing is validated against the rules of the puzzle until [`build`](Self::build), which checks the
/// grid once so that the automata never have to.
#[derive(Clone)]
pub struct GridBuilder {
    // width, height
    dims: (Dimension, Dimension),
    cells: Array2<Cell>,
    affiliation_displays: Vec<char>,
    invalid_reasons: Vec<BuilderInvalidReason>,
    // walls
    edge_blacklist: HashSet<UnorderedPair<Location>>,
    // holes
    location_blacklist: HashSet<Location>,
}

impl Default for GridBuilder {
    fn default() -> Self {
        Self::with_dims((Dimension::MIN.saturating_add(4), Dimension::MIN.saturating_add(4)))
    }
}

impl GridBuilder {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(x, y)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        let mut invalid_reasons = Vec::new();
        if dims.0.get() < 2 {
            invalid_reasons.push(BuilderInvalidReason::TooFewColumns);
        }

        Self {
            dims,
            cells: Array2::from_shape_simple_fn((dims.1.get(), dims.0.get()), Cell::default),
            affiliation_displays: Default::default(),
            invalid_reasons,
            edge_blacklist: Default::default(),
            location_blacklist: Default::default(),
        }
    }

    #[inline]
    fn in_bounds(&self, location: Location) -> bool {
        location.0 < self.dims.0.get() && location.1 < self.dims.1.get()
    }

    /// Add termini or "path endpoints". The order in which `locations` are specified does not matter.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if either location is out of bounds,
    /// or a [`DegenerateTermini`](BuilderInvalidReason::DegenerateTermini) one if both locations are the same.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn add_termini(&mut self, display: char, locations: (Location, Location)) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !self.in_bounds(locations.0) || !self.in_bounds(locations.1) {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return self;
        }

        if locations.0 == locations.1 {
            self.invalid_reasons.push(BuilderInvalidReason::DegenerateTermini(display));
            return self;
        }

        // non-null affiliation IDs start at 1
        let aff = self.affiliation_displays.len() + 1;
        self.affiliation_displays.push(display);
        for location in [locations.0, locations.1] {
            self.cells.index_mut(location.as_index()).assign_elem(Cell::Terminus { affiliation: aff })
        }

        self
    }

    /// Remove the most recently added pair of termini.
    ///
    /// If the builder is in an invalid state or no termini are present, this function does nothing.
    pub fn pop_termini(&mut self) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        let aff_to_remove = self.affiliation_displays.len();
        if self.affiliation_displays.pop().is_some() {
            self.cells.map_inplace(|cell| {
                if *cell == (Cell::Terminus { affiliation: aff_to_remove }) {
                    cell.assign_elem(Cell::Empty);
                }
            })
        }

        self
    }

    /// Drop a location from the grid, leaving a hole no path may enter.
    /// A terminus here is deleted regardless of where in the chain this method is called,
    /// which leaves its partner unpaired and the builder invalid at [`build`](Self::build) time.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if `location` is out of bounds.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn drop_location(&mut self, location: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !self.in_bounds(location) {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return self;
        }

        self.location_blacklist.insert(location);
        self
    }

    /// Disconnect the two `locations`, i.e. place a wall between them.
    ///
    /// A wall prevents paths from crossing it.
    /// If the two locations are not adjacent, this function does nothing and does not invalidate the builder.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if either location is out of bounds.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn disconnect(&mut self, locations: UnorderedPair<Location>) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !self.in_bounds(locations.0) || !self.in_bounds(locations.1) {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return self;
        }

        if SquareStep::direction_to(locations.0, locations.1).is_none() {
            return self;
        }

        self.edge_blacklist.insert(locations);
        self
    }

    /// Shorthand for multiple calls to [`Self::disconnect`], with the same conditions.
    ///
    /// Disconnect cells neighboring `location`. Directions pointing off the grid are ignored.
    pub fn disconnect_around(&mut self, location: Location, directions: Vec<SquareStep>) -> &mut Self {
        for direction in directions {
            let neighbor = direction.attempt_from(location);
            if self.in_bounds(neighbor) {
                self.disconnect(UnorderedPair::from((location, neighbor)));
            }
        }

        self
    }

    // every affiliation must end up with exactly two termini
    fn pairing_problems(&self) -> Vec<BuilderInvalidReason> {
        let counts = self.cells.indexed_iter()
            .filter(|(index, _)| !self.location_blacklist.contains(&Location::from(*index)))
            .filter_map(|(_, cell)| match cell {
                Cell::Terminus { affiliation } => Some(*affiliation),
                _ => None,
            })
            .counts();

        (1..=self.affiliation_displays.len())
            .filter(|aff| counts.get(aff).copied().unwrap_or(0) != 2)
            .map(|aff| BuilderInvalidReason::UnpairedTerminus(self.affiliation_displays[aff - 1]))
            .collect_vec()
    }

    /// Check the validity of this builder, ensuring no [`BuilderInvalidReason`] condition has arisen.
    ///
    /// Returns every reason the builder is invalid; an empty [`Vec`] means [`build`](Self::build) will succeed.
    pub fn invalid_reasons(&self) -> Vec<BuilderInvalidReason> {
        if !self.invalid_reasons.is_empty() {
            return self.invalid_reasons.clone();
        }

        self.pairing_problems()
    }

    /// Whether [`build`](Self::build) would succeed.
    pub fn is_valid(&self) -> bool {
        self.invalid_reasons().is_empty()
    }

    /// Convert the state of this builder into a [`Grid`].
    /// If the builder is invalid for any reason, a [`Vec`] of [`BuilderInvalidReason`] will indicate why.
    pub fn build(&self) -> Result<Grid, Vec<BuilderInvalidReason>> {
        let reasons = self.invalid_reasons();
        if !reasons.is_empty() {
            return Err(reasons);
        }

        let (width, height) = (self.dims.0.get(), self.dims.1.get());
        let mut graph = UnGraphMap::with_capacity(
            self.cells.len(),
            // "horizontal" edges
            (width - 1) * height
                // "vertical" edges
                + (height - 1) * width,
        );

        let mut cells = self.cells.clone();
        for location in self.location_blacklist.iter() {
            cells.index_mut(location.as_index()).assign_elem(Cell::Hole);
        }

        for (index, cell) in cells.indexed_iter() {
            if *cell == Cell::Hole {
                continue;
            }

            let location = Location::from(index);
            graph.add_node(location);
            // add edges down and to the right, if possible
            for direction in SquareStep::FORWARD_VARIANTS {
                let other = direction.attempt_from(location);
                if !self.in_bounds(other)
                    || self.location_blacklist.contains(&other)
                    || self.edge_blacklist.contains(&UnorderedPair::from((location, other))) {
                    continue;
                }

                graph.add_edge(location, other, *direction);
            }
        }

        let mut affiliation_displays = Vec::with_capacity(self.affiliation_displays.len() + 1);
        // affiliation 0 is unaffiliated and will display as empty
        affiliation_displays.push('.');
        affiliation_displays.extend(self.affiliation_displays.iter().copied());

        debug!(width, height, pairs = self.affiliation_displays.len(), edges = graph.edge_count(), "built grid");

        Ok(Grid {
            cells,
            graph,
            dims: self.dims,
            affiliation_displays,
        })
    }
}
