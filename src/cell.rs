use crate::affiliation::AffiliationID;

/// Contents of one grid cell.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Cell {
    /// One end of the path with this affiliation.
    Terminus {
        /// Which pair.
        affiliation: AffiliationID,
    },
    /// A cell some path runs through; only found on solved grids.
    Path {
        /// Which pair.
        affiliation: AffiliationID,
    },
    /// A cell removed from the board, which no path may touch.
    Hole,
    /// A blank cell.
    #[default]
    Empty,
}

impl Cell {
    /// The affiliation of this cell, if it has one.
    pub fn affiliation(&self) -> Option<AffiliationID> {
        match self {
            Cell::Terminus { affiliation } | Cell::Path { affiliation } => Some(*affiliation),
            Cell::Hole | Cell::Empty => None,
        }
    }
}
