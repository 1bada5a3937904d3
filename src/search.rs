//! Depth-first enumeration of the members accepted by a spec.

use tracing::trace;

use crate::spec::{DdSpec, Level, Outcome};

/// Every member of the set described by a [`DdSpec`], found by a plain depth-first walk.
///
/// Each member is the list of levels whose variable was taken, highest first.
/// Nothing is shared between branches, so this is exponential in general; it exists to check specs and to
/// solve small grids, not to build diagrams.
pub struct Solutions<S: DdSpec> {
    spec: S,
    // branches still to explore: state, level reached, levels taken on the way
    stack: Vec<(S::State, Level, Vec<Level>)>,
}

impl<S: DdSpec> Solutions<S> {
    /// Start a walk from the root of `spec`.
    pub fn new(spec: S) -> Self {
        let mut state = spec.new_state();
        let root = spec.get_root(&mut state);

        Self {
            spec,
            stack: vec![(state, root, Vec::new())],
        }
    }
}

impl<S: DdSpec> Iterator for Solutions<S> {
    type Item = Vec<Level>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((mut state, level, taken)) = self.stack.pop() {
            match Outcome::of(level) {
                Outcome::Accept => {
                    trace!(?taken, "accepted");
                    return Some(taken);
                }
                Outcome::Reject => {}
                Outcome::Continue(level) => {
                    let mut state_taken = state.clone();
                    let hi = self.spec.get_child(&mut state_taken, level, true);
                    let lo = self.spec.get_child(&mut state, level, false);

                    let mut with = taken.clone();
                    with.push(level);
                    // the 0-branch is popped first
                    self.stack.push((state_taken, hi, with));
                    self.stack.push((state, lo, taken));
                }
            }
        }

        None
    }
}
