//! The top-down decision diagram specification interface and the lock-step intersection of two specs.

use std::cmp::max;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// A decision level, or one of the two terminal values [`ACCEPT`] and [`REJECT`].
pub type Level = i32;

/// No extension of the choices made so far is a solution.
pub const REJECT: Level = 0;
/// The choices made so far, with every remaining variable left out, form a solution.
pub const ACCEPT: Level = -1;

/// A [`Level`] as seen by whoever drives a [`DdSpec`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Decide the variable at this level next.
    Continue(Level),
    /// See [`ACCEPT`].
    Accept,
    /// See [`REJECT`].
    Reject,
}

impl Outcome {
    /// Classify a level returned by a spec.
    pub fn of(level: Level) -> Self {
        match level {
            ACCEPT => Outcome::Accept,
            REJECT => Outcome::Reject,
            level if level > 0 => Outcome::Continue(level),
            // anything below -1 is a bug in the spec; treat it like a dead end
            _ => Outcome::Reject,
        }
    }
}

/// A top-down specification of a zero-suppressed decision diagram over binary variables.
///
/// The driver allocates a state with [`new_state`](Self::new_state), asks for the root level with
/// [`get_root`](Self::get_root), then walks down the levels with [`get_child`](Self::get_child),
/// cloning the state whenever it wants to explore both children.
/// States are mutated in place and must only ever be touched by one call at a time;
/// specs themselves are immutable and may be shared freely.
///
/// A variable skipped over by a returned level is implicitly left out.
pub trait DdSpec {
    /// Per-node state. Equal states must have equal sub-diagrams so that a driver may merge them.
    type State: Clone + Debug + Eq + Hash;

    /// A fresh, uninitialised state of the right size for this spec.
    fn new_state(&self) -> Self::State;

    /// Initialise `state` and return the level of the first decision, [`ACCEPT`] or [`REJECT`].
    fn get_root(&self, state: &mut Self::State) -> Level;

    /// Decide the variable at `level`, taking it if `take` is true, and return the next level,
    /// [`ACCEPT`] or [`REJECT`].
    fn get_child(&self, state: &mut Self::State, level: Level, take: bool) -> Level;

    /// Write a human-readable dump of `state`. Has no bearing on the diagram.
    fn print_state(&self, out: &mut dyn fmt::Write, state: &Self::State) -> fmt::Result;

    /// Borrow `state` for printing with `{}`.
    fn display<'a>(&'a self, state: &'a Self::State) -> StateDisplay<'a, Self>
    where
        Self: Sized,
    {
        StateDisplay { spec: self, state }
    }
}

/// A state paired with the spec that knows how to print it.
pub struct StateDisplay<'a, S: DdSpec> {
    spec: &'a S,
    state: &'a S::State,
}

impl<S: DdSpec> Display for StateDisplay<'_, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.spec.print_state(f, self.state)
    }
}

/// The intersection of two specs over the same variables, evaluated in lock-step.
///
/// Each side keeps its own level. A side sitting below the level being decided has skipped that variable,
/// so taking it rejects and leaving it out changes nothing for that side.
pub struct Intersection<A, B> {
    first: A,
    second: B,
}

/// State of an [`Intersection`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PairState<SA, SB> {
    first: SA,
    first_level: Level,
    second: SB,
    second_level: Level,
}

impl<A: DdSpec, B: DdSpec> Intersection<A, B> {
    /// Intersect `first` with `second`. Both must number their variables the same way.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// The first operand.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// The second operand.
    pub fn second(&self) -> &B {
        &self.second
    }

    #[inline]
    fn combine(first: Level, second: Level) -> Level {
        if first == REJECT || second == REJECT {
            return REJECT;
        }

        // ACCEPT is below every real level, so this is ACCEPT only once both sides accepted
        max(first, second)
    }
}

impl<A: DdSpec, B: DdSpec> DdSpec for Intersection<A, B> {
    type State = PairState<A::State, B::State>;

    fn new_state(&self) -> Self::State {
        PairState {
            first: self.first.new_state(),
            first_level: REJECT,
            second: self.second.new_state(),
            second_level: REJECT,
        }
    }

    fn get_root(&self, state: &mut Self::State) -> Level {
        state.first_level = self.first.get_root(&mut state.first);
        state.second_level = self.second.get_root(&mut state.second);
        Self::combine(state.first_level, state.second_level)
    }

    fn get_child(&self, state: &mut Self::State, level: Level, take: bool) -> Level {
        if state.first_level == level {
            state.first_level = self.first.get_child(&mut state.first, level, take);
        } else if take {
            return REJECT;
        }

        if state.second_level == level {
            state.second_level = self.second.get_child(&mut state.second, level, take);
        } else if take {
            return REJECT;
        }

        Self::combine(state.first_level, state.second_level)
    }

    fn print_state(&self, out: &mut dyn fmt::Write, state: &Self::State) -> fmt::Result {
        self.first.print_state(out, &state.first)?;
        write!(out, " & ")?;
        self.second.print_state(out, &state.second)
    }
}

impl<S: DdSpec> DdSpec for &S {
    type State = S::State;

    fn new_state(&self) -> Self::State {
        (**self).new_state()
    }

    fn get_root(&self, state: &mut Self::State) -> Level {
        (**self).get_root(state)
    }

    fn get_child(&self, state: &mut Self::State, level: Level, take: bool) -> Level {
        (**self).get_child(state, level, take)
    }

    fn print_state(&self, out: &mut dyn fmt::Write, state: &Self::State) -> fmt::Result {
        (**self).print_state(out, state)
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::Grid;
    use crate::spec::{DdSpec, Outcome, ACCEPT, REJECT};

    #[test]
    fn intersection_needs_both_sides() {
        // A leaves both termini downwards and meets itself in the bottom row
        let grid: Grid = "AA\n..".parse().unwrap();
        let both = grid.numberlink();
        let mut state = both.new_state();

        assert_eq!(both.get_root(&mut state), 2);
        assert_eq!(both.get_child(&mut state, 2, false), 1);
        assert_eq!(format!("{}", both.display(&state)), "[A A | .] & [||]");

        let mut paths = both.first().new_state();
        both.first().get_root(&mut paths);
        both.first().get_child(&mut paths, 2, false);
        assert_eq!(both.first().get_child(&mut paths, 1, true), ACCEPT);

        let mut corners = both.second().new_state();
        both.second().get_root(&mut corners);
        both.second().get_child(&mut corners, 2, false);
        assert_eq!(both.second().get_child(&mut corners, 1, true), REJECT);

        assert_eq!(both.get_child(&mut state, 1, true), REJECT);
    }

    #[test]
    fn outcomes() {
        assert_eq!(Outcome::of(3), Outcome::Continue(3));
        assert_eq!(Outcome::of(ACCEPT), Outcome::Accept);
        assert_eq!(Outcome::of(REJECT), Outcome::Reject);
        assert_eq!(Outcome::of(-7), Outcome::Reject);
    }
}
