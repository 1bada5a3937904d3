#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};
    use std::num::NonZero;

    use itertools::Itertools;
    use petgraph::graphmap::UnGraphMap;
    use unordered_pair::UnorderedPair;

    use crate::builder::{BuilderInvalidReason, GridBuilder};
    use crate::grid::{Grid, ParseGridError};
    use crate::level::LevelIndex;
    use crate::location::Location;
    use crate::mate::PathSpec;
    use crate::no_u_turn::NoUTurnSpec;
    use crate::search::Solutions;
    use crate::shape::SquareStep;
    use crate::solution::SolverFailure;
    use crate::spec::{DdSpec, Intersection, Level, Outcome, ACCEPT, REJECT};

    // walk the path leaving terminus `start`; returns where it ends and how many lines it used
    fn walk(lines: &UnGraphMap<Location, ()>, start: Location) -> (Location, usize) {
        let mut previous = None;
        let mut current = start;
        let mut steps = 0;
        while let Some(next) = lines.neighbors(current).find(|n| Some(*n) != previous) {
            previous = Some(current);
            current = next;
            steps += 1;
        }
        (current, steps)
    }

    fn is_path_cover(grid: &Grid, chosen: &[UnorderedPair<Location>]) -> bool {
        let mut lines: UnGraphMap<Location, ()> = UnGraphMap::new();
        for location in grid.graph.nodes() {
            lines.add_node(location);
        }
        for UnorderedPair(a, b) in chosen {
            lines.add_edge(*a, *b, ());
        }

        let degrees_ok = lines.nodes().all(|location| {
            let degree = lines.neighbors(location).count();
            match grid.terminus_at(location) {
                Some(_) => degree == 1,
                None => degree == 0 || degree == 2,
            }
        });
        if !degrees_ok {
            return false;
        }

        let mut used = 0;
        for (start, affiliation) in grid.termini() {
            let (end, steps) = walk(&lines, start);
            if grid.terminus_at(end) != Some(affiliation) {
                return false;
            }
            used += steps;
        }

        // every line lies on some terminus-to-terminus path, so none forms a loop
        used == 2 * chosen.len()
    }

    fn has_u_turn(grid: &Grid, chosen: &[UnorderedPair<Location>]) -> bool {
        let drawn: HashSet<UnorderedPair<Location>> = chosen.iter().copied().collect();
        (0..grid.rows() - 1).cartesian_product(0..grid.cols() - 1).any(|(y, x)| {
            let corner = Location(x, y);
            let right = Location(x + 1, y);
            let below = Location(x, y + 1);
            let diagonal = Location(x + 1, y + 1);
            let sides = [(corner, right), (corner, below), (right, diagonal), (below, diagonal)];

            let missing = sides.iter().filter(|(a, b)| !drawn.contains(&UnorderedPair(*a, *b))).collect_vec();
            missing.len() == 1 && grid.is_linkable(missing[0].0, missing[0].1)
        })
    }

    // every edge subset of the grid, filtered by the rules directly and projected onto the horizontal edges
    fn reference(grid: &Grid, forbid_u_turns: bool) -> BTreeSet<Vec<Level>> {
        let edges = grid.graph.all_edges().map(|(a, b, _)| UnorderedPair(a, b)).collect_vec();
        assert!(edges.len() <= 16, "grid too large to check exhaustively");
        let index = LevelIndex::new(grid);

        (0u32..1 << edges.len())
            .map(|mask| edges.iter().enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, edge)| *edge)
                .collect_vec())
            .filter(|chosen| is_path_cover(grid, chosen))
            .filter(|chosen| !forbid_u_turns || !has_u_turn(grid, chosen))
            .map(|chosen| chosen.iter()
                .filter(|UnorderedPair(a, b)| a.row() == b.row())
                .map(|UnorderedPair(a, b)| index.level_of(*a.min(b)))
                .sorted_by(|a, b| b.cmp(a))
                .collect_vec())
            .collect()
    }

    fn members<S: DdSpec>(spec: S) -> BTreeSet<Vec<Level>> {
        Solutions::new(spec).collect()
    }

    fn assert_matches_reference(grid: &Grid) {
        let paths = PathSpec::new(grid);
        let corners = NoUTurnSpec::new(grid);
        let both = Intersection::new(&paths, &corners);

        assert_eq!(members(&paths), reference(grid, false), "path spec on\n{}", grid);
        assert_eq!(members(&both), reference(grid, true), "numberlink on\n{}", grid);
        assert_eq!(members(both), members(grid.numberlink()));
    }

    #[test]
    fn remove_termini() {
        let grid = GridBuilder::with_dims((NonZero::new(5).unwrap(), NonZero::new(5).unwrap()))
            .add_termini('A', (Location(0, 0), Location(1, 4)))
            .pop_termini()
            .build()
            .unwrap();

        assert_eq!(format!("{}", grid), ".....
.....
.....
.....
.....
");
        assert_eq!(grid.num_affiliations(), 0);
    }

    #[test]
    fn builder_rejects_bad_grids() {
        let too_narrow = GridBuilder::with_dims((NonZero::new(1).unwrap(), NonZero::new(4).unwrap())).build();
        assert_eq!(too_narrow.err(), Some(vec![BuilderInvalidReason::TooFewColumns]));

        let out_of_bounds = GridBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()))
            .add_termini('A', (Location(0, 0), Location(3, 0)))
            .build();
        assert_eq!(out_of_bounds.err(), Some(vec![BuilderInvalidReason::FeatureOutOfBounds]));

        let degenerate = GridBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()))
            .add_termini('A', (Location(1, 1), Location(1, 1)))
            .build();
        assert_eq!(degenerate.err(), Some(vec![BuilderInvalidReason::DegenerateTermini('A')]));

        // B overwrites one end of A
        let overwritten = GridBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()))
            .add_termini('A', (Location(0, 0), Location(2, 2)))
            .add_termini('B', (Location(0, 0), Location(2, 0)))
            .build();
        assert_eq!(overwritten.err(), Some(vec![BuilderInvalidReason::UnpairedTerminus('A')]));

        let holed = GridBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()))
            .add_termini('A', (Location(0, 0), Location(2, 2)))
            .drop_location(Location(2, 2))
            .build();
        assert_eq!(holed.err(), Some(vec![BuilderInvalidReason::UnpairedTerminus('A')]));
    }

    #[test]
    fn parse_grid() {
        let grid: Grid = "
            A.b
            .#.
            B.a
        ".parse().unwrap();

        assert_eq!(format!("{}", grid), "A.B
.#.
B.A
");
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.terminus_at(Location(2, 2)), Some(1));
        assert_eq!(grid.terminus_at(Location(2, 0)), Some(2));
        assert!(!grid.is_linkable(Location(1, 0), Location(1, 1)));
        assert!(grid.is_linkable(Location(0, 0), Location(1, 0)));
        assert!(!grid.is_linkable(Location(0, 0), Location(1, 1)));

        assert_eq!("".parse::<Grid>().err(), Some(ParseGridError::Empty));
        assert_eq!("A.A\n..".parse::<Grid>().err(), Some(ParseGridError::Ragged { row: 1, width: 2, expected: 3 }));
        assert_eq!("A.A\n.A.".parse::<Grid>().err(), Some(ParseGridError::LabelCount { label: 'A', count: 3 }));
        assert_eq!("A\nA".parse::<Grid>().err(), Some(ParseGridError::Invalid(vec![BuilderInvalidReason::TooFewColumns])));
    }

    #[test]
    fn single_edge() {
        let grid: Grid = "AA".parse().unwrap();

        assert_eq!(members(grid.numberlink()), BTreeSet::from([vec![1]]));
        let solved = grid.solve().unwrap();
        assert_eq!(format!("{}", solved), "AA\n");
        assert_eq!(solved.edges().collect_vec(), vec![UnorderedPair(Location(0, 0), Location(1, 0))]);
    }

    #[test]
    fn no_termini_means_no_lines() {
        for text in ["..", "...\n...", "...\n.#.\n..."] {
            let grid: Grid = text.parse().unwrap();
            assert_eq!(members(grid.numberlink()), BTreeSet::from([vec![]]));

            let solved = grid.solve().unwrap();
            assert_eq!(solved.edges().count(), 0);
            assert_eq!(format!("{}", solved), format!("{}", grid));
        }
    }

    #[test]
    fn unreachable_pair() {
        // flow free warps starter pack level 1; without its warp, A can only reach the C termini
        let grid = GridBuilder::with_dims((NonZero::new(6).unwrap(), NonZero::new(3).unwrap()))
            .add_termini('A', (Location(0, 1), Location(4, 1)))
            .add_termini('B', (Location(1, 0), Location(3, 0)))
            .add_termini('C', (Location(1, 1), Location(3, 1)))
            .add_termini('D', (Location(1, 2), Location(3, 2)))
            .drop_location(Location(0, 0))
            .drop_location(Location(0, 2))
            .drop_location(Location(4, 0))
            .drop_location(Location(5, 0))
            .drop_location(Location(4, 2))
            .drop_location(Location(5, 2))
            .build()
            .unwrap();

        assert_eq!(format!("{}", grid), "#B.B##
AC.CA.
#D.D##
");

        assert_eq!(grid.count_solutions(), 0);
        assert_eq!(grid.solve().err(), Some(SolverFailure::Inconsistent));
    }

    #[test]
    fn walled_in_terminus() {
        let grid = GridBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(2).unwrap()))
            .add_termini('A', (Location(0, 0), Location(2, 1)))
            .disconnect_around(Location(2, 1), vec![SquareStep::Up, SquareStep::Left, SquareStep::Right])
            .build()
            .unwrap();

        let spec = grid.numberlink();
        let mut state = spec.new_state();
        assert_eq!(Outcome::of(spec.get_root(&mut state)), Outcome::Reject);

        let path = PathSpec::new(&grid);
        let mut mate = path.new_state();
        assert_eq!(path.get_root(&mut mate), REJECT);
        assert_eq!(grid.count_solutions(), 0);
    }

    #[test]
    fn different_pairs_never_merge() {
        let grid: Grid = "AB\nAB".parse().unwrap();
        let spec = PathSpec::new(&grid);
        let mut mate = spec.new_state();

        assert_eq!(spec.get_root(&mut mate), 2);
        assert_eq!(spec.get_child(&mut mate, 2, true), REJECT);
        assert_eq!(format!("{}", grid.solve().unwrap()), "AB\nAB\n");
    }

    #[test]
    fn same_pair_merges_only_at_the_end() {
        let grid: Grid = "AA\n..".parse().unwrap();
        let spec = PathSpec::new(&grid);
        let mut mate = spec.new_state();

        assert_eq!(spec.get_root(&mut mate), 2);
        // closing A right away leaves nothing open, so the bottom row is all blank
        assert_eq!(spec.get_child(&mut mate.clone(), 2, true), ACCEPT);
        assert_eq!(spec.get_child(&mut mate, 2, false), 1);
        assert_eq!(spec.get_child(&mut mate.clone(), 1, false), REJECT);
        assert_eq!(spec.get_child(&mut mate, 1, true), ACCEPT);

        // a second pair still waiting below keeps the first completion from accepting
        let grid: Grid = "AA\nBB".parse().unwrap();
        let spec = PathSpec::new(&grid);
        let mut mate = spec.new_state();
        spec.get_root(&mut mate);
        assert_eq!(spec.get_child(&mut mate, 2, true), 1);
        assert_eq!(spec.get_child(&mut mate.clone(), 1, false), REJECT);
        assert_eq!(spec.get_child(&mut mate, 1, true), ACCEPT);
    }

    fn replay<S: DdSpec>(spec: &S, mut state: S::State, choices: &[bool]) -> (Vec<(Level, String)>, S::State) {
        let mut level = spec.get_root(&mut state);
        let mut seen = vec![(level, format!("{}", spec.display(&state)))];
        for take in choices {
            if level <= 0 {
                break;
            }
            level = spec.get_child(&mut state, level, *take);
            seen.push((level, format!("{}", spec.display(&state))));
        }

        (seen, state)
    }

    #[test]
    fn transitions_are_deterministic() {
        let grid: Grid = "A..B\n.C..\n..C.\nB..A".parse().unwrap();
        let spec = grid.numberlink();
        let choices = [true, false, false, true, true, false, true, false, false];

        let fresh = spec.new_state();
        let (first, first_state) = replay(&spec, fresh.clone(), &choices);
        let (second, second_state) = replay(&spec, fresh, &choices);
        assert_eq!(first, second);
        assert_eq!(first_state, second_state);
    }

    #[test]
    fn detour_or_shortcut() {
        let grid: Grid = "A.A\n...".parse().unwrap();
        assert_eq!(members(PathSpec::new(&grid)).len(), 4);
        assert!(members(NoUTurnSpec::new(&grid)).is_superset(&members(grid.numberlink())));

        let solved = grid.solutions().map(|s| s.unwrap().to_string()).sorted().collect_vec();
        assert_eq!(solved, vec!["A.A\naaa\n", "AaA\n...\n"]);
    }

    #[test]
    fn detour_around_wall() {
        let grid = GridBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(2).unwrap()))
            .add_termini('A', (Location(0, 0), Location(2, 0)))
            .disconnect(UnorderedPair(Location(0, 0), Location(1, 0)))
            .build()
            .unwrap();

        let solved = grid.solutions().map(|s| s.unwrap().to_string()).sorted().collect_vec();
        assert_eq!(solved, vec!["A.A\naaa\n", "AaA\naa.\n"]);
    }

    #[test]
    fn straight_rows() {
        let grid: Grid = "A.A\nB.B".parse().unwrap();
        let solved = grid.solve().unwrap();

        assert_eq!(format!("{}", solved), "AaA\nBbB\n");
        assert_eq!(solved.levels(), &[4, 3, 2, 1]);
        assert_eq!(solved.path_of(2), vec![Location(0, 1), Location(1, 1), Location(2, 1)]);
        assert_eq!(grid.count_solutions(), 1);
    }

    #[test]
    fn crossing_corners_have_no_solution() {
        let grid: Grid = "A.B\n...\nB.A".parse().unwrap();
        assert_eq!(grid.count_solutions(), 0);
        assert_eq!(grid.solve().err(), Some(SolverFailure::Inconsistent));
    }

    #[test]
    fn two_disjoint_paths() {
        let grid: Grid = "A.B\n...\nA.B".parse().unwrap();
        let index = LevelIndex::new(&grid);
        let solutions = grid.solutions().map(Result::unwrap).collect_vec();
        assert!(!solutions.is_empty());

        for solution in &solutions {
            let a = solution.path_of(1);
            let b = solution.path_of(2);
            assert_eq!((a.first(), a.last()), (Some(&Location(0, 0)), Some(&Location(0, 2))));
            assert_eq!((b.first(), b.last()), (Some(&Location(2, 0)), Some(&Location(2, 2))));
            assert!(a.iter().all(|location| !b.contains(location)));
            assert!(a.iter().all_unique() && b.iter().all_unique());

            let edges = solution.edges().collect_vec();
            assert!(!has_u_turn(&grid, &edges));
            assert!(solution.levels().iter().all(|level| (1..=index.max_level()).contains(level)));
        }

        assert_matches_reference(&grid);
    }

    #[test]
    fn matches_exhaustive_search() {
        for text in [
            "AA",
            "A.\n.A",
            "A..\n..A",
            "A.A\n...",
            "AB\nAB",
            "A.B\n...\nB.A",
            "A..\n.B.\nA.B",
            "..A\nB..\nBA.",
            "A#A\n...\n...",
            "A..\n...\n..A",
            "A.B.\n..BA",
            "....\n.AA.",
        ] {
            assert_matches_reference(&text.parse().unwrap());
        }
    }

    #[test]
    fn walls_match_exhaustive_search() {
        let square = || GridBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()));

        let grids = [
            GridBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(2).unwrap()))
                .add_termini('A', (Location(0, 0), Location(2, 0)))
                .disconnect(UnorderedPair(Location(0, 0), Location(1, 0)))
                .build(),
            square()
                .add_termini('A', (Location(0, 0), Location(2, 2)))
                .disconnect(UnorderedPair(Location(1, 0), Location(1, 1)))
                .disconnect(UnorderedPair(Location(1, 1), Location(1, 2)))
                .build(),
            square()
                .add_termini('A', (Location(0, 0), Location(2, 0)))
                .add_termini('B', (Location(0, 2), Location(2, 2)))
                .disconnect(UnorderedPair(Location(1, 0), Location(1, 1)))
                .disconnect(UnorderedPair(Location(0, 1), Location(1, 1)))
                .build(),
            square()
                .add_termini('A', (Location(0, 0), Location(2, 2)))
                .drop_location(Location(1, 1))
                .disconnect(UnorderedPair(Location(0, 1), Location(0, 2)))
                .build(),
            square()
                .add_termini('A', (Location(0, 1), Location(2, 1)))
                .disconnect_around(Location(1, 1), vec![SquareStep::Left, SquareStep::Right])
                .build(),
            GridBuilder::with_dims((NonZero::new(4).unwrap(), NonZero::new(2).unwrap()))
                .add_termini('A', (Location(0, 0), Location(3, 0)))
                .add_termini('B', (Location(1, 1), Location(2, 1)))
                .disconnect(UnorderedPair(Location(1, 0), Location(2, 0)))
                .build(),
        ];

        for grid in grids {
            assert_matches_reference(&grid.unwrap());
        }
    }

    #[test]
    fn solve_most_basic() {
        // flow free classic pack level 1
        let grid = GridBuilder::with_dims((NonZero::new(5).unwrap(), NonZero::new(5).unwrap()))
            .add_termini('A', (Location(0, 0), Location(1, 4)))
            .add_termini('B', (Location(2, 0), Location(1, 3)))
            .add_termini('C', (Location(2, 1), Location(2, 4)))
            .add_termini('D', (Location(4, 0), Location(3, 3)))
            .add_termini('E', (Location(4, 1), Location(3, 4)))
            .build()
            .unwrap();

        assert_eq!(format!("{}", grid), "A.B.D
..C.E
.....
.B.D.
.ACE.
");

        // the flow free answer fills every cell; it is one of the numberlink answers
        let filled = "AbBdD
abCdE
abcde
aBcDe
aACEe
";
        assert!(grid.solutions().any(|solution| solution.unwrap().to_string() == filled));
    }
}
