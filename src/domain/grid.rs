/// BeliefGrid: every room's `BeliefCell`, keyed by start-relative coords.
///
/// ## Working window
///
/// The cave is unbounded until a bump reveals an edge, so cells are
/// stored for a fixed window `[-WINDOW_HALF_EXTENT, WINDOW_HALF_EXTENT]`
/// on both axes. Caves up to `MAX_CAVE_SIDE` rooms per side always fit
/// with a one-room margin. Telling a fact outside the window's interior
/// is a precondition violation and panics.
///
/// ## Propagation
///
/// `set` writes one attribute, then applies the rule for that
/// (attribute, value) pair to the four neighbours:
///   - stench TRUE  → UNKNOWN wumpus neighbours become MAYBE; if exactly
///     three neighbours are wumpus FALSE, the remaining one is TRUE
///   - stench FALSE → UNKNOWN/MAYBE wumpus neighbours become FALSE
///   - breeze TRUE/FALSE → the same rules for pits
///   - whenever the cell is empty, all neighbours are marked safe
///
/// Propagation is single-pass: it never chases second-order effects.

use std::collections::BTreeSet;

use super::belief::{Attribute, Belief, BeliefCell};
use super::percept::{Coord, Direction};

pub const WINDOW_HALF_EXTENT: i32 = 11;
/// Largest cave side the window is guaranteed to hold.
pub const MAX_CAVE_SIDE: i32 = 10;

const WINDOW_SIDE: usize = (2 * WINDOW_HALF_EXTENT + 1) as usize;

/// Discovered edges. Each holds the last in-bounds coordinate on its axis.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Bounds {
    pub top: Option<i32>,
    pub bottom: Option<i32>,
    pub left: Option<i32>,
    pub right: Option<i32>,
}

impl Bounds {
    pub fn contains(&self, c: Coord) -> bool {
        self.top.map_or(true, |t| c.y <= t)
            && self.bottom.map_or(true, |b| c.y >= b)
            && self.left.map_or(true, |l| c.x >= l)
            && self.right.map_or(true, |r| c.x <= r)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Hazard {
    Wumpus,
    Pit,
}

impl Hazard {
    fn attribute(self) -> Attribute {
        match self {
            Hazard::Wumpus => Attribute::Wumpus,
            Hazard::Pit => Attribute::Pit,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct BeliefGrid {
    cells: Vec<BeliefCell>,
    bounds: Bounds,
}

impl Default for BeliefGrid {
    fn default() -> Self {
        BeliefGrid::new()
    }
}

impl BeliefGrid {
    pub fn new() -> Self {
        BeliefGrid {
            cells: vec![BeliefCell::default(); WINDOW_SIDE * WINDOW_SIDE],
            bounds: Bounds::default(),
        }
    }

    // ── Addressing ──

    pub fn in_window(c: Coord) -> bool {
        c.x.abs() <= WINDOW_HALF_EXTENT && c.y.abs() <= WINDOW_HALF_EXTENT
    }

    /// Interior cells have all four neighbours inside the window.
    fn in_interior(c: Coord) -> bool {
        c.x.abs() < WINDOW_HALF_EXTENT && c.y.abs() < WINDOW_HALF_EXTENT
    }

    fn index(c: Coord) -> Option<usize> {
        if !Self::in_window(c) { return None; }
        let col = (c.x + WINDOW_HALF_EXTENT) as usize;
        let row = (c.y + WINDOW_HALF_EXTENT) as usize;
        Some(row * WINDOW_SIDE + col)
    }

    /// Every coordinate of the window, row by row from the bottom.
    pub fn coords() -> impl Iterator<Item = Coord> {
        let r = -WINDOW_HALF_EXTENT..=WINDOW_HALF_EXTENT;
        r.clone().flat_map(move |y| r.clone().map(move |x| Coord::new(x, y)))
    }

    pub fn get(&self, c: Coord) -> Option<&BeliefCell> {
        Self::index(c).map(|i| &self.cells[i])
    }

    /// Panics outside the window.
    pub fn cell(&self, c: Coord) -> &BeliefCell {
        match Self::index(c) {
            Some(i) => &self.cells[i],
            None => panic!("{c} lies outside the belief window"),
        }
    }

    fn cell_mut(&mut self, c: Coord) -> &mut BeliefCell {
        match Self::index(c) {
            Some(i) => &mut self.cells[i],
            None => panic!("{c} lies outside the belief window"),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Beyond a discovered edge, or beyond the window itself.
    pub fn is_out_of_bounds(&self, c: Coord) -> bool {
        !Self::in_window(c) || !self.bounds.contains(c)
    }

    // ── Writes ──

    fn touch(&mut self, c: Coord, changed: &mut BTreeSet<Coord>, f: impl FnOnce(&mut BeliefCell) -> bool) {
        if f(self.cell_mut(c)) {
            changed.insert(c);
        }
    }

    /// Assert one fact about `c` and propagate it to the neighbours.
    /// Returns every coordinate whose belief changed.
    pub fn set(&mut self, c: Coord, attr: Attribute, value: Belief) -> BTreeSet<Coord> {
        assert!(Self::in_interior(c), "cannot assert facts about {c}: outside the window interior");
        let mut changed = BTreeSet::new();
        self.touch(c, &mut changed, |cell| cell.set(attr, value));

        match (attr, value) {
            (Attribute::Stench, Belief::True) => self.suspect(c, Hazard::Wumpus, &mut changed),
            (Attribute::Stench, Belief::False) => self.rule_out(c, Hazard::Wumpus, &mut changed),
            (Attribute::Breeze, Belief::True) => self.suspect(c, Hazard::Pit, &mut changed),
            (Attribute::Breeze, Belief::False) => self.rule_out(c, Hazard::Pit, &mut changed),
            _ => {}
        }

        if self.cell(c).is_empty() {
            for n in c.neighbors() {
                self.touch(n, &mut changed, BeliefCell::mark_safe);
            }
        }
        changed
    }

    /// Something around `c` is sensed: every neighbour still unknown may
    /// hold the hazard. If only one neighbour is not ruled out, it does.
    fn suspect(&mut self, c: Coord, hazard: Hazard, changed: &mut BTreeSet<Coord>) {
        let attr = hazard.attribute();
        let mut ruled_out = 0;
        for n in c.neighbors() {
            match self.cell(n).get(attr) {
                Belief::False => ruled_out += 1,
                Belief::Unknown => self.touch(n, changed, |cell| cell.set(attr, Belief::Maybe)),
                _ => {}
            }
        }
        if ruled_out == 3 {
            for n in c.neighbors() {
                if self.cell(n).get(attr) == Belief::Maybe {
                    self.touch(n, changed, |cell| cell.set(attr, Belief::True));
                }
            }
        }
    }

    /// Nothing sensed at `c`: no neighbour holds the hazard.
    fn rule_out(&mut self, c: Coord, hazard: Hazard, changed: &mut BTreeSet<Coord>) {
        let attr = hazard.attribute();
        for n in c.neighbors() {
            if matches!(self.cell(n).get(attr), Belief::Unknown | Belief::Maybe) {
                self.touch(n, changed, |cell| cell.set(attr, Belief::False));
            }
        }
    }

    /// Mark `c` free of both hazards. No propagation.
    pub fn mark_safe(&mut self, c: Coord) -> bool {
        self.cell_mut(c).mark_safe()
    }

    /// A scream confirmed the wumpus at `c` is dead.
    pub fn clear_kill(&mut self, c: Coord) -> bool {
        self.cell_mut(c).clear_kill()
    }

    /// A bump revealed an edge: `value` is the last in-bounds coordinate
    /// in `dir`. Every cell strictly beyond it becomes out of bounds.
    pub fn set_bound(&mut self, dir: Direction, value: i32) -> BTreeSet<Coord> {
        let slot = match dir {
            Direction::Up => &mut self.bounds.top,
            Direction::Down => &mut self.bounds.bottom,
            Direction::Left => &mut self.bounds.left,
            Direction::Right => &mut self.bounds.right,
        };
        if let Some(known) = *slot {
            assert_eq!(known, value, "{dir:?} edge already discovered at {known}");
        }
        *slot = Some(value);

        let beyond = |c: Coord| match dir {
            Direction::Up => c.y > value,
            Direction::Down => c.y < value,
            Direction::Left => c.x < value,
            Direction::Right => c.x > value,
        };
        let mut changed = BTreeSet::new();
        for c in Self::coords().filter(|&c| beyond(c)) {
            self.touch(c, &mut changed, BeliefCell::mark_out_of_bounds);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn stench_makes_unknown_neighbours_suspects() {
        let mut g = BeliefGrid::new();
        let changed = g.set(c(0, 0), Attribute::Stench, Belief::True);
        for n in c(0, 0).neighbors() {
            assert_eq!(g.cell(n).wumpus(), Belief::Maybe);
            assert!(changed.contains(&n));
        }
        assert!(changed.contains(&c(0, 0)));
    }

    #[test]
    fn no_stench_clears_suspects() {
        let mut g = BeliefGrid::new();
        g.set(c(0, 0), Attribute::Stench, Belief::True);
        g.set(c(1, 1), Attribute::Stench, Belief::False);
        // (1,0) and (0,1) neighbour both
        assert_eq!(g.cell(c(1, 0)).wumpus(), Belief::False);
        assert_eq!(g.cell(c(0, 1)).wumpus(), Belief::False);
        assert_eq!(g.cell(c(-1, 0)).wumpus(), Belief::Maybe);
    }

    #[test]
    fn sole_remaining_candidate_is_confirmed() {
        let mut g = BeliefGrid::new();
        for n in [c(1, 0), c(-1, 0), c(0, 1)] {
            g.cell_mut(n).set_wumpus(Belief::False);
        }
        let changed = g.set(c(0, 0), Attribute::Stench, Belief::True);
        assert_eq!(g.cell(c(0, -1)).wumpus(), Belief::True);
        assert_eq!(g.cell(c(0, -1)).pit(), Belief::False);
        assert!(changed.contains(&c(0, -1)));
    }

    #[test]
    fn sole_candidate_needs_exactly_three_ruled_out() {
        let mut g = BeliefGrid::new();
        for n in [c(1, 0), c(-1, 0)] {
            g.cell_mut(n).set_wumpus(Belief::False);
        }
        g.set(c(0, 0), Attribute::Stench, Belief::True);
        assert_eq!(g.cell(c(0, 1)).wumpus(), Belief::Maybe);
        assert_eq!(g.cell(c(0, -1)).wumpus(), Belief::Maybe);
    }

    #[test]
    fn sole_candidate_for_pits() {
        let mut g = BeliefGrid::new();
        g.set(c(0, 0), Attribute::Breeze, Belief::True);
        for n in [c(0, 1), c(0, -1), c(-1, 0)] {
            g.cell_mut(n).set_pit(Belief::False);
        }
        // Re-asserting the breeze re-checks the neighbourhood.
        g.set(c(0, 0), Attribute::Breeze, Belief::True);
        assert_eq!(g.cell(c(1, 0)).pit(), Belief::True);
        assert_eq!(g.cell(c(1, 0)).wumpus(), Belief::False);
    }

    #[test]
    fn empty_cell_clears_all_neighbours() {
        let mut g = BeliefGrid::new();
        g.set(c(1, 0), Attribute::Breeze, Belief::True); // (0,0) becomes pit MAYBE
        assert_eq!(g.cell(c(0, 0)).pit(), Belief::Maybe);
        g.set(c(0, 1), Attribute::Stench, Belief::False);
        let changed = g.set(c(0, 1), Attribute::Breeze, Belief::False);
        for n in c(0, 1).neighbors() {
            assert!(g.cell(n).is_safe(), "{n} should be safe");
        }
        assert!(changed.contains(&c(0, 0)));
    }

    #[test]
    fn reasserting_known_fact_changes_nothing() {
        let mut g = BeliefGrid::new();
        g.set(c(0, 0), Attribute::Stench, Belief::False);
        g.set(c(0, 0), Attribute::Breeze, Belief::False);
        assert!(g.set(c(0, 0), Attribute::Breeze, Belief::False).is_empty());
    }

    #[test]
    fn set_bound_marks_beyond_as_out_of_bounds() {
        let mut g = BeliefGrid::new();
        g.set(c(2, 0), Attribute::Breeze, Belief::True);
        g.set_bound(Direction::Right, 2);
        assert_eq!(g.bounds().right, Some(2));
        for y in -WINDOW_HALF_EXTENT..=WINDOW_HALF_EXTENT {
            assert!(g.is_out_of_bounds(c(3, y)));
            assert!(g.cell(c(3, y)).is_safe());
            assert!(g.cell(c(3, y)).is_empty());
            assert!(!g.is_out_of_bounds(c(2, y)));
        }
        assert_eq!(g.cell(c(2, 1)).pit(), Belief::Maybe);
    }

    #[test]
    fn set_bound_each_direction() {
        let mut g = BeliefGrid::new();
        g.set_bound(Direction::Up, 3);
        g.set_bound(Direction::Down, -1);
        g.set_bound(Direction::Left, -2);
        assert!(g.is_out_of_bounds(c(0, 4)));
        assert!(g.is_out_of_bounds(c(0, -2)));
        assert!(g.is_out_of_bounds(c(-3, 0)));
        assert!(!g.is_out_of_bounds(c(-2, -1)));
        assert!(!g.is_out_of_bounds(c(5, 3)));
    }

    #[test]
    fn out_of_bounds_neighbour_counts_towards_sole_candidate() {
        let mut g = BeliefGrid::new();
        g.set_bound(Direction::Down, 0);
        g.cell_mut(c(-1, 0)).set_wumpus(Belief::False);
        g.cell_mut(c(1, 0)).set_wumpus(Belief::False);
        g.set(c(0, 0), Attribute::Stench, Belief::True);
        assert_eq!(g.cell(c(0, 1)).wumpus(), Belief::True);
    }

    #[test]
    fn window_edges() {
        let g = BeliefGrid::new();
        assert!(g.get(c(WINDOW_HALF_EXTENT, 0)).is_some());
        assert!(g.get(c(WINDOW_HALF_EXTENT + 1, 0)).is_none());
        assert!(g.is_out_of_bounds(c(0, -WINDOW_HALF_EXTENT - 1)));
        assert_eq!(BeliefGrid::coords().count(), WINDOW_SIDE * WINDOW_SIDE);
    }

    #[test]
    #[should_panic(expected = "outside the window interior")]
    fn facts_on_the_window_rim_are_rejected() {
        let mut g = BeliefGrid::new();
        g.set(c(WINDOW_HALF_EXTENT, 0), Attribute::Stench, Belief::False);
    }
}
