/// KnowledgeBase: the facade between the planner and the belief grid.
///
/// `tell` is the only ingestion point. Everything else is a read.
///
/// A room's sensory record (stench, breeze, gold) is written on the first
/// visit. The World may change afterwards (a killed wumpus takes its
/// stench with it, gold is picked up), so a revisit re-asserts only the
/// attributes whose percept still matches the record. Re-asserting lets
/// bounds and clearings learned since the first visit reach the
/// sole-candidate rule.

use std::collections::BTreeSet;

use tracing::debug;

use super::belief::{Attribute, Belief};
use super::grid::{BeliefGrid, Bounds, WINDOW_HALF_EXTENT};
use super::percept::{Action, Command, Coord, Direction, Percept};

/// Which hazard beliefs an aggregate query selects.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Certainty {
    Confirmed,
    Suspected,
    Either,
}

impl Certainty {
    fn admits(self, b: Belief) -> bool {
        match self {
            Certainty::Confirmed => b == Belief::True,
            Certainty::Suspected => b == Belief::Maybe,
            Certainty::Either => matches!(b, Belief::True | Belief::Maybe),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct KnowledgeBase {
    grid: BeliefGrid,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        KnowledgeBase::default()
    }

    /// Ingest what the agent perceives at `at` after `last`
    /// (`None` for the opening percept). Returns the changed rooms.
    pub fn tell(&mut self, at: Coord, percept: Percept, last: Option<Command>) -> BTreeSet<Coord> {
        let mut changed = BTreeSet::new();

        // Alive here, so nothing here can kill.
        if self.grid.mark_safe(at) {
            changed.insert(at);
        }

        if percept.bump {
            let Some(cmd) = last else {
                panic!("bump perceived at {at} without a preceding move");
            };
            let edge = match cmd.facing {
                Direction::Up | Direction::Down => at.y,
                Direction::Left | Direction::Right => at.x,
            };
            changed.extend(self.grid.set_bound(cmd.facing, edge));
        }

        if let Some(cmd) = last {
            if cmd.action == Action::Shoot && percept.scream {
                let target = at.step(cmd.facing);
                if self.grid.clear_kill(target) {
                    changed.insert(target);
                }
            }
        }

        let first_visit = !self.grid.cell(at).is_observed();
        for (attr, sensed) in [
            (Attribute::Stench, percept.stench),
            (Attribute::Breeze, percept.breeze),
            (Attribute::Gold, percept.glitter),
        ] {
            let sensed = Belief::from_bool(sensed);
            // A revisit re-runs propagation only where the record still holds.
            if first_visit || self.grid.cell(at).get(attr) == sensed {
                changed.extend(self.grid.set(at, attr, sensed));
            }
        }

        debug!(%at, %percept, changed = changed.len(), "told");
        changed
    }

    // ── Point queries ──

    pub fn ask(&self, at: Coord, attr: Attribute) -> Belief {
        self.grid.cell(at).get(attr)
    }

    /// Known free of hazards and not beyond a discovered edge.
    pub fn is_safe(&self, at: Coord) -> bool {
        !self.grid.is_out_of_bounds(at) && self.grid.cell(at).is_safe()
    }

    pub fn is_out_of_bounds(&self, at: Coord) -> bool {
        self.grid.is_out_of_bounds(at)
    }

    pub fn bounds(&self) -> Bounds {
        self.grid.bounds()
    }

    /// Bottom-left corner of the discovered rectangle, once both the left
    /// and bottom edges are known.
    pub fn exit(&self) -> Option<Coord> {
        let b = self.grid.bounds();
        Some(Coord::new(b.left?, b.bottom?))
    }

    // ── Aggregate queries ──

    fn in_bounds(&self) -> impl Iterator<Item = Coord> + '_ {
        BeliefGrid::coords().filter(move |&c| !self.grid.is_out_of_bounds(c))
    }

    pub fn safe_cells(&self) -> BTreeSet<Coord> {
        self.in_bounds().filter(|&c| self.grid.cell(c).is_safe()).collect()
    }

    pub fn wumpus_cells(&self, certainty: Certainty) -> BTreeSet<Coord> {
        self.hazard_cells(Attribute::Wumpus, certainty)
    }

    pub fn pit_cells(&self, certainty: Certainty) -> BTreeSet<Coord> {
        self.hazard_cells(Attribute::Pit, certainty)
    }

    fn hazard_cells(&self, attr: Attribute, certainty: Certainty) -> BTreeSet<Coord> {
        self.in_bounds()
            .filter(|&c| certainty.admits(self.grid.cell(c).get(attr)))
            .collect()
    }

    /// ASCII map of everything learned so far, top row first.
    /// `W`/`w` wumpus, `P`/`p` pit, `G` gold, `.` safe, `?` unknown, `#` edge.
    pub fn render(&self) -> String {
        let touched: Vec<Coord> = self
            .in_bounds()
            .filter(|&c| self.grid.cell(c).glyph() != '?')
            .collect();
        if touched.is_empty() {
            return String::new();
        }
        let b = self.grid.bounds();
        let lim = WINDOW_HALF_EXTENT;
        // One ring of margin so discovered edges show up as '#'.
        let min_x = touched.iter().map(|c| c.x).min().unwrap_or(0)
            .saturating_sub(1)
            .max(b.left.map_or(-lim, |l| l - 1));
        let max_x = touched.iter().map(|c| c.x).max().unwrap_or(0)
            .saturating_add(1)
            .min(b.right.map_or(lim, |r| r + 1));
        let min_y = touched.iter().map(|c| c.y).min().unwrap_or(0)
            .saturating_sub(1)
            .max(b.bottom.map_or(-lim, |v| v - 1));
        let max_y = touched.iter().map(|c| c.y).max().unwrap_or(0)
            .saturating_add(1)
            .min(b.top.map_or(lim, |t| t + 1));

        let mut out = String::new();
        for y in (min_y..=max_y).rev() {
            for x in min_x..=max_x {
                let c = Coord::new(x, y);
                let ch = if self.grid.is_out_of_bounds(c) { '#' } else { self.grid.cell(c).glyph() };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn stench() -> Percept {
        Percept { stench: true, ..Percept::default() }
    }

    #[test]
    fn tell_marks_current_room_safe() {
        let mut kb = KnowledgeBase::new();
        let changed = kb.tell(c(0, 0), stench(), None);
        assert!(kb.is_safe(c(0, 0)));
        assert!(changed.contains(&c(0, 0)));
        assert_eq!(kb.ask(c(0, 0), Attribute::Stench), Belief::True);
        assert_eq!(kb.ask(c(0, 0), Attribute::Gold), Belief::False);
    }

    #[test]
    fn shoot_and_confirm() {
        let mut kb = KnowledgeBase::new();
        kb.tell(c(0, 0), stench(), None);
        assert_eq!(kb.ask(c(1, 0), Attribute::Wumpus), Belief::Maybe);

        let scream = Percept { scream: true, ..Percept::default() };
        let changed = kb.tell(c(0, 0), scream, Some(Command::new(Action::Shoot, Direction::Right)));
        assert_eq!(kb.ask(c(1, 0), Attribute::Wumpus), Belief::False);
        assert!(kb.is_safe(c(1, 0)));
        assert!(changed.contains(&c(1, 0)));
        // The other suspects are untouched.
        assert_eq!(kb.ask(c(-1, 0), Attribute::Wumpus), Belief::Maybe);
    }

    #[test]
    fn shot_without_scream_clears_nothing() {
        let mut kb = KnowledgeBase::new();
        kb.tell(c(0, 0), stench(), None);
        kb.tell(c(0, 0), stench(), Some(Command::new(Action::Shoot, Direction::Up)));
        assert_eq!(kb.ask(c(0, 1), Attribute::Wumpus), Belief::Maybe);
    }

    /// Three clear rooms around a stench at (0,1) pin the wumpus to (0,2).
    fn confirmed_wumpus_above() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.tell(c(0, 0), Percept::default(), None);
        kb.tell(c(-1, 1), Percept::default(), None);
        kb.tell(c(1, 1), Percept::default(), None);
        kb.tell(c(0, 1), stench(), Some(Command::new(Action::Move, Direction::Up)));
        kb
    }

    #[test]
    fn kill_retracts_confirmed_wumpus() {
        let mut kb = confirmed_wumpus_above();
        assert_eq!(kb.ask(c(0, 2), Attribute::Wumpus), Belief::True);
        let scream = Percept { scream: true, ..stench() };
        kb.tell(c(0, 1), scream, Some(Command::new(Action::Shoot, Direction::Up)));
        assert_eq!(kb.ask(c(0, 2), Attribute::Wumpus), Belief::False);
        assert!(kb.is_safe(c(0, 2)));
        assert!(kb.wumpus_cells(Certainty::Either).is_empty());
    }

    #[test]
    fn bump_sets_bound_from_facing() {
        let mut kb = KnowledgeBase::new();
        kb.tell(c(0, 0), Percept::default(), None);
        let bump = Percept { bump: true, ..Percept::default() };
        kb.tell(c(0, 0), bump, Some(Command::new(Action::Move, Direction::Left)));
        assert_eq!(kb.bounds().left, Some(0));
        assert!(kb.exit().is_none());
        kb.tell(c(0, 0), bump, Some(Command::new(Action::Move, Direction::Down)));
        assert_eq!(kb.exit(), Some(c(0, 0)));
        assert!(kb.is_out_of_bounds(c(-1, 0)));
        assert!(!kb.safe_cells().contains(&c(-1, 0)));
    }

    #[test]
    #[should_panic(expected = "without a preceding move")]
    fn bump_without_action_panics() {
        let mut kb = KnowledgeBase::new();
        kb.tell(c(0, 0), Percept { bump: true, ..Percept::default() }, None);
    }

    #[test]
    fn empty_room_clears_all_neighbours() {
        let mut kb = KnowledgeBase::new();
        kb.tell(c(0, 0), Percept { breeze: true, ..Percept::default() }, None);
        assert_eq!(kb.ask(c(1, 0), Attribute::Pit), Belief::Maybe);
        kb.tell(c(1, 1), Percept::default(), None);
        assert!(kb.is_safe(c(1, 0)));
        assert!(kb.is_safe(c(0, 1)));
        assert_eq!(kb.ask(c(-1, 0), Attribute::Pit), Belief::Maybe);
    }

    #[test]
    fn bounds_exclude_cells_from_every_query() {
        let mut kb = KnowledgeBase::new();
        kb.tell(c(2, 0), Percept { stench: true, breeze: true, ..Percept::default() }, None);
        assert!(kb.wumpus_cells(Certainty::Either).contains(&c(3, 0)));
        let bump = Percept { bump: true, stench: true, breeze: true, ..Percept::default() };
        kb.tell(c(2, 0), bump, Some(Command::new(Action::Move, Direction::Right)));
        for set in [
            kb.safe_cells(),
            kb.wumpus_cells(Certainty::Either),
            kb.pit_cells(Certainty::Either),
        ] {
            assert!(set.iter().all(|p| p.x <= 2), "{set:?}");
        }
    }

    #[test]
    fn certainty_filters() {
        let kb = confirmed_wumpus_above();
        assert_eq!(kb.wumpus_cells(Certainty::Confirmed), [c(0, 2)].into_iter().collect());
        assert!(kb.wumpus_cells(Certainty::Suspected).is_empty());
        assert_eq!(kb.wumpus_cells(Certainty::Either).len(), 1);
        assert!(kb.pit_cells(Certainty::Either).is_empty());
    }

    #[test]
    fn revisit_promotes_candidate_left_by_later_bound() {
        let mut kb = KnowledgeBase::new();
        let breeze = Percept { breeze: true, ..Percept::default() };
        kb.tell(c(0, 0), breeze, None);
        let bump = Percept { bump: true, ..breeze };
        kb.tell(c(0, 0), bump, Some(Command::new(Action::Move, Direction::Up)));
        kb.tell(c(0, 0), bump, Some(Command::new(Action::Move, Direction::Down)));
        assert_eq!(kb.ask(c(1, 0), Attribute::Pit), Belief::Maybe);
        assert_eq!(kb.ask(c(-1, 0), Attribute::Pit), Belief::Maybe);

        // The left edge leaves (1,0) as the only room the breeze can explain.
        let changed = kb.tell(c(0, 0), bump, Some(Command::new(Action::Move, Direction::Left)));
        assert_eq!(kb.ask(c(1, 0), Attribute::Pit), Belief::True);
        assert!(changed.contains(&c(1, 0)));
        assert_eq!(kb.pit_cells(Certainty::Confirmed), [c(1, 0)].into_iter().collect());
    }

    #[test]
    fn sensory_record_keeps_values_the_world_took_back() {
        let mut kb = KnowledgeBase::new();
        kb.tell(c(0, 0), Percept { glitter: true, ..stench() }, None);
        // Gold picked up and wumpus killed: later percepts differ.
        kb.tell(c(0, 0), Percept::default(), Some(Command::new(Action::Shoot, Direction::Up)));
        assert_eq!(kb.ask(c(0, 0), Attribute::Gold), Belief::True);
        assert_eq!(kb.ask(c(0, 0), Attribute::Stench), Belief::True);
    }

    #[test]
    fn render_shows_learned_rooms() {
        let mut kb = KnowledgeBase::new();
        kb.tell(c(0, 0), stench(), None);
        let map = kb.render();
        let rows: Vec<&str> = map.lines().collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2], "?w.w?");
    }
}
