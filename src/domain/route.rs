/// Route search over known-safe rooms.
///
/// Breadth-first from `from`, expanding only rooms the knowledge base
/// reports safe and in bounds. The queue carries the first step taken so
/// the answer is available as soon as the goal is dequeued.

use std::collections::{BTreeSet, VecDeque};

use super::grid::WINDOW_HALF_EXTENT;
use super::knowledge::KnowledgeBase;
use super::percept::{Coord, Direction};

/// Every room of the belief window, once.
const BFS_MAX_NODES: usize =
    ((2 * WINDOW_HALF_EXTENT + 1) * (2 * WINDOW_HALF_EXTENT + 1)) as usize;

/// First room on a shortest safe route from `from` to `goal`.
/// `None` when already there or when no safe route is known.
pub fn first_step(kb: &KnowledgeBase, from: Coord, goal: Coord) -> Option<Coord> {
    if !kb.is_safe(goal) { return None; }
    search(kb, from, goal)
}

/// Like `first_step`, but only the rooms on the way must be safe: the
/// final step may enter an unsafe (but in-bounds) goal.
pub fn first_step_into(kb: &KnowledgeBase, from: Coord, goal: Coord) -> Option<Coord> {
    if kb.is_out_of_bounds(goal) { return None; }
    search(kb, from, goal)
}

fn search(kb: &KnowledgeBase, from: Coord, goal: Coord) -> Option<Coord> {
    if from == goal { return None; }

    let mut visited = BTreeSet::from([from]);
    let mut queue: VecDeque<(Coord, Coord)> = VecDeque::with_capacity(64);

    for dir in Direction::ALL {
        let next = from.step(dir);
        if next == goal { return Some(next); }
        if !kb.is_safe(next) { continue; }
        visited.insert(next);
        queue.push_back((next, next));
    }

    let mut expanded = 0;
    while let Some((here, first)) = queue.pop_front() {
        expanded += 1;
        if expanded > BFS_MAX_NODES { break; }

        for dir in Direction::ALL {
            let next = here.step(dir);
            if visited.contains(&next) { continue; }
            if next == goal { return Some(first); }
            if !kb.is_safe(next) { continue; }
            visited.insert(next);
            queue.push_back((next, first));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::percept::Percept;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    /// Tell an empty percept at each room; empty rooms clear their neighbours.
    fn kb_with_empty(rooms: &[(i32, i32)]) -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        for &(x, y) in rooms {
            kb.tell(c(x, y), Percept::default(), None);
        }
        kb
    }

    #[test]
    fn adjacent_goal() {
        let kb = kb_with_empty(&[(0, 0)]);
        assert_eq!(first_step(&kb, c(0, 0), c(-1, 0)), Some(c(-1, 0)));
    }

    #[test]
    fn follows_safe_corridor() {
        let mut kb = KnowledgeBase::new();
        let breeze = Percept { breeze: true, ..Percept::default() };
        // A breezy corridor: only the rooms told are safe.
        for x in 0..=3 {
            kb.tell(c(x, 0), breeze, None);
        }
        let step = first_step(&kb, c(3, 0), c(0, 0));
        assert_eq!(step, Some(c(2, 0)));
    }

    #[test]
    fn no_route_through_unknown() {
        let mut kb = KnowledgeBase::new();
        let breeze = Percept { breeze: true, ..Percept::default() };
        kb.tell(c(0, 0), breeze, None);
        kb.tell(c(2, 0), breeze, None);
        assert_eq!(first_step(&kb, c(2, 0), c(0, 0)), None);
    }

    #[test]
    fn unsafe_goal_only_as_last_step() {
        let mut kb = KnowledgeBase::new();
        let breeze = Percept { breeze: true, ..Percept::default() };
        for x in 0..=2 {
            kb.tell(c(x, 0), breeze, None);
        }
        // (-1,0) is a suspected pit next to the corridor's far end.
        assert_eq!(first_step(&kb, c(2, 0), c(-1, 0)), None);
        assert_eq!(first_step_into(&kb, c(2, 0), c(-1, 0)), Some(c(1, 0)));
        assert_eq!(first_step_into(&kb, c(0, 0), c(-1, 0)), Some(c(-1, 0)));
        // Never through another unsafe room on the way.
        assert_eq!(first_step_into(&kb, c(2, 0), c(-2, 0)), None);
    }

    #[test]
    fn already_there() {
        let kb = kb_with_empty(&[(0, 0)]);
        assert_eq!(first_step(&kb, c(0, 0), c(0, 0)), None);
    }
}
