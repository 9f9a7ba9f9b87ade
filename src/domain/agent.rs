/// Agent planner: chooses one command per step from what the knowledge
/// base currently believes.
///
/// Two mission modes:
///   1. **Exploring**: depth-first over safe rooms, collecting gold.
///   2. **ReturningToExit**: committed to leaving; walks home over known
///      safe rooms and climbs out, risking a suspected pit only when no
///      safe room is left anywhere.
///
/// Decision sequence (first branch that yields a command wins):
///   0. [returning] at the exit → CLIMB; safe route to exit known → follow it
///   1. unvisited safe neighbour → MOVE
///   2. wumpus suspect not yet missed → SHOOT (confirmed before suspected)
///   3. previous room on the exploration stack → MOVE back
///   4. [returning, every safe room visited] adjacent suspected pit → MOVE
///      (risk); otherwise walk over safe rooms towards the nearest one
///   5. commit to exit: reset stack and visited set, switch mode
///
/// Branch 5 runs at most once; in ReturningToExit mode running out of
/// branches means the mission is stalled.
///
/// Ties are broken with the session RNG. Exploring avoids stepping down
/// unless that is the only option; returning prefers down and left.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use super::belief::{Attribute, Belief};
use super::knowledge::{Certainty, KnowledgeBase};
use super::percept::{Action, Command, Coord, Direction, Percept, Response};
use super::route;
use crate::error::MissionError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mission {
    Exploring,
    ReturningToExit,
}

/// Outcome of one planning step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Plan {
    Act(Command),
    /// No branch applies: nothing safe or useful is left to do.
    Stall,
}

/// Why a command was issued. Decides how the World's answer is folded back.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Intent {
    Climb,
    Route(Coord),
    Explore(Coord),
    Hunt(Coord),
    Backtrack(Coord),
    /// One safe step towards `risk_target`.
    Approach(Coord),
    Risk(Coord),
}

pub struct Agent {
    kb: KnowledgeBase,
    position: Coord,
    facing: Direction,
    /// Depth-first path record; top is the current room.
    stack: Vec<Coord>,
    visited: BTreeSet<Coord>,
    /// Rooms shot at without a scream. Never targeted again this mission.
    missed: BTreeSet<Coord>,
    mode: Mission,
    gold: u32,
    rng: ChaCha8Rng,
    intent: Option<Intent>,
    /// Suspected pit being walked towards once nothing safe is left.
    risk_target: Option<Coord>,
    finished: bool,
}

impl Agent {
    pub fn new(seed: u64) -> Self {
        Agent {
            kb: KnowledgeBase::new(),
            position: Coord::ORIGIN,
            facing: Direction::Right,
            stack: vec![Coord::ORIGIN],
            visited: BTreeSet::from([Coord::ORIGIN]),
            missed: BTreeSet::new(),
            mode: Mission::Exploring,
            gold: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            intent: None,
            risk_target: None,
            finished: false,
        }
    }

    /// Ingest the percept of the start room.
    pub fn start(&mut self, percept: Percept) {
        self.kb.tell(self.position, percept, None);
        if percept.glitter {
            self.gold += 1;
        }
    }

    // ── Accessors ──

    pub fn knowledge(&self) -> &KnowledgeBase { &self.kb }
    pub fn position(&self) -> Coord { self.position }
    pub fn facing(&self) -> Direction { self.facing }
    pub fn mode(&self) -> Mission { self.mode }
    pub fn gold(&self) -> u32 { self.gold }
    pub fn stack(&self) -> &[Coord] { &self.stack }
    pub fn visited(&self) -> &BTreeSet<Coord> { &self.visited }
    pub fn missed(&self) -> &BTreeSet<Coord> { &self.missed }
    pub fn is_finished(&self) -> bool { self.finished }

    // ══════════════════════════════════════════════════════════════
    // Planning
    // ══════════════════════════════════════════════════════════════

    pub fn decide(&mut self) -> Result<Plan, MissionError> {
        if self.finished { return Err(MissionError::StaleAction); }

        loop {
            if let Some(intent) = self.choose() {
                let cmd = self.command_for(intent)?;
                debug!(?intent, %cmd, at = %self.position, mode = ?self.mode, "decided");
                self.intent = Some(intent);
                return Ok(Plan::Act(cmd));
            }
            if self.mode == Mission::ReturningToExit {
                info!(at = %self.position, "no safe option left");
                return Ok(Plan::Stall);
            }
            self.commit_to_exit();
        }
    }

    fn choose(&mut self) -> Option<Intent> {
        if self.mode == Mission::ReturningToExit {
            if self.climb_command().is_ok() {
                return Some(Intent::Climb);
            }
            if let Some(exit) = self.kb.exit() {
                if let Some(next) = route::first_step(&self.kb, self.position, exit) {
                    return Some(Intent::Route(next));
                }
            }
        }

        let rooms = self.safe_rooms();
        if let Some(room) = self.pick(&rooms) {
            return Some(Intent::Explore(room));
        }

        if let Some(target) = self.hunt_target() {
            return Some(Intent::Hunt(target));
        }

        match self.backtrack() {
            Ok(prev) => return Some(Intent::Backtrack(prev)),
            // Nothing to go back to: fall through to the risk/commit branches.
            Err(_) => {}
        }

        if self.mode == Mission::ReturningToExit && self.kb.safe_cells().is_subset(&self.visited) {
            let risky = self.risky_rooms();
            if let Some(room) = self.pick(&risky) {
                self.risk_target = None;
                return Some(Intent::Risk(room));
            }
            return self.approach_suspect();
        }
        None
    }

    fn command_for(&self, intent: Intent) -> Result<Command, MissionError> {
        match intent {
            Intent::Climb => self.climb_command(),
            Intent::Hunt(target) => Ok(Command::new(Action::Shoot, Direction::between(self.position, target)?)),
            Intent::Route(to)
            | Intent::Explore(to)
            | Intent::Backtrack(to)
            | Intent::Approach(to)
            | Intent::Risk(to) => {
                Ok(Command::new(Action::Move, Direction::between(self.position, to)?))
            }
        }
    }

    /// CLIMB is only valid in the known exit room.
    pub fn climb_command(&self) -> Result<Command, MissionError> {
        if self.kb.exit() == Some(self.position) {
            Ok(Command::new(Action::Climb, self.facing))
        } else {
            Err(MissionError::InvalidClimb { at: self.position })
        }
    }

    /// Pop the current room; the new top is where to go back to.
    pub fn backtrack(&mut self) -> Result<Coord, MissionError> {
        if self.stack.len() < 2 {
            return Err(MissionError::ExhaustedOptions);
        }
        self.stack.pop();
        self.stack.last().copied().ok_or(MissionError::ExhaustedOptions)
    }

    fn commit_to_exit(&mut self) {
        info!(at = %self.position, gold = self.gold, "committing to exit");
        self.visited.clear();
        self.stack.clear();
        self.stack.push(self.position);
        self.visited.insert(self.position);
        self.mode = Mission::ReturningToExit;
    }

    // ── Candidates ──

    fn neighbors_in_bounds(&self) -> impl Iterator<Item = Coord> + '_ {
        self.position
            .neighbors()
            .into_iter()
            .filter(move |&n| !self.kb.is_out_of_bounds(n))
    }

    /// Adjacent safe rooms not yet visited.
    fn safe_rooms(&self) -> Vec<Coord> {
        self.neighbors_in_bounds()
            .filter(|&n| self.kb.is_safe(n) && !self.visited.contains(&n))
            .collect()
    }

    /// Adjacent wumpus suspect to shoot at: confirmed first.
    fn hunt_target(&mut self) -> Option<Coord> {
        let shootable = |c: Certainty| -> Vec<Coord> {
            let cells = self.kb.wumpus_cells(c);
            self.neighbors_in_bounds()
                .filter(|n| cells.contains(n) && !self.missed.contains(n))
                .collect()
        };
        let confirmed = shootable(Certainty::Confirmed);
        let candidates = if confirmed.is_empty() { shootable(Certainty::Suspected) } else { confirmed };
        self.pick(&candidates)
    }

    /// A suspected pit not known to hold a wumpus.
    fn is_risky(&self, room: Coord) -> bool {
        !self.kb.is_out_of_bounds(room)
            && self.kb.ask(room, Attribute::Pit) == Belief::Maybe
            && self.kb.ask(room, Attribute::Wumpus) != Belief::True
    }

    /// Adjacent risky rooms.
    fn risky_rooms(&self) -> Vec<Coord> {
        self.neighbors_in_bounds().filter(|&n| self.is_risky(n)).collect()
    }

    /// Next safe step towards a risky room elsewhere in the cave, or the
    /// risk itself once it is one step away. The target is kept until it
    /// stops being risky or reachable.
    fn approach_suspect(&mut self) -> Option<Intent> {
        let kept = self.risk_target.filter(|&t| self.is_risky(t)).and_then(|t| {
            route::first_step_into(&self.kb, self.position, t).map(|next| (t, next))
        });
        let found = kept.or_else(|| {
            let mut targets: Vec<Coord> = self
                .kb
                .pit_cells(Certainty::Suspected)
                .into_iter()
                .filter(|&t| {
                    self.is_risky(t) && t.neighbors().iter().any(|&n| self.kb.is_safe(n))
                })
                .collect();
            targets.sort_by_key(|t| t.manhattan(self.position));
            targets.into_iter().find_map(|t| {
                route::first_step_into(&self.kb, self.position, t).map(|next| (t, next))
            })
        });

        let Some((target, next)) = found else {
            self.risk_target = None;
            return None;
        };
        if self.risk_target != Some(target) {
            info!(%target, at = %self.position, "heading for a suspected pit");
        }
        if next == target {
            self.risk_target = None;
            Some(Intent::Risk(target))
        } else {
            self.risk_target = Some(target);
            Some(Intent::Approach(next))
        }
    }

    /// Does the travel bias of the current mode favour stepping to `room`?
    fn favoured(&self, room: Coord) -> bool {
        let Ok(dir) = Direction::between(self.position, room) else { return false };
        match self.mode {
            Mission::Exploring => dir != Direction::Down,
            Mission::ReturningToExit => matches!(dir, Direction::Down | Direction::Left),
        }
    }

    /// Uniform draw among the favoured candidates, or among all of them
    /// when none is favoured.
    fn pick(&mut self, rooms: &[Coord]) -> Option<Coord> {
        let favoured: Vec<Coord> = rooms.iter().copied().filter(|&r| self.favoured(r)).collect();
        let pool = if favoured.is_empty() { rooms } else { &favoured[..] };
        pool.choose(&mut self.rng).copied()
    }

    // ══════════════════════════════════════════════════════════════
    // Folding the World's answer back in
    // ══════════════════════════════════════════════════════════════

    /// Apply the World's answer to `cmd`. A rejected climb leaves every
    /// piece of state untouched; any other error ends the mission.
    pub fn apply(&mut self, cmd: Command, result: Result<Response, MissionError>) -> Result<(), MissionError> {
        let response = match result {
            Ok(r) => r,
            Err(MissionError::InvalidClimb { at }) => {
                warn!(%at, "climb rejected, replanning");
                self.intent = None;
                return Ok(());
            }
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };
        let intent = self.intent.take();
        self.facing = cmd.facing;

        if response.game_over {
            self.finished = true;
            info!(at = %self.position, action = ?cmd.action, gold = self.gold, "mission over");
            return Ok(());
        }

        let percept = response.percept;
        match cmd.action {
            Action::Move if percept.bump => {
                debug!(at = %self.position, facing = ?cmd.facing, "bumped into an edge");
            }
            Action::Move => {
                let to = self.position.step(cmd.facing);
                self.position = to;
                match intent {
                    // Backtracking already popped the room we came from.
                    Some(Intent::Backtrack(_)) => {}
                    // The walk is not retraced: backtracking would undo it.
                    Some(Intent::Approach(_)) => {
                        self.stack.clear();
                        self.stack.push(to);
                    }
                    _ => self.stack.push(to),
                }
                self.visited.insert(to);
                if percept.glitter {
                    self.gold += 1;
                    info!(at = %to, gold = self.gold, "picked up gold");
                }
            }
            Action::Shoot if !percept.scream => {
                let target = self.position.step(cmd.facing);
                debug!(%target, "arrow missed");
                self.missed.insert(target);
            }
            Action::Shoot | Action::Climb => {}
        }

        let changed = self.kb.tell(self.position, percept, Some(cmd));
        debug!(changed = ?changed, "belief updated");
        Ok(())
    }
}
