/// Value types exchanged across the World boundary.
///
/// Coordinates are Cartesian and relative to the agent's start room:
/// `Up` is `y + 1`, `Right` is `x + 1`. The World never sees these;
/// it only receives a `Command` and answers with a `Percept`.

use std::fmt;

use crate::error::MissionError;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// The room one step away in `dir`.
    pub fn step(self, dir: Direction) -> Coord {
        let (dx, dy) = dir.offset();
        Coord { x: self.x + dx, y: self.y + dy }
    }

    /// The four orthogonal neighbours, in `Direction::ALL` order.
    pub fn neighbors(self) -> [Coord; 4] {
        Direction::ALL.map(|d| self.step(d))
    }

    pub fn manhattan(self, other: Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Left, Direction::Up, Direction::Down];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Which way to face from `from` to reach the adjacent room `to`.
    pub fn between(from: Coord, to: Coord) -> Result<Direction, MissionError> {
        Direction::ALL
            .into_iter()
            .find(|&d| from.step(d) == to)
            .ok_or(MissionError::NoDirection { from, to })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move,
    Shoot,
    Climb,
}

/// One action plus the facing it is performed in.
/// Turning is free: the agent faces `facing` before acting.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Command {
    pub action: Action,
    pub facing: Direction,
}

impl Command {
    pub fn new(action: Action, facing: Direction) -> Self {
        Command { action, facing }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.action, self.facing)
    }
}

/// Sensory vector reported after every action.
/// A `false` field means the feature was not sensed; it is never "unknown".
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Percept {
    pub stench: bool,
    pub breeze: bool,
    pub glitter: bool,
    pub bump: bool,
    pub scream: bool,
}

impl fmt::Display for Percept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.stench, "stench"),
            (self.breeze, "breeze"),
            (self.glitter, "glitter"),
            (self.bump, "bump"),
            (self.scream, "scream"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        if names.is_empty() {
            write!(f, "[none]")
        } else {
            write!(f, "[{}]", names.join(", "))
        }
    }
}

/// The World's answer to one command.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Response {
    pub percept: Percept,
    /// The mission ended with this action (death or climb-out).
    pub game_over: bool,
}
