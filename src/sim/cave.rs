/// Reference World: a rectangular cave loaded from a text diagram.
///
/// ## Diagram format:
///   ```text
///   4
///   -.-.-.P
///   W.G.P.-
///   -.-.-.-
///   A.-.P.-
///   ```
///
/// One row per line, top row first, rooms separated by `.`.
/// An optional first line holds only the row count. Lines starting with
/// `#` are comments.
///
/// ## Room legend:
///   'W' = Wumpus        'P' = Pit
///   'G' = Gold          'A' = Agent start (default: exit room)
///   'B' / 'S' = breeze / stench markers, ignored (derived from hazards)
///   '-' or blank = empty room
///
/// The exit is the bottom-left room. Cave coordinates run from that
/// corner; the agent's start-relative coordinates are translated at the
/// boundary so the agent never learns where it started.

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::grid::MAX_CAVE_SIDE;
use crate::domain::percept::{Action, Command, Coord, Percept};
use crate::error::MissionError;
use crate::sim::{Response, World};

// ── Scoring ──

pub const MOVE_POINTS: i64 = -10;
pub const ARROW_POINTS: i64 = -100;
pub const GOLD_POINTS: i64 = 100;
pub const CLIMB_POINTS: i64 = 10;
pub const DEATH_POINTS: i64 = -10_000;

/// Built-in caves, addressable by name from the CLI.
pub const EMBEDDED_CAVES: &[(&str, &str)] = &[
    ("classic", "4\n-.-.-.P\nW.G.P.-\n-.-.-.-\nA.-.P.-\n"),
    ("pocket", "-.G.-\nA.-.P\n"),
    ("midstart", "-.P.-.-\n-.A.G.W\n-.-.-.-\n"),
    ("corridor", "A.-.-.G.P\n"),
];

pub fn embedded(name: &str) -> Option<&'static str> {
    EMBEDDED_CAVES.iter().find(|(n, _)| *n == name).map(|(_, text)| *text)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaveError {
    #[error("cave diagram has no rows")]
    Empty,
    #[error("row {row} has {found} rooms, expected {expected}")]
    Ragged { row: usize, found: usize, expected: usize },
    #[error("unknown glyph {glyph:?} in row {row}")]
    Glyph { glyph: char, row: usize },
    #[error("declared {declared} rows but found {found}")]
    RowCount { declared: usize, found: usize },
    #[error("cave is {width}x{height}; at most {} rooms per side are supported", MAX_CAVE_SIDE)]
    TooLarge { width: usize, height: usize },
    #[error("{len} rooms do not fill a {width}x{height} cave")]
    Shape { len: usize, width: usize, height: usize },
    #[error("more than one start room")]
    MultipleStarts,
    #[error("room {at} holds more than one thing")]
    Crowded { at: Coord },
    #[error("start room {at} is outside the cave")]
    StartOutside { at: Coord },
    #[error("start room {at} holds a hazard")]
    HazardousStart { at: Coord },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Room {
    pub wumpus: bool,
    pub pit: bool,
    pub gold: bool,
}

impl Room {
    fn is_deadly(&self) -> bool {
        self.wumpus || self.pit
    }
}

#[derive(Clone, Debug)]
pub struct Cave {
    width: i32,
    height: i32,
    /// Row-major, bottom row first.
    rooms: Vec<Room>,
    start: Coord,
    agent: Coord,
    score: i64,
    over: bool,
    opening: Percept,
}

impl Cave {
    /// Build a cave from rooms listed bottom row first. `start` is in cave
    /// coordinates (origin at the exit).
    pub fn new(width: usize, height: usize, rooms: Vec<Room>, start: Coord) -> Result<Cave, CaveError> {
        if width == 0 || height == 0 { return Err(CaveError::Empty); }
        let side = MAX_CAVE_SIDE as usize;
        if width > side || height > side {
            return Err(CaveError::TooLarge { width, height });
        }
        if rooms.len() != width * height {
            return Err(CaveError::Shape { len: rooms.len(), width, height });
        }

        let mut cave = Cave {
            width: width as i32,
            height: height as i32,
            rooms,
            start,
            agent: start,
            score: 0,
            over: false,
            opening: Percept::default(),
        };

        for y in 0..cave.height {
            for x in 0..cave.width {
                let at = Coord::new(x, y);
                let r = cave.rooms[cave.index(at)];
                let things = [r.wumpus, r.pit, r.gold].iter().filter(|&&b| b).count();
                if things > 1 { return Err(CaveError::Crowded { at }); }
            }
        }
        let Some(start_room) = cave.room(start).copied() else {
            return Err(CaveError::StartOutside { at: start });
        };
        if start_room.is_deadly() { return Err(CaveError::HazardousStart { at: start }); }

        cave.opening = cave.senses(start);
        if start_room.gold {
            cave.take_gold(start);
            cave.opening.glitter = true;
        }
        Ok(cave)
    }

    pub fn parse(text: &str) -> Result<Cave, CaveError> {
        let mut lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();

        let mut declared = None;
        if let Some(first) = lines.first() {
            if first.chars().all(|c| c.is_ascii_digit()) {
                declared = Some(first.parse::<usize>().unwrap_or(usize::MAX));
                lines.remove(0);
            }
        }
        if lines.is_empty() { return Err(CaveError::Empty); }
        if let Some(declared) = declared {
            if declared != lines.len() {
                return Err(CaveError::RowCount { declared, found: lines.len() });
            }
        }

        let height = lines.len();
        let width = lines[0].split('.').count();
        let mut grid: Vec<Room> = vec![Room::default(); width * height];
        let mut start = None;

        for (row, line) in lines.iter().enumerate() {
            let cells: Vec<&str> = line.split('.').collect();
            if cells.len() != width {
                return Err(CaveError::Ragged { row, found: cells.len(), expected: width });
            }
            // Diagram rows are top first; cave rows are bottom first.
            let y = height - 1 - row;
            for (x, cell) in cells.iter().enumerate() {
                let room = &mut grid[y * width + x];
                for ch in cell.trim().chars() {
                    match ch.to_ascii_uppercase() {
                        'W' => room.wumpus = true,
                        'P' => room.pit = true,
                        'G' => room.gold = true,
                        'A' => {
                            if start.is_some() { return Err(CaveError::MultipleStarts); }
                            start = Some(Coord::new(x as i32, y as i32));
                        }
                        'B' | 'S' | '-' | ' ' => {}
                        glyph => return Err(CaveError::Glyph { glyph, row }),
                    }
                }
            }
        }

        Cave::new(width, height, grid, start.unwrap_or(Coord::ORIGIN))
    }

    // ── Ground truth, in agent (start-relative) coordinates ──

    fn absolute(&self, rel: Coord) -> Coord {
        Coord::new(rel.x + self.start.x, rel.y + self.start.y)
    }

    fn relative(&self, abs: Coord) -> Coord {
        Coord::new(abs.x - self.start.x, abs.y - self.start.y)
    }

    pub fn contains(&self, rel: Coord) -> bool {
        self.room(self.absolute(rel)).is_some()
    }

    pub fn wumpus_at(&self, rel: Coord) -> bool {
        self.room(self.absolute(rel)).is_some_and(|r| r.wumpus)
    }

    pub fn pit_at(&self, rel: Coord) -> bool {
        self.room(self.absolute(rel)).is_some_and(|r| r.pit)
    }

    pub fn hazard_at(&self, rel: Coord) -> bool {
        self.room(self.absolute(rel)).is_some_and(Room::is_deadly)
    }

    /// The exit room as the agent would name it.
    pub fn exit(&self) -> Coord {
        self.relative(Coord::ORIGIN)
    }

    pub fn agent(&self) -> Coord {
        self.relative(self.agent)
    }

    pub fn width(&self) -> i32 { self.width }
    pub fn height(&self) -> i32 { self.height }
    pub fn is_over(&self) -> bool { self.over }

    pub fn gold_left(&self) -> usize {
        self.rooms.iter().filter(|r| r.gold).count()
    }

    // ── Internals (cave coordinates) ──

    fn index(&self, abs: Coord) -> usize {
        (abs.y * self.width + abs.x) as usize
    }

    fn room(&self, abs: Coord) -> Option<&Room> {
        if abs.x < 0 || abs.y < 0 || abs.x >= self.width || abs.y >= self.height {
            return None;
        }
        self.rooms.get(self.index(abs))
    }

    fn take_gold(&mut self, abs: Coord) {
        let i = self.index(abs);
        self.rooms[i].gold = false;
        self.score += GOLD_POINTS;
    }

    fn senses(&self, abs: Coord) -> Percept {
        let mut p = Percept::default();
        for n in abs.neighbors() {
            if let Some(r) = self.room(n) {
                p.stench |= r.wumpus;
                p.breeze |= r.pit;
            }
        }
        p
    }

    fn answer(percept: Percept, game_over: bool) -> Result<Response, MissionError> {
        Ok(Response { percept, game_over })
    }
}

impl World for Cave {
    fn percept(&self) -> Percept {
        self.opening
    }

    fn act(&mut self, command: Command) -> Result<Response, MissionError> {
        if self.over { return Err(MissionError::StaleAction); }

        match command.action {
            Action::Move => {
                let to = self.agent.step(command.facing);
                let Some(room) = self.room(to).copied() else {
                    let mut p = self.senses(self.agent);
                    p.bump = true;
                    return Cave::answer(p, false);
                };
                self.agent = to;
                self.score += MOVE_POINTS;
                let mut p = self.senses(to);
                if room.is_deadly() {
                    self.over = true;
                    self.score += DEATH_POINTS;
                    info!(at = %self.relative(to), wumpus = room.wumpus, "agent died");
                    return Cave::answer(p, true);
                }
                if room.gold {
                    self.take_gold(to);
                    p.glitter = true;
                }
                Cave::answer(p, false)
            }
            Action::Shoot => {
                self.score += ARROW_POINTS;
                let target = self.agent.step(command.facing);
                let hit = self.room(target).is_some_and(|r| r.wumpus);
                if hit {
                    let i = self.index(target);
                    self.rooms[i].wumpus = false;
                    debug!(target = %self.relative(target), "wumpus killed");
                }
                let mut p = self.senses(self.agent);
                p.scream = hit;
                Cave::answer(p, false)
            }
            Action::Climb => {
                if self.agent != Coord::ORIGIN {
                    return Err(MissionError::InvalidClimb { at: self.relative(self.agent) });
                }
                self.over = true;
                self.score += CLIMB_POINTS;
                Cave::answer(self.senses(self.agent), true)
            }
        }
    }

    fn score(&self) -> i64 {
        self.score
    }
}
