/// Events recorded during a mission.
/// The session report and the CLI's trace output consume these.

use std::fmt;

use crate::domain::percept::{Command, Coord};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MissionEvent {
    Moved { to: Coord },
    Bumped { at: Coord, command: Command },
    GoldFound { at: Coord },
    ArrowHit { target: Coord },
    ArrowMissed { target: Coord },
    Committed { at: Coord },
    Rejected { command: Command },
    Died { at: Coord },
    ClimbedOut,
    Stalled { at: Coord },
}

impl fmt::Display for MissionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionEvent::Moved { to } => write!(f, "moved to {to}"),
            MissionEvent::Bumped { at, command } => write!(f, "bumped at {at} ({command})"),
            MissionEvent::GoldFound { at } => write!(f, "gold at {at}"),
            MissionEvent::ArrowHit { target } => write!(f, "wumpus killed at {target}"),
            MissionEvent::ArrowMissed { target } => write!(f, "arrow missed {target}"),
            MissionEvent::Committed { at } => write!(f, "heading for the exit from {at}"),
            MissionEvent::Rejected { command } => write!(f, "rejected: {command}"),
            MissionEvent::Died { at } => write!(f, "died at {at}"),
            MissionEvent::ClimbedOut => write!(f, "climbed out"),
            MissionEvent::Stalled { at } => write!(f, "stalled at {at}"),
        }
    }
}
