/// Simulation side of the agent: the World seam, a reference cave, and
/// the session loop that drives one mission.

pub mod cave;
pub mod event;
pub mod session;

use crate::domain::percept::{Command, Percept};
use crate::error::MissionError;

pub use crate::domain::percept::Response;

/// The external environment the agent acts in. The agent never sees the
/// World's layout; it only sends commands and receives percepts.
pub trait World {
    /// What the agent senses in the start room, before its first action.
    fn percept(&self) -> Percept;

    /// Perform one command. `InvalidClimb` leaves the World unchanged;
    /// any command after the game ended is `StaleAction`.
    fn act(&mut self, command: Command) -> Result<Response, MissionError>;

    fn score(&self) -> i64;
}
