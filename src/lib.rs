/// Cavewalk: a Wumpus World agent that reasons with four-state beliefs.
///
/// `domain` holds everything the agent knows and decides; `sim` holds the
/// World seam, a reference cave and the session loop.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod sim;

pub use domain::agent::{Agent, Mission, Plan};
pub use domain::knowledge::{Certainty, KnowledgeBase};
pub use domain::percept::{Action, Command, Coord, Direction, Percept};
pub use error::MissionError;
pub use sim::session::{Outcome, Report, Session};
pub use sim::World;
