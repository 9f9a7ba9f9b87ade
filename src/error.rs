/// Mission-level error kinds.
///
/// Belief contradictions are not represented here: they are programmer
/// errors and panic inside the grid.

use thiserror::Error;

use crate::domain::percept::Coord;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MissionError {
    /// CLIMB away from the exit room. Recoverable: replan.
    #[error("cannot climb out at {at}: not the exit room")]
    InvalidClimb { at: Coord },

    /// Destination is not orthogonally adjacent to the current room.
    #[error("no direction leads from {from} to {to}")]
    NoDirection { from: Coord, to: Coord },

    /// Backtrack with nothing left on the exploration stack.
    #[error("exploration stack exhausted")]
    ExhaustedOptions,

    /// An action was issued after the mission ended.
    #[error("mission already over")]
    StaleAction,
}
