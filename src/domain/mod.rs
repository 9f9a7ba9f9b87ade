/// Agent-side model: percepts, beliefs, inference and planning.
/// Nothing here knows the World's layout.

pub mod agent;
pub mod belief;
pub mod grid;
pub mod knowledge;
pub mod percept;
pub mod route;
