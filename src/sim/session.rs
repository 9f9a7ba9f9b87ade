/// One mission: an `Agent` acting in a `World` until it climbs out, dies,
/// stalls, or runs out of steps.
///
/// Per step:
///   1. agent plans (may commit to the exit first)
///   2. World performs the command
///   3. agent folds the answer into its beliefs
///   4. the session records what happened as `MissionEvent`s
///
/// A rejected climb is recorded and the loop carries on; any other
/// `MissionError` aborts the run.

use std::fmt;

use tracing::{debug, info, warn};

use crate::domain::agent::{Agent, Plan};
use crate::domain::percept::{Action, Command};
use crate::error::MissionError;
use crate::sim::event::MissionEvent;
use crate::sim::World;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Won,
    Died,
    Stalled,
}

#[derive(Clone, Debug)]
pub struct Report {
    pub outcome: Outcome,
    pub steps: usize,
    pub gold: u32,
    pub score: i64,
    pub trace: Vec<Command>,
    pub events: Vec<MissionEvent>,
    /// `KnowledgeBase::render` at the end of the run.
    pub belief_map: String,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "outcome: {:?}", self.outcome)?;
        writeln!(f, "steps:   {}", self.steps)?;
        writeln!(f, "gold:    {}", self.gold)?;
        write!(f, "score:   {}", self.score)
    }
}

pub struct Session<W: World> {
    agent: Agent,
    world: W,
    max_steps: usize,
    steps: usize,
    trace: Vec<Command>,
    events: Vec<MissionEvent>,
    outcome: Option<Outcome>,
}

impl<W: World> Session<W> {
    pub fn new(world: W, seed: u64, max_steps: usize) -> Self {
        let mut agent = Agent::new(seed);
        let opening = world.percept();
        agent.start(opening);
        let mut events = Vec::new();
        if opening.glitter {
            events.push(MissionEvent::GoldFound { at: agent.position() });
        }
        info!(seed, max_steps, percept = %opening, "mission start");
        Session { agent, world, max_steps, steps: 0, trace: Vec::new(), events, outcome: None }
    }

    pub fn agent(&self) -> &Agent { &self.agent }
    pub fn world(&self) -> &W { &self.world }
    pub fn world_mut(&mut self) -> &mut W { &mut self.world }
    pub fn steps(&self) -> usize { self.steps }
    pub fn trace(&self) -> &[Command] { &self.trace }
    pub fn events(&self) -> &[MissionEvent] { &self.events }
    pub fn outcome(&self) -> Option<Outcome> { self.outcome }

    /// Run one planning step. `Some` once the mission has ended.
    pub fn step(&mut self) -> Result<Option<Outcome>, MissionError> {
        if let Some(outcome) = self.outcome { return Ok(Some(outcome)); }

        let here = self.agent.position();
        if self.steps >= self.max_steps {
            warn!(steps = self.steps, "step limit reached");
            return Ok(self.finish(Outcome::Stalled, MissionEvent::Stalled { at: here }));
        }

        let mode = self.agent.mode();
        let plan = self.agent.decide()?;
        if self.agent.mode() != mode {
            self.events.push(MissionEvent::Committed { at: here });
        }
        let command = match plan {
            Plan::Act(command) => command,
            Plan::Stall => return Ok(self.finish(Outcome::Stalled, MissionEvent::Stalled { at: here })),
        };

        self.steps += 1;
        self.trace.push(command);
        let result = self.world.act(command);
        self.agent.apply(command, result.clone())?;

        // Only a rejected climb gets past `apply` as an error.
        let Ok(response) = result else {
            self.events.push(MissionEvent::Rejected { command });
            return Ok(None);
        };

        let percept = response.percept;
        let ahead = here.step(command.facing);
        match command.action {
            Action::Move if response.game_over => {
                return Ok(self.finish(Outcome::Died, MissionEvent::Died { at: ahead }));
            }
            Action::Move if percept.bump => {
                self.events.push(MissionEvent::Bumped { at: here, command });
            }
            Action::Move => {
                self.events.push(MissionEvent::Moved { to: ahead });
                if percept.glitter {
                    self.events.push(MissionEvent::GoldFound { at: ahead });
                }
            }
            Action::Shoot if percept.scream => self.events.push(MissionEvent::ArrowHit { target: ahead }),
            Action::Shoot => self.events.push(MissionEvent::ArrowMissed { target: ahead }),
            Action::Climb if response.game_over => {
                return Ok(self.finish(Outcome::Won, MissionEvent::ClimbedOut));
            }
            Action::Climb => {}
        }
        Ok(None)
    }

    fn finish(&mut self, outcome: Outcome, event: MissionEvent) -> Option<Outcome> {
        self.events.push(event);
        self.outcome = Some(outcome);
        info!(
            ?outcome,
            steps = self.steps,
            gold = self.agent.gold(),
            score = self.world.score(),
            "mission over"
        );
        debug!("belief map:\n{}", self.agent.knowledge().render());
        Some(outcome)
    }

    pub fn run(mut self) -> Result<Report, MissionError> {
        loop {
            if let Some(outcome) = self.step()? {
                return Ok(self.report(outcome));
            }
        }
    }

    fn report(self, outcome: Outcome) -> Report {
        Report {
            outcome,
            steps: self.steps,
            gold: self.agent.gold(),
            score: self.world.score(),
            belief_map: self.agent.knowledge().render(),
            trace: self.trace,
            events: self.events,
        }
    }
}
