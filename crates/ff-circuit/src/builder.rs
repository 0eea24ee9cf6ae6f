//! Applying a plan to a session.

use std::time::Instant;

use ff_network::NetworkModel;
use ff_profiles::DayAssignment;
use tracing::info;

use crate::command::Stage;
use crate::error::CircuitResult;
use crate::plan::{CircuitPlan, plan};
use crate::session::SolverSession;
use crate::settings::CircuitSettings;

/// A circuit composed inside a session it owns. It cannot be built again.
pub struct BuiltCircuit<S: SolverSession> {
    session: S,
    commands_sent: usize,
}

impl<S: SolverSession> BuiltCircuit<S> {
    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn commands_sent(&self) -> usize {
        self.commands_sent
    }

    pub fn into_session(self) -> S {
        self.session
    }

    pub fn close(self) -> CircuitResult<()> {
        self.session.close()
    }
}

/// Plan and apply in one step.
pub fn build<S: SolverSession>(
    model: &NetworkModel,
    assignment: &DayAssignment,
    settings: &CircuitSettings,
    session: S,
) -> CircuitResult<BuiltCircuit<S>> {
    let plan = plan(model, assignment, settings)?;
    apply(&plan, session)
}

pub fn apply<S: SolverSession>(plan: &CircuitPlan, mut session: S) -> CircuitResult<BuiltCircuit<S>> {
    let start = Instant::now();
    for stage in Stage::ALL {
        let mut count = 0usize;
        for command in plan.stage(stage) {
            session.command(&command.to_string())?;
            count += 1;
        }
        if count > 0 {
            info!(stage = %stage, commands = count, "applied build stage");
        }
    }
    info!(
        commands = plan.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "circuit built"
    );
    Ok(BuiltCircuit {
        session,
        commands_sent: plan.len(),
    })
}
