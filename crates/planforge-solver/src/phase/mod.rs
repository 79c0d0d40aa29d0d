//! Solver phases for different solving strategies
//!
//! Phases are the main building blocks of solving:
//! - ConstructionHeuristicPhase: Assigns uninitialized variables one at a time
//! - LocalSearchPhase: Improves an existing solution step by step

pub mod construction;
pub mod localsearch;

use std::fmt::Debug;

use planforge_core::{PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

use crate::scope::SolverScope;

/// How a phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// The phase ran out of work.
    Completed,
    /// A solver or phase termination fired at a step boundary.
    Terminated,
    /// A step accepted no candidate and the phase stopped there.
    NoAcceptedMove,
}

/// A phase of the solving process.
///
/// Phases are executed in sequence by the solver. Each phase has its own
/// strategy for exploring or constructing solutions.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `D` - The score director type
pub trait Phase<S: PlanningSolution, D: ScoreDirector<S>>: Send + Debug {
    /// Checks the phase can run at all, before solving starts.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// True when only a solver-level termination can stop this phase.
    ///
    /// The solver refuses to run such a phase without one.
    fn needs_solver_termination(&self) -> bool {
        false
    }

    /// Solving scope opened; called once for every phase before the first runs.
    fn solving_started(&mut self, _solver_scope: &mut SolverScope<S, D>) {}

    /// Executes this phase.
    ///
    /// The phase modifies the working solution in the solver scope and
    /// updates the best solution when improvements are found. Integrity
    /// failures abort the phase with an error.
    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<PhaseOutcome>;

    /// Solving scope closing; called in reverse phase order.
    fn solving_ended(&mut self, _solver_scope: &mut SolverScope<S, D>) {}

    /// Returns the name of this phase type.
    fn phase_type_name(&self) -> &'static str;
}
