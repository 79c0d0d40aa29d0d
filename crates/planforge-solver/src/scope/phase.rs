//! Phase-level scope.

use std::time::{Duration, Instant};

use rand::RngCore;

use planforge_config::EnvironmentMode;
use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::SolverScope;
use crate::event::{LifecycleContext, SolverEventSupport};
use crate::termination::{Termination, TerminationContext};

/// Scope for a single phase.
pub struct PhaseScope<'a, S: PlanningSolution, D: ScoreDirector<S>> {
    solver_scope: &'a mut SolverScope<S, D>,
    phase_index: usize,
    starting_score: Option<S::Score>,
    step_count: u64,
    last_improvement_step: u64,
    start_time: Instant,
}

impl<'a, S: PlanningSolution, D: ScoreDirector<S>> PhaseScope<'a, S, D> {
    pub fn new(solver_scope: &'a mut SolverScope<S, D>, phase_index: usize) -> Self {
        Self {
            solver_scope,
            phase_index,
            starting_score: None,
            step_count: 0,
            last_improvement_step: 0,
            start_time: Instant::now(),
        }
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn starting_score(&self) -> Option<S::Score> {
        self.starting_score
    }

    pub fn set_starting_score(&mut self, score: S::Score) {
        self.starting_score = Some(score);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Counts a completed step at phase and solver level.
    pub fn increment_step_count(&mut self) -> u64 {
        self.step_count += 1;
        self.solver_scope.increment_step_count();
        self.step_count
    }

    pub fn solver_scope(&self) -> &SolverScope<S, D> {
        &*self.solver_scope
    }

    pub fn solver_scope_mut(&mut self) -> &mut SolverScope<S, D> {
        &mut *self.solver_scope
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.solver_scope.environment_mode()
    }

    pub fn score_director(&self) -> &D {
        self.solver_scope.score_director()
    }

    pub fn score_director_mut(&mut self) -> &mut D {
        self.solver_scope.score_director_mut()
    }

    pub fn calculate_score(&mut self) -> S::Score {
        self.solver_scope.calculate_score()
    }

    pub fn reset_working_solution(&mut self) {
        self.solver_scope.reset_working_solution();
    }

    pub fn best_score(&self) -> Option<S::Score> {
        self.solver_scope.best_score()
    }

    pub fn update_best_solution(&mut self) -> bool {
        let improved = self.solver_scope.update_best_solution();
        if improved {
            self.last_improvement_step = self.step_count;
        }
        improved
    }

    pub fn solution_and_random(&mut self) -> (&S, &mut dyn RngCore) {
        self.solver_scope.solution_and_random()
    }

    pub fn random(&mut self) -> &mut dyn RngCore {
        self.solver_scope.random()
    }

    pub fn lifecycle(
        &mut self,
        step_score: Option<S::Score>,
    ) -> (LifecycleContext<'_, S>, &SolverEventSupport<S>) {
        let step_index = self.step_count;
        self.solver_scope
            .lifecycle(self.phase_index, step_index, step_score)
    }

    pub fn termination_context(&self) -> TerminationContext<S::Score> {
        TerminationContext {
            elapsed: self.elapsed(),
            step_count: self.step_count,
            unimproved_step_count: self.step_count - self.last_improvement_step,
            best_score: self.solver_scope.best_score(),
        }
    }

    /// Solver-level termination, or the phase's own if it has one.
    pub fn is_terminated(&self, phase_termination: Option<&dyn Termination<S::Score>>) -> bool {
        self.solver_scope.is_terminated()
            || phase_termination.is_some_and(|t| t.is_terminated(&self.termination_context()))
    }
}
