//! Solver-level scope.

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use planforge_config::EnvironmentMode;
use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use crate::event::{LifecycleContext, SolverEventSupport};
use crate::stats::SolverStats;
use crate::termination::{ExternalTermination, Termination, TerminationContext};

/// A new best solution, as published to a best-solution channel.
#[derive(Debug, Clone)]
pub struct BestSolution<S: PlanningSolution> {
    pub solution: S,
    pub score: S::Score,
}

/// Top-level scope for the entire solving process.
///
/// Owns the score director, the single random source, the best solution
/// found so far and the solver-level termination.
pub struct SolverScope<S: PlanningSolution, D: ScoreDirector<S>> {
    score_director: D,
    best_solution: Option<S>,
    best_score: Option<S::Score>,
    best_uninitialized: usize,
    random: Box<dyn RngCore + Send>,
    environment_mode: EnvironmentMode,
    start_time: Option<Instant>,
    total_step_count: u64,
    last_improvement_step: u64,
    phase_count: usize,
    stats: SolverStats,
    termination: Option<Box<dyn Termination<S::Score>>>,
    external_termination: Option<ExternalTermination>,
    events: SolverEventSupport<S>,
    best_solution_sender: Option<UnboundedSender<BestSolution<S>>>,
}

impl<S: PlanningSolution, D: ScoreDirector<S>> SolverScope<S, D> {
    /// Scope with an OS-seeded random source.
    pub fn new(score_director: D) -> Self {
        Self::with_random(score_director, Box::new(ChaCha8Rng::from_os_rng()))
    }

    pub fn with_seed(score_director: D, seed: u64) -> Self {
        Self::with_random(score_director, Box::new(ChaCha8Rng::seed_from_u64(seed)))
    }

    pub fn with_random(score_director: D, random: Box<dyn RngCore + Send>) -> Self {
        Self {
            score_director,
            best_solution: None,
            best_score: None,
            best_uninitialized: 0,
            random,
            environment_mode: EnvironmentMode::default(),
            start_time: None,
            total_step_count: 0,
            last_improvement_step: 0,
            phase_count: 0,
            stats: SolverStats::default(),
            termination: None,
            external_termination: None,
            events: SolverEventSupport::new(),
            best_solution_sender: None,
        }
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_termination(mut self, termination: Box<dyn Termination<S::Score>>) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Early-stop flag raised from outside; not a configured termination.
    pub fn with_external_termination(mut self, termination: ExternalTermination) -> Self {
        self.external_termination = Some(termination);
        self
    }

    pub fn with_events(mut self, events: SolverEventSupport<S>) -> Self {
        self.events = events;
        self
    }

    pub fn with_best_solution_sender(mut self, sender: UnboundedSender<BestSolution<S>>) -> Self {
        self.best_solution_sender = Some(sender);
        self
    }

    pub fn start_solving(&mut self) {
        self.start_time = Some(Instant::now());
        self.total_step_count = 0;
        self.last_improvement_step = 0;
        self.phase_count = 0;
        self.stats.start();
    }

    /// Index for the phase about to run.
    pub fn begin_phase(&mut self) -> usize {
        let index = self.phase_count;
        self.phase_count += 1;
        index
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    pub fn score_director(&self) -> &D {
        &self.score_director
    }

    pub fn score_director_mut(&mut self) -> &mut D {
        &mut self.score_director
    }

    pub fn working_solution(&self) -> &S {
        self.score_director.working_solution()
    }

    pub fn calculate_score(&mut self) -> S::Score {
        self.score_director.calculate_score()
    }

    /// Rebuilds the director's scoring state from a clone of the working
    /// solution. Phases call this once at start.
    pub fn reset_working_solution(&mut self) {
        let solution = self.score_director.clone_working_solution();
        self.score_director.reset_working_solution(solution);
    }

    pub fn best_solution(&self) -> Option<&S> {
        self.best_solution.as_ref()
    }

    pub fn best_score(&self) -> Option<S::Score> {
        self.best_score
    }

    /// Replaces the best solution if the working solution beats it.
    ///
    /// A solution with fewer unassigned variables always wins; between
    /// equally initialized ones the higher score wins. Returns true on improvement;
    /// listeners and the best-solution channel are notified only then.
    pub fn update_best_solution(&mut self) -> bool {
        let current_score = self.score_director.calculate_score();
        let uninitialized = self.score_director.working_solution().uninitialized_count();
        let is_better = match self.best_score {
            None => true,
            Some(best) => {
                (Reverse(uninitialized), current_score) > (Reverse(self.best_uninitialized), best)
            }
        };
        if !is_better {
            return false;
        }

        let solution = self.score_director.clone_working_solution();
        debug!(
            event = "new_best",
            step = self.total_step_count,
            score = %current_score,
        );
        self.events.fire_best_solution_changed(&solution, &current_score);
        if let Some(sender) = &self.best_solution_sender {
            // A dropped receiver only means nobody is listening any more.
            let _ = sender.send(BestSolution {
                solution: solution.clone(),
                score: current_score,
            });
        }
        self.best_solution = Some(solution);
        self.best_score = Some(current_score);
        self.best_uninitialized = uninitialized;
        self.last_improvement_step = self.total_step_count;
        self.stats.record_improvement();
        true
    }

    /// Both halves of what a selector needs to draw a candidate.
    pub fn solution_and_random(&mut self) -> (&S, &mut dyn RngCore) {
        (self.score_director.working_solution(), &mut *self.random)
    }

    pub fn random(&mut self) -> &mut dyn RngCore {
        &mut *self.random
    }

    /// Builds the context handed to lifecycle participants, plus the
    /// external listeners that should hear the same event.
    pub fn lifecycle(
        &mut self,
        phase_index: usize,
        step_index: u64,
        step_score: Option<S::Score>,
    ) -> (LifecycleContext<'_, S>, &SolverEventSupport<S>) {
        let context = LifecycleContext {
            solution: self.score_director.working_solution(),
            random: &mut *self.random,
            best_score: self.best_score,
            step_score,
            phase_index,
            step_index,
        };
        (context, &self.events)
    }

    pub fn events(&self) -> &SolverEventSupport<S> {
        &self.events
    }

    pub fn increment_step_count(&mut self) -> u64 {
        self.total_step_count += 1;
        self.stats.record_step();
        self.total_step_count
    }

    pub fn total_step_count(&self) -> u64 {
        self.total_step_count
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut SolverStats {
        &mut self.stats
    }

    /// Whether a configured termination is installed. The external
    /// early-stop flag does not count, since nothing guarantees it is raised.
    pub fn has_termination(&self) -> bool {
        self.termination.is_some()
    }

    pub fn termination_context(&self) -> TerminationContext<S::Score> {
        TerminationContext {
            elapsed: self.elapsed(),
            step_count: self.total_step_count,
            unimproved_step_count: self.total_step_count - self.last_improvement_step,
            best_score: self.best_score,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.external_termination
            .as_ref()
            .is_some_and(ExternalTermination::is_requested)
            || self
                .termination
                .as_ref()
                .is_some_and(|t| t.is_terminated(&self.termination_context()))
    }

    /// Consumes the scope, yielding the best solution (or the working one if
    /// no best was ever recorded) and the final statistics.
    pub fn into_result(mut self) -> (S, SolverStats) {
        self.stats.score_calculations = self.score_director.calculation_count();
        let solution = match self.best_solution {
            Some(best) => best,
            None => self.score_director.clone_working_solution(),
        };
        (solution, self.stats)
    }
}
