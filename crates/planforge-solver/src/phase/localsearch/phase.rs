//! Local search phase implementation.

use std::fmt::Debug;
use std::sync::Arc;

use tracing::{debug, info, trace};

use planforge_config::NoAcceptedMovePolicy;
use planforge_core::{PlanningSolution, Result, SolverError};
use planforge_scoring::ScoreDirector;

use super::evaluator::{score_candidate, ParallelEvaluator};
use super::{Acceptor, Forager};
use crate::event::{LifecycleContext, LifecycleEvent};
use crate::heuristic::r#move::{CandidateMove, Move, MoveArena};
use crate::heuristic::selector::MoveSelector;
use crate::heuristic::variable::PlanningValue;
use crate::phase::{Phase, PhaseOutcome};
use crate::scope::{PhaseScope, SolverScope, StepScope};
use crate::termination::Termination;

/// Consecutive unaccepted candidates after which a step over a never-ending
/// selector without a candidate limit gives up.
const UNACCEPTED_STREAK_LIMIT: usize = 10_000;

/// Candidates drawn per worker thread before a parallel batch is scored.
const CANDIDATES_PER_THREAD: usize = 4;

/// Local search phase that improves an existing solution.
///
/// Each step:
/// 1. Draws candidates from the move selector
/// 2. Scores each doable one by applying and undoing it
/// 3. Offers the score to the acceptor and accepted candidates to the forager
/// 4. Replays the forager's winner on the working solution
///
/// Accepted candidates live in a [`MoveArena`]; the forager only holds
/// their indices, and the winner is taken out of the arena when the step
/// commits.
pub struct LocalSearchPhase<S: PlanningSolution, V> {
    move_selector: MoveSelector<S, V>,
    acceptor: Box<dyn Acceptor<S>>,
    forager: Box<dyn Forager<S>>,
    termination: Option<Box<dyn Termination<S::Score>>>,
    no_accepted_move_policy: NoAcceptedMovePolicy,
    step_candidate_limit: Option<usize>,
    evaluator: Option<Arc<ParallelEvaluator>>,
    arena: MoveArena<CandidateMove<S, V>>,
}

impl<S: PlanningSolution, V: PlanningValue> LocalSearchPhase<S, V> {
    pub fn new<A, F>(move_selector: MoveSelector<S, V>, acceptor: A, forager: F) -> Self
    where
        A: Acceptor<S> + 'static,
        F: Forager<S> + 'static,
    {
        Self::from_parts(move_selector, Box::new(acceptor), Box::new(forager))
    }

    pub fn from_parts(
        move_selector: MoveSelector<S, V>,
        acceptor: Box<dyn Acceptor<S>>,
        forager: Box<dyn Forager<S>>,
    ) -> Self {
        Self {
            move_selector,
            acceptor,
            forager,
            termination: None,
            no_accepted_move_policy: NoAcceptedMovePolicy::default(),
            step_candidate_limit: None,
            evaluator: None,
            arena: MoveArena::new(),
        }
    }

    /// Phase-local termination, checked alongside the solver's.
    pub fn with_termination(mut self, termination: Box<dyn Termination<S::Score>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_no_accepted_move_policy(mut self, policy: NoAcceptedMovePolicy) -> Self {
        self.no_accepted_move_policy = policy;
        self
    }

    /// Caps the candidates drawn per step.
    pub fn with_step_candidate_limit(mut self, limit: usize) -> Self {
        self.step_candidate_limit = Some(limit);
        self
    }

    /// Scores candidates on a thread pool instead of inline.
    pub fn with_parallel_evaluator(mut self, evaluator: ParallelEvaluator) -> Self {
        self.evaluator = Some(Arc::new(evaluator));
        self
    }

    pub fn move_selector(&self) -> &MoveSelector<S, V> {
        &self.move_selector
    }

    /// Start events reach the selector first, end events reach it last.
    fn notify(&mut self, event: LifecycleEvent, context: &mut LifecycleContext<'_, S>) {
        if event.is_start() {
            self.move_selector.on_lifecycle(event, context);
            self.acceptor.on_lifecycle(event, context);
            self.forager.on_lifecycle(event, context);
        } else {
            self.forager.on_lifecycle(event, context);
            self.acceptor.on_lifecycle(event, context);
            self.move_selector.on_lifecycle(event, context);
        }
    }

    fn fire<D: ScoreDirector<S>>(
        &mut self,
        event: LifecycleEvent,
        phase_scope: &mut PhaseScope<'_, S, D>,
        step_score: Option<S::Score>,
    ) {
        let (mut context, events) = phase_scope.lifecycle(step_score);
        self.notify(event, &mut context);
        events.fire_lifecycle(event, &context);
    }

    fn draws(&self) -> StepDraws {
        let streak_limit = if self.move_selector.is_never_ending() && self.step_candidate_limit.is_none() {
            Some(UNACCEPTED_STREAK_LIMIT)
        } else {
            None
        };
        StepDraws {
            drawn: 0,
            limit: self.step_candidate_limit,
            unaccepted_streak: 0,
            streak_limit,
        }
    }

    fn draw<D: ScoreDirector<S>>(
        &mut self,
        phase_scope: &mut PhaseScope<'_, S, D>,
    ) -> Option<CandidateMove<S, V>> {
        let (solution, random) = phase_scope.solution_and_random();
        self.move_selector.next(solution, random)
    }

    /// Offers a scored candidate; returns true when the forager has enough.
    fn consider<D: ScoreDirector<S>>(
        &mut self,
        phase_scope: &mut PhaseScope<'_, S, D>,
        draws: &mut StepDraws,
        candidate: CandidateMove<S, V>,
        score: S::Score,
        last_step_score: S::Score,
    ) -> bool {
        let accepted = self.acceptor.is_accepted(&last_step_score, &score);
        phase_scope
            .solver_scope_mut()
            .stats_mut()
            .record_move(accepted);
        trace!(event = "move", candidate = ?candidate, score = %score, accepted);
        if accepted {
            draws.unaccepted_streak = 0;
            let index = self.arena.push(candidate);
            self.forager.add_accepted(index, score);
        } else {
            draws.unaccepted_streak += 1;
        }
        self.forager.is_quit_early()
    }

    fn skip_illegal<D: ScoreDirector<S>>(
        phase_scope: &mut PhaseScope<'_, S, D>,
        draws: &mut StepDraws,
        candidate: &CandidateMove<S, V>,
    ) {
        draws.unaccepted_streak += 1;
        phase_scope
            .solver_scope_mut()
            .stats_mut()
            .record_illegal_move();
        trace!(event = "move", candidate = ?candidate, doable = false);
    }

    fn forage<D: ScoreDirector<S>>(
        &mut self,
        phase_scope: &mut PhaseScope<'_, S, D>,
        last_step_score: S::Score,
    ) -> Result<Option<(usize, S::Score)>> {
        let mode = phase_scope.environment_mode();
        let mut draws = self.draws();
        while draws.may_draw() {
            let Some(candidate) = self.draw(phase_scope) else {
                break;
            };
            draws.drawn += 1;
            if !candidate.is_doable(phase_scope.score_director()) {
                Self::skip_illegal(phase_scope, &mut draws, &candidate);
                continue;
            }
            let score = score_candidate(phase_scope.score_director_mut(), &candidate, mode)?;
            if self.consider(phase_scope, &mut draws, candidate, score, last_step_score) {
                break;
            }
        }
        Ok(self.forager.pick(phase_scope.random()))
    }

    fn forage_parallel<D: ScoreDirector<S> + Clone>(
        &mut self,
        evaluator: &ParallelEvaluator,
        phase_scope: &mut PhaseScope<'_, S, D>,
        last_step_score: S::Score,
    ) -> Result<Option<(usize, S::Score)>> {
        let mode = phase_scope.environment_mode();
        // A forager that may quit mid-batch must see candidates one at a
        // time, or the batch draws moves the sequential driver never would.
        let batch_size = if self.forager.can_quit_early() {
            1
        } else {
            evaluator.thread_count() * CANDIDATES_PER_THREAD
        };
        let mut draws = self.draws();
        let mut exhausted = false;

        'step: while !exhausted && draws.may_draw() {
            let mut batch = Vec::with_capacity(batch_size);
            while batch.len() < batch_size && draws.may_draw() {
                let Some(candidate) = self.draw(phase_scope) else {
                    exhausted = true;
                    break;
                };
                draws.drawn += 1;
                if candidate.is_doable(phase_scope.score_director()) {
                    batch.push(candidate);
                } else {
                    Self::skip_illegal(phase_scope, &mut draws, &candidate);
                }
            }

            let scores = evaluator.score_all(phase_scope.score_director(), &batch, mode);
            for (candidate, score) in batch.into_iter().zip(scores) {
                let score = score?;
                if self.consider(phase_scope, &mut draws, candidate, score, last_step_score) {
                    break 'step;
                }
            }
        }
        Ok(self.forager.pick(phase_scope.random()))
    }
}

/// Per-step draw bookkeeping.
struct StepDraws {
    drawn: usize,
    limit: Option<usize>,
    unaccepted_streak: usize,
    streak_limit: Option<usize>,
}

impl StepDraws {
    fn may_draw(&self) -> bool {
        self.limit.map_or(true, |limit| self.drawn < limit)
            && self
                .streak_limit
                .map_or(true, |limit| self.unaccepted_streak < limit)
    }
}

impl<S: PlanningSolution, V: Debug> Debug for LocalSearchPhase<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSearchPhase")
            .field("move_selector", &self.move_selector)
            .field("acceptor", &self.acceptor)
            .field("forager", &self.forager)
            .field("termination", &self.termination)
            .field("no_accepted_move_policy", &self.no_accepted_move_policy)
            .field("step_candidate_limit", &self.step_candidate_limit)
            .field("evaluator", &self.evaluator)
            .finish()
    }
}

impl<S, V, D> Phase<S, D> for LocalSearchPhase<S, V>
where
    S: PlanningSolution,
    V: PlanningValue,
    D: ScoreDirector<S> + Clone,
{
    fn validate(&self) -> Result<()> {
        if self.move_selector.is_never_ending()
            && !self.forager.can_quit_early()
            && self.step_candidate_limit.is_none()
        {
            return Err(SolverError::configuration(
                "local search with a never-ending move selector needs a forager that quits early or a step_candidate_limit",
            ));
        }
        Ok(())
    }

    fn needs_solver_termination(&self) -> bool {
        self.no_accepted_move_policy == NoAcceptedMovePolicy::Continue && self.termination.is_none()
    }

    fn solving_started(&mut self, solver_scope: &mut SolverScope<S, D>) {
        let (mut context, _) = solver_scope.lifecycle(0, 0, None);
        self.notify(LifecycleEvent::SolvingStarted, &mut context);
    }

    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<PhaseOutcome> {
        Phase::<S, D>::validate(self)?;
        if Phase::<S, D>::needs_solver_termination(self) && !solver_scope.has_termination() {
            return Err(SolverError::configuration(
                "no_accepted_move_policy = continue needs a solver or phase termination",
            ));
        }

        let phase_index = solver_scope.begin_phase();
        let mut phase_scope = PhaseScope::new(solver_scope, phase_index);
        phase_scope.reset_working_solution();
        let starting_score = phase_scope.calculate_score();
        phase_scope.set_starting_score(starting_score);
        phase_scope.update_best_solution();
        self.fire(LifecycleEvent::PhaseStarted, &mut phase_scope, Some(starting_score));
        info!(
            event = "phase_start",
            phase = "LocalSearch",
            phase_index,
            score = %starting_score,
        );

        let evaluator = self.evaluator.clone();
        let mut last_step_score = starting_score;
        let outcome = loop {
            if phase_scope.is_terminated(self.termination.as_deref()) {
                break PhaseOutcome::Terminated;
            }
            self.fire(LifecycleEvent::StepStarted, &mut phase_scope, Some(last_step_score));
            self.arena.reset();

            let picked = match &evaluator {
                Some(evaluator) => self.forage_parallel(evaluator, &mut phase_scope, last_step_score)?,
                None => self.forage(&mut phase_scope, last_step_score)?,
            };
            let winner = picked.and_then(|(index, _)| self.arena.take(index));

            let Some(winner) = winner else {
                self.fire(LifecycleEvent::StepEnded, &mut phase_scope, Some(last_step_score));
                match self.no_accepted_move_policy {
                    NoAcceptedMovePolicy::Terminate => {
                        debug!(event = "no_accepted_move", phase_index, step = phase_scope.step_count());
                        break PhaseOutcome::NoAcceptedMove;
                    }
                    NoAcceptedMovePolicy::Continue => {
                        phase_scope.increment_step_count();
                        continue;
                    }
                }
            };

            let mode = phase_scope.environment_mode();
            let mut step_scope = StepScope::new(&mut phase_scope);
            let step_index = step_scope.step_index();
            let director = step_scope.score_director_mut();
            winner.do_move(director);
            let step_score = if mode.is_asserted() {
                director.assert_score_integrity(&format!("after step {step_index} ({winner:?})"))?
            } else {
                director.calculate_score()
            };
            step_scope.set_step_score(step_score);
            let improved = step_scope.complete();
            last_step_score = step_score;

            debug!(
                event = "step",
                phase_index,
                step = step_index,
                score = %step_score,
                improved,
                winner = ?winner,
            );
            self.fire(LifecycleEvent::StepEnded, &mut phase_scope, Some(step_score));
        };

        self.fire(LifecycleEvent::PhaseEnded, &mut phase_scope, Some(last_step_score));
        info!(
            event = "phase_end",
            phase = "LocalSearch",
            phase_index,
            steps = phase_scope.step_count(),
            best_score = ?phase_scope.best_score(),
            outcome = ?outcome,
        );
        Ok(outcome)
    }

    fn solving_ended(&mut self, solver_scope: &mut SolverScope<S, D>) {
        let best_score = solver_scope.best_score();
        let (mut context, _) = solver_scope.lifecycle(0, 0, best_score);
        self.notify(LifecycleEvent::SolvingEnded, &mut context);
    }

    fn phase_type_name(&self) -> &'static str {
        "LocalSearch"
    }
}
