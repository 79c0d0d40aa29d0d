//! Construction heuristic phase implementation.

use std::fmt::Debug;

use tracing::{debug, info, trace};

use planforge_config::ConstructionPickEarlyType;
use planforge_core::{PlanningSolution, Result, Score, SolverError};
use planforge_scoring::ScoreDirector;

use super::{EntityPlacer, Placement};
use crate::event::{LifecycleContext, LifecycleEvent};
use crate::heuristic::r#move::{ChangeMove, Move};
use crate::heuristic::variable::{PlanningValue, VariableDefinition};
use crate::phase::localsearch::evaluator::score_candidate;
use crate::phase::{Phase, PhaseOutcome};
use crate::scope::{PhaseScope, SolverScope, StepScope};
use crate::termination::Termination;

/// Construction heuristic phase that builds an initial solution.
///
/// Each step fills one uninitialized (entity, variable) slot. Placements
/// are fixed when the phase starts: every placer in declaration order,
/// entities in original order or, for first fit decreasing, most difficult
/// first. Each value is tried with a [`ChangeMove`]
/// that is undone again, and the best one is kept, unless the pick-early
/// type stops evaluation sooner. A slot with no doable value stays
/// unassigned.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `V` - The planning value type
pub struct ConstructionHeuristicPhase<S: PlanningSolution, V> {
    placers: Vec<EntityPlacer<S, V>>,
    pick_early: ConstructionPickEarlyType,
    termination: Option<Box<dyn Termination<S::Score>>>,
}

impl<S: PlanningSolution, V: PlanningValue> ConstructionHeuristicPhase<S, V> {
    pub fn new(definitions: &[VariableDefinition<S, V>]) -> Self {
        Self {
            placers: definitions.iter().map(EntityPlacer::new).collect(),
            pick_early: ConstructionPickEarlyType::default(),
            termination: None,
        }
    }

    /// First fit decreasing: every variable needs an entity difficulty.
    pub fn decreasing_difficulty(definitions: &[VariableDefinition<S, V>]) -> Result<Self> {
        let placers = definitions
            .iter()
            .map(EntityPlacer::sorted_by_difficulty)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            placers,
            pick_early: ConstructionPickEarlyType::default(),
            termination: None,
        })
    }

    pub fn with_pick_early(mut self, pick_early: ConstructionPickEarlyType) -> Self {
        self.pick_early = pick_early;
        self
    }

    pub fn with_termination(mut self, termination: Box<dyn Termination<S::Score>>) -> Self {
        self.termination = Some(termination);
        self
    }

    fn notify(&mut self, event: LifecycleEvent, context: &mut LifecycleContext<'_, S>) {
        if event.is_start() {
            for placer in &mut self.placers {
                placer.on_lifecycle(event, context);
            }
        } else {
            for placer in self.placers.iter_mut().rev() {
                placer.on_lifecycle(event, context);
            }
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

    /// Tries every value for one placement and returns the move to commit.
    fn forage<D: ScoreDirector<S>>(
        &mut self,
        placement: Placement,
        phase_scope: &mut PhaseScope<'_, S, D>,
        last_step_score: S::Score,
    ) -> Result<Option<ChangeMove<S, V>>> {
        let mode = phase_scope.environment_mode();
        let Placement {
            placer_index,
            entity_index,
        } = placement;
        let Some(placer) = self.placers.get_mut(placer_index) else {
            return Err(SolverError::InvalidState(format!(
                "placement refers to missing placer {placer_index}"
            )));
        };
        let variable = *placer.variable();
        {
            let (solution, random) = phase_scope.solution_and_random();
            placer.start_entity(solution, entity_index, random);
        }

        let mut best: Option<(ChangeMove<S, V>, S::Score)> = None;
        loop {
            let value = {
                let (solution, random) = phase_scope.solution_and_random();
                placer.next_value(solution, entity_index, random)
            };
            let Some(value) = value else {
                break;
            };
            let candidate = ChangeMove::new(variable, entity_index, value);
            if !candidate.is_doable(phase_scope.score_director()) {
                phase_scope
                    .solver_scope_mut()
                    .stats_mut()
                    .record_illegal_move();
                continue;
            }

            let score = score_candidate(phase_scope.score_director_mut(), &candidate, mode)?;
            let improves = best.as_ref().map_or(true, |(_, b)| score > *b);
            phase_scope
                .solver_scope_mut()
                .stats_mut()
                .record_move(improves);
            trace!(event = "move", candidate = ?candidate, score = %score, improves);

            let early = match self.pick_early {
                ConstructionPickEarlyType::Never => false,
                ConstructionPickEarlyType::FirstNonDeterioratingScore => score >= last_step_score,
                ConstructionPickEarlyType::FirstFeasibleScore => score.is_feasible(),
            };
            if early {
                return Ok(Some(candidate));
            }
            if improves {
                best = Some((candidate, score));
            }
        }
        Ok(best.map(|(m, _)| m))
    }
}

impl<S: PlanningSolution, V: Debug> Debug for ConstructionHeuristicPhase<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructionHeuristicPhase")
            .field("placers", &self.placers)
            .field("pick_early", &self.pick_early)
            .field("termination", &self.termination)
            .finish()
    }
}

impl<S, V, D> Phase<S, D> for ConstructionHeuristicPhase<S, V>
where
    S: PlanningSolution,
    V: PlanningValue,
    D: ScoreDirector<S>,
{
    fn validate(&self) -> Result<()> {
        if self.placers.is_empty() {
            return Err(SolverError::configuration(
                "construction heuristic has no variables to place",
            ));
        }
        Ok(())
    }

    fn solving_started(&mut self, solver_scope: &mut SolverScope<S, D>) {
        let (mut context, _) = solver_scope.lifecycle(0, 0, None);
        self.notify(LifecycleEvent::SolvingStarted, &mut context);
    }

    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<PhaseOutcome> {
        Phase::<S, D>::validate(self)?;
        let phase_index = solver_scope.begin_phase();
        let mut phase_scope = PhaseScope::new(solver_scope, phase_index);
        phase_scope.reset_working_solution();
        let starting_score = phase_scope.calculate_score();
        phase_scope.set_starting_score(starting_score);
        self.fire(LifecycleEvent::PhaseStarted, &mut phase_scope, Some(starting_score));

        let mut placements = Vec::new();
        for (placer_index, placer) in self.placers.iter_mut().enumerate() {
            let (solution, random) = phase_scope.solution_and_random();
            placements.extend(placer.placements(placer_index, solution, random));
        }
        info!(
            event = "phase_start",
            phase = "ConstructionHeuristic",
            phase_index,
            placements = placements.len(),
            score = %starting_score,
        );

        let mut last_step_score = starting_score;
        let mut outcome = PhaseOutcome::Completed;
        for placement in placements {
            if phase_scope.is_terminated(self.termination.as_deref()) {
                outcome = PhaseOutcome::Terminated;
                break;
            }
            self.fire(LifecycleEvent::StepStarted, &mut phase_scope, Some(last_step_score));
            let chosen = self.forage(placement, &mut phase_scope, last_step_score)?;

            let mode = phase_scope.environment_mode();
            let mut step_scope = StepScope::new(&mut phase_scope);
            let step_index = step_scope.step_index();
            let director = step_scope.score_director_mut();
            if let Some(m) = &chosen {
                m.do_move(director);
            }
            let step_score = if mode.is_asserted() {
                director.assert_score_integrity(&format!("after construction step {step_index}"))?
            } else {
                director.calculate_score()
            };
            step_scope.set_step_score(step_score);
            step_scope.complete();
            last_step_score = step_score;

            debug!(
                event = "step",
                phase_index,
                step = step_index,
                entity = placement.entity_index,
                score = %step_score,
                placed = ?chosen,
            );
            self.fire(LifecycleEvent::StepEnded, &mut phase_scope, Some(step_score));
        }

        // Even an empty construction leaves a best solution behind.
        phase_scope.update_best_solution();
        self.fire(LifecycleEvent::PhaseEnded, &mut phase_scope, Some(last_step_score));
        info!(
            event = "phase_end",
            phase = "ConstructionHeuristic",
            phase_index,
            steps = phase_scope.step_count(),
            score = %last_step_score,
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
        "ConstructionHeuristic"
    }
}
