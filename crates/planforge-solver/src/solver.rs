//! Solver implementation.

use std::cmp::Reverse;
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use planforge_config::EnvironmentMode;
use planforge_core::{PlanningSolution, Result, SolverError};
use planforge_scoring::ScoreDirector;

use crate::event::{LifecycleEvent, SolverEventListener, SolverEventSupport};
use crate::phase::Phase;
use crate::scope::{BestSolution, SolverScope};
use crate::stats::SolverStats;
use crate::termination::{ExternalTermination, Termination};

/// Outcome of one solver run.
#[derive(Debug, Clone)]
pub struct SolveResult<S: PlanningSolution> {
    /// Best solution found, with its score set.
    pub solution: S,
    pub score: S::Score,
    pub stats: SolverStats,
}

impl<S: PlanningSolution> SolveResult<S> {
    /// Fewer unassigned variables rank higher, then the better score.
    fn beats(&self, other: &Self) -> bool {
        (Reverse(self.solution.uninitialized_count()), self.score)
            > (Reverse(other.solution.uninitialized_count()), other.score)
    }
}

/// The main solver that optimizes planning solutions.
///
/// Runs its phases in order on one working solution. Before each phase the
/// solver termination is polled; once it fires the remaining phases are
/// skipped.
///
/// # Example
///
/// ```
/// use planforge_core::{PlanningSolution, Result, SimpleScore};
/// use planforge_scoring::{ScoreDirector, SimpleScoreDirector};
/// use planforge_solver::phase::{Phase, PhaseOutcome};
/// use planforge_solver::scope::SolverScope;
/// use planforge_solver::solver::Solver;
///
/// #[derive(Clone, Debug)]
/// struct Plan { score: Option<SimpleScore> }
///
/// impl PlanningSolution for Plan {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<SimpleScore> { self.score }
///     fn set_score(&mut self, score: Option<SimpleScore>) { self.score = score; }
///     fn entity_count(&self, _: usize) -> usize { 0 }
/// }
///
/// #[derive(Debug)]
/// struct NoOpPhase;
///
/// impl<S: PlanningSolution, D: ScoreDirector<S>> Phase<S, D> for NoOpPhase {
///     fn solve(&mut self, _: &mut SolverScope<S, D>) -> Result<PhaseOutcome> {
///         Ok(PhaseOutcome::Completed)
///     }
///     fn phase_type_name(&self) -> &'static str { "NoOp" }
/// }
///
/// let director = SimpleScoreDirector::new(Plan { score: None }, |_: &Plan| SimpleScore::of(-2));
/// let result = Solver::new().with_phase(Box::new(NoOpPhase)).solve(director).unwrap();
/// assert_eq!(result.score, SimpleScore::of(-2));
/// assert_eq!(result.solution.score, Some(SimpleScore::of(-2)));
/// ```
pub struct Solver<S: PlanningSolution, D: ScoreDirector<S>> {
    phases: Vec<Box<dyn Phase<S, D>>>,
    termination: Option<Box<dyn Termination<S::Score>>>,
    environment_mode: EnvironmentMode,
    random_seed: Option<u64>,
    events: SolverEventSupport<S>,
    best_solution_sender: Option<UnboundedSender<BestSolution<S>>>,
    terminate_early_flag: Arc<AtomicBool>,
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Solver<S, D> {
    /// A reproducible solver seeded with 0 and no phases.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            termination: None,
            environment_mode: EnvironmentMode::default(),
            random_seed: None,
            events: SolverEventSupport::new(),
            best_solution_sender: None,
            terminate_early_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_phase(mut self, phase: Box<dyn Phase<S, D>>) -> Self {
        self.phases.push(phase);
        self
    }

    pub fn with_termination(mut self, termination: Box<dyn Termination<S::Score>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Seed for reproducible modes; ignored in `NonReproducible` mode.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_event_listener(mut self, listener: Arc<dyn SolverEventListener<S>>) -> Self {
        self.events.add_listener(listener);
        self
    }

    pub fn with_best_solution_sender(mut self, sender: UnboundedSender<BestSolution<S>>) -> Self {
        self.best_solution_sender = Some(sender);
        self
    }

    /// Creates a channel that receives every new best solution.
    pub fn best_solution_channel(&mut self) -> UnboundedReceiver<BestSolution<S>> {
        let (sender, receiver) = unbounded_channel();
        self.best_solution_sender = Some(sender);
        receiver
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    /// Flag that stops the run at the next step boundary once set.
    ///
    /// Can be set from any thread while [`Solver::solve`] runs.
    pub fn terminate_early_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate_early_flag)
    }

    /// Requests early termination of the solving process.
    pub fn terminate_early(&self) {
        self.terminate_early_flag.store(true, Ordering::SeqCst);
    }

    fn random(&self) -> (Box<dyn RngCore + Send>, Option<u64>) {
        if self.environment_mode.is_reproducible() {
            let seed = self.random_seed.unwrap_or(0);
            (Box::new(ChaCha8Rng::seed_from_u64(seed)), Some(seed))
        } else {
            (Box::new(ChaCha8Rng::from_os_rng()), None)
        }
    }

    /// Runs every phase on `score_director`'s working solution.
    ///
    /// Integrity failures abort the run; solving-ended events still reach
    /// every phase before the error is returned.
    pub fn solve(mut self, score_director: D) -> Result<SolveResult<S>> {
        if self.phases.is_empty() {
            return Err(SolverError::configuration("solver has no phases"));
        }
        for phase in &self.phases {
            phase.validate()?;
            if self.termination.is_none() && phase.needs_solver_termination() {
                return Err(SolverError::configuration(format!(
                    "{} phase never stops on its own and the solver has no termination",
                    phase.phase_type_name()
                )));
            }
        }

        let (random, seed) = self.random();
        let external = ExternalTermination::with_flag(Arc::clone(&self.terminate_early_flag));
        let mut solver_scope = SolverScope::with_random(score_director, random)
            .with_environment_mode(self.environment_mode)
            .with_external_termination(external)
            .with_events(self.events.clone());
        if let Some(termination) = self.termination.take() {
            solver_scope = solver_scope.with_termination(termination);
        }
        if let Some(sender) = self.best_solution_sender.take() {
            solver_scope = solver_scope.with_best_solution_sender(sender);
        }
        solver_scope.start_solving();

        info!(
            event = "solve_start",
            phases = self.phases.len(),
            environment_mode = ?self.environment_mode,
            seed = ?seed,
        );
        {
            let (context, events) = solver_scope.lifecycle(0, 0, None);
            events.fire_lifecycle(LifecycleEvent::SolvingStarted, &context);
        }
        for phase in &mut self.phases {
            phase.solving_started(&mut solver_scope);
        }

        let mut failure = None;
        for phase in &mut self.phases {
            if solver_scope.is_terminated() {
                debug!(event = "phase_skipped", phase = phase.phase_type_name());
                continue;
            }
            match phase.solve(&mut solver_scope) {
                Ok(outcome) => debug!(
                    event = "phase_outcome",
                    phase = phase.phase_type_name(),
                    outcome = ?outcome,
                ),
                Err(e) => {
                    error!(event = "phase_failed", phase = phase.phase_type_name(), error = %e);
                    failure = Some(e);
                    break;
                }
            }
        }

        for phase in self.phases.iter_mut().rev() {
            phase.solving_ended(&mut solver_scope);
        }
        {
            let best_score = solver_scope.best_score();
            let (context, events) = solver_scope.lifecycle(0, 0, best_score);
            events.fire_lifecycle(LifecycleEvent::SolvingEnded, &context);
        }
        if let Some(e) = failure {
            return Err(e);
        }

        if solver_scope.best_score().is_none() {
            solver_scope.update_best_solution();
        }
        let score = match solver_scope.best_score() {
            Some(score) => score,
            None => solver_scope.calculate_score(),
        };
        let (mut solution, stats) = solver_scope.into_result();
        solution.set_score(Some(score));

        info!(
            event = "solve_end",
            score = %score,
            steps = stats.step_count,
            moves_evaluated = stats.moves_evaluated,
            illegal_moves = stats.illegal_moves,
            score_calculations = stats.score_calculations,
            elapsed_ms = stats.elapsed().as_millis() as u64,
        );
        Ok(SolveResult {
            solution,
            score,
            stats,
        })
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Default for Solver<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Debug for Solver<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("phases", &self.phases)
            .field("termination", &self.termination)
            .field("environment_mode", &self.environment_mode)
            .field("random_seed", &self.random_seed)
            .field("events", &self.events)
            .finish()
    }
}

/// Solves independent copies of a problem in parallel, one per seed.
///
/// `build` creates a fresh solver and score director for a seed; each run
/// owns its cloned working solution and its own seeded random source. The
/// best result wins, ties going to the earliest seed.
pub fn solve_many<S, D, F>(seeds: &[u64], build: F) -> Result<SolveResult<S>>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    F: Fn(u64) -> Result<(Solver<S, D>, D)> + Sync,
{
    if seeds.is_empty() {
        return Err(SolverError::configuration("solve_many needs at least one seed"));
    }
    info!(event = "solve_many_start", runs = seeds.len());

    let results: Vec<SolveResult<S>> = seeds
        .par_iter()
        .map(|&seed| {
            let (solver, director) = build(seed)?;
            solver.with_random_seed(seed).solve(director)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut best: Option<SolveResult<S>> = None;
    for result in results {
        let better = best.as_ref().map_or(true, |b| result.beats(b));
        if better {
            best = Some(result);
        }
    }
    best.ok_or_else(|| SolverError::InvalidState("no run produced a result".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::{SimpleScore, ValueRange};
    use planforge_config::NoAcceptedMovePolicy;
    use planforge_test::nqueens::{
        calculate_conflicts, create_nqueens_director, create_partial_nqueens_director, get_queen_row, row_range,
        set_queen_row, NQueensDirector, NQueensSolution, QUEEN, ROW,
    };

    use crate::event::CountingEventListener;
    use crate::heuristic::selector::{ChangeMoveSelector, SelectionOrder};
    use crate::heuristic::variable::{PlanningVariable, VariableDefinition};
    use crate::phase::construction::ConstructionHeuristicPhase;
    use crate::phase::localsearch::{
        BestScoreForager, FirstAcceptedForager, HillClimbingAcceptor, LateAcceptanceAcceptor,
        LocalSearchPhase,
    };
    use crate::termination::StepCountTermination;

    type Queens = Solver<NQueensSolution, NQueensDirector>;

    fn rows() -> VariableDefinition<NQueensSolution, i64> {
        VariableDefinition::new(
            "Queen",
            PlanningVariable::new(QUEEN, ROW, get_queen_row, set_queen_row),
            ValueRange::computed(row_range),
        )
    }

    fn solver(steps: u64) -> Queens {
        let local_search = LocalSearchPhase::new(
            ChangeMoveSelector::new(&rows(), SelectionOrder::Random).into(),
            LateAcceptanceAcceptor::new(10),
            FirstAcceptedForager::new(),
        );
        Solver::new()
            .with_phase(Box::new(ConstructionHeuristicPhase::new(&[rows()])))
            .with_phase(Box::new(local_search))
            .with_termination(Box::new(StepCountTermination::new(steps)))
    }

    #[test]
    fn test_construction_then_local_search() {
        let result = solver(200)
            .solve(create_partial_nqueens_director(&[None; 8]))
            .unwrap();

        assert!(result.solution.is_initialized());
        assert_eq!(result.score, calculate_conflicts(&result.solution));
        assert_eq!(result.solution.score, Some(result.score));
        // Eight construction steps, then local search until the limit or a dead end.
        assert!(result.stats.step_count >= 8 && result.stats.step_count <= 200);
        assert!(result.stats.moves_evaluated >= result.stats.step_count);
    }

    #[test]
    fn test_same_seed_same_solution() {
        let run = || {
            solver(120)
                .with_random_seed(9)
                .solve(create_partial_nqueens_director(&[None; 6]))
                .unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.solution.rows(), b.solution.rows());
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_best_solution_channel_sees_every_improvement() {
        let mut solver = solver(60);
        let mut receiver = solver.best_solution_channel();
        let result = solver.solve(create_partial_nqueens_director(&[None; 5])).unwrap();

        let mut received = Vec::new();
        while let Ok(best) = receiver.try_recv() {
            received.push(best);
        }
        assert!(!received.is_empty());
        assert_eq!(received.len() as u64, result.stats.best_score_improvements);
        let last = received.last().unwrap();
        assert_eq!(last.score, result.score);
        assert_eq!(last.solution.rows(), result.solution.rows());
    }

    #[test]
    fn test_listeners_hear_the_solver_lifecycle() {
        let listener = Arc::new(CountingEventListener::new());
        solver(30)
            .with_event_listener(listener.clone())
            .solve(create_partial_nqueens_director(&[None; 4]))
            .unwrap();

        assert_eq!(listener.count(LifecycleEvent::SolvingStarted), 1);
        assert_eq!(listener.count(LifecycleEvent::SolvingEnded), 1);
        assert_eq!(listener.count(LifecycleEvent::PhaseStarted), 2);
        assert_eq!(listener.count(LifecycleEvent::PhaseEnded), 2);
        assert_eq!(
            listener.count(LifecycleEvent::StepStarted),
            listener.count(LifecycleEvent::StepEnded)
        );
        assert!(listener.best_solution_count() >= 1);
    }

    #[test]
    fn test_terminate_early_skips_every_phase() {
        let solver = solver(1000);
        solver.terminate_early();
        let result = solver.solve(create_partial_nqueens_director(&[None; 4])).unwrap();

        assert_eq!(result.stats.step_count, 0);
        assert!(!result.solution.is_initialized());
        assert_eq!(result.score, SimpleScore::ZERO);
    }

    #[test]
    fn test_more_placed_result_beats_better_scoring_one() {
        let result = |rows: &[Option<i64>], score: i64| SolveResult {
            solution: NQueensSolution::with_optional_rows(rows),
            score: SimpleScore::of(score),
            stats: SolverStats::default(),
        };
        let two_placed = result(&[Some(0), Some(0), None], -1);
        let one_placed = result(&[Some(0), None, None], 0);
        assert!(two_placed.beats(&one_placed));
        assert!(!one_placed.beats(&two_placed));
    }

    #[test]
    fn test_solver_without_phases_is_rejected() {
        let err = Queens::new()
            .solve(create_partial_nqueens_director(&[None; 4]))
            .unwrap_err();
        assert!(matches!(err, SolverError::Configuration(_)));
    }

    fn continuing_local_search() -> LocalSearchPhase<NQueensSolution, i64> {
        LocalSearchPhase::new(
            ChangeMoveSelector::new(&rows(), SelectionOrder::Original).into(),
            HillClimbingAcceptor::new(),
            BestScoreForager::new(None),
        )
        .with_no_accepted_move_policy(NoAcceptedMovePolicy::Continue)
    }

    #[test]
    fn test_continue_policy_needs_a_solver_termination() {
        let err = Queens::new()
            .with_phase(Box::new(continuing_local_search()))
            .solve(create_nqueens_director(&[1, 3, 0, 2]))
            .unwrap_err();
        assert!(matches!(err, SolverError::Configuration(_)));

        let result = Queens::new()
            .with_phase(Box::new(continuing_local_search()))
            .with_termination(Box::new(StepCountTermination::new(3)))
            .solve(create_nqueens_director(&[1, 3, 0, 2]))
            .unwrap();
        assert_eq!(result.stats.step_count, 3);
        assert_eq!(result.score, SimpleScore::ZERO);
    }

    #[test]
    fn test_solve_many_keeps_the_best_run() {
        let seeds = [1, 2, 3, 4];
        let best = solve_many(&seeds, |_| Ok((solver(40), create_partial_nqueens_director(&[None; 6])))).unwrap();

        for seed in seeds {
            let single = solver(40)
                .with_random_seed(seed)
                .solve(create_partial_nqueens_director(&[None; 6]))
                .unwrap();
            assert!(best.score >= single.score);
        }
        assert!(best.solution.is_initialized());
    }

    #[test]
    fn test_solve_many_needs_a_seed() {
        let err = solve_many(&[], |_| Ok((solver(1), create_partial_nqueens_director(&[None; 2])))).unwrap_err();
        assert!(matches!(err, SolverError::Configuration(_)));
    }
}
