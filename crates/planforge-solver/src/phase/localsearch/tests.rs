use planforge_config::EnvironmentMode;
use planforge_core::{SimpleScore, SolverError, ValueRange};
use planforge_scoring::ScoreDirector;
use planforge_test::nqueens::{
    calculate_conflicts, create_nqueens_director, get_queen_row, row_range, set_queen_row,
    NQueensDirector, NQueensSolution, QUEEN, ROW,
};

use super::*;
use crate::event::LifecycleEvent;
use crate::heuristic::selector::{ChangeMoveSelector, MoveSelector, SelectionOrder, UnionMoveSelector};
use crate::heuristic::variable::{PlanningVariable, VariableDefinition};
use crate::phase::{Phase, PhaseOutcome};
use crate::scope::SolverScope;
use crate::termination::StepCountTermination;

type Scope = SolverScope<NQueensSolution, NQueensDirector>;
type Queens = LocalSearchPhase<NQueensSolution, i64>;

fn rows() -> VariableDefinition<NQueensSolution, i64> {
    VariableDefinition::new(
        "Queen",
        PlanningVariable::new(QUEEN, ROW, get_queen_row, set_queen_row),
        ValueRange::computed(row_range),
    )
}

fn change(order: SelectionOrder) -> MoveSelector<NQueensSolution, i64> {
    ChangeMoveSelector::new(&rows(), order).into()
}

fn scope(rows: &[i64], steps: u64, seed: u64) -> Scope {
    let mut scope = SolverScope::with_seed(create_nqueens_director(rows), seed)
        .with_termination(Box::new(StepCountTermination::new(steps)));
    scope.start_solving();
    scope
}

fn run(phase: &mut Queens, scope: &mut Scope) -> planforge_core::Result<PhaseOutcome> {
    phase.solving_started(scope);
    let outcome = phase.solve(scope);
    phase.solving_ended(scope);
    outcome
}

#[test]
fn test_best_score_hill_climbing_improves() {
    let mut phase = Queens::new(
        change(SelectionOrder::Original),
        HillClimbingAcceptor::new(),
        BestScoreForager::new(None),
    );
    let mut scope = scope(&[0, 0, 0, 0], 10, 1);
    let outcome = run(&mut phase, &mut scope).unwrap();
    assert!(matches!(outcome, PhaseOutcome::Terminated | PhaseOutcome::NoAcceptedMove));

    let best_score = scope.best_score().unwrap();
    assert!(best_score > SimpleScore::of(-6));
    assert_eq!(calculate_conflicts(scope.best_solution().unwrap()), best_score);
}

#[test]
fn test_solved_board_accepts_nothing() {
    let mut phase = Queens::new(
        change(SelectionOrder::Original),
        HillClimbingAcceptor::new(),
        BestScoreForager::new(None),
    );
    let mut scope = scope(&[1, 3, 0, 2], 10, 1);
    let outcome = run(&mut phase, &mut scope).unwrap();

    assert_eq!(outcome, PhaseOutcome::NoAcceptedMove);
    assert_eq!(scope.total_step_count(), 0);
    assert_eq!(scope.best_score(), Some(SimpleScore::ZERO));
    // Each queen's current row is offered once and is not doable.
    assert_eq!(scope.stats().illegal_moves, 4);
    assert_eq!(scope.stats().moves_evaluated, 12);
    assert_eq!(scope.stats().moves_accepted, 0);
}

#[test]
fn test_one_step_reaches_every_selector_once() {
    let selector = UnionMoveSelector::new(
        vec![change(SelectionOrder::Original), change(SelectionOrder::Original)],
        SelectionOrder::Original,
    );
    let mut phase = Queens::new(
        selector.into(),
        AcceptAllAcceptor::new(),
        FirstAcceptedForager::new(),
    );
    let mut scope = scope(&[0, 0, 0, 0], 1, 3);
    assert_eq!(run(&mut phase, &mut scope).unwrap(), PhaseOutcome::Terminated);
    assert_eq!(scope.total_step_count(), 1);

    let trackers = phase.move_selector().trackers();
    assert_eq!(trackers.len(), 4);
    for tracker in trackers {
        for event in LifecycleEvent::ALL {
            assert_eq!(tracker.count(event), 1, "{:?}", event);
        }
        assert!(tracker.is_balanced());
    }
}

#[test]
fn test_same_seed_same_result() {
    let solve = |seed: u64| {
        let mut phase = Queens::new(
            change(SelectionOrder::Random),
            LateAcceptanceAcceptor::new(5),
            FirstAcceptedForager::new(),
        );
        let mut scope = scope(&[0, 0, 0, 0, 0, 0], 40, seed);
        run(&mut phase, &mut scope).unwrap();
        let (solution, _) = scope.into_result();
        solution.rows()
    };
    assert_eq!(solve(11), solve(11));
}

#[test]
fn test_full_assert_finds_no_corruption() {
    let mut phase = Queens::new(
        change(SelectionOrder::Random),
        LateAcceptanceAcceptor::new(3),
        FirstAcceptedForager::new(),
    );
    let mut scope = scope(&[0, 1, 0, 1, 0], 25, 5).with_environment_mode(EnvironmentMode::FullAssert);
    assert!(run(&mut phase, &mut scope).is_ok());
}

#[test]
fn test_never_ending_selector_needs_a_bound() {
    let phase = Queens::new(
        change(SelectionOrder::Random),
        HillClimbingAcceptor::new(),
        BestScoreForager::new(None),
    );
    let err = Phase::<NQueensSolution, NQueensDirector>::validate(&phase).unwrap_err();
    assert!(matches!(err, SolverError::Configuration(_)));

    let bounded = phase.with_step_candidate_limit(20);
    assert!(Phase::<NQueensSolution, NQueensDirector>::validate(&bounded).is_ok());
}

#[test]
fn test_continue_policy_without_termination_is_rejected() {
    let mut phase = Queens::new(
        change(SelectionOrder::Original),
        HillClimbingAcceptor::new(),
        BestScoreForager::new(None),
    )
    .with_no_accepted_move_policy(NoAcceptedMovePolicy::Continue);
    let mut scope = SolverScope::with_seed(create_nqueens_director(&[0, 0, 0, 0]), 1);
    scope.start_solving();
    assert!(matches!(phase.solve(&mut scope), Err(SolverError::Configuration(_))));
}

#[test]
fn test_continue_policy_counts_empty_steps() {
    let mut phase = Queens::new(
        change(SelectionOrder::Original),
        HillClimbingAcceptor::new(),
        BestScoreForager::new(None),
    )
    .with_no_accepted_move_policy(NoAcceptedMovePolicy::Continue);
    let mut scope = scope(&[1, 3, 0, 2], 3, 1);
    assert_eq!(run(&mut phase, &mut scope).unwrap(), PhaseOutcome::Terminated);
    assert_eq!(scope.total_step_count(), 3);
    assert_eq!(scope.best_score(), Some(SimpleScore::ZERO));
}

#[test]
fn test_parallel_evaluation_matches_sequential() {
    let solve = |parallel: bool| {
        let mut phase = Queens::new(
            change(SelectionOrder::Original),
            HillClimbingAcceptor::new(),
            BestScoreForager::new(None),
        );
        if parallel {
            phase = phase.with_parallel_evaluator(ParallelEvaluator::new(3).unwrap());
        }
        let mut scope = scope(&[0, 0, 0, 0, 0], 6, 2);
        run(&mut phase, &mut scope).unwrap();
        let moves = scope.stats().moves_evaluated;
        let (solution, _) = scope.into_result();
        (solution.rows(), moves)
    };
    assert_eq!(solve(true), solve(false));
}

#[test]
fn test_parallel_first_accepted_follows_the_sequential_search() {
    let solve = |parallel: bool| {
        let mut phase = Queens::new(
            change(SelectionOrder::Random),
            HillClimbingAcceptor::new(),
            FirstAcceptedForager::new(),
        );
        if parallel {
            phase = phase.with_parallel_evaluator(ParallelEvaluator::new(3).unwrap());
        }
        let mut scope = scope(&[0; 8], 6, 2);
        run(&mut phase, &mut scope).unwrap();
        let moves = scope.stats().moves_evaluated;
        let (solution, _) = scope.into_result();
        (solution.rows(), moves)
    };
    assert_eq!(solve(true), solve(false));
}

#[test]
fn test_phase_termination_stops_only_the_phase() {
    let mut phase = Queens::new(
        change(SelectionOrder::Random),
        AcceptAllAcceptor::new(),
        FirstAcceptedForager::new(),
    )
    .with_termination(Box::new(StepCountTermination::new(2)));
    let mut scope = scope(&[0, 0, 0, 0], 100, 4);
    assert_eq!(run(&mut phase, &mut scope).unwrap(), PhaseOutcome::Terminated);
    assert_eq!(scope.total_step_count(), 2);
    assert!(!scope.is_terminated());
}

#[test]
fn test_phase_start_rebuilds_stale_scoring_state() {
    let mut scope = scope(&[0, 0, 0, 0], 10, 1).with_environment_mode(EnvironmentMode::FullAssert);
    // Rewrite the board without telling the director.
    for (queen, row) in [1, 3, 0, 2].into_iter().enumerate() {
        set_queen_row(scope.score_director_mut().working_solution_mut(), queen, Some(row));
    }
    let mut phase = Queens::new(
        change(SelectionOrder::Original),
        HillClimbingAcceptor::new(),
        BestScoreForager::new(None),
    );
    assert_eq!(run(&mut phase, &mut scope).unwrap(), PhaseOutcome::NoAcceptedMove);
    assert_eq!(scope.best_score(), Some(SimpleScore::ZERO));
}
