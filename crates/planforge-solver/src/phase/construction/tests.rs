use std::cmp::Ordering;

use planforge_core::{PlanningSolution, SolverError, ValueRange};
use planforge_test::nqueens::{
    calculate_conflicts, create_partial_nqueens_director, get_queen_row, row_range,
    set_queen_row, NQueensDirector, NQueensSolution, QUEEN, ROW,
};
use planforge_test::task::{create_task_director, get_worker, set_worker, TaskSolution, TASK};

use super::*;
use crate::heuristic::variable::{PlanningVariable, VariableDefinition};
use crate::phase::{Phase, PhaseOutcome};
use crate::scope::SolverScope;
use crate::termination::StepCountTermination;

type Queens = ConstructionHeuristicPhase<NQueensSolution, i64>;

fn rows() -> VariableDefinition<NQueensSolution, i64> {
    VariableDefinition::new(
        "Queen",
        PlanningVariable::new(QUEEN, ROW, get_queen_row, set_queen_row),
        ValueRange::computed(row_range),
    )
}

fn scope(rows: &[Option<i64>]) -> SolverScope<NQueensSolution, NQueensDirector> {
    let mut scope = SolverScope::with_seed(create_partial_nqueens_director(rows), 0);
    scope.start_solving();
    scope
}

#[test]
fn test_best_fit_places_every_queen() {
    let mut phase = Queens::new(&[rows()]);
    let mut scope = scope(&[None; 6]);
    assert_eq!(phase.solve(&mut scope).unwrap(), PhaseOutcome::Completed);

    assert_eq!(scope.total_step_count(), 6);
    let best = scope.best_solution().unwrap();
    assert!(best.is_initialized());
    assert_eq!(Some(calculate_conflicts(best)), scope.best_score());
    // Ties keep the first value tried.
    assert_eq!(best.queens[0].row, Some(0));
}

#[test]
fn test_assigned_queens_are_left_alone() {
    let mut phase = Queens::new(&[rows()]);
    let mut scope = scope(&[Some(1), None, None, None]);
    phase.solve(&mut scope).unwrap();

    assert_eq!(scope.total_step_count(), 3);
    let (solution, _) = scope.into_result();
    assert_eq!(solution.queens[0].row, Some(1));
    assert!(solution.is_initialized());
}

#[test]
fn test_first_non_deteriorating_stops_at_first_free_row() {
    let mut phase = Queens::new(&[rows()])
        .with_pick_early(ConstructionPickEarlyType::FirstNonDeterioratingScore);
    let mut scope = scope(&[Some(0), None, None, None]);
    phase.solve(&mut scope).unwrap();

    let (solution, stats) = scope.into_result();
    // Queen 1 cannot share row 0 or the diagonal through row 1.
    assert_eq!(solution.queens[1].row, Some(2));
    assert!(stats.moves_evaluated < 12);
}

#[test]
fn test_termination_leaves_construction_partial() {
    let mut phase = Queens::new(&[rows()]).with_termination(Box::new(StepCountTermination::new(2)));
    let mut scope = scope(&[None; 4]);
    assert_eq!(phase.solve(&mut scope).unwrap(), PhaseOutcome::Terminated);

    let (solution, _) = scope.into_result();
    assert_eq!(solution.rows().iter().filter(|r| r.is_some()).count(), 2);
    assert!(!solution.is_initialized());
}

#[test]
fn test_empty_range_leaves_slot_unassigned() {
    let workers = VariableDefinition::new(
        "Task",
        PlanningVariable::new(TASK, "worker", get_worker, set_worker),
        ValueRange::listed(Vec::new()),
    );
    let mut phase = ConstructionHeuristicPhase::new(&[workers]);
    let mut scope = SolverScope::with_seed(create_task_director(TaskSolution::empty(2)), 0);
    scope.start_solving();
    assert_eq!(phase.solve(&mut scope).unwrap(), PhaseOutcome::Completed);

    assert_eq!(scope.total_step_count(), 2);
    let (solution, _) = scope.into_result();
    assert!(solution.tasks.iter().all(|t| t.worker.is_none()));
}

#[test]
fn test_no_variables_is_a_configuration_error() {
    let phase = Queens::new(&[]);
    let err = Phase::<NQueensSolution, NQueensDirector>::validate(&phase).unwrap_err();
    assert!(matches!(err, SolverError::Configuration(_)));
}

fn later_columns_first(_: &NQueensSolution, a: usize, b: usize) -> Ordering {
    a.cmp(&b)
}

#[test]
fn test_decreasing_difficulty_places_hardest_first() {
    let mut phase = Queens::decreasing_difficulty(&[rows().with_entity_difficulty(later_columns_first)])
        .unwrap()
        .with_termination(Box::new(StepCountTermination::new(2)));
    let mut scope = scope(&[None, Some(1), None, None]);
    assert_eq!(phase.solve(&mut scope).unwrap(), PhaseOutcome::Terminated);

    let (solution, _) = scope.into_result();
    // Columns 3 then 2; column 1 was already placed.
    assert_eq!(solution.queens[0].row, None);
    assert!(solution.queens[2].row.is_some());
    assert!(solution.queens[3].row.is_some());
}

#[test]
fn test_decreasing_difficulty_needs_a_comparator() {
    let err = Queens::decreasing_difficulty(&[rows()]).unwrap_err();
    assert!(matches!(err, SolverError::Configuration(_)));
}
