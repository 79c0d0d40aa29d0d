use planforge_core::SimpleScore;
use planforge_scoring::ScoreDirector;
use planforge_test::nqueens::{create_nqueens_director, get_queen_row, set_queen_row, NQueensSolution, QUEEN, ROW};
use planforge_test::task::{create_task_director, get_priority, get_worker, set_priority, set_worker, Task, TaskSolution, TASK};

use super::*;
use crate::heuristic::variable::PlanningVariable;

fn row() -> PlanningVariable<NQueensSolution, i64> {
    PlanningVariable::new(QUEEN, ROW, get_queen_row, set_queen_row)
}

fn priority() -> PlanningVariable<TaskSolution, i64> {
    PlanningVariable::new(TASK, "priority", get_priority, set_priority)
}

fn worker() -> PlanningVariable<TaskSolution, i64> {
    PlanningVariable::new(TASK, "worker", get_worker, set_worker)
}

/// Does a move, checks the score, undoes it and checks full restoration.
fn assert_reversible<D, M>(director: &mut D, m: &M)
where
    D: ScoreDirector<NQueensSolution>,
    M: Move<NQueensSolution>,
{
    let before_rows = director.working_solution().rows();
    let before_score = director.calculate_score();

    let undo = m.create_undo_move(director);
    m.do_move(director);
    let moved_score = director.calculate_score();
    assert_eq!(moved_score, director.calculate_full_score());

    undo.do_move(director);
    assert_eq!(director.working_solution().rows(), before_rows);
    assert_eq!(director.calculate_score(), before_score);
    assert_eq!(director.calculate_full_score(), before_score);
}

#[test]
fn test_change_move_do_and_undo() {
    let mut director = create_nqueens_director(&[0, 0, 0, 0]);
    let m = ChangeMove::new(row(), 1, Some(2));
    assert!(m.is_doable(&director));
    assert_reversible(&mut director, &m);
}

#[test]
fn test_change_move_to_current_value_is_not_doable() {
    let director = create_nqueens_director(&[0, 1, 2, 3]);
    assert!(!ChangeMove::new(row(), 2, Some(2)).is_doable(&director));
    assert!(!ChangeMove::new(row(), 9, Some(2)).is_doable(&director));
}

#[test]
fn test_change_move_on_pinned_entity_is_not_doable() {
    let mut solution = TaskSolution::empty(2);
    solution.tasks[0].pinned = true;
    let director = create_task_director(solution);
    assert!(!ChangeMove::new(priority(), 0, Some(1)).is_doable(&director));
    assert!(ChangeMove::new(priority(), 1, Some(1)).is_doable(&director));
}

#[test]
fn test_change_move_undo_restores_unassigned() {
    let mut director = create_task_director(TaskSolution::empty(1));
    let m = ChangeMove::new(worker(), 0, Some(4));
    let undo = m.create_undo_move(&director);
    m.do_move(&mut director);
    assert_eq!(director.working_solution().tasks[0].worker, Some(4));
    undo.do_move(&mut director);
    assert_eq!(director.working_solution().tasks[0].worker, None);
}

#[test]
fn test_swap_move_do_undo_redo() {
    let mut director = create_nqueens_director(&[0, 0, 1, 3]);
    let m = SwapMove::new(row(), 1, 2);
    assert!(m.is_doable(&director));
    assert_reversible(&mut director, &m);

    m.do_move(&mut director);
    assert_eq!(
        director.working_solution().rows(),
        vec![Some(0), Some(1), Some(0), Some(3)]
    );
    let undo = m.create_undo_move(&director);
    undo.do_move(&mut director);
    m.do_move(&mut director);
    assert_eq!(director.calculate_score(), director.calculate_full_score());
}

#[test]
fn test_swap_of_equal_values_is_not_doable() {
    let director = create_nqueens_director(&[0, 0, 1, 3]);
    assert!(!SwapMove::new(row(), 0, 1).is_doable(&director));
    assert!(!SwapMove::new(row(), 2, 2).is_doable(&director));
}

#[test]
fn test_composite_move_undo_with_overlapping_parts() {
    // Swap then overwrite one side: undoing must restore both queens.
    let mut director = create_nqueens_director(&[0, 3, 1, 2]);
    let composite = CompositeMove::new(vec![
        SwapMove::new(row(), 0, 1).into(),
        ChangeMove::new(row(), 0, Some(2)).into(),
    ]);
    assert!(composite.is_doable(&director));
    assert_reversible(&mut director, &composite);

    composite.do_move(&mut director);
    assert_eq!(
        director.working_solution().rows(),
        vec![Some(2), Some(0), Some(1), Some(2)]
    );
}

#[test]
fn test_composite_move_redo_after_undo() {
    let mut director = create_nqueens_director(&[0, 0, 0, 0]);
    let composite: CandidateMove<_, _> = CompositeMove::new(vec![
        ChangeMove::new(row(), 1, Some(2)).into(),
        ChangeMove::new(row(), 3, Some(1)).into(),
    ])
    .into();

    let undo = composite.create_undo_move(&director);
    composite.do_move(&mut director);
    let moved = director.calculate_score();
    let redo = undo.create_undo_move(&director);
    undo.do_move(&mut director);
    assert_eq!(director.calculate_score(), SimpleScore::of(-6));
    redo.do_move(&mut director);
    assert_eq!(director.calculate_score(), moved);
}

#[test]
fn test_composite_is_doable_when_any_part_changes_something() {
    let mut director = create_nqueens_director(&[0, 1, 2, 3]);
    let composite = CompositeMove::new(vec![
        ChangeMove::new(row(), 0, Some(3)).into(),
        ChangeMove::new(row(), 1, Some(1)).into(),
    ]);
    assert!(composite.is_doable(&director));
    assert_reversible(&mut director, &composite);
    composite.do_move(&mut director);
    assert_eq!(
        director.working_solution().rows(),
        vec![Some(3), Some(1), Some(2), Some(3)]
    );

    let unchanged = CompositeMove::new(vec![
        ChangeMove::new(row(), 0, Some(3)).into(),
        ChangeMove::new(row(), 1, Some(1)).into(),
    ]);
    assert!(!unchanged.is_doable(&director));
    assert!(!CompositeMove::<NQueensSolution, i64>::new(Vec::new()).is_doable(&director));
}

#[test]
fn test_candidate_debug_format() {
    let m: CandidateMove<TaskSolution, i64> = CompositeMove::new(vec![
        ChangeMove::new(priority(), 0, Some(1)).into(),
        SwapMove::new(worker(), 0, 1).into(),
    ])
    .into();
    assert_eq!(
        format!("{:?}", m),
        "[priority[0] -> Some(1), worker[0] <-> worker[1]]"
    );
}

#[test]
fn test_task_score_follows_moves() {
    let mut director = create_task_director(TaskSolution::new(vec![Task {
        priority: Some(2),
        ..Task::default()
    }]));
    assert_eq!(director.calculate_score(), SimpleScore::ZERO);
    ChangeMove::new(worker(), 0, Some(2)).do_move(&mut director);
    assert_eq!(director.calculate_score(), SimpleScore::of(1));
}

#[test]
fn test_arena_take_keeps_other_indices() {
    let mut arena = MoveArena::new();
    let a = arena.push("a");
    let b = arena.push("b");
    let c = arena.push("c");
    assert_eq!(arena.take(b), Some("b"));
    assert_eq!(arena.take(b), None);
    assert_eq!(arena.get(a), Some(&"a"));
    assert_eq!(arena.get(c), Some(&"c"));
    assert_eq!(arena.iter().count(), 2);
    arena.reset();
    assert!(arena.is_empty());
    assert_eq!(arena.get(a), None);
}
