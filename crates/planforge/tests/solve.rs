//! End-to-end runs through the facade: config in, solved board out.

use planforge::prelude::*;
use planforge::{solve_many, EnvironmentMode, SimpleScoreDirector, SolverError};
use planforge_test::nqueens::{
    calculate_conflicts, create_partial_nqueens_director, get_queen_row, row_range, set_queen_row,
    NQueensDirector, NQueensSolution, QUEEN, ROW,
};

const CONFIG: &str = r#"
environment_mode: fast_assert
random_seed: 3
termination:
  step_count_limit: 400
phases:
  - type: construction_heuristic
  - type: local_search
    step_candidate_limit: 64
    acceptor:
      type: late_acceptance
      late_acceptance_size: 20
    forager:
      pick: best_score
      accepted_count_limit: 4
    move_selector:
      type: union_move_selector
      selectors:
        - type: change_move_selector
          entity_class: Queen
        - type: swap_move_selector
          entity_class: Queen
      weights: [3.0, 1.0]
"#;

fn domain() -> SolverDomain<NQueensSolution, i64> {
    SolverDomain::new().with_variable(VariableDefinition::new(
        "Queen",
        PlanningVariable::new(QUEEN, ROW, get_queen_row, set_queen_row),
        ValueRange::computed(row_range),
    ))
}

#[test]
fn test_yaml_config_solves_eight_queens() {
    planforge::logging::init();
    let config = SolverConfig::from_yaml_str(CONFIG).unwrap();
    let solver = build_solver::<_, _, NQueensDirector>(&config, &domain()).unwrap();
    let result = solver.solve(create_partial_nqueens_director(&[None; 8])).unwrap();

    assert!(result.solution.is_initialized());
    assert_eq!(result.score, calculate_conflicts(&result.solution));
    assert!(result.stats.step_count <= 400);
    assert!(result.stats.score_calculations > 0);
}

#[test]
fn test_incremental_and_full_directors_agree() {
    type FullDirector = SimpleScoreDirector<NQueensSolution, fn(&NQueensSolution) -> SimpleScore>;

    let config = SolverConfig::from_yaml_str(CONFIG)
        .unwrap()
        .with_environment_mode(EnvironmentMode::Reproducible);
    let incremental = build_solver::<_, _, NQueensDirector>(&config, &domain())
        .unwrap()
        .solve(create_partial_nqueens_director(&[None; 6]))
        .unwrap();
    let full = build_solver::<_, _, FullDirector>(&config, &domain())
        .unwrap()
        .solve(SimpleScoreDirector::new(
            NQueensSolution::with_optional_rows(&[None; 6]),
            calculate_conflicts as fn(&NQueensSolution) -> SimpleScore,
        ))
        .unwrap();

    assert_eq!(incremental.solution.rows(), full.solution.rows());
    assert_eq!(incremental.score, full.score);
    assert_eq!(incremental.stats.step_count, full.stats.step_count);
}

#[test]
fn test_solve_many_over_built_solvers() {
    let config = SolverConfig::from_yaml_str(CONFIG).unwrap();
    let best = solve_many(&[10, 20, 30], |_| {
        let solver = build_solver::<_, _, NQueensDirector>(&config, &domain())?;
        Ok((solver, create_partial_nqueens_director(&[None; 6])))
    })
    .unwrap();

    assert!(best.solution.is_initialized());
    assert_eq!(best.score, calculate_conflicts(&best.solution));
}

#[test]
fn test_unknown_entity_class_fails_before_solving() {
    let config = SolverConfig::from_yaml_str(&CONFIG.replace("entity_class: Queen", "entity_class: Rook")).unwrap();
    let err = build_solver::<_, _, NQueensDirector>(&config, &domain()).unwrap_err();
    assert!(matches!(err, SolverError::Configuration(_)));
}
