use std::sync::Arc;

use planforge_core::{PlanningSolution, SimpleScore, SolverError};

use super::*;
use crate::network::{ConstraintFactory, ConstraintNetwork, Tuple};

#[derive(Clone, Debug)]
struct Board {
    rows: Vec<i64>,
    score: Option<SimpleScore>,
}

impl PlanningSolution for Board {
    type Score = SimpleScore;

    fn score(&self) -> Option<SimpleScore> {
        self.score
    }

    fn set_score(&mut self, score: Option<SimpleScore>) {
        self.score = score;
    }

    fn entity_count(&self, _: usize) -> usize {
        self.rows.len()
    }
}

fn row(b: &Board, t: &Tuple) -> i64 {
    b.rows[t.index(0)]
}

fn ascending(_: &Board, t: &Tuple) -> bool {
    t.index(0) < t.index(1)
}

fn network() -> Arc<ConstraintNetwork<Board>> {
    let mut f = ConstraintFactory::<Board>::new();
    let queens = f.for_each(0);
    let same_row = f.join(queens, queens, row, row).unwrap();
    let conflicts = f.filter(same_row, ascending).unwrap();
    f.penalize("Row conflict", conflicts, SimpleScore::ONE).unwrap();
    Arc::new(f.build().unwrap())
}

fn conflicts(b: &Board) -> SimpleScore {
    let mut n = 0;
    for i in 0..b.rows.len() {
        for j in i + 1..b.rows.len() {
            if b.rows[i] == b.rows[j] {
                n += 1;
            }
        }
    }
    SimpleScore::of(-n)
}

fn board(rows: &[i64]) -> Board {
    Board {
        rows: rows.to_vec(),
        score: None,
    }
}

fn set_row<D: ScoreDirector<Board>>(director: &mut D, queen: usize, value: i64) {
    director.before_variable_changed(0, queen, "row");
    director.working_solution_mut().rows[queen] = value;
    director.after_variable_changed(0, queen, "row");
}

#[test]
fn test_network_director_tracks_changes() {
    let mut director = NetworkScoreDirector::new(board(&[0, 0, 0, 1]), network());
    assert_eq!(director.calculate_score(), SimpleScore::of(-3));
    assert_eq!(director.working_solution().score(), Some(SimpleScore::of(-3)));

    set_row(&mut director, 1, 2);
    set_row(&mut director, 2, 3);
    assert_eq!(director.calculate_score(), SimpleScore::ZERO);
    assert_eq!(director.calculation_count(), 2);
    assert!(director.is_incremental());
}

#[test]
fn test_network_director_agrees_with_simple_director() {
    let mut incremental = NetworkScoreDirector::new(board(&[0, 1, 2, 3]), network());
    let mut simple = SimpleScoreDirector::new(board(&[0, 1, 2, 3]), conflicts);
    for (queen, value) in [(0, 1), (3, 1), (2, 1), (0, 0), (1, 3)] {
        set_row(&mut incremental, queen, value);
        set_row(&mut simple, queen, value);
        assert_eq!(incremental.calculate_score(), simple.calculate_score());
    }
}

#[test]
fn test_unreported_change_is_detected_as_corruption() {
    let mut director = NetworkScoreDirector::new(board(&[0, 1, 2]), network());
    assert_eq!(director.assert_score_integrity("start").unwrap(), SimpleScore::ZERO);

    director.working_solution_mut().rows[2] = 0;
    let err = director.assert_score_integrity("after step 1").unwrap_err();
    match err {
        SolverError::ScoreCorruption { context, incremental, full } => {
            assert_eq!(context, "after step 1");
            assert_eq!(incremental, "0");
            assert_eq!(full, "-1");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_reset_rebuilds_state() {
    let mut director = NetworkScoreDirector::new(board(&[0, 1]), network());
    director.calculate_score();
    director.reset_working_solution(board(&[5, 5, 5]));
    assert_eq!(director.calculate_score(), SimpleScore::of(-3));
    assert_eq!(director.entity_count(0), 3);
}

#[test]
fn test_added_and_removed_entities() {
    let mut director = NetworkScoreDirector::new(board(&[0, 1]), network());
    assert_eq!(director.calculate_score(), SimpleScore::ZERO);

    director.working_solution_mut().rows.push(1);
    director.after_entity_added(0, 2);
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));

    director.before_entity_removed(0, 2);
    director.working_solution_mut().rows.pop();
    assert_eq!(director.assert_score_integrity("after removal").unwrap(), SimpleScore::ZERO);
}

#[test]
fn test_constraint_match_totals() {
    let mut director = NetworkScoreDirector::new(board(&[4, 4, 4]), network());
    let totals = director.constraint_match_totals();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].constraint_ref.name, "Row conflict");
    assert_eq!(totals[0].match_count, 3);
    assert_eq!(totals[0].score, SimpleScore::of(-3));
}

#[test]
fn test_simple_director_caches_until_change() {
    let mut director = SimpleScoreDirector::new(board(&[0, 0]), conflicts);
    director.calculate_score();
    director.calculate_score();
    assert_eq!(director.calculation_count(), 1);
    set_row(&mut director, 0, 1);
    assert_eq!(director.calculate_score(), SimpleScore::ZERO);
    assert_eq!(director.calculation_count(), 2);
}
