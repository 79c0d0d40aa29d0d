//! N-Queens problem test fixtures.
//!
//! Queens sit in fixed columns and the planning variable is the row. Two
//! queens conflict when they share a row or a diagonal.
//!
//! # Example
//!
//! ```
//! use planforge_test::nqueens::{create_nqueens_director, calculate_conflicts};
//! use planforge_scoring::ScoreDirector;
//!
//! let mut director = create_nqueens_director(&[0, 2, 1, 3]);
//! let score = director.calculate_score();
//! assert_eq!(score, calculate_conflicts(director.working_solution()));
//! ```

use std::sync::Arc;

use planforge_core::{PlanningSolution, SimpleScore};
use planforge_scoring::{
    ConstraintFactory, ConstraintNetwork, NetworkScoreDirector, SimpleScoreDirector, Tuple,
};

/// Descriptor index of the queen entity class.
pub const QUEEN: usize = 0;

/// Name of the row planning variable.
pub const ROW: &str = "row";

#[derive(Clone, Debug, PartialEq)]
pub struct Queen {
    pub column: i64,
    pub row: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct NQueensSolution {
    pub queens: Vec<Queen>,
    pub score: Option<SimpleScore>,
}

impl NQueensSolution {
    /// Board with every queen placed on the given rows.
    pub fn with_rows(rows: &[i64]) -> Self {
        Self::with_optional_rows(&rows.iter().copied().map(Some).collect::<Vec<_>>())
    }

    /// Board of `n` queens with no rows assigned.
    pub fn uninitialized(n: usize) -> Self {
        Self::with_optional_rows(&vec![None; n])
    }

    pub fn with_optional_rows(rows: &[Option<i64>]) -> Self {
        let queens = rows
            .iter()
            .enumerate()
            .map(|(column, &row)| Queen {
                column: column as i64,
                row,
            })
            .collect();
        NQueensSolution {
            queens,
            score: None,
        }
    }

    pub fn rows(&self) -> Vec<Option<i64>> {
        self.queens.iter().map(|q| q.row).collect()
    }
}

impl PlanningSolution for NQueensSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<SimpleScore> {
        self.score
    }

    fn set_score(&mut self, score: Option<SimpleScore>) {
        self.score = score;
    }

    fn entity_count(&self, descriptor_index: usize) -> usize {
        if descriptor_index == QUEEN {
            self.queens.len()
        } else {
            0
        }
    }

    fn uninitialized_count(&self) -> usize {
        self.queens.iter().filter(|q| q.row.is_none()).count()
    }
}

pub fn get_queen_row(s: &NQueensSolution, idx: usize) -> Option<i64> {
    s.queens.get(idx).and_then(|q| q.row)
}

pub fn set_queen_row(s: &mut NQueensSolution, idx: usize, v: Option<i64>) {
    if let Some(queen) = s.queens.get_mut(idx) {
        queen.row = v;
    }
}

/// Value range provider: every row of the board.
pub fn row_range(s: &NQueensSolution) -> Vec<i64> {
    (0..s.queens.len() as i64).collect()
}

/// Brute-force conflict count.
pub fn calculate_conflicts(solution: &NQueensSolution) -> SimpleScore {
    let queens = &solution.queens;
    let mut conflicts = 0i64;
    for i in 0..queens.len() {
        for j in (i + 1)..queens.len() {
            if let (Some(row_i), Some(row_j)) = (queens[i].row, queens[j].row) {
                if row_i == row_j {
                    conflicts += 1;
                }
                if (row_i - row_j).abs() == (queens[j].column - queens[i].column).abs() {
                    conflicts += 1;
                }
            }
        }
    }
    SimpleScore::of(-conflicts)
}

fn queen<'a>(s: &'a NQueensSolution, t: &Tuple) -> &'a Queen {
    &s.queens[t.index(0)]
}

fn placed(s: &NQueensSolution, t: &Tuple) -> bool {
    queen(s, t).row.is_some()
}

fn row(s: &NQueensSolution, t: &Tuple) -> i64 {
    queen(s, t).row.unwrap_or(-1)
}

fn ascending_diagonal(s: &NQueensSolution, t: &Tuple) -> i64 {
    let q = queen(s, t);
    q.row.unwrap_or(-1) + q.column
}

fn descending_diagonal(s: &NQueensSolution, t: &Tuple) -> i64 {
    let q = queen(s, t);
    q.row.unwrap_or(-1) - q.column
}

fn ordered(_: &NQueensSolution, t: &Tuple) -> bool {
    t.index(0) < t.index(1)
}

/// Compiles the three conflict constraints into a shared network.
///
/// # Panics
///
/// Never in practice; the declarations below are statically valid.
pub fn nqueens_network() -> Arc<ConstraintNetwork<NQueensSolution>> {
    let mut f = ConstraintFactory::<NQueensSolution>::with_package("nqueens");
    let queens = f.for_each(QUEEN);
    let placed = f.filter(queens, placed).expect("filter");

    let same_row = f.join(placed, placed, row, row).expect("join");
    let same_row = f.filter(same_row, ordered).expect("filter");
    f.penalize("Row conflict", same_row, SimpleScore::ONE)
        .expect("penalize");

    let ascending = f
        .join(placed, placed, ascending_diagonal, ascending_diagonal)
        .expect("join");
    let ascending = f.filter(ascending, ordered).expect("filter");
    f.penalize("Ascending diagonal conflict", ascending, SimpleScore::ONE)
        .expect("penalize");

    let descending = f
        .join(placed, placed, descending_diagonal, descending_diagonal)
        .expect("join");
    let descending = f.filter(descending, ordered).expect("filter");
    f.penalize("Descending diagonal conflict", descending, SimpleScore::ONE)
        .expect("penalize");

    Arc::new(f.build().expect("network"))
}

pub type NQueensDirector = NetworkScoreDirector<NQueensSolution>;

pub type SimpleNQueensDirector =
    SimpleScoreDirector<NQueensSolution, fn(&NQueensSolution) -> SimpleScore>;

/// Incremental director over a fully placed board.
pub fn create_nqueens_director(rows: &[i64]) -> NQueensDirector {
    NetworkScoreDirector::new(NQueensSolution::with_rows(rows), nqueens_network())
}

/// Incremental director over a board with optional rows.
pub fn create_partial_nqueens_director(rows: &[Option<i64>]) -> NQueensDirector {
    NetworkScoreDirector::new(NQueensSolution::with_optional_rows(rows), nqueens_network())
}

/// Full-recalculation director over a fully placed board.
pub fn create_simple_nqueens_director(rows: &[i64]) -> SimpleNQueensDirector {
    SimpleScoreDirector::new(
        NQueensSolution::with_rows(rows),
        calculate_conflicts as fn(&NQueensSolution) -> SimpleScore,
    )
}
