//! Candidate scoring.
//!
//! Every candidate is scored by applying it, reading the score and undoing
//! it again, so the working solution is unchanged afterwards. The parallel
//! evaluator does the same on cloned directors inside a dedicated rayon pool;
//! the canonical director is only read to make the clones.

use std::fmt::{self, Debug};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use planforge_config::EnvironmentMode;
use planforge_core::{PlanningSolution, Result, SolverError};
use planforge_scoring::ScoreDirector;

use crate::heuristic::r#move::{CandidateMove, Move};
use crate::heuristic::variable::PlanningValue;

/// Applies `candidate`, reads the resulting score and undoes it.
///
/// Under `FullAssert` the score after the move is checked against a full
/// recalculation, and the score after the undo must equal the score before
/// the move.
pub(crate) fn score_candidate<S, M, D>(
    director: &mut D,
    candidate: &M,
    mode: EnvironmentMode,
) -> Result<S::Score>
where
    S: PlanningSolution,
    M: Move<S>,
    D: ScoreDirector<S>,
{
    let before = if mode.is_fully_asserted() {
        Some(director.calculate_score())
    } else {
        None
    };

    let undo = candidate.create_undo_move(director);
    candidate.do_move(director);
    let score = if mode.is_fully_asserted() {
        director.assert_score_integrity(&format!("after candidate {:?}", candidate))?
    } else {
        director.calculate_score()
    };
    undo.do_move(director);

    if let Some(before) = before {
        let after = director.calculate_score();
        if after != before {
            return Err(SolverError::UndoCorruption {
                move_description: format!("{:?}", candidate),
                before: before.to_string(),
                after: after.to_string(),
            });
        }
        director.assert_score_integrity(&format!("after undo of {:?}", candidate))?;
    }
    Ok(score)
}

/// Scores batches of candidates on a fixed-size thread pool.
pub struct ParallelEvaluator {
    pool: ThreadPool,
    thread_count: usize,
}

impl ParallelEvaluator {
    pub fn new(thread_count: usize) -> Result<Self> {
        if thread_count == 0 {
            return Err(SolverError::configuration(
                "parallel evaluation needs at least one thread",
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(|i| format!("planforge-move-{i}"))
            .build()
            .map_err(|e| SolverError::configuration(format!("move thread pool: {e}")))?;
        Ok(Self { pool, thread_count })
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Scores `candidates` and returns the results in input order.
    ///
    /// Candidates are split into one contiguous slice per worker, and each
    /// worker scores its slice on its own clone of `director`.
    pub fn score_all<S, V, D>(
        &self,
        director: &D,
        candidates: &[CandidateMove<S, V>],
        mode: EnvironmentMode,
    ) -> Vec<Result<S::Score>>
    where
        S: PlanningSolution,
        V: PlanningValue,
        D: ScoreDirector<S> + Clone,
    {
        if candidates.is_empty() {
            return Vec::new();
        }
        let per_worker = candidates.len().div_ceil(self.thread_count);
        let mut workers: Vec<D> = candidates
            .chunks(per_worker)
            .map(|_| director.clone())
            .collect();

        let scored: Vec<Vec<Result<S::Score>>> = self.pool.install(|| {
            workers
                .par_iter_mut()
                .zip(candidates.par_chunks(per_worker))
                .map(|(worker, slice)| {
                    slice
                        .iter()
                        .map(|candidate| score_candidate(worker, candidate, mode))
                        .collect()
                })
                .collect()
        });
        scored.into_iter().flatten().collect()
    }
}

impl Debug for ParallelEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelEvaluator")
            .field("thread_count", &self.thread_count)
            .finish()
    }
}
