//! Solver statistics.
//!
//! Plain counters owned by the solver scope and reported at the end of a run.

use std::time::{Duration, Instant};

/// Solver-level statistics.
///
/// # Example
///
/// ```
/// use planforge_solver::stats::SolverStats;
///
/// let mut stats = SolverStats::default();
/// stats.start();
/// stats.record_step();
/// stats.record_move(true);
/// stats.record_move(false);
/// stats.record_illegal_move();
///
/// assert_eq!(stats.step_count, 1);
/// assert_eq!(stats.moves_evaluated, 2);
/// assert_eq!(stats.moves_accepted, 1);
/// assert_eq!(stats.illegal_moves, 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct SolverStats {
    start_time: Option<Instant>,
    /// Steps taken across all phases.
    pub step_count: u64,
    /// Doable candidates scored across all phases.
    pub moves_evaluated: u64,
    pub moves_accepted: u64,
    /// Candidates skipped because they were not doable.
    pub illegal_moves: u64,
    /// Times the best solution improved.
    pub best_score_improvements: u64,
    /// Score calculations reported by the director at the end of solving.
    pub score_calculations: u64,
}

impl SolverStats {
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Records a scored candidate and whether it was accepted.
    pub fn record_move(&mut self, accepted: bool) {
        self.moves_evaluated += 1;
        if accepted {
            self.moves_accepted += 1;
        }
    }

    pub fn record_illegal_move(&mut self) {
        self.illegal_moves += 1;
    }

    pub fn record_step(&mut self) {
        self.step_count += 1;
    }

    pub fn record_improvement(&mut self) {
        self.best_score_improvements += 1;
    }

    pub fn moves_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.moves_evaluated as f64 / secs
        } else {
            0.0
        }
    }

    /// Accepted over evaluated, 0 when nothing was evaluated.
    pub fn acceptance_rate(&self) -> f64 {
        if self.moves_evaluated == 0 {
            0.0
        } else {
            self.moves_accepted as f64 / self.moves_evaluated as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance_rate() {
        let mut stats = SolverStats::default();
        assert_eq!(stats.acceptance_rate(), 0.0);
        stats.record_move(true);
        stats.record_move(false);
        stats.record_move(false);
        stats.record_move(true);
        assert_eq!(stats.acceptance_rate(), 0.5);
    }

    #[test]
    fn test_elapsed_before_start_is_zero() {
        let stats = SolverStats::default();
        assert_eq!(stats.elapsed(), Duration::ZERO);
        assert_eq!(stats.moves_per_second(), 0.0);
    }
}
