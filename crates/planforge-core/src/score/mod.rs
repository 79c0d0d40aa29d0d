//! Score types for representing solution quality
//!
//! A score is an immutable, totally ordered vector of levels. Levels are
//! compared from the first (most important) to the last.

#[macro_use]
mod macros;

mod hard_medium_soft;
mod hard_soft;
mod simple;
mod traits;

#[cfg(test)]
mod tests;

pub use hard_medium_soft::HardMediumSoftScore;
pub use hard_soft::HardSoftScore;
pub use simple::SimpleScore;
pub use traits::{Score, ScoreParseError};

/// Priority class of a score level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreLevel {
    /// Must be satisfied for the solution to be feasible.
    Hard,
    Medium,
    /// Optimization objective.
    Soft,
}
