//! Error types for planforge

use thiserror::Error;

/// Errors surfaced while building or running a solver.
///
/// Only build-time and integrity failures are represented here. A move that
/// reports itself as not doable is skipped and counted by the driver, and a
/// termination request ends a phase normally rather than through an error.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Malformed constraint network, selector graph or solver configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The incremental score disagrees with a full recalculation.
    #[error("Score corruption {context}: incremental score {incremental} but full recalculation gives {full}")]
    ScoreCorruption {
        context: String,
        incremental: String,
        full: String,
    },

    /// Undoing a move did not restore the score from before the move.
    #[error("Undo corruption after {move_description}: score before move was {before} but after undo is {after}")]
    UndoCorruption {
        move_description: String,
        before: String,
        after: String,
    },

    /// A move was applied although it is not doable.
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    /// Operation invalid for the current solver state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl SolverError {
    /// Shorthand for a [`SolverError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        SolverError::Configuration(message.into())
    }

    /// Returns true if this error must abort the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SolverError::IllegalMove(_))
    }
}

/// Result type alias for planforge operations
pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message() {
        let err = SolverError::configuration("empty union");
        assert_eq!(err.to_string(), "Configuration error: empty union");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_illegal_move_is_not_fatal() {
        let err = SolverError::IllegalMove("queen 3 to row 3".to_string());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_score_corruption_message() {
        let err = SolverError::ScoreCorruption {
            context: "after step 4".to_string(),
            incremental: "-2".to_string(),
            full: "-3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Score corruption after step 4: incremental score -2 but full recalculation gives -3"
        );
    }
}
