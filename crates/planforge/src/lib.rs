//! Planforge - an incremental local search solver in Rust
//!
//! Declare constraints once as a network, describe the planning variables,
//! and let the solver construct and then improve a solution.
//!
//! # Example
//!
//! ```rust
//! use planforge::prelude::*;
//!
//! // Score types are re-exported
//! let score = HardSoftScore::of(0, -100);
//! assert_eq!(score.hard(), 0);
//! assert_eq!(score.soft(), -100);
//! assert!(score.is_feasible());
//! ```

pub mod logging;

// Score types
pub use planforge_core::{
    HardMediumSoftScore, HardSoftScore, Score, ScoreLevel, ScoreParseError, SimpleScore,
};

// Domain model and errors
pub use planforge_core::{
    ConstraintRef, EntityRef, ImpactType, PlanningSolution, Result, SolverError, ValueRange,
};

// Constraint network and score directors
pub use planforge_scoring::{
    collector, ConstraintFactory, ConstraintNetwork, NetworkScoreDirector, ScoreDirector,
    SimpleScoreDirector,
};

pub use planforge_config::{
    ConfigError, EnvironmentMode, MoveThreadCount, PhaseConfig, SolverConfig, TerminationConfig,
};

pub use planforge_solver::{
    build_solver, solve_many, BestSolution, PlanningVariable, SolveResult, Solver, SolverDomain,
    SolverEventListener, SolverStats, VariableDefinition,
};

/// Component-level access for hand-wired solvers.
pub mod solver {
    pub use planforge_solver::builder;
    pub use planforge_solver::event;
    pub use planforge_solver::heuristic;
    pub use planforge_solver::phase;
    pub use planforge_solver::termination;
}

pub mod prelude {
    pub use super::{
        HardMediumSoftScore, HardSoftScore, Score, SimpleScore,
    };
    pub use super::{PlanningSolution, ValueRange};
    pub use super::{ConstraintFactory, ConstraintNetwork, NetworkScoreDirector, ScoreDirector};
    pub use super::{build_solver, SolverConfig, SolverDomain, PlanningVariable, VariableDefinition};
}
