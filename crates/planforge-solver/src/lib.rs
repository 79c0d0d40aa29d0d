//! Planforge Solver Engine
//!
//! This crate provides the main solver implementation including:
//! - The `Solver` entry point and multi-seed `solve_many`
//! - Phases (construction heuristic, local search)
//! - Move and selector system
//! - Acceptors, foragers and parallel candidate evaluation
//! - Termination conditions
//! - Lifecycle events for selectors, phases and listeners
//! - Configuration wiring (builder module)

pub mod builder;
pub mod event;
pub mod heuristic;
pub mod phase;
pub mod scope;
pub mod solver;
pub mod stats;
pub mod termination;

#[cfg(test)]
mod test_utils;

pub use builder::{
    build_solver, AcceptorBuilder, ForagerBuilder, MoveSelectorBuilder, PhaseBuilder,
    SolverDomain, TerminationBuilder,
};
pub use event::{
    CountingEventListener, LifecycleContext, LifecycleEvent, LifecycleTracker,
    SolverEventListener, SolverEventSupport,
};
pub use heuristic::{
    CandidateMove, CartesianMoveSelector, ChangeMove, ChangeMoveSelector, CompositeMove,
    EntitySelector, FilteringMoveSelector, Move, MoveArena, MoveFilter, MoveSelector,
    PlanningValue, PlanningVariable, SelectionOrder, SwapMove, SwapMoveSelector,
    UnionMoveSelector, UnionWeights, ValueSelector, VariableDefinition,
};
pub use phase::{
    construction::{
        ConstructionHeuristicPhase, ConstructionHeuristicType, ConstructionPickEarlyType,
        EntityPlacer, Placement,
    },
    localsearch::{
        AcceptAllAcceptor, Acceptor, BestScoreForager, FirstAcceptedForager, Forager,
        HillClimbingAcceptor, LateAcceptanceAcceptor, LocalSearchPhase, NoAcceptedMovePolicy,
        ParallelEvaluator, ProbabilisticForager,
    },
    Phase, PhaseOutcome,
};
pub use scope::{BestSolution, PhaseScope, SolverScope, StepScope};
pub use solver::{solve_many, SolveResult, Solver};
pub use stats::SolverStats;
pub use termination::{
    AndTermination, BestScoreFeasibleTermination, BestScoreTermination, ExternalTermination,
    OrTermination, StepCountTermination, Termination, TerminationContext, TimeTermination,
    UnimprovedStepCountTermination,
};
