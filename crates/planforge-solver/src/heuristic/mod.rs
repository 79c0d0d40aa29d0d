//! Heuristic building blocks: planning variables, moves and selectors.

pub mod r#move;
pub mod selector;
pub mod variable;

pub use r#move::{CandidateMove, ChangeMove, CompositeMove, Move, MoveArena, SwapMove};
pub use selector::{
    CartesianMoveSelector, ChangeMoveSelector, EntitySelector, FilteringMoveSelector,
    MoveFilter, MoveSelector, SelectionOrder, SwapMoveSelector, UnionMoveSelector, UnionWeights,
    ValueSelector,
};
pub use variable::{PlanningValue, PlanningVariable, VariableDefinition};
