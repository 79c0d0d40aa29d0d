//! Local search phase
//!
//! Improves a complete solution one step at a time. Each step scores a set
//! of candidates drawn from a move selector, filters them through an
//! [`Acceptor`] and lets a [`Forager`] pick the winner to commit.

mod acceptor;
pub(crate) mod evaluator;
mod forager;
mod phase;

#[cfg(test)]
mod tests;

pub use acceptor::{AcceptAllAcceptor, Acceptor, HillClimbingAcceptor, LateAcceptanceAcceptor};
pub use evaluator::ParallelEvaluator;
pub use forager::{BestScoreForager, FirstAcceptedForager, Forager, ProbabilisticForager};
pub use phase::LocalSearchPhase;
pub use planforge_config::NoAcceptedMovePolicy;
