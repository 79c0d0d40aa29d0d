//! Acceptors for local search move acceptance.
//!
//! Acceptors determine whether a move should be accepted based on
//! comparing the resulting score with the previous step's score.

mod accept_all;
mod hill_climbing;
mod late_acceptance;

use std::fmt::Debug;

use planforge_core::PlanningSolution;

use crate::event::{LifecycleContext, LifecycleEvent};

pub use accept_all::AcceptAllAcceptor;
pub use hill_climbing::HillClimbingAcceptor;
pub use late_acceptance::LateAcceptanceAcceptor;

/// Trait for accepting or rejecting moves in local search.
///
/// Acceptors implement different strategies for escaping local optima.
/// Any state they keep is driven by lifecycle events.
pub trait Acceptor<S: PlanningSolution>: Send + Debug {
    /// Returns true if a move resulting in `move_score` should be accepted,
    /// given the previous step's score.
    fn is_accepted(&mut self, last_step_score: &S::Score, move_score: &S::Score) -> bool;

    fn on_lifecycle(&mut self, _event: LifecycleEvent, _context: &LifecycleContext<'_, S>) {}
}
