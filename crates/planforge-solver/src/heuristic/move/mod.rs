//! Moves: reversible changes to the working solution.
//!
//! Every move can produce its undo from the state it is about to change,
//! so `undo(do(m))` restores the solution and the score exactly.

mod arena;
mod candidate;
mod change;
mod composite;
mod swap;
mod traits;

#[cfg(test)]
mod tests;

pub use arena::MoveArena;
pub use candidate::CandidateMove;
pub use change::ChangeMove;
pub use composite::CompositeMove;
pub use swap::SwapMove;
pub use traits::Move;
