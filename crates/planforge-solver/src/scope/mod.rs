//! Scope hierarchy for solving.
//!
//! A [`SolverScope`] owns everything that lives for a whole solve. A
//! [`PhaseScope`] borrows it for one phase and a [`StepScope`] borrows the
//! phase scope for one step, so the borrow checker enforces the nesting.

mod phase;
mod solver;
mod step;


pub use phase::PhaseScope;
pub use solver::{BestSolution, SolverScope};
pub use step::StepScope;
