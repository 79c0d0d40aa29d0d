//! Score directors: the solver's only door to the working solution.
//!
//! A director owns the working solution, is told about every variable change
//! through the before/after hooks, and answers score requests.
//!
//! - [`NetworkScoreDirector`] keeps a constraint network session in sync and
//!   scores incrementally
//! - [`SimpleScoreDirector`] recalculates the whole score with a closure

mod network;
mod simple;
mod traits;

#[cfg(test)]
mod tests;

pub use network::NetworkScoreDirector;
pub use simple::SimpleScoreDirector;
pub use traits::ScoreDirector;
