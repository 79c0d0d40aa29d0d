//! Move selector decorators that combine or restrict other move selectors.
//!
//! - [`UnionMoveSelector`] - draws from one child at a time
//! - [`CartesianMoveSelector`] - one move from every child, applied together
//! - [`FilteringMoveSelector`] - drops moves a predicate rejects

mod cartesian;
mod filtering;
mod union;

pub use cartesian::CartesianMoveSelector;
pub use filtering::{FilteringMoveSelector, MoveFilter};
pub use union::{UnionMoveSelector, UnionWeights};
