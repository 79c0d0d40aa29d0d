//! Domain model traits for defining planning problems
//!
//! - [`PlanningSolution`]: the working solution the solver mutates in place
//! - [`EntityRef`]: address of one entity or fact inside the solution
//! - [`ValueRange`]: legal values of a planning variable

mod entity_ref;
mod traits;
mod value_range;

#[cfg(test)]
mod tests;

pub use entity_ref::EntityRef;
pub use traits::PlanningSolution;
pub use value_range::ValueRange;
