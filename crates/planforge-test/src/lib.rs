//! Shared test fixtures for planforge crates.
//!
//! - [`nqueens`]: N-Queens with both an incremental network director and a
//!   full-recalculation director over the same rules
//! - [`task`]: a tiny two-variable model for selector and move tests

pub mod nqueens;
pub mod task;
