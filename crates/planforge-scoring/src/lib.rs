//! Incremental constraint scoring for planforge.
//!
//! This crate provides:
//! - The constraint network: a compiled dataflow graph of source, filter,
//!   join, group and scorer nodes kept consistent under fact mutations
//! - [`ConstraintFactory`] for declaring constraints against that graph
//! - Score directors that bracket every variable change for the solver
//!
//! # Architecture
//!
//! Nodes live in an arena addressed by [`NodeId`]. A compiled
//! [`ConstraintNetwork`] is immutable and shared behind an `Arc`; all
//! mutable node memories live in a [`NetworkSession`], so a from-scratch
//! recalculation is simply a fresh session over the same network.

pub mod director;
pub mod network;

pub use director::{NetworkScoreDirector, ScoreDirector, SimpleScoreDirector};
pub use network::collector::{self, Accumulator, Collector};
pub use network::{
    ConstraintFactory, ConstraintMatchTotal, ConstraintNetwork, Key, NetworkSession, NodeId,
    Stream, Tuple,
};
