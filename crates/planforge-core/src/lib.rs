//! planforge core - shared types for the planforge solver
//!
//! This crate provides the vocabulary every other planforge crate speaks:
//! - Score types and the [`Score`] trait
//! - Domain traits describing the working solution
//! - Constraint identity and impact direction
//! - The solver error taxonomy

pub mod constraint;
pub mod domain;
pub mod error;
pub mod score;

pub use constraint::{ConstraintRef, ImpactType};
pub use domain::{EntityRef, PlanningSolution, ValueRange};
pub use error::{Result, SolverError};
pub use score::{
    HardMediumSoftScore, HardSoftScore, Score, ScoreLevel, ScoreParseError, SimpleScore,
};
