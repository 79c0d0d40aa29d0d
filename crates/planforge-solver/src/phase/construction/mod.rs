//! Construction heuristic phase
//!
//! Builds an initial solution by assigning values to uninitialized
//! planning variables one at a time.

mod phase;
mod placer;

#[cfg(test)]
mod tests;

pub use phase::ConstructionHeuristicPhase;
pub use placer::{EntityPlacer, Placement};
pub use planforge_config::{ConstructionHeuristicType, ConstructionPickEarlyType};
