//! The constraint network.
//!
//! Constraints are declared through a [`ConstraintFactory`] and compiled into
//! an immutable [`ConstraintNetwork`]: an arena of nodes where each node only
//! knows its children by [`NodeId`]. A [`NetworkSession`] holds the node
//! memories for one working solution and turns fact inserts, updates and
//! retracts into score changes.
//!
//! ```
//! use std::sync::Arc;
//! use planforge_core::{EntityRef, PlanningSolution, SimpleScore};
//! use planforge_scoring::{ConstraintFactory, NetworkSession};
//!
//! #[derive(Clone)]
//! struct Board { rows: Vec<i64> }
//!
//! impl PlanningSolution for Board {
//!     type Score = SimpleScore;
//!     fn score(&self) -> Option<SimpleScore> { None }
//!     fn set_score(&mut self, _: Option<SimpleScore>) {}
//!     fn entity_count(&self, _: usize) -> usize { self.rows.len() }
//! }
//!
//! let mut factory = ConstraintFactory::<Board>::new();
//! let queens = factory.for_each(0);
//! let pairs = factory
//!     .join(queens, queens, |b: &Board, t| b.rows[t.index(0)], |b: &Board, t| b.rows[t.index(0)])
//!     .unwrap();
//! let conflicts = factory.filter(pairs, |_: &Board, t| t.index(0) < t.index(1)).unwrap();
//! factory.penalize("Row conflict", conflicts, SimpleScore::ONE).unwrap();
//! let network = Arc::new(factory.build().unwrap());
//!
//! let mut board = Board { rows: vec![0, 0, 1] };
//! let mut session = NetworkSession::new(Arc::clone(&network));
//! session.insert_all(&board);
//! assert_eq!(session.score(&board), SimpleScore::of(-1));
//!
//! board.rows[1] = 2;
//! session.update(EntityRef::new(0, 1));
//! assert_eq!(session.score(&board), SimpleScore::ZERO);
//! ```

mod builder;
pub mod collector;
mod node;
mod session;
mod tuple;

#[cfg(test)]
mod tests;

use std::fmt;

use planforge_core::{ConstraintRef, ImpactType, PlanningSolution, Score};

pub use builder::{ConstraintFactory, Stream};
pub use session::NetworkSession;
pub use tuple::{Element, Key, Tuple, TupleId};

use node::Node;

/// Handle of a node in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

pub(crate) struct ConstraintInfo<Sc> {
    pub constraint_ref: ConstraintRef,
    pub scorer: NodeId,
    pub weight: Sc,
    pub impact: ImpactType,
}

/// Score and match count of one constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatchTotal<Sc> {
    pub constraint_ref: ConstraintRef,
    pub impact: ImpactType,
    pub weight: Sc,
    pub score: Sc,
    pub match_count: usize,
}

/// A compiled, immutable constraint network.
pub struct ConstraintNetwork<S: PlanningSolution> {
    pub(crate) nodes: Vec<Node<S, S::Score>>,
    pub(crate) sources: Vec<(usize, NodeId)>,
    pub(crate) constraints: Vec<ConstraintInfo<S::Score>>,
}

impl<S: PlanningSolution> ConstraintNetwork<S> {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraint_refs(&self) -> impl Iterator<Item = &ConstraintRef> {
        self.constraints.iter().map(|c| &c.constraint_ref)
    }

    /// Descriptor classes the network reads facts from.
    pub fn descriptor_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.sources.iter().map(|&(descriptor_index, _)| descriptor_index)
    }

    /// Kind of the node behind `id`, for diagnostics.
    pub fn node_label(&self, id: NodeId) -> Option<&'static str> {
        self.nodes.get(id.0).map(|node| node.kind.label())
    }

    pub(crate) fn source_for(&self, descriptor_index: usize) -> Option<NodeId> {
        self.sources
            .iter()
            .find(|&&(d, _)| d == descriptor_index)
            .map(|&(_, id)| id)
    }
}

impl<S: PlanningSolution> fmt::Debug for ConstraintNetwork<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintNetwork")
            .field("nodes", &self.nodes.len())
            .field("sources", &self.sources)
            .field(
                "constraints",
                &self
                    .constraints
                    .iter()
                    .map(|c| c.constraint_ref.full_name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<Sc: Score> ConstraintInfo<Sc> {
    pub(crate) fn total(&self, score: Sc, match_count: usize) -> ConstraintMatchTotal<Sc> {
        ConstraintMatchTotal {
            constraint_ref: self.constraint_ref.clone(),
            impact: self.impact,
            weight: self.weight,
            score,
            match_count,
        }
    }
}
