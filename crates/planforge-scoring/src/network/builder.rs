//! Declarative construction of a constraint network.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use planforge_core::{ConstraintRef, ImpactType, PlanningSolution, Result, Score, SolverError};
use tracing::debug;

use super::collector::Collector;
use super::node::{Edge, Node, NodeKind, Side};
use super::tuple::{Key, Tuple};
use super::{ConstraintInfo, ConstraintNetwork, NodeId};

static NEXT_FACTORY_ID: AtomicU64 = AtomicU64::new(0);

/// Handle of a stream of tuples inside one [`ConstraintFactory`].
///
/// Handles are `Copy` and may feed any number of downstream nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stream {
    node: NodeId,
    factory: u64,
}

impl Stream {
    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// Identifies structurally identical nodes.
///
/// Closures only take part when they capture nothing: then their type alone
/// determines their behaviour and two nodes with equal signatures compute
/// the same tuples.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Signature {
    Source(usize),
    Filter(NodeId, TypeId),
    Join(NodeId, NodeId, TypeId),
    Group(NodeId, TypeId),
}

fn stateless<F: 'static>() -> Option<TypeId> {
    (std::mem::size_of::<F>() == 0).then(TypeId::of::<F>)
}

/// Builder for a [`ConstraintNetwork`].
///
/// Every method takes and returns [`Stream`] handles. Filters, joins and
/// groups over the same inputs with the same non-capturing functions are
/// created once and shared by every constraint that uses them.
pub struct ConstraintFactory<S: PlanningSolution> {
    id: u64,
    package: String,
    nodes: Vec<Node<S, S::Score>>,
    signatures: HashMap<Signature, NodeId>,
    constraints: Vec<ConstraintInfo<S::Score>>,
    shared_hits: usize,
}

impl<S: PlanningSolution> Default for ConstraintFactory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution> ConstraintFactory<S> {
    pub fn new() -> Self {
        Self::with_package("")
    }

    /// Creates a factory whose constraints live in `package`.
    pub fn with_package(package: impl Into<String>) -> Self {
        ConstraintFactory {
            id: NEXT_FACTORY_ID.fetch_add(1, Ordering::Relaxed),
            package: package.into(),
            nodes: Vec::new(),
            signatures: HashMap::new(),
            constraints: Vec::new(),
            shared_hits: 0,
        }
    }

    /// Number of node requests answered with an existing node.
    pub fn shared_hits(&self) -> usize {
        self.shared_hits
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every fact of one descriptor class, as single-fact tuples.
    pub fn for_each(&mut self, descriptor_index: usize) -> Stream {
        self.add_node(
            Some(Signature::Source(descriptor_index)),
            NodeKind::Source { descriptor_index },
            &[],
        )
    }

    /// Tuples of `stream` for which `predicate` holds.
    pub fn filter<F>(&mut self, stream: Stream, predicate: F) -> Result<Stream>
    where
        F: Fn(&S, &Tuple) -> bool + Send + Sync + 'static,
    {
        let parent = self.check(stream)?;
        let signature = stateless::<F>().map(|t| Signature::Filter(parent, t));
        Ok(self.add_node(
            signature,
            NodeKind::Filter {
                predicate: Arc::new(predicate),
            },
            &[(parent, Side::Left)],
        ))
    }

    /// Pairs of tuples from `left` and `right` with equal keys.
    ///
    /// The joined tuple holds the left elements followed by the right ones.
    /// `left` and `right` may be the same stream. Chain joins to combine
    /// more than two streams.
    pub fn join<L, R, K>(&mut self, left: Stream, right: Stream, left_key: L, right_key: R) -> Result<Stream>
    where
        L: Fn(&S, &Tuple) -> K + Send + Sync + 'static,
        R: Fn(&S, &Tuple) -> K + Send + Sync + 'static,
        K: Into<Key> + 'static,
    {
        let left_parent = self.check(left)?;
        let right_parent = self.check(right)?;
        let signature =
            stateless::<(L, R)>().map(|t| Signature::Join(left_parent, right_parent, t));
        Ok(self.add_node(
            signature,
            NodeKind::Join {
                left_key: Arc::new(move |s: &S, t: &Tuple| left_key(s, t).into()),
                right_key: Arc::new(move |s: &S, t: &Tuple| right_key(s, t).into()),
            },
            &[(left_parent, Side::Left), (right_parent, Side::Right)],
        ))
    }

    /// One tuple per distinct key, carrying the collected value of its members.
    ///
    /// Downstream functions read the key with [`Tuple::group_key`] and the
    /// collected value with [`Tuple::aggregate`].
    pub fn group_by<K, C, V, G>(&mut self, stream: Stream, key: K, collector: C, value: V) -> Result<Stream>
    where
        K: Fn(&S, &Tuple) -> G + Send + Sync + 'static,
        C: Collector + 'static,
        V: Fn(&S, &Tuple) -> i64 + Send + Sync + 'static,
        G: Into<Key> + 'static,
    {
        let parent = self.check(stream)?;
        let signature = stateless::<(K, C, V)>().map(|t| Signature::Group(parent, t));
        Ok(self.add_node(
            signature,
            NodeKind::Group {
                key: Arc::new(move |s: &S, t: &Tuple| key(s, t).into()),
                value: Arc::new(value),
                collector: Arc::new(collector),
            },
            &[(parent, Side::Left)],
        ))
    }

    /// Penalizes every tuple of `stream` by `weight`.
    pub fn penalize(&mut self, name: &str, stream: Stream, weight: S::Score) -> Result<()> {
        self.impact(name, stream, ImpactType::Penalty, weight, |_: &S, _: &Tuple| 1)
    }

    /// Penalizes every tuple of `stream` by `weight` times its match weight.
    pub fn penalize_weighted<W>(&mut self, name: &str, stream: Stream, weight: S::Score, match_weight: W) -> Result<()>
    where
        W: Fn(&S, &Tuple) -> i64 + Send + Sync + 'static,
    {
        self.impact(name, stream, ImpactType::Penalty, weight, match_weight)
    }

    pub fn reward(&mut self, name: &str, stream: Stream, weight: S::Score) -> Result<()> {
        self.impact(name, stream, ImpactType::Reward, weight, |_: &S, _: &Tuple| 1)
    }

    pub fn reward_weighted<W>(&mut self, name: &str, stream: Stream, weight: S::Score, match_weight: W) -> Result<()>
    where
        W: Fn(&S, &Tuple) -> i64 + Send + Sync + 'static,
    {
        self.impact(name, stream, ImpactType::Reward, weight, match_weight)
    }

    fn impact<W>(
        &mut self,
        name: &str,
        stream: Stream,
        impact: ImpactType,
        weight: S::Score,
        match_weight: W,
    ) -> Result<()>
    where
        W: Fn(&S, &Tuple) -> i64 + Send + Sync + 'static,
    {
        let parent = self.check(stream)?;
        let constraint_ref = ConstraintRef::new(self.package.clone(), name);
        if weight.single_level().is_none() {
            return Err(SolverError::configuration(format!(
                "constraint '{}' has weight {}, which must have exactly one nonzero level",
                constraint_ref, weight
            )));
        }
        if self.constraints.iter().any(|c| c.constraint_ref == constraint_ref) {
            return Err(SolverError::configuration(format!(
                "constraint '{}' is defined twice",
                constraint_ref
            )));
        }
        let scorer = self.add_node(
            None,
            NodeKind::Scorer {
                weight: weight.scaled(impact.sign()),
                match_weight: Arc::new(match_weight),
            },
            &[(parent, Side::Left)],
        );
        self.constraints.push(ConstraintInfo {
            constraint_ref,
            scorer: scorer.node,
            weight,
            impact,
        });
        Ok(())
    }

    /// Compiles the declared constraints.
    ///
    /// Nodes that feed no constraint are left out of propagation.
    pub fn build(mut self) -> Result<ConstraintNetwork<S>> {
        if self.constraints.is_empty() {
            return Err(SolverError::configuration("constraint network defines no constraints"));
        }

        // Children always have higher indices than their parents.
        let mut live = vec![false; self.nodes.len()];
        for index in (0..self.nodes.len()).rev() {
            let node = &self.nodes[index];
            live[index] = matches!(node.kind, NodeKind::Scorer { .. })
                || node.children.iter().any(|edge| live[edge.target.0]);
        }
        for node in &mut self.nodes {
            node.children.retain(|edge| live[edge.target.0]);
        }

        let sources = self
            .nodes
            .iter()
            .enumerate()
            .filter(|&(index, _)| live[index])
            .filter_map(|(index, node)| match node.kind {
                NodeKind::Source { descriptor_index } => Some((descriptor_index, NodeId(index))),
                _ => None,
            })
            .collect();

        debug!(
            event = "network_built",
            nodes = self.nodes.len(),
            live_nodes = live.iter().filter(|&&l| l).count(),
            shared_hits = self.shared_hits,
            constraints = self.constraints.len(),
        );

        Ok(ConstraintNetwork {
            nodes: self.nodes,
            sources,
            constraints: self.constraints,
        })
    }

    fn check(&self, stream: Stream) -> Result<NodeId> {
        if stream.factory != self.id || stream.node.0 >= self.nodes.len() {
            return Err(SolverError::configuration(format!(
                "stream {} was not created by this constraint factory",
                stream.node
            )));
        }
        Ok(stream.node)
    }

    fn stream(&self, node: NodeId) -> Stream {
        Stream {
            node,
            factory: self.id,
        }
    }

    fn add_node(
        &mut self,
        signature: Option<Signature>,
        kind: NodeKind<S, S::Score>,
        parents: &[(NodeId, Side)],
    ) -> Stream {
        if let Some(existing) = signature.as_ref().and_then(|s| self.signatures.get(s).copied()) {
            self.shared_hits += 1;
            return self.stream(existing);
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
        });
        for &(parent, side) in parents {
            self.nodes[parent.0].children.push(Edge { target: id, side });
        }
        if let Some(signature) = signature {
            self.signatures.insert(signature, id);
        }
        self.stream(id)
    }
}
