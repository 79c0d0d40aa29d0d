//! Mutable state of a network for one working solution.

use std::collections::VecDeque;
use std::sync::Arc;

use planforge_core::{EntityRef, PlanningSolution, Score};
use tracing::trace;

use super::node::{Delta, NodeKind, NodeMemory, Side};
use super::tuple::{Element, Tuple, TupleId};
use super::{ConstraintMatchTotal, ConstraintNetwork, NodeId};

#[derive(Debug, Clone)]
struct Pending {
    target: NodeId,
    side: Side,
    delta: Delta,
}

/// Node memories and pending deltas of one [`ConstraintNetwork`].
///
/// Mutations are queued and only propagated when the score is requested,
/// so a batch of changes settles in one pass. Every read of the score first
/// drains the queue; a partially propagated state is never returned.
///
/// Deltas are processed in FIFO order. Closures read the solution as it is
/// when their node processes a delta, so the solution must not change while
/// [`settle`](Self::settle) runs, and every changed fact must be reported
/// through [`update`](Self::update) before the next settle.
#[derive(Clone)]
pub struct NetworkSession<S: PlanningSolution> {
    network: Arc<ConstraintNetwork<S>>,
    memories: Vec<NodeMemory<S::Score>>,
    queue: VecDeque<Pending>,
    score: S::Score,
}

impl<S: PlanningSolution> NetworkSession<S> {
    /// Creates an empty session. No facts are known until inserted.
    pub fn new(network: Arc<ConstraintNetwork<S>>) -> Self {
        let memories = network.nodes.iter().map(|node| node.kind.new_memory()).collect();
        NetworkSession {
            network,
            memories,
            queue: VecDeque::new(),
            score: S::Score::zero(),
        }
    }

    /// Scores `solution` from scratch on a fresh session.
    pub fn full_score(network: &Arc<ConstraintNetwork<S>>, solution: &S) -> S::Score {
        let mut session = Self::new(Arc::clone(network));
        session.insert_all(solution);
        session.score(solution)
    }

    pub fn network(&self) -> &Arc<ConstraintNetwork<S>> {
        &self.network
    }

    /// Queues every fact of every descriptor class the network reads.
    pub fn insert_all(&mut self, solution: &S) {
        let sources = self.network.sources.clone();
        for (descriptor_index, node) in sources {
            for entity_index in 0..solution.entity_count(descriptor_index) {
                let fact = EntityRef::new(descriptor_index, entity_index);
                self.enqueue_source(node, Delta::Insert(Tuple::of_fact(fact, node)));
            }
        }
    }

    /// Queues a newly present fact.
    pub fn insert(&mut self, fact: EntityRef) {
        if let Some(node) = self.network.source_for(fact.descriptor_index) {
            self.enqueue_source(node, Delta::Insert(Tuple::of_fact(fact, node)));
        }
    }

    /// Queues a fact whose contents changed.
    pub fn update(&mut self, fact: EntityRef) {
        if let Some(node) = self.network.source_for(fact.descriptor_index) {
            self.enqueue_source(node, Delta::Update(Tuple::of_fact(fact, node)));
        }
    }

    /// Queues the removal of a fact.
    pub fn retract(&mut self, fact: EntityRef) {
        if let Some(node) = self.network.source_for(fact.descriptor_index) {
            let mut id = TupleId::new();
            id.push(Element::Fact(fact));
            self.enqueue_source(node, Delta::Retract(id));
        }
    }

    pub fn is_settled(&self) -> bool {
        self.queue.is_empty()
    }

    /// Propagates all pending deltas and returns how many were processed.
    pub fn settle(&mut self, solution: &S) -> usize {
        let mut processed = 0;
        let mut out = Vec::new();
        while let Some(pending) = self.queue.pop_front() {
            self.process(solution, pending, &mut out);
            processed += 1;
        }
        if processed > 0 {
            trace!(event = "network_settled", deltas = processed, score = %self.score);
        }
        processed
    }

    /// Settles and returns the aggregate score.
    pub fn score(&mut self, solution: &S) -> S::Score {
        self.settle(solution);
        self.score
    }

    /// Settles and returns the score and match count of every constraint.
    pub fn constraint_match_totals(&mut self, solution: &S) -> Vec<ConstraintMatchTotal<S::Score>> {
        self.settle(solution);
        self.network
            .constraints
            .iter()
            .map(|info| match &self.memories[info.scorer.0] {
                NodeMemory::Scorer(memory) => info.total(memory.total(), memory.match_count()),
                _ => info.total(S::Score::zero(), 0),
            })
            .collect()
    }

    fn enqueue_source(&mut self, node: NodeId, delta: Delta) {
        self.queue.push_back(Pending {
            target: node,
            side: Side::Left,
            delta,
        });
    }

    fn process(&mut self, solution: &S, pending: Pending, out: &mut Vec<Delta>) {
        let network = Arc::clone(&self.network);
        let node = &network.nodes[pending.target.0];
        let origin = pending.target;
        out.clear();

        match (&node.kind, &mut self.memories[origin.0]) {
            (NodeKind::Source { .. }, NodeMemory::Source(memory)) => {
                memory.apply(pending.delta, origin, out);
            }
            (NodeKind::Filter { predicate }, NodeMemory::Filter(memory)) => {
                memory.apply(pending.delta, |t| predicate(solution, t), origin, out);
            }
            (NodeKind::Join { left_key, right_key }, NodeMemory::Join(memory)) => {
                let key_fn = match pending.side {
                    Side::Left => left_key,
                    Side::Right => right_key,
                };
                memory.apply(pending.side, pending.delta, |t| key_fn(solution, t), origin, out);
            }
            (NodeKind::Group { key, value, collector }, NodeMemory::Group(memory)) => {
                memory.apply(
                    pending.delta,
                    |t| (key(solution, t), value(solution, t)),
                    collector.as_ref(),
                    origin,
                    out,
                );
            }
            (NodeKind::Scorer { weight, match_weight }, NodeMemory::Scorer(memory)) => {
                let change = memory.apply(pending.delta, |t| weight.scaled(match_weight(solution, t)));
                self.score = self.score + change;
                return;
            }
            _ => unreachable!("memory of node {} does not match its kind", origin),
        }

        for delta in out.drain(..) {
            for edge in &node.children {
                self.queue.push_back(Pending {
                    target: edge.target,
                    side: edge.side,
                    delta: delta.clone(),
                });
            }
        }
    }
}
