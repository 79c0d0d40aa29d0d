//! Node definitions and per-node memories.
//!
//! A [`Node`] is the immutable part of a network stage. Its mutable state is
//! a [`NodeMemory`] owned by a session. Memories cache every key, value and
//! filter verdict they compute, so a retraction never re-evaluates a user
//! function against a solution that has already changed.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use planforge_core::{EntityRef, Score};

use super::collector::{Accumulator, Collector};
use super::tuple::{joined_id, Element, Key, Tuple, TupleId};
use super::NodeId;

pub(crate) type Predicate<S> = Arc<dyn Fn(&S, &Tuple) -> bool + Send + Sync>;
pub(crate) type KeyFn<S> = Arc<dyn Fn(&S, &Tuple) -> Key + Send + Sync>;
pub(crate) type WeightFn<S> = Arc<dyn Fn(&S, &Tuple) -> i64 + Send + Sync>;

/// Input a delta arrives on. Single-input nodes only use `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Edge {
    pub target: NodeId,
    pub side: Side,
}

pub(crate) enum NodeKind<S, Sc> {
    Source {
        descriptor_index: usize,
    },
    Filter {
        predicate: Predicate<S>,
    },
    Join {
        left_key: KeyFn<S>,
        right_key: KeyFn<S>,
    },
    Group {
        key: KeyFn<S>,
        value: WeightFn<S>,
        collector: Arc<dyn Collector>,
    },
    Scorer {
        /// Constraint weight with the impact sign already applied.
        weight: Sc,
        match_weight: WeightFn<S>,
    },
}

impl<S, Sc: Score> NodeKind<S, Sc> {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            NodeKind::Source { .. } => "source",
            NodeKind::Filter { .. } => "filter",
            NodeKind::Join { .. } => "join",
            NodeKind::Group { .. } => "group",
            NodeKind::Scorer { .. } => "scorer",
        }
    }

    pub(crate) fn new_memory(&self) -> NodeMemory<Sc> {
        match self {
            NodeKind::Source { .. } => NodeMemory::Source(SourceMemory::default()),
            NodeKind::Filter { .. } => NodeMemory::Filter(FilterMemory::default()),
            NodeKind::Join { .. } => NodeMemory::Join(JoinMemory::default()),
            NodeKind::Group { .. } => NodeMemory::Group(GroupMemory::default()),
            NodeKind::Scorer { .. } => NodeMemory::Scorer(ScorerMemory {
                matches: HashMap::new(),
                total: Sc::zero(),
            }),
        }
    }
}

pub(crate) struct Node<S, Sc> {
    pub kind: NodeKind<S, Sc>,
    pub children: Vec<Edge>,
}

/// A change travelling along one edge.
#[derive(Debug, Clone)]
pub(crate) enum Delta {
    Insert(Tuple),
    Update(Tuple),
    Retract(TupleId),
}

#[derive(Clone)]
pub(crate) enum NodeMemory<Sc> {
    Source(SourceMemory),
    Filter(FilterMemory),
    Join(JoinMemory),
    Group(GroupMemory),
    Scorer(ScorerMemory<Sc>),
}

#[derive(Clone, Default)]
pub(crate) struct SourceMemory {
    present: HashSet<EntityRef>,
}

impl SourceMemory {
    pub(crate) fn apply(&mut self, delta: Delta, origin: NodeId, out: &mut Vec<Delta>) {
        match delta {
            Delta::Insert(tuple) => {
                let Some(fact) = tuple.fact(0) else { return };
                if self.present.insert(fact) {
                    out.push(Delta::Insert(tuple.with_origin(origin)));
                } else {
                    out.push(Delta::Update(tuple.with_origin(origin)));
                }
            }
            Delta::Update(tuple) => {
                // Updates of facts that were never inserted are ignored.
                if tuple.fact(0).is_some_and(|fact| self.present.contains(&fact)) {
                    out.push(Delta::Update(tuple.with_origin(origin)));
                }
            }
            Delta::Retract(id) => {
                if let Some(Element::Fact(fact)) = id.first() {
                    if self.present.remove(fact) {
                        out.push(Delta::Retract(id));
                    }
                }
            }
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct FilterMemory {
    verdicts: HashMap<TupleId, bool>,
}

impl FilterMemory {
    pub(crate) fn apply(
        &mut self,
        delta: Delta,
        mut test: impl FnMut(&Tuple) -> bool,
        origin: NodeId,
        out: &mut Vec<Delta>,
    ) {
        match delta {
            Delta::Insert(tuple) | Delta::Update(tuple) => {
                let passes = test(&tuple);
                let before = self.verdicts.insert(tuple.id().clone(), passes);
                match (before, passes) {
                    (Some(true), true) => out.push(Delta::Update(tuple.with_origin(origin))),
                    (Some(true), false) => out.push(Delta::Retract(tuple.id().clone())),
                    (_, true) => out.push(Delta::Insert(tuple.with_origin(origin))),
                    (_, false) => {}
                }
            }
            Delta::Retract(id) => {
                if self.verdicts.remove(&id) == Some(true) {
                    out.push(Delta::Retract(id));
                }
            }
        }
    }
}

/// One side of a join, indexed by join key.
#[derive(Clone, Default)]
struct JoinIndex {
    entries: HashMap<TupleId, (Key, Tuple)>,
    by_key: HashMap<Key, HashSet<TupleId>>,
}

impl JoinIndex {
    fn add(&mut self, key: Key, tuple: Tuple) {
        self.by_key
            .entry(key.clone())
            .or_default()
            .insert(tuple.id().clone());
        self.entries.insert(tuple.id().clone(), (key, tuple));
    }

    fn remove(&mut self, id: &TupleId) -> Option<(Key, Tuple)> {
        let (key, tuple) = self.entries.remove(id)?;
        if let Some(ids) = self.by_key.get_mut(&key) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_key.remove(&key);
            }
        }
        Some((key, tuple))
    }

    fn key_of(&self, id: &TupleId) -> Option<&Key> {
        self.entries.get(id).map(|(key, _)| key)
    }

    fn partners<'a>(&'a self, key: &Key) -> impl Iterator<Item = &'a Tuple> + 'a {
        self.by_key
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.entries.get(id).map(|(_, tuple)| tuple))
    }
}

#[derive(Clone, Default)]
pub(crate) struct JoinMemory {
    left: JoinIndex,
    right: JoinIndex,
}

impl JoinMemory {
    fn sides(&mut self, side: Side) -> (&mut JoinIndex, &JoinIndex) {
        match side {
            Side::Left => (&mut self.left, &self.right),
            Side::Right => (&mut self.right, &self.left),
        }
    }

    fn combine(side: Side, own: &Tuple, partner: &Tuple, origin: NodeId) -> Tuple {
        match side {
            Side::Left => Tuple::joined(own, partner, origin),
            Side::Right => Tuple::joined(partner, own, origin),
        }
    }

    fn combined_id(side: Side, own: &TupleId, partner: &TupleId) -> TupleId {
        match side {
            Side::Left => joined_id(own, partner),
            Side::Right => joined_id(partner, own),
        }
    }

    pub(crate) fn apply(
        &mut self,
        side: Side,
        delta: Delta,
        mut key_of: impl FnMut(&Tuple) -> Key,
        origin: NodeId,
        out: &mut Vec<Delta>,
    ) {
        match delta {
            Delta::Insert(tuple) | Delta::Update(tuple) => {
                let key = key_of(&tuple);
                let previous = self.sides(side).0.key_of(tuple.id()).cloned();
                match previous {
                    Some(old) if old == key => self.refresh(side, tuple, key, origin, out),
                    Some(_) => {
                        self.retract(side, &tuple.id().clone(), out);
                        self.insert(side, tuple, key, origin, out);
                    }
                    None => self.insert(side, tuple, key, origin, out),
                }
            }
            Delta::Retract(id) => self.retract(side, &id, out),
        }
    }

    fn insert(&mut self, side: Side, tuple: Tuple, key: Key, origin: NodeId, out: &mut Vec<Delta>) {
        let (own, other) = self.sides(side);
        for partner in other.partners(&key) {
            out.push(Delta::Insert(Self::combine(side, &tuple, partner, origin)));
        }
        own.add(key, tuple);
    }

    fn refresh(&mut self, side: Side, tuple: Tuple, key: Key, origin: NodeId, out: &mut Vec<Delta>) {
        let (own, other) = self.sides(side);
        for partner in other.partners(&key) {
            out.push(Delta::Update(Self::combine(side, &tuple, partner, origin)));
        }
        own.add(key, tuple);
    }

    fn retract(&mut self, side: Side, id: &TupleId, out: &mut Vec<Delta>) {
        let (own, other) = self.sides(side);
        if let Some((key, _)) = own.remove(id) {
            for partner in other.partners(&key) {
                out.push(Delta::Retract(Self::combined_id(side, id, partner.id())));
            }
        }
    }
}

/// Accumulator of one group plus the member values it was built from.
#[derive(Clone)]
struct GroupState {
    accumulator: Box<dyn Accumulator>,
    values: HashMap<TupleId, i64>,
}

impl GroupState {
    fn new(collector: &dyn Collector) -> Self {
        GroupState {
            accumulator: collector.create_accumulator(),
            values: HashMap::new(),
        }
    }

    fn add(&mut self, id: TupleId, value: i64) {
        self.accumulator.add(value);
        self.values.insert(id, value);
    }

    fn remove(&mut self, collector: &dyn Collector, id: &TupleId) {
        if let Some(value) = self.values.remove(id) {
            if !self.accumulator.remove(value) {
                self.rebuild(collector);
            }
        }
    }

    /// Recomputes this group only, for collectors that cannot remove.
    fn rebuild(&mut self, collector: &dyn Collector) {
        let mut accumulator = collector.create_accumulator();
        for &value in self.values.values() {
            accumulator.add(value);
        }
        self.accumulator = accumulator;
    }
}

#[derive(Clone, Default)]
pub(crate) struct GroupMemory {
    groups: HashMap<Key, GroupState>,
    members: HashMap<TupleId, Key>,
}

impl GroupMemory {
    pub(crate) fn apply(
        &mut self,
        delta: Delta,
        mut evaluate: impl FnMut(&Tuple) -> (Key, i64),
        collector: &dyn Collector,
        origin: NodeId,
        out: &mut Vec<Delta>,
    ) {
        match delta {
            Delta::Insert(tuple) | Delta::Update(tuple) => {
                let (key, value) = evaluate(&tuple);
                let id = tuple.id().clone();
                let previous = self.members.get(&id).cloned();
                match previous {
                    Some(old) if old == key => self.revalue(collector, id, key, value, origin, out),
                    Some(_) => {
                        self.retract(collector, &id, origin, out);
                        self.insert(collector, id, key, value, origin, out);
                    }
                    None => self.insert(collector, id, key, value, origin, out),
                }
            }
            Delta::Retract(id) => self.retract(collector, &id, origin, out),
        }
    }

    fn insert(
        &mut self,
        collector: &dyn Collector,
        id: TupleId,
        key: Key,
        value: i64,
        origin: NodeId,
        out: &mut Vec<Delta>,
    ) {
        self.members.insert(id.clone(), key.clone());
        match self.groups.entry(key) {
            Entry::Occupied(entry) => {
                let key = entry.key().clone();
                let group = entry.into_mut();
                let before = group.accumulator.result();
                group.add(id, value);
                let after = group.accumulator.result();
                if before != after {
                    out.push(Delta::Update(Tuple::of_group(key, after, origin)));
                }
            }
            Entry::Vacant(entry) => {
                let key = entry.key().clone();
                let mut group = GroupState::new(collector);
                group.add(id, value);
                out.push(Delta::Insert(Tuple::of_group(key, group.accumulator.result(), origin)));
                entry.insert(group);
            }
        }
    }

    fn revalue(
        &mut self,
        collector: &dyn Collector,
        id: TupleId,
        key: Key,
        value: i64,
        origin: NodeId,
        out: &mut Vec<Delta>,
    ) {
        let Some(group) = self.groups.get_mut(&key) else { return };
        if group.values.get(&id) == Some(&value) {
            return;
        }
        let before = group.accumulator.result();
        group.remove(collector, &id);
        group.add(id, value);
        let after = group.accumulator.result();
        if before != after {
            out.push(Delta::Update(Tuple::of_group(key, after, origin)));
        }
    }

    fn retract(&mut self, collector: &dyn Collector, id: &TupleId, origin: NodeId, out: &mut Vec<Delta>) {
        let Some(key) = self.members.remove(id) else { return };
        let Some(group) = self.groups.get_mut(&key) else { return };
        let before = group.accumulator.result();
        group.remove(collector, id);
        if group.values.is_empty() {
            self.groups.remove(&key);
            let mut group_id = TupleId::new();
            group_id.push(Element::Group(key));
            out.push(Delta::Retract(group_id));
            return;
        }
        let after = group.accumulator.result();
        if before != after {
            out.push(Delta::Update(Tuple::of_group(key, after, origin)));
        }
    }
}

#[derive(Clone)]
pub(crate) struct ScorerMemory<Sc> {
    matches: HashMap<TupleId, Sc>,
    total: Sc,
}

impl<Sc: Score> ScorerMemory<Sc> {
    /// Applies one delta and returns the resulting change of the score.
    pub(crate) fn apply(&mut self, delta: Delta, mut impact: impl FnMut(&Tuple) -> Sc) -> Sc {
        let change = match delta {
            Delta::Insert(tuple) | Delta::Update(tuple) => {
                let new = impact(&tuple);
                let old = self.matches.insert(tuple.id().clone(), new);
                new - old.unwrap_or_else(Sc::zero)
            }
            Delta::Retract(id) => match self.matches.remove(&id) {
                Some(old) => -old,
                None => Sc::zero(),
            },
        };
        self.total = self.total + change;
        change
    }

    pub(crate) fn total(&self) -> Sc {
        self.total
    }

    pub(crate) fn match_count(&self) -> usize {
        self.matches.len()
    }
}
