//! Tuples flowing through the constraint network.

use std::fmt;
use std::sync::Arc;

use planforge_core::EntityRef;
use smallvec::SmallVec;

use super::NodeId;

/// Join or group key produced by a key function.
///
/// # Example
///
/// ```
/// use planforge_scoring::Key;
///
/// assert_eq!(Key::from(3usize), Key::Int(3));
/// assert_eq!(Key::from((1, 2)), Key::Pair(1, 2));
/// assert_ne!(Key::from("room-a"), Key::from("room-b"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Unit,
    Int(i64),
    Pair(i64, i64),
    Entity(EntityRef),
    Text(Arc<str>),
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

impl From<(i64, i64)> for Key {
    fn from((a, b): (i64, i64)) -> Self {
        Key::Pair(a, b)
    }
}

impl From<EntityRef> for Key {
    fn from(value: EntityRef) -> Self {
        Key::Entity(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Text(Arc::from(value))
    }
}

impl<T: Into<Key>> From<Option<T>> for Key {
    fn from(value: Option<T>) -> Self {
        value.map_or(Key::Unit, Into::into)
    }
}

/// One position of a tuple: a fact, or the key of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    Fact(EntityRef),
    Group(Key),
}

/// Identity of a tuple within the node that produced it.
pub type TupleId = SmallVec<[Element; 4]>;

/// A combination of facts flowing through one network node.
///
/// The identity is the sequence of facts and group keys. Group aggregates
/// ride along as payload and may change while the identity stays the same.
#[derive(Clone, PartialEq)]
pub struct Tuple {
    elements: TupleId,
    aggregates: SmallVec<[i64; 2]>,
    origin: NodeId,
}

impl Tuple {
    pub(crate) fn of_fact(fact: EntityRef, origin: NodeId) -> Self {
        let mut elements = TupleId::new();
        elements.push(Element::Fact(fact));
        Tuple {
            elements,
            aggregates: SmallVec::new(),
            origin,
        }
    }

    pub(crate) fn of_group(key: Key, aggregate: i64, origin: NodeId) -> Self {
        let mut elements = TupleId::new();
        elements.push(Element::Group(key));
        let mut aggregates = SmallVec::new();
        aggregates.push(aggregate);
        Tuple {
            elements,
            aggregates,
            origin,
        }
    }

    pub(crate) fn joined(left: &Tuple, right: &Tuple, origin: NodeId) -> Self {
        Tuple {
            elements: joined_id(&left.elements, &right.elements),
            aggregates: left.aggregates.iter().chain(&right.aggregates).copied().collect(),
            origin,
        }
    }

    pub(crate) fn with_origin(mut self, origin: NodeId) -> Self {
        self.origin = origin;
        self
    }

    #[inline]
    pub fn id(&self) -> &TupleId {
        &self.elements
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    /// Node that produced this tuple.
    #[inline]
    pub fn origin(&self) -> NodeId {
        self.origin
    }

    /// The fact at `position`, if that position holds a fact.
    pub fn fact(&self, position: usize) -> Option<EntityRef> {
        match self.elements.get(position) {
            Some(Element::Fact(fact)) => Some(*fact),
            _ => None,
        }
    }

    /// Entity index of the fact at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range or holds a group key.
    pub fn index(&self, position: usize) -> usize {
        match self.elements.get(position) {
            Some(Element::Fact(fact)) => fact.entity_index,
            other => panic!("tuple position {} is not a fact: {:?}", position, other),
        }
    }

    /// The group key at `position`, if that position holds one.
    pub fn group_key(&self, position: usize) -> Option<&Key> {
        match self.elements.get(position) {
            Some(Element::Group(key)) => Some(key),
            _ => None,
        }
    }

    /// Aggregate number `n`, counted over all group positions left to right.
    ///
    /// # Panics
    ///
    /// Panics if the tuple carries fewer than `n + 1` aggregates.
    pub fn aggregate(&self, n: usize) -> i64 {
        self.aggregates[n]
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for element in &self.elements {
            match element {
                Element::Fact(fact) => list.entry(&format_args!("{}", fact)),
                Element::Group(key) => list.entry(key),
            };
        }
        list.finish()?;
        if !self.aggregates.is_empty() {
            write!(f, " => {:?}", self.aggregates.as_slice())?;
        }
        Ok(())
    }
}

/// Identity of the tuple a join emits for `left` and `right`.
pub(crate) fn joined_id(left: &TupleId, right: &TupleId) -> TupleId {
    left.iter().chain(right).cloned().collect()
}
