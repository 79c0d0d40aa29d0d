//! Value ranges for planning variables.

use std::borrow::Cow;
use std::fmt;

/// Legal values of a planning variable.
///
/// A range is either a fixed list, computed from the solution, or computed
/// per entity. Whether "unassigned" is a legal value is a property of the
/// variable, not of its range.
///
/// # Example
///
/// ```
/// use planforge_core::ValueRange;
///
/// struct Board { n: usize }
///
/// let rows: ValueRange<Board, usize> = ValueRange::computed(|b: &Board| (0..b.n).collect());
/// let board = Board { n: 4 };
/// assert_eq!(rows.values(&board, 0).len(), 4);
/// assert!(!rows.is_entity_dependent());
/// ```
pub enum ValueRange<S, V> {
    /// A fixed list of values.
    Listed(Vec<V>),
    /// Values derived from the whole solution.
    Computed(fn(&S) -> Vec<V>),
    /// Values derived per entity, given the entity index.
    EntityDependent(fn(&S, usize) -> Vec<V>),
}

impl<S, V: Clone> ValueRange<S, V> {
    pub fn listed(values: Vec<V>) -> Self {
        ValueRange::Listed(values)
    }

    pub fn computed(provider: fn(&S) -> Vec<V>) -> Self {
        ValueRange::Computed(provider)
    }

    pub fn entity_dependent(provider: fn(&S, usize) -> Vec<V>) -> Self {
        ValueRange::EntityDependent(provider)
    }

    /// Values legal for the entity at `entity_index`.
    pub fn values<'a>(&'a self, solution: &S, entity_index: usize) -> Cow<'a, [V]> {
        match self {
            ValueRange::Listed(values) => Cow::Borrowed(values.as_slice()),
            ValueRange::Computed(provider) => Cow::Owned(provider(solution)),
            ValueRange::EntityDependent(provider) => Cow::Owned(provider(solution, entity_index)),
        }
    }

    pub fn is_entity_dependent(&self) -> bool {
        matches!(self, ValueRange::EntityDependent(_))
    }
}

impl<S, V: Clone> Clone for ValueRange<S, V> {
    fn clone(&self) -> Self {
        match self {
            ValueRange::Listed(values) => ValueRange::Listed(values.clone()),
            ValueRange::Computed(provider) => ValueRange::Computed(*provider),
            ValueRange::EntityDependent(provider) => ValueRange::EntityDependent(*provider),
        }
    }
}

impl<S, V: fmt::Debug> fmt::Debug for ValueRange<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRange::Listed(values) => f.debug_tuple("Listed").field(values).finish(),
            ValueRange::Computed(_) => f.write_str("Computed(..)"),
            ValueRange::EntityDependent(_) => f.write_str("EntityDependent(..)"),
        }
    }
}
