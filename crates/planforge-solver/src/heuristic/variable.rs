//! Typed access to planning variables.
//!
//! A [`PlanningVariable`] is a pair of plain function pointers plus the
//! identity the score director needs to bracket a change. Moves and
//! selectors copy it freely.

use std::cmp::Ordering;
use std::fmt::{self, Debug};

use planforge_core::{PlanningSolution, ValueRange};
use planforge_scoring::ScoreDirector;

/// Bounds every planning value satisfies.
pub trait PlanningValue: Clone + PartialEq + Send + Sync + Debug + 'static {}

impl<T: Clone + PartialEq + Send + Sync + Debug + 'static> PlanningValue for T {}

/// Getter and setter for one variable of one entity class.
pub struct PlanningVariable<S, V> {
    descriptor_index: usize,
    name: &'static str,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
}

impl<S, V> PlanningVariable<S, V> {
    pub fn new(
        descriptor_index: usize,
        name: &'static str,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
    ) -> Self {
        Self {
            descriptor_index,
            name,
            getter,
            setter,
        }
    }

    pub fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, solution: &S, entity_index: usize) -> Option<V> {
        (self.getter)(solution, entity_index)
    }

    /// True when both address the same variable.
    pub fn same_as(&self, other: &Self) -> bool {
        self.descriptor_index == other.descriptor_index && self.name == other.name
    }
}

impl<S: PlanningSolution, V> PlanningVariable<S, V> {
    /// Writes a value, bracketed by the director's change notifications.
    pub fn assign<D: ScoreDirector<S>>(&self, director: &mut D, entity_index: usize, value: Option<V>) {
        director.before_variable_changed(self.descriptor_index, entity_index, self.name);
        (self.setter)(director.working_solution_mut(), entity_index, value);
        director.after_variable_changed(self.descriptor_index, entity_index, self.name);
    }
}

impl<S, V> Clone for PlanningVariable<S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V> Copy for PlanningVariable<S, V> {}

impl<S, V> Debug for PlanningVariable<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.descriptor_index)
    }
}

/// Everything the solver needs to search one variable.
pub struct VariableDefinition<S, V> {
    pub entity_class: &'static str,
    pub variable: PlanningVariable<S, V>,
    pub value_range: ValueRange<S, V>,
    /// Whether `None` is a legal value.
    pub allows_unassigned: bool,
    /// Orders two entities by how hard they are to place; `Greater` means
    /// the first is more difficult.
    pub entity_difficulty: Option<fn(&S, usize, usize) -> Ordering>,
}

impl<S, V: Clone> VariableDefinition<S, V> {
    pub fn new(
        entity_class: &'static str,
        variable: PlanningVariable<S, V>,
        value_range: ValueRange<S, V>,
    ) -> Self {
        Self {
            entity_class,
            variable,
            value_range,
            allows_unassigned: false,
            entity_difficulty: None,
        }
    }

    pub fn allowing_unassigned(mut self) -> Self {
        self.allows_unassigned = true;
        self
    }

    pub fn with_entity_difficulty(mut self, comparator: fn(&S, usize, usize) -> Ordering) -> Self {
        self.entity_difficulty = Some(comparator);
        self
    }
}

impl<S, V: Clone> Clone for VariableDefinition<S, V> {
    fn clone(&self) -> Self {
        Self {
            entity_class: self.entity_class,
            variable: self.variable,
            value_range: self.value_range.clone(),
            allows_unassigned: self.allows_unassigned,
            entity_difficulty: self.entity_difficulty,
        }
    }
}

impl<S, V: Debug> Debug for VariableDefinition<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableDefinition")
            .field("entity_class", &self.entity_class)
            .field("variable", &self.variable)
            .field("value_range", &self.value_range)
            .field("allows_unassigned", &self.allows_unassigned)
            .field("sorted_by_difficulty", &self.entity_difficulty.is_some())
            .finish()
    }
}
