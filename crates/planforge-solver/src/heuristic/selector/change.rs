//! Change move selector: entity x value.

use std::fmt::{self, Debug};

use rand::RngCore;

use planforge_core::PlanningSolution;

use super::{EntitySelector, SelectionOrder, ValueSelector};
use crate::event::{LifecycleContext, LifecycleEvent, LifecycleTracker};
use crate::heuristic::r#move::{CandidateMove, ChangeMove};
use crate::heuristic::variable::{PlanningValue, PlanningVariable, VariableDefinition};

/// Yields a [`ChangeMove`] for every (entity, value) pair.
///
/// Ordered modes nest values inside entities and end once every pair was
/// yielded. `Random` draws an entity and a value independently per move.
pub struct ChangeMoveSelector<S, V> {
    variable: PlanningVariable<S, V>,
    entity_selector: EntitySelector,
    value_selector: ValueSelector<S, V>,
    order: SelectionOrder,
    current_entity: Option<usize>,
}

impl<S: PlanningSolution, V: PlanningValue> ChangeMoveSelector<S, V> {
    pub fn new(definition: &VariableDefinition<S, V>, order: SelectionOrder) -> Self {
        let order = order.resolve(SelectionOrder::Inherit);
        let variable = definition.variable;
        Self {
            variable,
            entity_selector: EntitySelector::new(variable.descriptor_index(), order),
            value_selector: ValueSelector::new(
                definition.value_range.clone(),
                definition.allows_unassigned,
                order,
            ),
            order,
            current_entity: None,
        }
    }

    pub fn variable(&self) -> &PlanningVariable<S, V> {
        &self.variable
    }

    pub fn order(&self) -> SelectionOrder {
        self.order
    }

    pub fn next(&mut self, solution: &S, random: &mut dyn RngCore) -> Option<CandidateMove<S, V>> {
        if self.order.is_random() {
            // Entities with an empty range yield nothing; give each a chance.
            let attempts = solution
                .entity_count(self.variable.descriptor_index())
                .max(1);
            for _ in 0..attempts {
                let entity = self.entity_selector.next(solution, random)?;
                if let Some(value) = self.value_selector.next(solution, entity, random) {
                    return Some(ChangeMove::new(self.variable, entity, value).into());
                }
            }
            return None;
        }

        loop {
            let entity = match self.current_entity {
                Some(entity) => entity,
                None => {
                    let entity = self.entity_selector.next(solution, random)?;
                    self.value_selector.start_entity(solution, entity, random);
                    self.current_entity = Some(entity);
                    entity
                }
            };
            match self.value_selector.next(solution, entity, random) {
                Some(value) => return Some(ChangeMove::new(self.variable, entity, value).into()),
                None => self.current_entity = None,
            }
        }
    }

    pub fn reset(&mut self) {
        self.entity_selector.reset();
        self.value_selector.reset();
        self.current_entity = None;
    }

    /// Number of (entity, value) pairs.
    pub fn size(&self, solution: &S) -> usize {
        self.entity_selector
            .movable(solution)
            .into_iter()
            .map(|entity| self.value_selector.size(solution, entity))
            .sum()
    }

    pub fn is_never_ending(&self) -> bool {
        self.order.is_random()
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent, context: &mut LifecycleContext<'_, S>) {
        if event.is_start() {
            self.entity_selector.on_lifecycle(event, context);
            self.value_selector.on_lifecycle(event, context);
        } else {
            self.value_selector.on_lifecycle(event, context);
            self.entity_selector.on_lifecycle(event, context);
        }
        if matches!(event, LifecycleEvent::PhaseStarted | LifecycleEvent::StepStarted) {
            self.current_entity = None;
        }
    }

    pub(crate) fn collect_trackers<'a>(&'a self, out: &mut Vec<&'a LifecycleTracker>) {
        out.push(self.entity_selector.tracker());
        out.push(self.value_selector.tracker());
    }
}

impl<S, V: Clone> Clone for ChangeMoveSelector<S, V> {
    fn clone(&self) -> Self {
        Self {
            variable: self.variable,
            entity_selector: self.entity_selector.clone(),
            value_selector: self.value_selector.clone(),
            order: self.order,
            current_entity: self.current_entity,
        }
    }
}

impl<S, V: Debug> Debug for ChangeMoveSelector<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeMoveSelector")
            .field("variable", &self.variable)
            .field("order", &self.order)
            .finish()
    }
}
