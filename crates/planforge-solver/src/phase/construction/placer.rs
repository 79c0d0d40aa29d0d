//! Entity placers: which (entity, variable) slots a construction phase fills.

use std::cmp::Ordering;
use std::fmt::{self, Debug};

use rand::RngCore;

use planforge_core::{PlanningSolution, Result, SolverError};

use crate::event::{LifecycleContext, LifecycleEvent};
use crate::heuristic::selector::{EntitySelector, SelectionOrder, ValueSelector};
use crate::heuristic::variable::{PlanningValue, PlanningVariable, VariableDefinition};

/// One uninitialized slot to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index of the placer that owns the variable.
    pub placer_index: usize,
    pub entity_index: usize,
}

/// Enumerates the uninitialized entities of one variable and the values
/// that can be placed there.
///
/// Values always come in original order. Entities do too, unless the placer
/// was built with [`EntityPlacer::sorted_by_difficulty`], which places the
/// most difficult ones first (first fit decreasing). Equally difficult
/// entities keep their original order.
pub struct EntityPlacer<S, V> {
    variable: PlanningVariable<S, V>,
    entity_selector: EntitySelector,
    value_selector: ValueSelector<S, V>,
    difficulty: Option<fn(&S, usize, usize) -> Ordering>,
}

impl<S: PlanningSolution, V: PlanningValue> EntityPlacer<S, V> {
    pub fn new(definition: &VariableDefinition<S, V>) -> Self {
        let variable = definition.variable;
        Self {
            variable,
            entity_selector: EntitySelector::new(variable.descriptor_index(), SelectionOrder::Original),
            value_selector: ValueSelector::new(
                definition.value_range.clone(),
                definition.allows_unassigned,
                SelectionOrder::Original,
            ),
            difficulty: None,
        }
    }

    /// Placer visiting the most difficult entities first.
    ///
    /// Fails when the variable declares no difficulty comparator.
    pub fn sorted_by_difficulty(definition: &VariableDefinition<S, V>) -> Result<Self> {
        let Some(difficulty) = definition.entity_difficulty else {
            return Err(SolverError::configuration(format!(
                "first_fit_decreasing needs an entity difficulty for {}.{}",
                definition.entity_class,
                definition.variable.name()
            )));
        };
        Ok(Self {
            difficulty: Some(difficulty),
            ..Self::new(definition)
        })
    }

    pub fn variable(&self) -> &PlanningVariable<S, V> {
        &self.variable
    }

    /// Movable entities whose variable is still unassigned.
    pub fn placements(
        &mut self,
        placer_index: usize,
        solution: &S,
        random: &mut dyn RngCore,
    ) -> Vec<Placement> {
        self.entity_selector.reset();
        let mut placements = Vec::new();
        while let Some(entity_index) = self.entity_selector.next(solution, random) {
            if self.variable.get(solution, entity_index).is_none() {
                placements.push(Placement {
                    placer_index,
                    entity_index,
                });
            }
        }
        if let Some(difficulty) = self.difficulty {
            placements.sort_by(|a, b| difficulty(solution, b.entity_index, a.entity_index));
        }
        placements
    }

    pub fn start_entity(&mut self, solution: &S, entity_index: usize, random: &mut dyn RngCore) {
        self.value_selector.start_entity(solution, entity_index, random);
    }

    pub fn next_value(
        &mut self,
        solution: &S,
        entity_index: usize,
        random: &mut dyn RngCore,
    ) -> Option<Option<V>> {
        self.value_selector.next(solution, entity_index, random)
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent, context: &mut LifecycleContext<'_, S>) {
        if event.is_start() {
            self.entity_selector.on_lifecycle(event, context);
            self.value_selector.on_lifecycle(event, context);
        } else {
            self.value_selector.on_lifecycle(event, context);
            self.entity_selector.on_lifecycle(event, context);
        }
    }
}

impl<S, V: Debug> Debug for EntityPlacer<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityPlacer")
            .field("variable", &self.variable)
            .field("sorted", &self.difficulty.is_some())
            .finish()
    }
}
