//! Value selector: enumerates the legal values of one variable.

use std::fmt::{self, Debug};

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use planforge_core::{PlanningSolution, ValueRange};

use super::SelectionOrder;
use crate::event::{LifecycleContext, LifecycleEvent, LifecycleTracker};

/// Yields candidate values for a given entity.
///
/// Values are cached per step; entity-dependent ranges are re-read whenever
/// the entity changes. When the variable allows unassigned, `None` is a
/// candidate ahead of the listed values.
pub struct ValueSelector<S, V> {
    value_range: ValueRange<S, V>,
    allows_unassigned: bool,
    order: SelectionOrder,
    cache: Vec<Option<V>>,
    cached_entity: Option<usize>,
    cursor: usize,
    stale: bool,
    tracker: LifecycleTracker,
}

impl<S: PlanningSolution, V: Clone> ValueSelector<S, V> {
    /// `Inherit` resolves to `Random`.
    pub fn new(value_range: ValueRange<S, V>, allows_unassigned: bool, order: SelectionOrder) -> Self {
        Self {
            value_range,
            allows_unassigned,
            order: order.resolve(SelectionOrder::Inherit),
            cache: Vec::new(),
            cached_entity: None,
            cursor: 0,
            stale: true,
            tracker: LifecycleTracker::new(),
        }
    }

    pub fn order(&self) -> SelectionOrder {
        self.order
    }

    fn needs_refresh(&self, entity_index: usize) -> bool {
        self.stale
            || (self.value_range.is_entity_dependent() && self.cached_entity != Some(entity_index))
    }

    fn refresh(&mut self, solution: &S, entity_index: usize) {
        let values = self.value_range.values(solution, entity_index);
        self.cache.clear();
        if self.allows_unassigned {
            self.cache.push(None);
        }
        self.cache.extend(values.iter().cloned().map(Some));
        self.cached_entity = Some(entity_index);
        self.stale = false;
    }

    /// Restarts ordered iteration for a new entity.
    pub fn start_entity(&mut self, solution: &S, entity_index: usize, random: &mut dyn RngCore) {
        if self.needs_refresh(entity_index) {
            self.refresh(solution, entity_index);
        }
        if self.order == SelectionOrder::Shuffled {
            self.cache.shuffle(random);
        }
        self.cursor = 0;
    }

    /// The next candidate value, or `None` when the entity is exhausted.
    pub fn next(&mut self, solution: &S, entity_index: usize, random: &mut dyn RngCore) -> Option<Option<V>> {
        if self.needs_refresh(entity_index) {
            self.start_entity(solution, entity_index, random);
        }
        if self.order.is_random() {
            if self.cache.is_empty() {
                return None;
            }
            let pick = random.random_range(0..self.cache.len());
            return Some(self.cache[pick].clone());
        }
        let value = self.cache.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(value)
    }

    pub fn reset(&mut self) {
        self.stale = true;
        self.cursor = 0;
    }

    pub fn size(&self, solution: &S, entity_index: usize) -> usize {
        self.value_range.values(solution, entity_index).len() + usize::from(self.allows_unassigned)
    }

    pub fn is_never_ending(&self) -> bool {
        self.order.is_random()
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent, _context: &mut LifecycleContext<'_, S>) {
        self.tracker.record(event);
        if matches!(event, LifecycleEvent::PhaseStarted | LifecycleEvent::StepStarted) {
            self.reset();
        }
    }

    pub fn tracker(&self) -> &LifecycleTracker {
        &self.tracker
    }
}

impl<S, V: Clone> Clone for ValueSelector<S, V> {
    fn clone(&self) -> Self {
        Self {
            value_range: self.value_range.clone(),
            allows_unassigned: self.allows_unassigned,
            order: self.order,
            cache: self.cache.clone(),
            cached_entity: self.cached_entity,
            cursor: self.cursor,
            stale: self.stale,
            tracker: self.tracker.clone(),
        }
    }
}

impl<S, V: Debug> Debug for ValueSelector<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSelector")
            .field("value_range", &self.value_range)
            .field("allows_unassigned", &self.allows_unassigned)
            .field("order", &self.order)
            .finish()
    }
}
