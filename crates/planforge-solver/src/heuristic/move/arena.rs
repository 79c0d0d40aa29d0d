//! Per-step storage for accepted candidates.
//!
//! Foragers only remember indices and scores; the moves themselves stay in
//! the arena until the step picks its winner. The buffer is cleared and
//! reused every step.

use std::fmt::{self, Debug};

pub struct MoveArena<M> {
    slots: Vec<Option<M>>,
}

impl<M> MoveArena<M> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Drops every stored move, keeping the allocation.
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    /// Stores a move and returns its index.
    pub fn push(&mut self, m: M) -> usize {
        self.slots.push(Some(m));
        self.slots.len() - 1
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&M> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Removes a move, leaving the other indices valid.
    pub fn take(&mut self, index: usize) -> Option<M> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn iter(&self) -> impl Iterator<Item = &M> {
        self.slots.iter().flatten()
    }
}

impl<M> Default for MoveArena<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Debug for MoveArena<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveArena")
            .field("len", &self.slots.len())
            .field("capacity", &self.slots.capacity())
            .finish()
    }
}
