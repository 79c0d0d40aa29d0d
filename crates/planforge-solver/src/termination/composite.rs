//! Composite terminations.

use planforge_core::Score;

use super::{Termination, TerminationContext};

/// Terminates when any child terminates.
#[derive(Debug)]
pub struct OrTermination<Sc: Score> {
    children: Vec<Box<dyn Termination<Sc>>>,
}

impl<Sc: Score> OrTermination<Sc> {
    pub fn new(children: Vec<Box<dyn Termination<Sc>>>) -> Self {
        Self { children }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<Sc: Score> Termination<Sc> for OrTermination<Sc> {
    fn is_terminated(&self, context: &TerminationContext<Sc>) -> bool {
        self.children.iter().any(|t| t.is_terminated(context))
    }
}

/// Terminates when every child terminates. Empty never terminates.
#[derive(Debug)]
pub struct AndTermination<Sc: Score> {
    children: Vec<Box<dyn Termination<Sc>>>,
}

impl<Sc: Score> AndTermination<Sc> {
    pub fn new(children: Vec<Box<dyn Termination<Sc>>>) -> Self {
        Self { children }
    }
}

impl<Sc: Score> Termination<Sc> for AndTermination<Sc> {
    fn is_terminated(&self, context: &TerminationContext<Sc>) -> bool {
        !self.children.is_empty() && self.children.iter().all(|t| t.is_terminated(context))
    }
}
