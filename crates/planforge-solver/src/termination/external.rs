//! Termination requested from outside the solver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use planforge_core::Score;

use super::{Termination, TerminationContext};

/// Terminates once a shared flag is raised.
///
/// # Example
///
/// ```
/// use planforge_solver::termination::ExternalTermination;
///
/// let term = ExternalTermination::new();
/// let flag = term.flag();
/// flag.store(true, std::sync::atomic::Ordering::SeqCst);
/// assert!(term.is_requested());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExternalTermination {
    flag: Arc<AtomicBool>,
}

impl ExternalTermination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    /// Handle that other threads raise to stop the solver.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl<Sc: Score> Termination<Sc> for ExternalTermination {
    fn is_terminated(&self, _context: &TerminationContext<Sc>) -> bool {
        self.is_requested()
    }
}
