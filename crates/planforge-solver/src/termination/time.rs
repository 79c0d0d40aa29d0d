//! Wall-clock termination.

use std::time::Duration;

use planforge_core::Score;

use super::{Termination, TerminationContext};

/// Terminates once the scope has run for the given duration.
///
/// # Example
///
/// ```
/// use planforge_solver::termination::TimeTermination;
/// use std::time::Duration;
///
/// let term = TimeTermination::new(Duration::from_secs(30));
/// assert_eq!(term.limit(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl<Sc: Score> Termination<Sc> for TimeTermination {
    fn is_terminated(&self, context: &TerminationContext<Sc>) -> bool {
        context.elapsed >= self.limit
    }
}
