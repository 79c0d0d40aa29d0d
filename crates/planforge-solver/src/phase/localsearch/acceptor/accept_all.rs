//! Accept-all acceptor.

use planforge_core::PlanningSolution;

use super::Acceptor;

/// Accepts every doable move; the forager alone decides.
#[derive(Debug, Clone, Default)]
pub struct AcceptAllAcceptor;

impl AcceptAllAcceptor {
    pub fn new() -> Self {
        Self
    }
}

impl<S: PlanningSolution> Acceptor<S> for AcceptAllAcceptor {
    fn is_accepted(&mut self, _last_step_score: &S::Score, _move_score: &S::Score) -> bool {
        true
    }
}
