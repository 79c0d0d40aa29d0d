use std::time::Duration;

use planforge_core::{HardSoftScore, SimpleScore};

use super::*;

fn context(step_count: u64, unimproved: u64, best: Option<i64>) -> TerminationContext<SimpleScore> {
    TerminationContext {
        elapsed: Duration::from_millis(50),
        step_count,
        unimproved_step_count: unimproved,
        best_score: best.map(SimpleScore::of),
    }
}

#[test]
fn test_step_count() {
    let term = StepCountTermination::new(10);
    assert!(!term.is_terminated(&context(9, 0, None)));
    assert!(term.is_terminated(&context(10, 0, None)));
}

#[test]
fn test_unimproved_step_count() {
    let term = UnimprovedStepCountTermination::new(3);
    assert!(!term.is_terminated(&context(100, 2, None)));
    assert!(term.is_terminated(&context(100, 3, None)));
}

#[test]
fn test_time() {
    assert!(Termination::<SimpleScore>::is_terminated(
        &TimeTermination::millis(50),
        &context(0, 0, None)
    ));
    assert!(!Termination::<SimpleScore>::is_terminated(
        &TimeTermination::millis(51),
        &context(0, 0, None)
    ));
}

#[test]
fn test_best_score_target() {
    let term = BestScoreTermination::new(SimpleScore::of(-2));
    assert!(!term.is_terminated(&context(0, 0, None)));
    assert!(!term.is_terminated(&context(0, 0, Some(-3))));
    assert!(term.is_terminated(&context(0, 0, Some(-2))));
    assert!(term.is_terminated(&context(0, 0, Some(0))));
}

#[test]
fn test_best_score_feasible() {
    let infeasible = TerminationContext {
        elapsed: Duration::ZERO,
        step_count: 0,
        unimproved_step_count: 0,
        best_score: Some(HardSoftScore::of(-1, 10)),
    };
    let feasible = TerminationContext {
        best_score: Some(HardSoftScore::of(0, -10)),
        ..infeasible.clone()
    };
    assert!(!BestScoreFeasibleTermination.is_terminated(&infeasible));
    assert!(BestScoreFeasibleTermination.is_terminated(&feasible));
}

#[test]
fn test_external_flag() {
    let term = ExternalTermination::new();
    assert!(!Termination::<SimpleScore>::is_terminated(&term, &context(0, 0, None)));
    term.flag().store(true, std::sync::atomic::Ordering::SeqCst);
    assert!(Termination::<SimpleScore>::is_terminated(&term, &context(0, 0, None)));
}

#[test]
fn test_or_and_composites() {
    let or = OrTermination::<SimpleScore>::new(vec![
        Box::new(StepCountTermination::new(5)),
        Box::new(UnimprovedStepCountTermination::new(2)),
    ]);
    assert!(!or.is_terminated(&context(1, 1, None)));
    assert!(or.is_terminated(&context(1, 2, None)));
    assert!(or.is_terminated(&context(5, 0, None)));

    let and = AndTermination::<SimpleScore>::new(vec![
        Box::new(StepCountTermination::new(5)),
        Box::new(UnimprovedStepCountTermination::new(2)),
    ]);
    assert!(!and.is_terminated(&context(5, 0, None)));
    assert!(and.is_terminated(&context(5, 2, None)));
    assert!(!AndTermination::<SimpleScore>::new(Vec::new()).is_terminated(&context(9, 9, None)));
}
