use std::collections::HashMap;
use std::sync::Arc;

use planforge_core::{EntityRef, HardSoftScore, PlanningSolution, SimpleScore, SolverError};
use proptest::prelude::*;

use super::collector;
use super::*;

const LESSON: usize = 0;
const INSTRUCTOR: usize = 1;

#[derive(Clone, Debug)]
struct Lesson {
    instructor: usize,
    room: Option<usize>,
    slot: i64,
    size: i64,
}

#[derive(Clone, Debug)]
struct Timetable {
    lessons: Vec<Lesson>,
    max_load: Vec<i64>,
}

impl PlanningSolution for Timetable {
    type Score = HardSoftScore;

    fn score(&self) -> Option<HardSoftScore> {
        None
    }

    fn set_score(&mut self, _: Option<HardSoftScore>) {}

    fn entity_count(&self, descriptor_index: usize) -> usize {
        match descriptor_index {
            LESSON => self.lessons.len(),
            INSTRUCTOR => self.max_load.len(),
            _ => 0,
        }
    }
}

fn lesson(instructor: usize, room: Option<usize>, slot: i64, size: i64) -> Lesson {
    Lesson {
        instructor,
        room,
        slot,
        size,
    }
}

fn timetable() -> Timetable {
    Timetable {
        lessons: vec![
            lesson(0, Some(0), 1, 30),
            lesson(0, Some(0), 1, 20),
            lesson(1, Some(1), 1, 25),
            lesson(0, None, 2, 10),
            lesson(1, Some(0), 2, 15),
        ],
        max_load: vec![2, 3],
    }
}

fn room_slot(t: &Timetable, tuple: &Tuple) -> Key {
    let l = &t.lessons[tuple.index(0)];
    Key::Pair(l.room.map_or(-1, |r| r as i64), l.slot)
}

fn is_assigned(t: &Timetable, tuple: &Tuple) -> bool {
    t.lessons[tuple.index(0)].room.is_some()
}

fn build_network() -> Arc<ConstraintNetwork<Timetable>> {
    let mut f = ConstraintFactory::<Timetable>::with_package("timetable");
    let lessons = f.for_each(LESSON);
    let assigned = f.filter(lessons, is_assigned).unwrap();

    let same_slot = f.join(assigned, assigned, room_slot, room_slot).unwrap();
    let conflicts = f
        .filter(same_slot, |_: &Timetable, t: &Tuple| t.index(0) < t.index(1))
        .unwrap();
    f.penalize("Room conflict", conflicts, HardSoftScore::ONE_HARD).unwrap();

    let load = f
        .group_by(
            lessons,
            |t: &Timetable, tu: &Tuple| t.lessons[tu.index(0)].instructor,
            collector::count(),
            |_: &Timetable, _: &Tuple| 1,
        )
        .unwrap();
    let instructors = f.for_each(INSTRUCTOR);
    let load_of_instructor = f
        .join(
            load,
            instructors,
            |_: &Timetable, tu: &Tuple| tu.group_key(0).cloned().unwrap_or(Key::Unit),
            |_: &Timetable, tu: &Tuple| Key::from(tu.index(0)),
        )
        .unwrap();
    let overloaded = f
        .filter(load_of_instructor, |t: &Timetable, tu: &Tuple| {
            tu.aggregate(0) > t.max_load[tu.index(1)]
        })
        .unwrap();
    f.penalize_weighted(
        "Instructor overload",
        overloaded,
        HardSoftScore::ONE_HARD,
        |t: &Timetable, tu: &Tuple| tu.aggregate(0) - t.max_load[tu.index(1)],
    )
    .unwrap();

    let biggest = f
        .group_by(
            assigned,
            |t: &Timetable, tu: &Tuple| t.lessons[tu.index(0)].room,
            collector::max(),
            |t: &Timetable, tu: &Tuple| t.lessons[tu.index(0)].size,
        )
        .unwrap();
    f.penalize_weighted(
        "Room size",
        biggest,
        HardSoftScore::ONE_SOFT,
        |_: &Timetable, tu: &Tuple| tu.aggregate(0),
    )
    .unwrap();

    f.reward("Assigned", assigned, HardSoftScore::of_soft(100)).unwrap();

    Arc::new(f.build().unwrap())
}

/// Independent scoring of the lessons marked present.
fn brute_force(t: &Timetable, present: &[bool]) -> HardSoftScore {
    let lessons: Vec<&Lesson> = t
        .lessons
        .iter()
        .zip(present)
        .filter(|&(_, &p)| p)
        .map(|(l, _)| l)
        .collect();
    let mut hard = 0;
    let mut soft = 0;
    for (i, a) in lessons.iter().enumerate() {
        for b in &lessons[i + 1..] {
            if a.room.is_some() && a.room == b.room && a.slot == b.slot {
                hard -= 1;
            }
        }
    }
    for (instructor, &max) in t.max_load.iter().enumerate() {
        let count = lessons.iter().filter(|l| l.instructor == instructor).count() as i64;
        if count > max {
            hard -= count - max;
        }
    }
    let mut biggest: HashMap<usize, i64> = HashMap::new();
    for l in &lessons {
        if let Some(room) = l.room {
            let entry = biggest.entry(room).or_insert(l.size);
            *entry = (*entry).max(l.size);
            soft += 100;
        }
    }
    soft -= biggest.values().sum::<i64>();
    HardSoftScore::of(hard, soft)
}

fn all_present(t: &Timetable) -> Vec<bool> {
    vec![true; t.lessons.len()]
}

fn session_for(t: &Timetable) -> NetworkSession<Timetable> {
    let mut session = NetworkSession::new(build_network());
    session.insert_all(t);
    session
}

#[test]
fn test_initial_score_matches_brute_force() {
    let t = timetable();
    let mut session = session_for(&t);
    // one room conflict, instructor 0 has 3 lessons for max 2,
    // rooms 0 and 1 have largest sizes 30 and 25, four lessons assigned
    assert_eq!(session.score(&t), HardSoftScore::of(-2, 400 - 55));
    assert_eq!(session.score(&t), brute_force(&t, &all_present(&t)));
}

#[test]
fn test_score_is_not_observable_before_settle() {
    let mut t = timetable();
    let mut session = session_for(&t);
    session.score(&t);

    t.lessons[1].slot = 3;
    session.update(EntityRef::new(LESSON, 1));
    assert!(!session.is_settled());
    let score = session.score(&t);
    assert!(session.is_settled());
    assert_eq!(score, brute_force(&t, &all_present(&t)));
}

#[test]
fn test_batch_of_updates_settles_once() {
    let mut t = timetable();
    let mut session = session_for(&t);
    session.score(&t);

    t.lessons[0].room = Some(1);
    t.lessons[3].room = Some(1);
    t.lessons[3].slot = 1;
    session.update(EntityRef::new(LESSON, 0));
    session.update(EntityRef::new(LESSON, 3));
    assert_eq!(session.score(&t), brute_force(&t, &all_present(&t)));
}

#[test]
fn test_max_collector_falls_back_to_group_rebuild() {
    let mut t = timetable();
    let mut session = session_for(&t);
    session.score(&t);

    // room 0 loses its largest lesson; max must drop from 30 to 20
    t.lessons[0].room = None;
    session.update(EntityRef::new(LESSON, 0));
    let totals = session.constraint_match_totals(&t);
    let room_size = totals
        .iter()
        .find(|c| c.constraint_ref.name == "Room size")
        .unwrap();
    assert_eq!(room_size.score, HardSoftScore::of_soft(-45));
    assert_eq!(session.score(&t), brute_force(&t, &all_present(&t)));
    assert_eq!(session.score(&t), NetworkSession::full_score(session.network(), &t));
}

#[test]
fn test_retract_and_reinsert_restores_score() {
    let t = timetable();
    let mut session = session_for(&t);
    let before = session.score(&t);

    session.retract(EntityRef::new(LESSON, 1));
    let mut present = all_present(&t);
    present[1] = false;
    assert_eq!(session.score(&t), brute_force(&t, &present));

    session.insert(EntityRef::new(LESSON, 1));
    assert_eq!(session.score(&t), before);
}

#[test]
fn test_retracting_problem_fact_removes_its_matches() {
    let t = timetable();
    let mut session = session_for(&t);
    session.score(&t);

    session.retract(EntityRef::new(INSTRUCTOR, 0));
    let totals = session.constraint_match_totals(&t);
    let overload = totals
        .iter()
        .find(|c| c.constraint_ref.name == "Instructor overload")
        .unwrap();
    assert_eq!(overload.match_count, 0);
    assert_eq!(overload.score, HardSoftScore::ZERO);
}

#[test]
fn test_update_of_unknown_fact_is_ignored() {
    let t = timetable();
    let mut session = session_for(&t);
    let before = session.score(&t);
    session.retract(EntityRef::new(LESSON, 4));
    let after_retract = session.score(&t);
    session.update(EntityRef::new(LESSON, 4));
    assert_eq!(session.score(&t), after_retract);
    assert_ne!(after_retract, before);
}

#[test]
fn test_constraint_match_totals() {
    let t = timetable();
    let mut session = session_for(&t);
    let totals = session.constraint_match_totals(&t);
    let names: Vec<String> = totals.iter().map(|c| c.constraint_ref.full_name()).collect();
    assert_eq!(
        names,
        vec![
            "timetable/Room conflict",
            "timetable/Instructor overload",
            "timetable/Room size",
            "timetable/Assigned"
        ]
    );
    assert_eq!(totals[0].match_count, 1);
    assert_eq!(totals[0].impact, planforge_core::ImpactType::Penalty);
    assert_eq!(totals[3].score, HardSoftScore::of_soft(400));
    let sum: HardSoftScore = totals.iter().map(|c| c.score).sum();
    assert_eq!(sum, session.score(&t));
}

#[test]
fn test_stateless_nodes_are_shared() {
    let mut f = ConstraintFactory::<Timetable>::new();
    let a = f.for_each(LESSON);
    let b = f.for_each(LESSON);
    assert_eq!(a, b);
    let x = f.filter(a, is_assigned).unwrap();
    let y = f.filter(b, is_assigned).unwrap();
    assert_eq!(x, y);
    let j1 = f.join(x, x, room_slot, room_slot).unwrap();
    let j2 = f.join(y, y, room_slot, room_slot).unwrap();
    assert_eq!(j1, j2);
    assert_eq!(f.shared_hits(), 3);
    assert_eq!(f.node_count(), 3);
}

#[test]
fn test_capturing_closures_are_not_shared() {
    let mut f = ConstraintFactory::<Timetable>::new();
    let lessons = f.for_each(LESSON);
    let limit = 20;
    let a = f
        .filter(lessons, move |t: &Timetable, tu: &Tuple| t.lessons[tu.index(0)].size > limit)
        .unwrap();
    let b = f
        .filter(lessons, move |t: &Timetable, tu: &Tuple| t.lessons[tu.index(0)].size > limit)
        .unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_unused_streams_are_not_wired() {
    let mut f = ConstraintFactory::<Timetable>::new();
    let lessons = f.for_each(LESSON);
    let _instructors = f.for_each(INSTRUCTOR);
    f.penalize("Every lesson", lessons, HardSoftScore::ONE_SOFT).unwrap();
    let network = f.build().unwrap();
    assert_eq!(network.descriptor_indices().collect::<Vec<_>>(), vec![LESSON]);
    assert_eq!(network.node_count(), 3);
    assert_eq!(network.node_label(NodeId(1)), Some("source"));
}

#[test]
fn test_foreign_stream_is_rejected() {
    let mut other = ConstraintFactory::<Timetable>::new();
    let foreign = other.for_each(LESSON);
    let mut f = ConstraintFactory::<Timetable>::new();
    let err = f.filter(foreign, is_assigned).unwrap_err();
    assert!(matches!(err, SolverError::Configuration(_)));
}

#[test]
fn test_weight_must_target_one_level() {
    let mut f = ConstraintFactory::<Timetable>::new();
    let lessons = f.for_each(LESSON);
    let err = f
        .penalize("Mixed", lessons, HardSoftScore::of(1, 1))
        .unwrap_err();
    assert!(err.to_string().contains("exactly one nonzero level"));
    assert!(f.penalize("Zero", lessons, HardSoftScore::ZERO).is_err());
}

#[test]
fn test_duplicate_constraint_name_is_rejected() {
    let mut f = ConstraintFactory::<Timetable>::new();
    let lessons = f.for_each(LESSON);
    f.penalize("Same", lessons, HardSoftScore::ONE_SOFT).unwrap();
    assert!(f.penalize("Same", lessons, HardSoftScore::ONE_HARD).is_err());
}

#[test]
fn test_empty_network_is_rejected() {
    let f = ConstraintFactory::<Timetable>::new();
    assert!(matches!(f.build(), Err(SolverError::Configuration(_))));
}

#[derive(Clone)]
struct Numbers {
    values: Vec<i64>,
}

impl PlanningSolution for Numbers {
    type Score = SimpleScore;

    fn score(&self) -> Option<SimpleScore> {
        None
    }

    fn set_score(&mut self, _: Option<SimpleScore>) {}

    fn entity_count(&self, _: usize) -> usize {
        self.values.len()
    }
}

#[test]
fn test_group_key_change_moves_member_between_groups() {
    let mut f = ConstraintFactory::<Numbers>::new();
    let numbers = f.for_each(0);
    let parity = f
        .group_by(
            numbers,
            |n: &Numbers, t: &Tuple| n.values[t.index(0)] % 2,
            collector::sum(),
            |n: &Numbers, t: &Tuple| n.values[t.index(0)],
        )
        .unwrap();
    let odd = f
        .filter(parity, |_: &Numbers, t: &Tuple| t.group_key(0) == Some(&Key::Int(1)))
        .unwrap();
    f.reward_weighted("Odd sum", odd, SimpleScore::ONE, |_: &Numbers, t: &Tuple| t.aggregate(0))
        .unwrap();
    let network = Arc::new(f.build().unwrap());

    let mut n = Numbers { values: vec![1, 2, 3] };
    let mut session = NetworkSession::new(network);
    session.insert_all(&n);
    assert_eq!(session.score(&n), SimpleScore::of(4));

    n.values[1] = 5;
    session.update(EntityRef::new(0, 1));
    assert_eq!(session.score(&n), SimpleScore::of(9));

    n.values[0] = 4;
    n.values[1] = 6;
    n.values[2] = 8;
    for i in 0..3 {
        session.update(EntityRef::new(0, i));
    }
    // the odd group disappears entirely
    assert_eq!(session.score(&n), SimpleScore::ZERO);
}

#[derive(Debug, Clone)]
enum Op {
    Move { lesson: usize, room: Option<usize>, slot: i64 },
    Toggle { lesson: usize },
    Settle,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..5usize, proptest::option::of(0..3usize), 0..3i64)
            .prop_map(|(lesson, room, slot)| Op::Move { lesson, room, slot }),
        1 => (0..5usize).prop_map(|lesson| Op::Toggle { lesson }),
        1 => Just(Op::Settle),
    ]
}

proptest! {
    #[test]
    fn prop_incremental_matches_brute_force(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let mut t = timetable();
        let mut present = all_present(&t);
        let mut session = session_for(&t);
        for op in &ops {
            match *op {
                Op::Move { lesson, room, slot } => {
                    t.lessons[lesson].room = room;
                    t.lessons[lesson].slot = slot;
                    session.update(EntityRef::new(LESSON, lesson));
                }
                Op::Toggle { lesson } => {
                    if present[lesson] {
                        session.retract(EntityRef::new(LESSON, lesson));
                    } else {
                        session.insert(EntityRef::new(LESSON, lesson));
                    }
                    present[lesson] = !present[lesson];
                }
                Op::Settle => {
                    prop_assert_eq!(session.score(&t), brute_force(&t, &present));
                }
            }
        }
        prop_assert_eq!(session.score(&t), brute_force(&t, &present));
    }

    #[test]
    fn prop_update_order_does_not_matter(
        rooms in proptest::collection::vec(proptest::option::of(0..3usize), 5),
        slots in proptest::collection::vec(0..3i64, 5),
        order in Just((0..5usize).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let start = timetable();
        let mut target = start.clone();
        for i in 0..5 {
            target.lessons[i].room = rooms[i];
            target.lessons[i].slot = slots[i];
        }

        // forward order, settling after each change
        let mut t = start.clone();
        let mut forward = session_for(&t);
        forward.score(&t);
        for i in 0..5 {
            t.lessons[i] = target.lessons[i].clone();
            forward.update(EntityRef::new(LESSON, i));
            forward.score(&t);
        }

        // shuffled order, one batch
        let mut u = start.clone();
        let mut shuffled = session_for(&u);
        shuffled.score(&u);
        for &i in &order {
            u.lessons[i] = target.lessons[i].clone();
            shuffled.update(EntityRef::new(LESSON, i));
        }

        let expected = brute_force(&target, &all_present(&target));
        prop_assert_eq!(forward.score(&t), expected);
        prop_assert_eq!(shuffled.score(&u), expected);
    }
}
