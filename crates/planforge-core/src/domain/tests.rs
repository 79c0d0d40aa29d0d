use super::*;

struct Timetable {
    rooms: Vec<u32>,
    capacity: Vec<usize>,
}

fn rooms(t: &Timetable) -> Vec<u32> {
    t.rooms.clone()
}

fn rooms_for_lesson(t: &Timetable, lesson: usize) -> Vec<u32> {
    t.rooms.iter().copied().take(t.capacity[lesson]).collect()
}

fn timetable() -> Timetable {
    Timetable {
        rooms: vec![10, 11, 12],
        capacity: vec![1, 3],
    }
}

#[test]
fn test_listed_range_borrows() {
    let range: ValueRange<Timetable, u32> = ValueRange::listed(vec![1, 2]);
    let t = timetable();
    assert_eq!(&*range.values(&t, 0), &[1, 2]);
}

#[test]
fn test_computed_range() {
    let range = ValueRange::computed(rooms);
    let t = timetable();
    assert_eq!(range.values(&t, 1).into_owned(), vec![10, 11, 12]);
}

#[test]
fn test_entity_dependent_range() {
    let range = ValueRange::entity_dependent(rooms_for_lesson);
    let t = timetable();
    assert!(range.is_entity_dependent());
    assert_eq!(range.values(&t, 0).into_owned(), vec![10]);
    assert_eq!(range.values(&t, 1).into_owned(), vec![10, 11, 12]);
}

#[test]
fn test_entity_ref_display_and_order() {
    let a = EntityRef::new(0, 5);
    let b = EntityRef::new(1, 0);
    assert!(a < b);
    assert_eq!(a.to_string(), "0#5");
}
