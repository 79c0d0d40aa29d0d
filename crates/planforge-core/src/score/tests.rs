use super::*;

#[test]
fn test_hard_dominates_soft() {
    assert!(HardSoftScore::of(0, -1000) > HardSoftScore::of(-1, 0));
    assert!(HardSoftScore::of(-1, -5) > HardSoftScore::of(-1, -6));
}

#[test]
fn test_medium_ordering() {
    let a = HardMediumSoftScore::of(0, -1, 100);
    let b = HardMediumSoftScore::of(0, 0, -100);
    assert!(b > a);
    assert_eq!(HardMediumSoftScore::level_label(1), ScoreLevel::Medium);
}

#[test]
fn test_arithmetic() {
    let a = HardSoftScore::of(-2, -10);
    let b = HardSoftScore::of(1, 4);
    assert_eq!(a + b, HardSoftScore::of(-1, -6));
    assert_eq!(a - b, HardSoftScore::of(-3, -14));
    assert_eq!(-a, HardSoftScore::of(2, 10));
    let total: HardSoftScore = vec![a, b, b].into_iter().sum();
    assert_eq!(total, HardSoftScore::of(0, -2));
}

#[test]
fn test_scaled() {
    assert_eq!(HardSoftScore::ONE_SOFT.scaled(-7), HardSoftScore::of(0, -7));
    assert_eq!(SimpleScore::of(3).scaled(4), SimpleScore::of(12));
}

#[test]
fn test_level_numbers() {
    let score = HardMediumSoftScore::of(-1, 2, -3);
    assert_eq!(score.to_level_numbers(), vec![-1, 2, -3]);
    assert_eq!(HardMediumSoftScore::from_level_numbers(&[-1, 2, -3]), Some(score));
    assert_eq!(HardMediumSoftScore::from_level_numbers(&[1, 2]), None);
    assert_eq!(HardSoftScore::from_level_numbers(&[1, 2, 3]), None);
}

#[test]
fn test_single_level() {
    assert_eq!(HardSoftScore::ONE_HARD.single_level(), Some(0));
    assert_eq!(HardSoftScore::of_soft(-3).single_level(), Some(1));
    assert_eq!(HardSoftScore::of(1, 1).single_level(), None);
    assert_eq!(HardSoftScore::ZERO.single_level(), None);
}

#[test]
fn test_display_and_parse() {
    let score = HardMediumSoftScore::of(-1, 0, -30);
    assert_eq!(score.to_string(), "-1hard/0medium/-30soft");
    assert_eq!("-1hard/0medium/-30soft".parse::<HardMediumSoftScore>(), Ok(score));
    assert_eq!("-4".parse::<SimpleScore>(), Ok(SimpleScore::of(-4)));
}

#[test]
fn test_parse_errors() {
    assert!("0hard".parse::<HardSoftScore>().is_err());
    assert!("0hard/1soft/2soft".parse::<HardSoftScore>().is_err());
    assert!("0hard/xsoft".parse::<HardSoftScore>().is_err());
    assert!("0/1soft".parse::<HardSoftScore>().is_err());
}

#[test]
fn test_feasibility() {
    assert!(HardSoftScore::of(0, -100).is_feasible());
    assert!(!HardSoftScore::of(-1, 100).is_feasible());
    assert!(SimpleScore::of(-100).is_feasible());
}
