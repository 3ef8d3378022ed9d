use crate::domain::cards::{parse_hand, Rank};
use crate::domain::solver::{subset_sum, Grouping, PointValues, SolverPolicy};

/// Generous policy used by the Three-Thirteen style hands below.
fn generous() -> SolverPolicy {
    SolverPolicy {
        wild_as_rank: true,
        all_wild_groups: true,
        mostly_wild_groups: true,
        same_suit_runs: true,
        ..SolverPolicy::default()
    }
}

fn three_thirteen(round: Rank) -> SolverPolicy {
    SolverPolicy {
        wild_cards: vec![Rank::Joker, round],
        wild_as_rank: true,
        same_suit_runs: true,
        ..SolverPolicy::default()
    }
}

#[test]
fn min_score_known_hands() {
    let policy = generous();
    let cases = [
        ("JS QS KS 3D", 3),
        ("JS QS KS 9D 8D", 17),
        ("JS QS * QD", 11),
        ("JS QD *", 43),
        ("AS 2S * 4S 4H 5S", 4),
        ("5H 5S 5C 6D 7D 8D", 0),
    ];
    for (tokens, expected) in cases {
        let hand = parse_hand(tokens).unwrap();
        assert_eq!(policy.min_score(&hand), expected, "hand {tokens}");
    }
}

#[test]
fn three_thirteen_wilds_fill_runs() {
    let policy = three_thirteen(Rank::Queen);
    let hand = parse_hand("KC QS *F TC 9C 8C").unwrap();
    assert_eq!(policy.min_score(&hand), 0);

    let hand = parse_hand("4C 3C 2C KC QS *F TC 9C 8C *F AS AD").unwrap();
    assert_eq!(policy.min_score(&hand), 0);
}

#[test]
fn empty_hand_scores_zero() {
    let policy = SolverPolicy::default();
    assert_eq!(policy.min_score(&[]), 0);
    assert!(policy.min_score_below(&[], 0));
}

#[test]
fn min_score_below_agrees_with_min_score() {
    let policy = generous();
    let hand = parse_hand("JS QS KS 9D 8D").unwrap();
    assert!(policy.min_score_below(&hand, 17));
    assert!(!policy.min_score_below(&hand, 16));
    assert!(policy.min_score_below(&hand, 100));
}

#[test]
fn can_make_score_requires_a_real_partition() {
    let policy = generous();
    let hand = parse_hand("JS QS KS 3D").unwrap();
    assert!(policy.can_make_score(&hand, 3));
    assert!(policy.can_make_score(&hand, 39));
    // 11+12+13 is a subset sum, but 3D cannot be grouped alone.
    assert!(!policy.can_make_score(&hand, 36));
    // Not even a subset sum.
    assert!(!policy.can_make_score(&hand, 2));
    assert!(!policy.can_make_score(&hand, 40));
}

#[test]
fn subset_sum_uses_each_value_once() {
    assert!(subset_sum(&[3, 5, 9], 8));
    assert!(subset_sum(&[3, 5, 9], 0));
    assert!(!subset_sum(&[3, 5, 9], 6));
    assert!(subset_sum(&[3, 3, 9], 6));
    assert!(!subset_sum(&[4], 3));
    assert!(!subset_sum(&[4], -1));
}

#[test]
fn best_grouping_scores_to_minimum() {
    let policy = generous();
    let hand = parse_hand("AS 2S * 4S 4H 5S").unwrap();
    let grouping = policy.best_grouping(&hand);
    assert_eq!(grouping.leftover, vec![5]);
    assert_eq!(policy.score_grouping(&hand, &[], &grouping).unwrap(), 4);
}

#[test]
fn score_grouping_rejects_bad_partitions() {
    let policy = generous();
    let hand = parse_hand("JS QS KS 3D").unwrap();

    let ok = Grouping {
        groups: vec![vec![1, 2, 3]],
        leftover: vec![4],
    };
    assert_eq!(policy.score_grouping(&hand, &[], &ok).unwrap(), 3);

    let twice = Grouping {
        groups: vec![vec![1, 2, 3]],
        leftover: vec![3, 4],
    };
    assert!(policy.score_grouping(&hand, &[], &twice).is_err());

    let missing = Grouping {
        groups: vec![vec![1, 2, 3]],
        leftover: vec![],
    };
    assert!(policy.score_grouping(&hand, &[], &missing).is_err());

    let invalid = Grouping {
        groups: vec![vec![1, 2, 4]],
        leftover: vec![3],
    };
    assert!(policy.score_grouping(&hand, &[], &invalid).is_err());
}

#[test]
fn score_grouping_can_borrow_extra_cards() {
    let policy = SolverPolicy {
        point_values: PointValues::gin(false),
        same_suit_runs: true,
        ..SolverPolicy::default()
    };
    let hand = parse_hand("9H 5C").unwrap();
    let mut extra = parse_hand("TH JH QH").unwrap();
    for (i, card) in extra.iter_mut().enumerate() {
        card.id = 10 + i as i32;
    }
    let grouping = Grouping {
        groups: vec![vec![1, 10, 11, 12]],
        leftover: vec![2],
    };
    assert_eq!(policy.score_grouping(&hand, &extra, &grouping).unwrap(), 5);

    // Borrowed cards never count as your leftover.
    let bad = Grouping {
        groups: vec![vec![10, 11, 12]],
        leftover: vec![1, 2],
    };
    assert_eq!(policy.score_grouping(&hand, &extra, &bad).unwrap(), 14);
    let stolen = Grouping {
        groups: vec![],
        leftover: vec![1, 2, 10],
    };
    assert!(policy.score_grouping(&hand, &extra, &stolen).is_err());
}

#[test]
fn gin_point_values() {
    let values = PointValues::gin(false);
    assert_eq!(values.value(Rank::Ace), 1);
    assert_eq!(values.value(Rank::Ten), 10);
    assert_eq!(values.value(Rank::King), 10);
    assert_eq!(values.value(Rank::Joker), 20);
    assert_eq!(PointValues::gin(true).value(Rank::Ace), 15);
    assert_eq!(PointValues::standard().value(Rank::Queen), 12);
}
