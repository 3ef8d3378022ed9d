use crate::domain::cards::{parse_hand, Rank};
use crate::domain::solver::SolverPolicy;

fn all(hand: &[crate::domain::cards::Card]) -> Vec<usize> {
    (0..hand.len()).collect()
}

fn check(policy: &SolverPolicy, tokens: &str) -> (bool, bool) {
    let hand = parse_hand(tokens).unwrap();
    let idx = all(&hand);
    (policy.is_run(&hand, &idx), policy.is_kind(&hand, &idx))
}

#[test]
fn three_of_a_kind_without_wilds() {
    let policy = SolverPolicy {
        wild_cards: vec![],
        ..SolverPolicy::default()
    };
    assert_eq!(check(&policy, "5S 5H 5C"), (false, true));
    assert_eq!(check(&policy, "5S 9H KC"), (false, false));
}

#[test]
fn groups_need_three_cards() {
    let policy = SolverPolicy::default();
    assert_eq!(check(&policy, "5S 5H"), (false, false));
    assert_eq!(check(&policy, "5S 6S"), (false, false));
}

#[test]
fn all_wild_groups_policy() {
    let mut policy = SolverPolicy {
        all_wild_groups: true,
        any_wild_group: false,
        ..SolverPolicy::default()
    };
    assert_eq!(check(&policy, "* * *"), (true, true));

    policy.all_wild_groups = false;
    assert_eq!(check(&policy, "* * *"), (false, false));

    policy.any_wild_group = true;
    assert_eq!(check(&policy, "* * *"), (true, true));
}

#[test]
fn mixed_suit_runs_with_gaps() {
    let policy = SolverPolicy {
        wild_as_rank: true,
        ..SolverPolicy::default()
    };
    assert_eq!(check(&policy, "5S 4C 3H"), (true, false));
    assert_eq!(check(&policy, "5S 3H AC"), (false, false));
    assert_eq!(check(&policy, "5S 3H *"), (true, false));
    assert_eq!(check(&policy, "5S 4H * *"), (true, false));
    assert_eq!(check(&policy, "3S 2H * *"), (true, false));
    assert_eq!(check(&policy, "5S 5H *"), (false, true));
    assert_eq!(check(&policy, "KS JH *"), (true, false));
    // Wild cards may not outnumber naturals by default.
    assert_eq!(check(&policy, "5S 4H * * *"), (false, false));
}

#[test]
fn mostly_wild_groups_allow_wild_majority() {
    let policy = SolverPolicy {
        mostly_wild_groups: true,
        ..SolverPolicy::default()
    };
    assert_eq!(check(&policy, "5S 4H * * *"), (true, false));
    assert_eq!(check(&policy, "4S * * *"), (true, true));
    // Still at least one natural card.
    assert_eq!(check(&policy, "* * *"), (false, false));
}

#[test]
fn ace_position_follows_policy() {
    let low = SolverPolicy::default();
    assert_eq!(check(&low, "AS QS *"), (false, false));
    assert_eq!(check(&low, "AS * 3S"), (true, false));
    assert_eq!(check(&low, "KS AH *"), (false, false));

    let high = SolverPolicy {
        ace_high: true,
        ..SolverPolicy::default()
    };
    assert_eq!(check(&high, "AS QS *"), (true, false));
    assert_eq!(check(&high, "AS * 3S"), (false, false));
    assert_eq!(check(&high, "KS AH *"), (true, false));
}

#[test]
fn runs_wrap_only_with_high_aces() {
    let wrap_only = SolverPolicy {
        runs_wrap: true,
        ..SolverPolicy::default()
    };
    assert_eq!(check(&wrap_only, "QS KS AS 2S"), (false, false));

    let wrapping = SolverPolicy {
        ace_high: true,
        runs_wrap: true,
        ..SolverPolicy::default()
    };
    assert_eq!(check(&wrapping, "QS KS AS 2S"), (true, false));
    assert_eq!(check(&wrapping, "AS * 3S"), (true, false));
    assert_eq!(check(&wrapping, "KS * 2S"), (true, false));
    assert_eq!(check(&wrapping, "KS 4S *"), (false, false));
}

#[test]
fn run_length_is_capped_at_thirteen() {
    let policy = SolverPolicy::default();
    let thirteen = "KS QH JH TH 9H 8H 7H 6H 5H 4H 3H 2H AH";
    assert_eq!(check(&policy, thirteen), (true, false));
    assert_eq!(check(&policy, &format!("{thirteen} *")), (false, false));
    // Duplicate ranks break a run.
    assert_eq!(check(&policy, "5S 5H 6S 7S"), (false, false));
}

#[test]
fn same_suit_runs_reject_mixed_suits() {
    let policy = SolverPolicy {
        same_suit_runs: true,
        ..SolverPolicy::default()
    };
    assert_eq!(check(&policy, "5S 4S 3S"), (true, false));
    assert_eq!(check(&policy, "5S 4H 3S"), (false, false));
    assert_eq!(check(&policy, "5S 3S *"), (true, false));
}

#[test]
fn ranked_wilds_can_stand_for_themselves() {
    let mut policy = SolverPolicy {
        wild_cards: vec![Rank::Joker, Rank::Four],
        ..SolverPolicy::default()
    };
    // Every card is wild: only all-wild rules help.
    assert_eq!(check(&policy, "* * * 4S"), (false, false));

    policy.all_wild_groups = true;
    assert_eq!(check(&policy, "* * * 4S"), (true, true));

    policy.all_wild_groups = false;
    policy.wild_as_rank = true;
    assert_eq!(check(&policy, "* * * 4S"), (false, false));

    policy.mostly_wild_groups = true;
    assert_eq!(check(&policy, "* * * 4S"), (true, true));
    assert_eq!(check(&policy, "* * 4S"), (true, true));
}

#[test]
fn gap_rank_wild_counts_as_natural() {
    let policy = SolverPolicy {
        wild_cards: vec![Rank::Joker, Rank::Seven],
        wild_as_rank: true,
        same_suit_runs: true,
        ..SolverPolicy::default()
    };
    // 7H fills its own gap, leaving one joker among five cards.
    assert_eq!(check(&policy, "5H 6H 7H 8H *"), (true, false));
    // Without the own-rank rule three of five would be wild.
    let strict = SolverPolicy {
        wild_as_rank: false,
        ..policy.clone()
    };
    assert_eq!(check(&strict, "5H 7H 7C 8H *"), (false, false));
}

#[test]
fn bad_indices_are_not_groups() {
    let policy = SolverPolicy::default();
    let hand = parse_hand("5S 5H 5C").unwrap();
    assert!(!policy.is_valid_group(&hand, &[0, 1, 1]));
    assert!(!policy.is_valid_group(&hand, &[0, 1, 7]));
    assert!(policy.is_valid_group(&hand, &[2, 0, 1]));
}
