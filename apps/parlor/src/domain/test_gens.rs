// Proptest generators for cards, hands and solver policies.

use proptest::prelude::*;

use crate::domain::cards::{Card, CardId, Rank, Suit};
use crate::domain::solver::SolverPolicy;

pub fn suit() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Clubs),
        Just(Suit::Hearts),
        Just(Suit::Spades),
        Just(Suit::Diamonds),
    ]
}

pub fn rank() -> impl Strategy<Value = Rank> {
    (1u8..=13).prop_map(|v| Rank::from_value(v).unwrap_or(Rank::Ace))
}

/// A card from two decks plus jokers, so duplicate faces can appear.
pub fn card() -> impl Strategy<Value = Card> {
    prop_oneof![
        9 => (rank(), suit()).prop_map(|(rank, suit)| Card::new(rank, suit)),
        1 => Just(Card::new(Rank::Joker, Suit::Fancy)),
    ]
}

/// Hand of up to `max` cards with ids 1..=n.
pub fn hand_up_to(max: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::collection::vec(card(), 0..=max).prop_map(|mut cards| {
        for (i, card) in cards.iter_mut().enumerate() {
            card.id = i as CardId + 1;
        }
        cards
    })
}

pub fn policy() -> impl Strategy<Value = SolverPolicy> {
    (
        any::<[bool; 7]>(),
        prop::option::of(rank()),
    )
        .prop_map(|(flags, extra_wild)| {
            let mut wild_cards = vec![Rank::Joker];
            wild_cards.extend(extra_wild);
            SolverPolicy {
                wild_cards,
                any_wild_group: flags[0],
                all_wild_groups: flags[1],
                wild_as_rank: flags[2],
                mostly_wild_groups: flags[3],
                same_suit_runs: flags[4],
                ace_high: flags[5],
                runs_wrap: flags[6],
                ..SolverPolicy::default()
            }
        })
}
