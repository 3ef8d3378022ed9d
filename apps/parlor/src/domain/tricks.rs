//! Trick bookkeeping shared by the trick-taking modes.

use serde::{Deserialize, Serialize};

use super::cards::{Card, Rank, Suit};

/// One trick: who led, who played what, and who took it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    pub leader: usize,
    pub plays: Vec<(usize, Card)>,
    pub winner: Option<usize>,
}

impl Trick {
    pub fn new(leader: usize) -> Self {
        Self {
            leader,
            plays: Vec::new(),
            winner: None,
        }
    }

    /// The card that led this trick.
    pub fn lead(&self) -> Option<Card> {
        self.plays.first().map(|(_, card)| *card)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.plays.iter().map(|(_, card)| card)
    }

    pub fn contains(&self, rank: Rank, suit: Suit) -> bool {
        self.cards().any(|c| c.rank == rank && c.suit == suit)
    }

    /// Seat of the winning play under `beats(challenger, best)`; earlier
    /// plays keep the trick unless a later one beats them.
    pub fn resolve(&self, beats: impl Fn(&Card, &Card) -> bool) -> Option<usize> {
        let (mut seat, mut best) = *self.plays.first()?;
        for (player, card) in self.plays.iter().skip(1) {
            if beats(card, &best) {
                seat = *player;
                best = *card;
            }
        }
        Some(seat)
    }
}

/// Rank strength for trick play: aces high, jokers above everything.
pub fn trick_rank(rank: Rank) -> u8 {
    match rank {
        Rank::Ace => 14,
        Rank::Joker => 15,
        other => other.value(),
    }
}

/// Whether `hand` holds any card other than the one being played that
/// satisfies `pred`.
pub fn holds_other(hand: &[Card], played: &Card, pred: impl Fn(&Card) -> bool) -> bool {
    hand.iter().any(|c| c.id != played.id && pred(c))
}
