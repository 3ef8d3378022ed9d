use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, Rank};

/// Point value per rank, indexed by [`Rank::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointValues([i32; 15]);

impl PointValues {
    /// Face value with J=11, Q=12, K=13 and jokers at 20.
    pub fn standard() -> Self {
        let mut values = [0; 15];
        for rank in Rank::STANDARD {
            values[usize::from(rank.value())] = i32::from(rank.value());
        }
        values[usize::from(Rank::Joker.value())] = 20;
        Self(values)
    }

    /// Gin counting: court cards are 10, jokers 20, a high ace 15.
    pub fn gin(ace_high: bool) -> Self {
        let mut values = Self::standard();
        for rank in [Rank::Jack, Rank::Queen, Rank::King] {
            values.set(rank, 10);
        }
        if ace_high {
            values.set(Rank::Ace, 15);
        }
        values
    }

    pub fn value(&self, rank: Rank) -> i32 {
        self.0[usize::from(rank.value())]
    }

    pub fn set(&mut self, rank: Rank, value: i32) {
        self.0[usize::from(rank.value())] = value;
    }
}

impl Default for PointValues {
    fn default() -> Self {
        Self::standard()
    }
}

/// Wildcard and run rules for one melding game.
///
/// When several wild-card rules could permit a group they are consulted in
/// the order `any_wild_group`, `all_wild_groups`, `wild_as_rank`,
/// `mostly_wild_groups`; the first one that permits the group decides.
/// With none of them set, wild cards may make up at most half of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverPolicy {
    pub point_values: PointValues,
    /// Ranks that act as wild cards.
    pub wild_cards: Vec<Rank>,
    /// Wild cards may make up any share of a group, including all of it.
    pub any_wild_group: bool,
    /// A group may consist solely of wild cards.
    pub all_wild_groups: bool,
    /// A wild card may stand for its own rank, counting as a natural card.
    pub wild_as_rank: bool,
    /// Wild cards may outnumber natural cards (at least one natural remains).
    pub mostly_wild_groups: bool,
    pub same_suit_runs: bool,
    /// Aces rank above kings instead of below twos.
    pub ace_high: bool,
    /// With `ace_high`, runs may wrap from king through ace to two.
    pub runs_wrap: bool,
}

impl Default for SolverPolicy {
    fn default() -> Self {
        Self {
            point_values: PointValues::standard(),
            wild_cards: vec![Rank::Joker],
            any_wild_group: false,
            all_wild_groups: false,
            wild_as_rank: false,
            mostly_wild_groups: false,
            same_suit_runs: false,
            ace_high: false,
            runs_wrap: false,
        }
    }
}

impl SolverPolicy {
    pub fn is_wild(&self, card: &Card) -> bool {
        self.wild_cards.contains(&card.rank)
    }

    pub fn point_value(&self, card: &Card) -> i32 {
        self.point_values.value(card.rank)
    }

    pub fn hand_value(&self, hand: &[Card]) -> i32 {
        hand.iter().map(|c| self.point_value(c)).sum()
    }

    pub(super) fn wraps(&self) -> bool {
        self.ace_high && self.runs_wrap
    }
}
