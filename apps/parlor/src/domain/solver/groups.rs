use crate::domain::cards::{Card, Rank};

use super::policy::SolverPolicy;

/// Longest possible run: one of each rank.
const MAX_RUN: usize = 13;

impl SolverPolicy {
    pub fn is_valid_group(&self, hand: &[Card], indices: &[usize]) -> bool {
        self.is_kind(hand, indices) || self.is_run(hand, indices)
    }

    /// All natural cards share one rank.
    pub fn is_kind(&self, hand: &[Card], indices: &[usize]) -> bool {
        let Some((naturals, wilds)) = self.split(hand, indices) else {
            return false;
        };
        let len = indices.len();

        if !same_rank(&naturals) {
            return false;
        }
        if wilds.is_empty() {
            return true;
        }

        if self.any_wild_group {
            return true;
        }
        if naturals.is_empty() && self.all_wild_groups {
            return true;
        }
        if self.wild_as_rank {
            let target = naturals
                .first()
                .map(|c| c.rank)
                .or_else(|| most_common_ranked(&wilds));
            if let Some(rank) = target {
                let promoted = wilds.iter().filter(|c| c.rank == rank).count();
                let natural_count = naturals.len() + promoted;
                if natural_count > 0 && self.wild_share_allowed(len - natural_count, len) {
                    return true;
                }
            }
        }

        !naturals.is_empty() && self.wild_share_allowed(wilds.len(), len)
    }

    /// Natural cards form a duplicate-free range of consecutive ranks whose
    /// gaps the wild cards can fill.
    pub fn is_run(&self, hand: &[Card], indices: &[usize]) -> bool {
        if indices.len() > MAX_RUN {
            return false;
        }
        let Some((mut naturals, mut wilds)) = self.split(hand, indices) else {
            return false;
        };
        let len = indices.len();

        // A joker that isn't wild has no place in a sequence.
        if naturals.iter().any(Card::is_joker) {
            return false;
        }

        if naturals.is_empty() {
            if self.any_wild_group || self.all_wild_groups {
                return true;
            }
            if !self.wild_as_rank {
                return false;
            }
            let Some(anchor) = wilds.iter().position(|c| !c.is_joker()) else {
                return false;
            };
            naturals.push(wilds.remove(anchor));
        }

        let suit = naturals[0].suit;
        if self.same_suit_runs && naturals.iter().any(|c| c.suit != suit) {
            return false;
        }

        let Some(mut gaps) = self.run_gaps(&naturals) else {
            return false;
        };

        if self.wild_as_rank {
            // A wild card whose own rank fills a gap plays as itself.
            while let Some(pos) = wilds.iter().position(|w| {
                !w.is_joker()
                    && gaps.contains(&w.rank)
                    && (!self.same_suit_runs || w.suit == suit)
            }) {
                naturals.push(wilds.remove(pos));
                match self.run_gaps(&naturals) {
                    Some(next) => gaps = next,
                    None => return false,
                }
            }
        }

        if gaps.len() > wilds.len() {
            return false;
        }
        if wilds.is_empty() || self.any_wild_group {
            return true;
        }
        self.wild_share_allowed(wilds.len(), len)
    }

    fn wild_share_allowed(&self, wilds: usize, len: usize) -> bool {
        wilds * 2 <= len || self.mostly_wild_groups
    }

    /// Partition the selected cards into (naturals, wilds). `None` when the
    /// selection is too short or names a card twice or out of range.
    fn split(&self, hand: &[Card], indices: &[usize]) -> Option<(Vec<Card>, Vec<Card>)> {
        if indices.len() < 3 {
            return None;
        }
        let mut seen = vec![false; hand.len()];
        let mut naturals = Vec::new();
        let mut wilds = Vec::new();
        for &index in indices {
            let card = hand.get(index)?;
            if std::mem::replace(&mut seen[index], true) {
                return None;
            }
            if self.is_wild(card) {
                wilds.push(*card);
            } else {
                naturals.push(*card);
            }
        }
        Some((naturals, wilds))
    }

    /// Ranks missing between the natural cards of a run, or `None` when two
    /// naturals share a rank.
    fn run_gaps(&self, naturals: &[Card]) -> Option<Vec<Rank>> {
        if self.wraps() {
            return cyclic_gaps(naturals);
        }

        let mut positions: Vec<u8> = naturals.iter().map(|c| self.run_position(c.rank)).collect();
        positions.sort_unstable();
        if positions.windows(2).any(|w| w[0] == w[1]) {
            return None;
        }
        let (first, last) = (*positions.first()?, *positions.last()?);
        Some(
            (first..=last)
                .filter(|p| !positions.contains(p))
                .filter_map(|p| self.rank_at(p))
                .collect(),
        )
    }

    fn run_position(&self, rank: Rank) -> u8 {
        if rank == Rank::Ace && self.ace_high {
            14
        } else {
            rank.value()
        }
    }

    fn rank_at(&self, position: u8) -> Option<Rank> {
        match position {
            14 => Some(Rank::Ace),
            p => Rank::from_value(p),
        }
    }
}

/// Gaps of a run that may wrap king→ace→two: treat ranks as a 13-cycle and
/// leave the single largest unfilled span outside the run.
fn cyclic_gaps(naturals: &[Card]) -> Option<Vec<Rank>> {
    let mut values: Vec<u8> = naturals.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable();
    if values.windows(2).any(|w| w[0] == w[1]) {
        return None;
    }
    let n = values.len();
    if n == 0 {
        return Some(Vec::new());
    }

    let mut widest = (0usize, 0u8);
    for i in 0..n {
        let here = values[i];
        let next = values[(i + 1) % n];
        let distance = if n == 1 { 13 } else { (next + 13 - here) % 13 };
        if distance > widest.1 {
            widest = (i, distance);
        }
    }

    // The run starts just after the widest span and ends at its start.
    let start = values[(widest.0 + 1) % n];
    let length = 13 - widest.1 + 1;
    let mut gaps = Vec::new();
    for step in 0..length {
        let value = (start - 1 + step) % 13 + 1;
        if !values.contains(&value) {
            gaps.extend(Rank::from_value(value));
        }
    }
    Some(gaps)
}

fn same_rank(cards: &[Card]) -> bool {
    cards.windows(2).all(|w| w[0].rank == w[1].rank)
}

/// The most frequent non-joker rank among wild cards.
fn most_common_ranked(wilds: &[Card]) -> Option<Rank> {
    let mut best: Option<(Rank, usize)> = None;
    for card in wilds.iter().filter(|c| !c.is_joker()) {
        let count = wilds.iter().filter(|c| c.rank == card.rank).count();
        if best.is_none_or(|(_, n)| count > n) {
            best = Some((card.rank, count));
        }
    }
    best.map(|(rank, _)| rank)
}
