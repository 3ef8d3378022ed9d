use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::domain::cards::Card;

use super::policy::SolverPolicy;
use super::Grouping;

/// Largest hand any melding game holds (14 dealt plus a drawn card) with
/// one to spare; the partition search is exponential in hand size.
const MAX_SEARCH_CARDS: usize = 16;

/// Whether some subset of `values` sums exactly to `target`.
///
/// O(|values| × target). Each value may be used at most as many times as it
/// appears.
pub fn subset_sum(values: &[i32], target: i32) -> bool {
    if target == 0 {
        return true;
    }
    if target < 0 {
        return false;
    }
    let Ok(target) = usize::try_from(target) else {
        return false;
    };

    let mut reachable = vec![false; target + 1];
    reachable[0] = true;
    for &value in values {
        let Ok(value) = usize::try_from(value) else {
            continue;
        };
        if value == 0 || value > target {
            continue;
        }
        // Walk downwards so each card contributes once.
        for sum in (value..=target).rev() {
            if reachable[sum - value] {
                reachable[sum] = true;
            }
        }
        if reachable[target] {
            return true;
        }
    }
    reachable[target]
}

/// Precomputed valid melds of one hand, as bitmasks bucketed by their lowest
/// card so the search only tries melds that cover the next unplaced card.
struct MeldTable {
    values: Vec<i32>,
    by_lowest: Vec<Vec<u32>>,
}

impl MeldTable {
    fn build(policy: &SolverPolicy, hand: &[Card]) -> Self {
        let n = hand.len();
        let mut by_lowest = vec![Vec::new(); n];
        let mut indices = Vec::with_capacity(n);
        for mask in 1u32..(1u32 << n) {
            let size = mask.count_ones() as usize;
            if size < 3 {
                continue;
            }
            indices.clear();
            indices.extend((0..n).filter(|i| mask & (1 << i) != 0));
            if policy.is_valid_group(hand, &indices) {
                by_lowest[mask.trailing_zeros() as usize].push(mask);
            }
        }
        Self {
            values: hand.iter().map(|c| policy.point_value(c)).collect(),
            by_lowest,
        }
    }

    fn min_leftover(&self, mask: u32, memo: &mut HashMap<u32, i32>) -> i32 {
        if mask == 0 {
            return 0;
        }
        if let Some(&known) = memo.get(&mask) {
            return known;
        }
        let low = mask.trailing_zeros() as usize;
        let mut best = self.values[low] + self.min_leftover(mask & !(1 << low), memo);
        for &meld in &self.by_lowest[low] {
            if meld & mask == meld {
                best = best.min(self.min_leftover(mask & !meld, memo));
            }
        }
        memo.insert(mask, best);
        best
    }

    fn leftovers(&self, mask: u32, memo: &mut HashMap<u32, BTreeSet<i32>>) -> BTreeSet<i32> {
        if mask == 0 {
            return BTreeSet::from([0]);
        }
        if let Some(known) = memo.get(&mask) {
            return known.clone();
        }
        let low = mask.trailing_zeros() as usize;
        let mut out: BTreeSet<i32> = self
            .leftovers(mask & !(1 << low), memo)
            .into_iter()
            .map(|s| s + self.values[low])
            .collect();
        for &meld in &self.by_lowest[low] {
            if meld & mask == meld {
                out.extend(self.leftovers(mask & !meld, memo));
            }
        }
        memo.insert(mask, out.clone());
        out
    }
}

fn full_mask(n: usize) -> u32 {
    if n == 0 {
        0
    } else {
        u32::MAX >> (32 - n)
    }
}

impl SolverPolicy {
    /// Smallest leftover value over every partition of `hand` into valid
    /// groups.
    pub fn min_score(&self, hand: &[Card]) -> i32 {
        if hand.len() > MAX_SEARCH_CARDS {
            warn!(cards = hand.len(), "[SOLVER] hand too large to search; counting every card");
            return self.hand_value(hand);
        }
        let table = MeldTable::build(self, hand);
        table.min_leftover(full_mask(hand.len()), &mut HashMap::new())
    }

    /// `min_score(hand) <= limit`, skipping the search when the whole hand
    /// already fits under the limit.
    pub fn min_score_below(&self, hand: &[Card], limit: i32) -> bool {
        self.hand_value(hand) <= limit || self.min_score(hand) <= limit
    }

    /// Whether some partition of `hand` leaves exactly `score` points.
    pub fn can_make_score(&self, hand: &[Card], score: i32) -> bool {
        let values: Vec<i32> = hand.iter().map(|c| self.point_value(c)).collect();
        let total: i32 = values.iter().sum();
        if total < score {
            return false;
        }
        if total == score {
            return true;
        }
        // No set of leftover cards can sum to the score: skip the search.
        if !subset_sum(&values, score) {
            return false;
        }
        if hand.len() > MAX_SEARCH_CARDS {
            return false;
        }
        let table = MeldTable::build(self, hand);
        table
            .leftovers(full_mask(hand.len()), &mut HashMap::new())
            .contains(&score)
    }

    /// One grouping achieving [`Self::min_score`].
    pub fn best_grouping(&self, hand: &[Card]) -> Grouping {
        if hand.len() > MAX_SEARCH_CARDS {
            return Grouping {
                groups: Vec::new(),
                leftover: hand.iter().map(|c| c.id).collect(),
            };
        }
        let table = MeldTable::build(self, hand);
        let mut memo = HashMap::new();
        let mut mask = full_mask(hand.len());
        let mut grouping = Grouping::default();

        while mask != 0 {
            let target = table.min_leftover(mask, &mut memo);
            let low = mask.trailing_zeros() as usize;
            let meld = table.by_lowest[low]
                .iter()
                .copied()
                .find(|&m| m & mask == m && table.min_leftover(mask & !m, &mut memo) == target);
            match meld {
                Some(m) => {
                    grouping.groups.push(
                        (0..hand.len())
                            .filter(|i| m & (1 << i) != 0)
                            .map(|i| hand[i].id)
                            .collect(),
                    );
                    mask &= !m;
                }
                None => {
                    grouping.leftover.push(hand[low].id);
                    mask &= !(1 << low);
                }
            }
        }
        grouping
    }
}
