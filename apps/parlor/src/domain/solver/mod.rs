//! Meld validation and minimum-leftover search for the melding games.
//!
//! Everything here is a pure function of a hand and a [`SolverPolicy`]; the
//! solver holds no state and is safe to call from any session.

mod groups;
mod policy;
mod score;

#[cfg(test)]
mod tests_groups;
#[cfg(test)]
mod tests_score;

use serde::{Deserialize, Serialize};

use crate::domain::cards::{find_card, Card, CardId};
use crate::errors::GameError;

pub use policy::{PointValues, SolverPolicy};
pub use score::subset_sum;

/// A player's partition of a hand into melds plus unmatched cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grouping {
    pub groups: Vec<Vec<CardId>>,
    pub leftover: Vec<CardId>,
}

impl SolverPolicy {
    /// Check a client-supplied grouping against `hand` and return its
    /// leftover value.
    ///
    /// `extra` holds cards the player may meld with but does not own (in Gin,
    /// the grouped cards of the player who laid down). Every card of `hand`
    /// must appear exactly once; `extra` cards may only appear inside groups.
    pub fn score_grouping(
        &self,
        hand: &[Card],
        extra: &[Card],
        grouping: &Grouping,
    ) -> Result<i32, GameError> {
        let pool: Vec<Card> = hand.iter().chain(extra.iter()).copied().collect();
        let mut used: Vec<CardId> = Vec::with_capacity(pool.len());

        for group in &grouping.groups {
            let mut indices = Vec::with_capacity(group.len());
            for &id in group {
                if used.contains(&id) {
                    return Err(GameError::validation("card was used twice"));
                }
                let index = find_card(&pool, id).ok_or_else(|| {
                    GameError::validation(format!("unable to find card with id {id}"))
                })?;
                used.push(id);
                indices.push(index);
            }
            if !self.is_valid_group(&pool, &indices) {
                return Err(GameError::validation("not a valid grouping"));
            }
        }

        let mut score = 0;
        for &id in &grouping.leftover {
            if used.contains(&id) {
                return Err(GameError::validation("card was used twice"));
            }
            let index = find_card(hand, id).ok_or_else(|| {
                GameError::validation(format!("leftover card {id} is not in your hand"))
            })?;
            used.push(id);
            score += self.point_values.value(hand[index].rank);
        }

        if hand.iter().any(|c| !used.contains(&c.id)) {
            return Err(GameError::validation("some cards were missing from scoring"));
        }

        Ok(score)
    }
}
