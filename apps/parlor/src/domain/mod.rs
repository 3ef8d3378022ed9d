//! Domain layer: cards, the grouping solver and one state machine per game
//! mode. Nothing here knows about sessions or transports.

pub mod cards;
pub mod outcome;
pub mod rules;
pub mod seed_derivation;
pub mod solver;
pub mod tricks;

pub mod board_layouts;
pub mod dictionary;
pub mod letter_grid;

pub mod eight_jacks;
pub mod gin;
pub mod hearts;
pub mod rush;
pub mod spades;
pub mod three_thirteen;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_eight_jacks;
#[cfg(test)]
mod tests_gin;
#[cfg(test)]
mod tests_props_conservation;

pub use cards::{Card, CardId, Deck, Rank, Suit};
pub use outcome::Outcome;
pub use rules::{GameMode, GameRules};
