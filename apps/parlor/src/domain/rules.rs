//! The capability contract every game mode implements, plus small helpers
//! shared by the rule sets.

use std::fmt::Display;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Rush,
    Hearts,
    Spades,
    #[serde(rename = "eightjacks")]
    EightJacks,
    Gin,
    #[serde(rename = "threethirteen")]
    ThreeThirteen,
}

impl GameMode {
    pub const ALL: [GameMode; 6] = [
        GameMode::Rush,
        GameMode::Hearts,
        GameMode::Spades,
        GameMode::EightJacks,
        GameMode::Gin,
        GameMode::ThreeThirteen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Rush => "rush",
            GameMode::Hearts => "hearts",
            GameMode::Spades => "spades",
            GameMode::EightJacks => "eightjacks",
            GameMode::Gin => "gin",
            GameMode::ThreeThirteen => "threethirteen",
        }
    }

    /// Modes whose seating (dealer, order, teams) the owner assigns before
    /// starting.
    pub fn requires_assignment(&self) -> bool {
        matches!(self, GameMode::Spades | GameMode::EightJacks)
    }
}

impl std::str::FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| GameError::protocol(format!("unknown game mode: {s}")))
    }
}

/// Shared lifecycle of every rule set.
///
/// `Init` is the mode's constructor (`XState::new(config, seed)`), which
/// validates the configuration. Turn operations are mode-specific inherent
/// methods returning `Result<Outcome, GameError>`; each validates all of its
/// preconditions before changing any field.
pub trait GameRules {
    /// Seat `players` participants and deal the first round.
    fn start(&mut self, players: usize) -> Result<(), GameError>;
    fn is_started(&self) -> bool;
    fn is_finished(&self) -> bool;
    fn winner(&self) -> Option<usize>;
    fn num_players(&self) -> usize;

    /// Cards (or tiles) currently held anywhere in the game.
    fn counted_cards(&self) -> usize;
    /// Cards (or tiles) created for the current deal.
    fn constructed_cards(&self) -> usize;
}

/// Reject `value` unless it lies in `range`.
pub fn check_range<T>(parameter: &'static str, value: T, range: RangeInclusive<T>) -> Result<(), GameError>
where
    T: PartialOrd + Display + Copy,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(GameError::config(
            parameter,
            value,
            format!("between {} and {}", range.start(), range.end()),
        ))
    }
}

/// Reject `value` unless it is one of `allowed`.
pub fn check_one_of<T>(parameter: &'static str, value: T, allowed: &[T]) -> Result<(), GameError>
where
    T: PartialEq + Display + Copy,
{
    if allowed.contains(&value) {
        Ok(())
    } else {
        let options: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        Err(GameError::config(parameter, value, format!("one of {}", options.join(", "))))
    }
}

/// Common guard for turn operations: started, not finished, valid seat.
pub fn ensure_in_play(
    started: bool,
    finished: bool,
    player: usize,
    players: usize,
) -> Result<(), GameError> {
    if !started {
        return Err(GameError::validation("game hasn't started yet"));
    }
    if finished {
        return Err(GameError::validation("game has already finished"));
    }
    if player >= players {
        return Err(GameError::validation(format!(
            "not a valid player identifier: {player}"
        )));
    }
    Ok(())
}
