//! Per-mode adapters between the wire protocol and the rule engines.
//!
//! Each rule engine implements [`ModeRules`]: its config and message types
//! plus the views sent to players. [`Driver`] turns any of them into the
//! object-safe [`ModeDriver`] a session holds, so the mode is resolved once
//! when the session is built.

pub mod eight_jacks;
pub mod gin;
pub mod hearts;
pub mod rush;
pub mod spades;
pub mod three_thirteen;


use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::dictionary::Dictionary;
use crate::domain::eight_jacks::EightJacksState;
use crate::domain::gin::GinState;
use crate::domain::hearts::HeartsState;
use crate::domain::outcome::Outcome;
use crate::domain::rules::{GameMode, GameRules};
use crate::domain::rush::RushState;
use crate::domain::spades::SpadesState;
use crate::domain::three_thirteen::ThreeThirteenState;
use crate::errors::{ConfigError, GameError};
use crate::protocol::{Assignment, Envelope, Notification};

/// What a mode message did.
#[derive(Debug, Clone, PartialEq)]
pub enum Handled {
    /// The game state changed; fan out new views.
    Changed(Outcome),
    /// A read-only answer for the sender alone.
    Reply(Notification),
}

/// Options every mode configuration accepts next to its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommonOptions {
    /// Run the countback barrier before the start.
    pub countdown: bool,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self { countdown: true }
    }
}

impl CommonOptions {
    pub fn from_config(config: &Value) -> Result<Self, GameError> {
        serde_json::from_value(or_empty(config))
            .map_err(|e| ConfigError::new("countdown", e, "true or false").into())
    }
}

/// A missing configuration means all defaults.
fn or_empty(config: &Value) -> Value {
    if config.is_null() {
        Value::Object(Default::default())
    } else {
        config.clone()
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value, GameError> {
    serde_json::to_value(value)
        .map_err(|e| GameError::invariant(format!("unable to encode view: {e}")))
}

/// A rule engine as seen by the protocol layer.
pub trait ModeRules: GameRules + Serialize + DeserializeOwned + Send + Sync + 'static {
    const MODE: GameMode;
    type Config: DeserializeOwned;
    type Message: DeserializeOwned;

    fn create(config: Self::Config, seed: [u8; 32]) -> Result<Self, GameError>;

    fn apply(
        &mut self,
        seat: usize,
        message: Self::Message,
        dictionary: &Dictionary,
    ) -> Result<Handled, GameError>;

    /// What `seat` may see of the game.
    fn player_view(&self, seat: usize) -> Result<Value, GameError>;

    /// Public summary shown to everyone, spectators included.
    fn synopsis(&self) -> Result<Value, GameError>;

    /// Dealer and teams picked by the owner before the start. Modes without
    /// seat assignment accept only the empty assignment.
    fn assign(&mut self, assignment: &Assignment, _players: usize) -> Result<(), GameError> {
        if assignment.dealer == 0 && assignment.teams.is_empty() {
            Ok(())
        } else {
            Err(GameError::validation(format!(
                "{} does not assign dealers or teams",
                Self::MODE.as_str()
            )))
        }
    }
}

/// The session-facing capability set of one running game.
pub trait ModeDriver: Send + Sync {
    fn mode(&self) -> GameMode;
    fn rules(&self) -> &dyn GameRules;
    fn start(&mut self, players: usize) -> Result<(), GameError>;
    /// Decode and apply a mode-specific message for `seat`. Unknown message
    /// types are protocol errors even from unseated users.
    fn handle(&mut self, seat: Option<usize>, envelope: &Envelope) -> Result<Handled, GameError>;
    fn player_view(&self, seat: usize) -> Result<Value, GameError>;
    fn synopsis(&self) -> Result<Value, GameError>;
    /// Everything, hands and deck included.
    fn peek(&self) -> Result<Value, GameError>;
    fn assign(&mut self, assignment: &Assignment, players: usize) -> Result<(), GameError>;
    fn snapshot(&self) -> Result<Value, GameError>;
    /// (counted, constructed) cards or tiles.
    fn card_count(&self) -> (usize, usize);
}

pub struct Driver<S> {
    state: S,
    dictionary: Arc<Dictionary>,
}

impl<S: ModeRules> Driver<S> {
    pub fn new(state: S, dictionary: Arc<Dictionary>) -> Self {
        Self { state, dictionary }
    }
}

impl<S: ModeRules> ModeDriver for Driver<S> {
    fn mode(&self) -> GameMode {
        S::MODE
    }

    fn rules(&self) -> &dyn GameRules {
        &self.state
    }

    fn start(&mut self, players: usize) -> Result<(), GameError> {
        self.state.start(players)
    }

    fn handle(&mut self, seat: Option<usize>, envelope: &Envelope) -> Result<Handled, GameError> {
        let message: S::Message = envelope.body()?;
        let seat = seat.ok_or_else(|| GameError::validation("not seated in this game"))?;
        self.state.apply(seat, message, &self.dictionary)
    }

    fn player_view(&self, seat: usize) -> Result<Value, GameError> {
        self.state.player_view(seat)
    }

    fn synopsis(&self) -> Result<Value, GameError> {
        self.state.synopsis()
    }

    fn peek(&self) -> Result<Value, GameError> {
        let mut state = to_json(&self.state)?;
        // The seed would reveal future shuffles.
        if let Some(fields) = state.as_object_mut() {
            fields.remove("shuffle");
        }
        Ok(state)
    }

    fn assign(&mut self, assignment: &Assignment, players: usize) -> Result<(), GameError> {
        self.state.assign(assignment, players)
    }

    fn snapshot(&self) -> Result<Value, GameError> {
        to_json(&self.state)
    }

    fn card_count(&self) -> (usize, usize) {
        (self.state.counted_cards(), self.state.constructed_cards())
    }
}

fn create<S: ModeRules>(
    config: &Value,
    seed: [u8; 32],
    dictionary: Arc<Dictionary>,
) -> Result<Box<dyn ModeDriver>, GameError> {
    let config: S::Config = serde_json::from_value(or_empty(config)).map_err(|e| {
        GameError::from(ConfigError::new(
            "config",
            e,
            format!("a {} configuration", S::MODE.as_str()),
        ))
    })?;
    Ok(Box::new(Driver::new(S::create(config, seed)?, dictionary)))
}

/// Build a fresh game of `mode` from its JSON configuration.
pub fn build_driver(
    mode: GameMode,
    config: &Value,
    seed: [u8; 32],
    dictionary: Arc<Dictionary>,
) -> Result<Box<dyn ModeDriver>, GameError> {
    match mode {
        GameMode::Rush => create::<RushState>(config, seed, dictionary),
        GameMode::Hearts => create::<HeartsState>(config, seed, dictionary),
        GameMode::Spades => create::<SpadesState>(config, seed, dictionary),
        GameMode::EightJacks => create::<EightJacksState>(config, seed, dictionary),
        GameMode::Gin => create::<GinState>(config, seed, dictionary),
        GameMode::ThreeThirteen => create::<ThreeThirteenState>(config, seed, dictionary),
    }
}

fn revive<S: ModeRules>(
    snapshot: &Value,
    dictionary: Arc<Dictionary>,
) -> Result<Box<dyn ModeDriver>, GameError> {
    let state: S = serde_json::from_value(snapshot.clone()).map_err(|e| {
        GameError::invariant(format!("stored {} state is unreadable: {e}", S::MODE.as_str()))
    })?;
    Ok(Box::new(Driver::new(state, dictionary)))
}

/// Rebuild a game from [`ModeDriver::snapshot`] output.
pub fn restore_driver(
    mode: GameMode,
    snapshot: &Value,
    dictionary: Arc<Dictionary>,
) -> Result<Box<dyn ModeDriver>, GameError> {
    match mode {
        GameMode::Rush => revive::<RushState>(snapshot, dictionary),
        GameMode::Hearts => revive::<HeartsState>(snapshot, dictionary),
        GameMode::Spades => revive::<SpadesState>(snapshot, dictionary),
        GameMode::EightJacks => revive::<EightJacksState>(snapshot, dictionary),
        GameMode::Gin => revive::<GinState>(snapshot, dictionary),
        GameMode::ThreeThirteen => revive::<ThreeThirteenState>(snapshot, dictionary),
    }
}
